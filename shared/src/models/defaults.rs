//! Fallback values for every derived metric and profile field
//!
//! All defaulting in the pipeline goes through [`MetricDefaults`]; no call
//! site coalesces optional fields on its own.

use serde::{Deserialize, Serialize};

/// Defaults applied when a backend or the farmer profile leaves a value out
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MetricDefaults {
    /// Average air temperature (°C)
    pub temperature_c: f64,
    /// Total rainfall (mm)
    pub rainfall_mm: f64,
    pub soil_ph: f64,
    pub ndvi_mean: f64,
    /// Soil organic carbon (%)
    pub soil_org_carbon_pct: f64,
    pub fertilizer_rate_kg_per_ha: f64,
    pub pesticide_rate_l_per_ha: f64,
    pub farm_size_ha: f64,
    pub irrigated_area_ha: f64,
    /// Used when neither the profile nor the geometry backend names a state
    pub state: String,
}

impl Default for MetricDefaults {
    fn default() -> Self {
        Self {
            temperature_c: 25.0,
            rainfall_mm: 100.0,
            soil_ph: 6.5,
            ndvi_mean: 0.45,
            soil_org_carbon_pct: 1.2,
            fertilizer_rate_kg_per_ha: 50.0,
            pesticide_rate_l_per_ha: 2.0,
            farm_size_ha: 1.5,
            irrigated_area_ha: 0.5,
            state: "Unknown".to_string(),
        }
    }
}
