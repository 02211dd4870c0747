//! Farmer profile models

use serde::{Deserialize, Serialize};

use crate::types::lenient;

/// Farm characteristics captured during onboarding.
///
/// Every field is optional: the pipeline defaults each one independently.
/// The onboarding form stores its inputs under `fertilizerUse`,
/// `pesticideUse` and `irrigatedArea`; those keys are read as the
/// corresponding rate/area fields. When a record carries several spellings
/// of one field, the snake_case key wins, then camelCase, then the form key.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(from = "StoredProfile")]
pub struct UserProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,

    pub state: Option<String>,
    pub fertilizer_rate_kg_per_ha: Option<f64>,
    pub pesticide_rate_l_per_ha: Option<f64>,
    pub farm_size_ha: Option<f64>,
    pub irrigated_area_ha: Option<f64>,
}

/// Profile record as persisted, one slot per accepted key
#[derive(Debug, Default, Deserialize)]
struct StoredProfile {
    #[serde(default, deserialize_with = "lenient::optional_string")]
    first_name: Option<String>,
    #[serde(default, rename = "firstName", deserialize_with = "lenient::optional_string")]
    first_name_camel: Option<String>,

    #[serde(default, deserialize_with = "lenient::optional_string")]
    last_name: Option<String>,
    #[serde(default, rename = "lastName", deserialize_with = "lenient::optional_string")]
    last_name_camel: Option<String>,

    #[serde(default, deserialize_with = "lenient::optional_string")]
    state: Option<String>,

    #[serde(default, deserialize_with = "lenient::optional_f64")]
    fertilizer_rate_kg_per_ha: Option<f64>,
    #[serde(default, rename = "fertilizerRateKgPerHa", deserialize_with = "lenient::optional_f64")]
    fertilizer_rate_camel: Option<f64>,
    #[serde(default, rename = "fertilizerUse", deserialize_with = "lenient::optional_f64")]
    fertilizer_use: Option<f64>,

    #[serde(default, deserialize_with = "lenient::optional_f64")]
    pesticide_rate_l_per_ha: Option<f64>,
    #[serde(default, rename = "pesticideRateLPerHa", deserialize_with = "lenient::optional_f64")]
    pesticide_rate_camel: Option<f64>,
    #[serde(default, rename = "pesticideUse", deserialize_with = "lenient::optional_f64")]
    pesticide_use: Option<f64>,

    #[serde(default, deserialize_with = "lenient::optional_f64")]
    farm_size_ha: Option<f64>,
    #[serde(default, rename = "farmSizeHa", deserialize_with = "lenient::optional_f64")]
    farm_size_camel: Option<f64>,

    #[serde(default, deserialize_with = "lenient::optional_f64")]
    irrigated_area_ha: Option<f64>,
    #[serde(default, rename = "irrigatedAreaHa", deserialize_with = "lenient::optional_f64")]
    irrigated_area_camel: Option<f64>,
    #[serde(default, rename = "irrigatedArea", deserialize_with = "lenient::optional_f64")]
    irrigated_area: Option<f64>,
}

impl From<StoredProfile> for UserProfile {
    fn from(stored: StoredProfile) -> Self {
        Self {
            first_name: stored.first_name.or(stored.first_name_camel),
            last_name: stored.last_name.or(stored.last_name_camel),
            state: stored.state,
            fertilizer_rate_kg_per_ha: stored
                .fertilizer_rate_kg_per_ha
                .or(stored.fertilizer_rate_camel)
                .or(stored.fertilizer_use),
            pesticide_rate_l_per_ha: stored
                .pesticide_rate_l_per_ha
                .or(stored.pesticide_rate_camel)
                .or(stored.pesticide_use),
            farm_size_ha: stored.farm_size_ha.or(stored.farm_size_camel),
            irrigated_area_ha: stored
                .irrigated_area_ha
                .or(stored.irrigated_area_camel)
                .or(stored.irrigated_area),
        }
    }
}
