//! Domain models for field delineation and derived metrics

mod capture;
mod crop;
mod defaults;
mod field;
mod metrics;
mod profile;
mod weather;

pub use capture::*;
pub use crop::*;
pub use defaults::*;
pub use field::*;
pub use metrics::*;
pub use profile::*;
pub use weather::*;
