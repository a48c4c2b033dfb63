pub mod alerts;
pub mod assessment;
pub mod measurement;
pub mod params;
pub mod reference;

pub use alerts::{AlertKind, GrowthAlert};
pub use assessment::{GrowthAssessment, GrowthStatus, ReferenceValues, Severity, ZScoreResult};
pub use measurement::{Measurement, Visit};
pub use params::{DuplicateAgePolicy, EngineParams};
pub use reference::{ChartType, Gender, ReferencePoint};

#[cfg(test)]
#[path = "../../tests/src_inline/model/tests.rs"]
mod tests;
