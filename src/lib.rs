//! Child growth assessment against LMS reference curves.
//!
//! Reference rows are validated into immutable per-chart tables
//! ([`pipeline::stage1_build`]), looked up and interpolated by age, and turned into
//! Z-scores, percentiles, classifications and longitudinal trends.

pub mod input;
pub mod logging;
pub mod model;
pub mod pipeline;
pub mod reference;
pub mod report;

pub use model::{
    ChartType, EngineParams, Gender, GrowthAssessment, GrowthStatus, Measurement, ReferencePoint,
    Severity, Visit, ZScoreResult,
};
pub use pipeline::assess::{assess, assess_series, assess_visit, compute_zscore_result};
pub use pipeline::stage1_build::{BuildError, BuildReport, build_reference_set, build_reference_table};
pub use pipeline::stage5_percentile::{percentile_to_z, z_to_percentile};
pub use pipeline::stage7_trend::{WeightProjection, analyze_trend, project_weight};
pub use reference::{RawReferenceRow, RawValue, ReferenceSet, ReferenceStore, ReferenceTable};

#[cfg(test)]
#[path = "../tests/src_inline/testutil.rs"]
pub(crate) mod testutil;
