use crate::model::assessment::{NO_REFERENCE_DATA, UNABLE_TO_ASSESS};
use crate::model::{ChartType, GrowthStatus, Severity};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub label: &'static str,
    pub severity: Severity,
    pub recommendation: &'static str,
}

/// Z-score channels, lowest first. A Z below `upper` (or at/below when `inclusive`) falls in the band.
struct Band {
    upper: f64,
    inclusive: bool,
    class: Classification,
}

const BANDS: &[Band] = &[
    Band {
        upper: -3.0,
        inclusive: false,
        class: Classification {
            label: "Severe Underweight",
            severity: Severity::Severe,
            recommendation: "Urgent referral for nutritional rehabilitation and medical evaluation",
        },
    },
    Band {
        upper: -2.0,
        inclusive: false,
        class: Classification {
            label: "Moderate Underweight",
            severity: Severity::Moderate,
            recommendation: "Nutritional counselling and follow-up within 2 weeks",
        },
    },
    Band {
        upper: -1.0,
        inclusive: false,
        class: Classification {
            label: "Mild Underweight",
            severity: Severity::Mild,
            recommendation: "Review feeding practices and monitor growth monthly",
        },
    },
    Band {
        upper: 1.0,
        inclusive: true,
        class: Classification {
            label: "Normal",
            severity: Severity::Normal,
            recommendation: "Continue routine growth monitoring",
        },
    },
    Band {
        upper: 2.0,
        inclusive: true,
        class: Classification {
            label: "Overweight",
            severity: Severity::Mild,
            recommendation: "Review diet and physical activity at the next visit",
        },
    },
    Band {
        upper: 3.0,
        inclusive: true,
        class: Classification {
            label: "Obese",
            severity: Severity::Moderate,
            recommendation: "Dietary counselling and lifestyle intervention",
        },
    },
];

const SEVERELY_OBESE: Classification = Classification {
    label: "Severely Obese",
    severity: Severity::Severe,
    recommendation: "Refer for specialist evaluation of obesity and comorbidities",
};

pub const UNASSESSABLE: Classification = Classification {
    label: UNABLE_TO_ASSESS,
    severity: Severity::Normal,
    recommendation: "Verify the measurement, age and units, then reassess",
};

pub const NO_COVERAGE: Classification = Classification {
    label: NO_REFERENCE_DATA,
    severity: Severity::Normal,
    recommendation: "Verify reference data coverage for this chart and gender",
};

/// Same cut-offs as `BANDS`, worded for charts other than weight-for-age.
const REFERENCE_BANDS: &[Band] = &[
    Band {
        upper: -3.0,
        inclusive: false,
        class: Classification {
            label: "Severely below reference",
            severity: Severity::Severe,
            recommendation: "Urgent clinical evaluation of growth",
        },
    },
    Band {
        upper: -2.0,
        inclusive: false,
        class: Classification {
            label: "Moderately below reference",
            severity: Severity::Moderate,
            recommendation: "Clinical review and repeat measurement within 2 weeks",
        },
    },
    Band {
        upper: -1.0,
        inclusive: false,
        class: Classification {
            label: "Mildly below reference",
            severity: Severity::Mild,
            recommendation: "Monitor growth monthly",
        },
    },
    Band {
        upper: 1.0,
        inclusive: true,
        class: Classification {
            label: "Within reference range",
            severity: Severity::Normal,
            recommendation: "Continue routine growth monitoring",
        },
    },
    Band {
        upper: 2.0,
        inclusive: true,
        class: Classification {
            label: "Mildly above reference",
            severity: Severity::Mild,
            recommendation: "Recheck at the next routine visit",
        },
    },
    Band {
        upper: 3.0,
        inclusive: true,
        class: Classification {
            label: "Moderately above reference",
            severity: Severity::Moderate,
            recommendation: "Clinical review of growth at the next visit",
        },
    },
];

const SEVERELY_ABOVE: Classification = Classification {
    label: "Severely above reference",
    severity: Severity::Severe,
    recommendation: "Refer for specialist evaluation of growth",
};

fn classify_bands(z: Option<f64>, bands: &[Band], above: Classification) -> Classification {
    let Some(z) = z.filter(|z| z.is_finite()) else {
        return UNASSESSABLE;
    };
    for band in bands {
        let inside = if band.inclusive {
            z <= band.upper
        } else {
            z < band.upper
        };
        if inside {
            return band.class;
        }
    }
    above
}

/// Single-metric classification for a weight-for-age Z-score.
pub fn classify_zscore(z: Option<f64>) -> Classification {
    classify_bands(z, BANDS, SEVERELY_OBESE)
}

/// Weight-for-age uses the nutritional labels; every other chart gets neutral wording.
pub fn classify_chart_zscore(chart: ChartType, z: Option<f64>) -> Classification {
    match chart {
        ChartType::WeightForAge => classify_zscore(z),
        _ => classify_bands(z, REFERENCE_BANDS, SEVERELY_ABOVE),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GrowthZScores {
    pub weight_for_age: Option<f64>,
    pub height_for_age: Option<f64>,
    pub bmi_for_age: Option<f64>,
}

/// Combined status; first matching rule wins.
pub fn classify_growth(z: &GrowthZScores) -> GrowthStatus {
    let above = |v: Option<f64>, t: f64| v.is_some_and(|v| v > t);
    let below = |v: Option<f64>, t: f64| v.is_some_and(|v| v < t);

    if above(z.bmi_for_age, 3.0) {
        GrowthStatus::Obese
    } else if above(z.bmi_for_age, 2.0) {
        GrowthStatus::Overweight
    } else if below(z.weight_for_age, -2.0) {
        GrowthStatus::Underweight
    } else if below(z.height_for_age, -2.0) {
        GrowthStatus::Stunted
    } else if z.weight_for_age.is_none() && z.height_for_age.is_none() && z.bmi_for_age.is_none() {
        GrowthStatus::Unknown
    } else {
        GrowthStatus::Normal
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage6_classify.rs"]
mod tests;
