use chrono::NaiveDate;
use serde::Serialize;

use crate::model::reference::{ChartType, Gender};

/// One measured value on one chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Measurement {
    pub patient_id: String,
    pub gender: Gender,
    pub age_days: i64,
    pub value: f64,
    pub date: Option<NaiveDate>,
}

/// Everything recorded at one clinic visit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Visit {
    pub patient_id: String,
    pub gender: Gender,
    pub age_days: i64,
    pub date: Option<NaiveDate>,
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
    pub head_circumference_cm: Option<f64>,
}

impl Visit {
    /// Body-mass index in kg/m^2, when both weight and a positive height are known.
    pub fn bmi(&self) -> Option<f64> {
        let weight = self.weight_kg?;
        let height_m = self.height_cm? / 100.0;
        if height_m <= 0.0 || !weight.is_finite() || !height_m.is_finite() {
            return None;
        }
        Some(weight / (height_m * height_m))
    }

    pub fn value_for(&self, chart: ChartType) -> Option<f64> {
        match chart {
            ChartType::WeightForAge => self.weight_kg,
            ChartType::HeightForAge => self.height_cm,
            ChartType::HeadCircumferenceForAge => self.head_circumference_cm,
            ChartType::BmiForAge => self.bmi(),
        }
    }

    pub fn measurement(&self, chart: ChartType) -> Option<Measurement> {
        self.value_for(chart).map(|value| Measurement {
            patient_id: self.patient_id.clone(),
            gender: self.gender,
            age_days: self.age_days,
            value,
            date: self.date,
        })
    }
}
