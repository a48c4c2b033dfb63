use std::collections::BTreeMap;

pub mod raw;
pub mod store;

pub use raw::{RawReferenceRow, RawValue};
pub use store::{ReferenceSnapshot, ReferenceStore};

use crate::model::{ChartType, Gender, ReferencePoint};

/// Age-sorted reference curve for one chart, split by gender. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceTable {
    chart: ChartType,
    by_gender: BTreeMap<Gender, Vec<ReferencePoint>>,
}

impl ReferenceTable {
    /// Caller guarantees each vector is sorted by `age_days` with no repeated ages.
    pub(crate) fn from_sorted(chart: ChartType, by_gender: BTreeMap<Gender, Vec<ReferencePoint>>) -> Self {
        debug_assert!(
            by_gender
                .values()
                .all(|pts| pts.windows(2).all(|w| w[0].age_days < w[1].age_days))
        );
        Self { chart, by_gender }
    }

    pub fn chart(&self) -> ChartType {
        self.chart
    }

    pub fn points(&self, gender: Gender) -> &[ReferencePoint] {
        self.by_gender
            .get(&gender)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn genders(&self) -> impl Iterator<Item = Gender> + '_ {
        self.by_gender
            .iter()
            .filter(|(_, pts)| !pts.is_empty())
            .map(|(g, _)| *g)
    }

    pub fn len(&self) -> usize {
        self.by_gender.values().map(|v| v.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Covered age range for a gender, inclusive.
    pub fn age_range(&self, gender: Gender) -> Option<(u32, u32)> {
        let pts = self.points(gender);
        Some((pts.first()?.age_days, pts.last()?.age_days))
    }
}

/// All chart tables produced by one build.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceSet {
    tables: BTreeMap<ChartType, ReferenceTable>,
}

impl ReferenceSet {
    pub fn get(&self, chart: ChartType) -> Option<&ReferenceTable> {
        self.tables.get(&chart)
    }

    pub fn charts(&self) -> impl Iterator<Item = ChartType> + '_ {
        self.tables.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub(crate) fn insert(&mut self, table: ReferenceTable) {
        self.tables.insert(table.chart(), table);
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/reference/tests.rs"]
mod tests;
