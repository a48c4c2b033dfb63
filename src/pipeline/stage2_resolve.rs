use crate::model::{Gender, ReferencePoint};
use crate::reference::ReferenceTable;

/// Where a requested age falls on a reference curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution<'a> {
    /// Gender missing from the table, or the table is empty.
    NoData,
    Exact(&'a ReferencePoint),
    Bracket {
        lower: &'a ReferencePoint,
        upper: &'a ReferencePoint,
    },
    /// Age outside the covered range; nearest endpoint, not interpolated.
    Clamped(&'a ReferencePoint),
}

pub fn resolve_point(table: &ReferenceTable, gender: Gender, age_days: u32) -> Resolution<'_> {
    let points = table.points(gender);
    if points.is_empty() {
        return Resolution::NoData;
    }
    match points.binary_search_by_key(&age_days, |p| p.age_days) {
        Ok(idx) => Resolution::Exact(&points[idx]),
        Err(0) => Resolution::Clamped(&points[0]),
        Err(idx) if idx == points.len() => Resolution::Clamped(&points[idx - 1]),
        Err(idx) => Resolution::Bracket {
            lower: &points[idx - 1],
            upper: &points[idx],
        },
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage2_resolve.rs"]
mod tests;
