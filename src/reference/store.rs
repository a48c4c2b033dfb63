use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use crate::model::{ChartType, EngineParams};
use crate::pipeline::stage1_build::{BuildError, BuildReport, build_reference_set};
use crate::reference::{RawReferenceRow, ReferenceSet};

/// A published, never-mutated view of the reference data.
#[derive(Debug)]
pub struct ReferenceSnapshot {
    pub version: u64,
    pub set: ReferenceSet,
    pub report: BuildReport,
}

/// Process-wide holder of the current snapshot.
///
/// Readers clone the `Arc` and keep using it for as long as they like; a refresh
/// builds a complete new snapshot off to the side and swaps the pointer.
#[derive(Debug)]
pub struct ReferenceStore {
    current: RwLock<Arc<ReferenceSnapshot>>,
    next_version: AtomicU64,
}

impl ReferenceStore {
    pub fn new(set: ReferenceSet, report: BuildReport) -> Self {
        let snapshot = ReferenceSnapshot {
            version: 1,
            set,
            report,
        };
        Self {
            current: RwLock::new(Arc::new(snapshot)),
            next_version: AtomicU64::new(2),
        }
    }

    pub fn build(
        rows: &[RawReferenceRow],
        default_chart: Option<ChartType>,
        params: &EngineParams,
    ) -> Result<Self, BuildError> {
        let (set, report) = build_reference_set(rows, default_chart, params)?;
        Ok(Self::new(set, report))
    }

    pub fn snapshot(&self) -> Arc<ReferenceSnapshot> {
        let guard = self.current.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&*guard)
    }

    pub fn version(&self) -> u64 {
        self.snapshot().version
    }

    /// Rebuild from `rows` and publish. On failure the previous snapshot stays live.
    pub fn refresh(
        &self,
        rows: &[RawReferenceRow],
        default_chart: Option<ChartType>,
        params: &EngineParams,
    ) -> Result<Arc<ReferenceSnapshot>, BuildError> {
        let (set, report) = build_reference_set(rows, default_chart, params)?;
        let snapshot = Arc::new(ReferenceSnapshot {
            version: self.next_version.fetch_add(1, Ordering::SeqCst),
            set,
            report,
        });
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        *guard = Arc::clone(&snapshot);
        drop(guard);
        tracing::info!(version = snapshot.version, "reference snapshot published");
        Ok(snapshot)
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/reference/store.rs"]
mod tests;
