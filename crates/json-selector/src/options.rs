//! Query options and the processing flags derived from them.

use serde::{Deserialize, Serialize};
use std::ops::{BitOr, BitOrAssign};

/// Default limit on recursive descent.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// How matched results are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortBy {
    /// Document traversal order.
    #[default]
    None,
    /// Ascending normalized path.
    Path,
    /// Ascending value, using the kind-first total order.
    Value,
}

/// Whether union members are evaluated one after another or concurrently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExecutionMode {
    #[default]
    Sequential,
    Parallel,
}

/// Options accepted by every query operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct JsonSelectorOptions {
    /// Drop results whose normalized path was already produced.
    pub no_duplicates: bool,
    pub sort_by: SortBy,
    /// Deepest recursive-descent level allowed; the root is level 0.
    pub max_depth: usize,
    pub execution_mode: ExecutionMode,
}

impl Default for JsonSelectorOptions {
    fn default() -> Self {
        JsonSelectorOptions {
            no_duplicates: false,
            sort_by: SortBy::None,
            max_depth: DEFAULT_MAX_DEPTH,
            execution_mode: ExecutionMode::Sequential,
        }
    }
}

impl JsonSelectorOptions {
    pub fn with_no_duplicates(mut self, no_duplicates: bool) -> Self {
        self.no_duplicates = no_duplicates;
        self
    }

    pub fn with_sort_by(mut self, sort_by: SortBy) -> Self {
        self.sort_by = sort_by;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_execution_mode(mut self, execution_mode: ExecutionMode) -> Self {
        self.execution_mode = execution_mode;
        self
    }

    pub(crate) fn flags(&self) -> ProcessingFlags {
        let mut flags = ProcessingFlags::default();
        if self.no_duplicates {
            flags |= ProcessingFlags::NO_DUPLICATES;
        }
        match self.sort_by {
            SortBy::None => {}
            SortBy::Path => flags |= ProcessingFlags::SORT_BY_PATH,
            SortBy::Value => flags |= ProcessingFlags::SORT_BY_VALUE,
        }
        flags
    }
}

/// Bit set steering evaluation. Duplicate removal and path sorting both
/// imply that locations are tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct ProcessingFlags(u8);

impl ProcessingFlags {
    pub(crate) const PATHS_REQUIRED: ProcessingFlags = ProcessingFlags(0b0001);
    pub(crate) const NO_DUPLICATES: ProcessingFlags = ProcessingFlags(0b0011);
    pub(crate) const SORT_BY_PATH: ProcessingFlags = ProcessingFlags(0b0101);
    pub(crate) const SORT_BY_VALUE: ProcessingFlags = ProcessingFlags(0b1000);

    pub(crate) fn contains(self, other: ProcessingFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Results must be gathered before they are returned.
    pub(crate) fn needs_post_processing(self) -> bool {
        self.contains(Self::NO_DUPLICATES)
            || self.contains(Self::SORT_BY_PATH)
            || self.contains(Self::SORT_BY_VALUE)
    }
}

impl BitOr for ProcessingFlags {
    type Output = ProcessingFlags;

    fn bitor(self, rhs: ProcessingFlags) -> ProcessingFlags {
        ProcessingFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for ProcessingFlags {
    fn bitor_assign(&mut self, rhs: ProcessingFlags) {
        self.0 |= rhs.0;
    }
}
