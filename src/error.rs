use thiserror::Error;

/// Returned when an entry cannot be placed inside its hop neighborhood.
///
/// The table never resizes. Insertion fails either when no empty slot exists
/// at or after the entry's base bucket, or when no chain of displacements can
/// bring an empty slot within range. Both causes surface as this one error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("could not insert hash code {code:#018x}: no free slot within hop range")]
pub struct InsertionFailed {
    code: u64,
}

impl InsertionFailed {
    pub(crate) fn new(code: u64) -> Self {
        Self { code }
    }

    /// The hash code of the entry that could not be inserted.
    pub fn code(&self) -> u64 {
        self.code
    }
}

/// Errors produced while validating a [`TableConfig`](crate::TableConfig).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A hop range of zero leaves no legal slot for any entry.
    #[error("hop range must be at least 1")]
    ZeroHopRange,
    /// The neighborhood cannot be wider than the table itself.
    #[error("hop range {hop_range} exceeds table size {size}")]
    HopRangeExceedsSize {
        /// Configured hop range.
        hop_range: usize,
        /// Number of slots implied by the configured power.
        size: usize,
    },
    /// `2^power` slots cannot be addressed on this target.
    #[error("table power {power} is too large for this target")]
    PowerTooLarge {
        /// Configured power.
        power: u32,
    },
}
