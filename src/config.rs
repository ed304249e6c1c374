use crate::error::ConfigError;

/// Default neighborhood width.
pub const DEFAULT_HOP_RANGE: usize = 32;

/// Default table power, i.e. `2^16` slots.
pub const DEFAULT_POWER: u32 = 16;

/// Sizing parameters for a hopscotch table.
///
/// A table built from this config has exactly `2^power` slots, and every entry
/// lives at most `hop_range - 1` slots after its base bucket. Neither value
/// changes for the lifetime of the table, so callers should pick them for the
/// load factor they expect to reach.
///
/// # Examples
///
/// ```rust
/// use hophash::TableConfig;
///
/// let config = TableConfig::new(8, 10);
/// assert_eq!(config.size(), Ok(1024));
/// assert!(config.validate().is_ok());
///
/// assert!(TableConfig::new(0, 10).validate().is_err());
/// assert!(TableConfig::new(32, 4).validate().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TableConfig {
    /// Maximum distance, in slots, from an entry's base bucket (exclusive).
    pub hop_range: usize,
    /// Base-two logarithm of the number of slots.
    pub power: u32,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            hop_range: DEFAULT_HOP_RANGE,
            power: DEFAULT_POWER,
        }
    }
}

impl TableConfig {
    /// Creates a config with the given hop range and power.
    pub const fn new(hop_range: usize, power: u32) -> Self {
        Self { hop_range, power }
    }

    /// Number of slots a table built from this config will have.
    pub fn size(&self) -> Result<usize, ConfigError> {
        if self.power >= usize::BITS {
            return Err(ConfigError::PowerTooLarge { power: self.power });
        }
        Ok(1usize << self.power)
    }

    /// Checks that the hop range is in `1..=size`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let size = self.size()?;
        if self.hop_range == 0 {
            return Err(ConfigError::ZeroHopRange);
        }
        if self.hop_range > size {
            return Err(ConfigError::HopRangeExceedsSize {
                hop_range: self.hop_range,
                size,
            });
        }
        Ok(())
    }
}
