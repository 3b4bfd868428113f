//! Decoder configuration.
//!
//! Only one policy is configurable today: what to do when a reserved byte
//! range holds a nonzero byte. Every observed firmware revision keeps those
//! ranges zeroed, so the default fails fast; `Tolerate` exists for captures
//! from monitors that have never been seen before.

/// Policy applied when a reserved byte range is not all-zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReservedPolicy {
    /// Reject the block with `ReservedNonZero`.
    #[default]
    Strict,
    /// Log a warning and keep decoding.
    Tolerate,
}

/// Options shared by every block decoder.
///
/// # Examples
/// ```
/// use cmsdecode_core::{DecodeConfig, ReservedPolicy};
///
/// let config = DecodeConfig::lenient();
/// assert_eq!(config.reserved, ReservedPolicy::Tolerate);
/// assert_eq!(DecodeConfig::default().reserved, ReservedPolicy::Strict);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeConfig {
    pub reserved: ReservedPolicy,
}

impl DecodeConfig {
    /// Configuration that logs reserved-range anomalies instead of failing.
    pub fn lenient() -> Self {
        Self {
            reserved: ReservedPolicy::Tolerate,
        }
    }
}
