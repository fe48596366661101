//! Error types for rustof.

use crate::dim::{ConvertMode, Dim};
use thiserror::Error;

/// Result type alias for rustof operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy for coordinate conversion.
///
/// All variants are deterministic input-validation failures; they are
/// surfaced to the caller immediately and never retried. A failed conversion
/// leaves no partially rewritten coordinate observable.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A required beamline coordinate is absent.
    #[error("missing beamline metadata: no `{0}` coordinate")]
    MissingMetadata(Dim),

    /// Mutually exclusive inputs were both set or both unset.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The origin/target/mode combination is not in the supported mapping.
    #[error("unsupported conversion: `{origin}` to `{target}` in {mode} mode")]
    UnsupportedConversion {
        /// Dimension converted from.
        origin: Dim,
        /// Dimension converted to.
        target: Dim,
        /// Requested scattering mode.
        mode: ConvertMode,
    },

    /// An input unit does not match what the operation expects.
    #[error("unit mismatch: expected {expected}, found {found}")]
    UnitMismatch {
        /// Unit the operation expects.
        expected: String,
        /// Unit actually found.
        found: String,
    },

    /// A derived value left its valid numerical domain.
    #[error("numerical domain error: {0}")]
    NumericalDomain(String),

    /// Array dimensions or extents are incompatible.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    /// Ragged index ranges violate the bucket invariants.
    #[error("invalid event ranges: {0}")]
    InvalidRanges(String),
}
