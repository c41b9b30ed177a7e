//! Error types for the `lasing-medium` crate.
//!
//! All fallible operations in this crate return [`MediumError`]. Every
//! variant is a construction-time or caller error; the per-tick rules
//! themselves cannot fail.

/// Errors that can occur when building or addressing the fluorophore lattice.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MediumError {
    /// A probability was NaN or outside `[0, 1]`.
    #[error("{name} must be a probability in [0, 1], got {value}")]
    InvalidProbability {
        /// Name of the offending parameter.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// A lattice dimension was zero.
    #[error("{name} must be at least 1, got {value}")]
    InvalidDimension {
        /// Name of the offending dimension.
        name: &'static str,
        /// The rejected value.
        value: u32,
    },

    /// The lattice has more cells than can be counted.
    #[error("lattice of {width}x{height} cells is too large")]
    LatticeTooLarge {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },

    /// A cell position lies outside the lattice.
    #[error("cell (row {row}, column {column}) is outside the lattice")]
    CellOutOfBounds {
        /// Requested row.
        row: u32,
        /// Requested column.
        column: u32,
    },
}
