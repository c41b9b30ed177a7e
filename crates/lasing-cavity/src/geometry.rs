//! Axial layout of the cavity and region classification for photons.
//!
//! ```text
//! 0        far mirror          medium            output coupler      domain edge
//! |------------|============[#########]============|-------------------|
//!           offset      medium_origin         offset+length-1     domain_width-1
//! ```
//!
//! The medium is centered between the mirrors and its rows are the
//! transverse coordinate of every photon. Photons only move along the axis,
//! so the transverse extent of the cavity plays no part in the rules.

use lasing_medium::FluorophoreGrid;
use lasing_types::{CellPosition, PhotonPosition};

use crate::config::CavityConfig;
use crate::error::CavityError;

/// Which rule applies to a photon at its current position.
///
/// Exactly one region holds for any photon; they are tested in declaration
/// order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    /// Inside the medium lattice, over the given cell.
    Medium(CellPosition),
    /// At or beyond the lossless far mirror.
    FarMirror,
    /// At or beyond the partially reflecting output coupler.
    OutputCoupler,
    /// At or beyond the outer edge of the domain.
    DomainEdge,
    /// Anywhere else: free flight.
    Free,
}

/// Resolved axial coordinates of the mirrors, medium and domain edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CavityGeometry {
    /// Axial coordinate of the far mirror.
    far_mirror_x: i64,
    /// Axial coordinate of the output coupler.
    coupler_x: i64,
    /// Axial coordinate of the domain edge.
    domain_edge_x: i64,
    /// Axial coordinate of medium column 0.
    medium_origin_x: i64,
    /// Mirror-to-coupler distance in cells.
    length: u32,
    /// Number of medium rows.
    medium_height: u32,
}

impl CavityGeometry {
    /// Lay out a cavity around a medium of `medium_width` x `medium_height`
    /// cells.
    ///
    /// # Errors
    ///
    /// Returns [`CavityError::InvalidGeometry`] if the medium does not fit
    /// strictly between the mirrors or the domain ends at or before the
    /// output coupler, and [`CavityError::InvalidParameter`] for a zero
    /// length or medium dimension.
    pub fn new(
        config: &CavityConfig,
        medium_width: u32,
        medium_height: u32,
    ) -> Result<Self, CavityError> {
        if config.length == 0 {
            return Err(CavityError::InvalidParameter {
                name: "cavity.length",
                value: config.length,
            });
        }
        if medium_width == 0 || medium_height == 0 {
            return Err(CavityError::InvalidParameter {
                name: "medium dimensions",
                value: 0,
            });
        }

        // The medium must leave at least one free cell in front of each mirror.
        let required = medium_width.saturating_add(2);
        if config.length < required {
            return Err(CavityError::InvalidGeometry {
                reason: format!(
                    "cavity length {} cannot hold a medium {medium_width} cells wide (need at least {required})",
                    config.length
                ),
            });
        }

        let far_mirror_x = i64::from(config.offset);
        let coupler_x = far_mirror_x
            .checked_add(i64::from(config.length))
            .and_then(|x| x.checked_sub(1))
            .ok_or_else(|| overflow("output coupler"))?;
        let domain_edge_x = i64::from(config.domain_width)
            .checked_sub(1)
            .ok_or_else(|| overflow("domain edge"))?;

        if domain_edge_x <= coupler_x {
            return Err(CavityError::InvalidGeometry {
                reason: format!(
                    "domain width {} leaves no room past the output coupler at x={coupler_x}",
                    config.domain_width
                ),
            });
        }

        let margin = config.length.saturating_sub(medium_width).checked_div(2).unwrap_or(0);
        let medium_origin_x = far_mirror_x
            .checked_add(i64::from(margin))
            .ok_or_else(|| overflow("medium origin"))?;

        Ok(Self {
            far_mirror_x,
            coupler_x,
            domain_edge_x,
            medium_origin_x,
            length: config.length,
            medium_height,
        })
    }

    /// Axial coordinate of the far mirror.
    pub const fn far_mirror_x(&self) -> i64 {
        self.far_mirror_x
    }

    /// Axial coordinate of the output coupler.
    pub const fn coupler_x(&self) -> i64 {
        self.coupler_x
    }

    /// Axial coordinate of the domain edge.
    pub const fn domain_edge_x(&self) -> i64 {
        self.domain_edge_x
    }

    /// Axial coordinate of medium column 0.
    pub const fn medium_origin_x(&self) -> i64 {
        self.medium_origin_x
    }

    /// Number of medium rows.
    pub const fn medium_height(&self) -> u32 {
        self.medium_height
    }

    /// Round-trip transit time in ticks: twice the cavity length.
    pub fn round_trip_period(&self) -> u64 {
        u64::from(self.length).saturating_mul(2)
    }

    /// Domain position of a medium cell.
    pub fn cell_to_domain(&self, cell: CellPosition) -> PhotonPosition {
        PhotonPosition {
            x: self.medium_origin_x.saturating_add(i64::from(cell.column)),
            y: i64::from(cell.row),
        }
    }

    /// Clamp a transverse coordinate to the medium rows.
    pub fn clamp_row(&self, y: i64) -> i64 {
        let last = i64::from(self.medium_height.saturating_sub(1));
        y.clamp(0, last)
    }

    /// Classify a photon position.
    ///
    /// `escaped` photons have already been transmitted by the output
    /// coupler; mirrors no longer apply to them.
    pub fn classify(&self, grid: &FluorophoreGrid, position: PhotonPosition, escaped: bool) -> Region {
        let column = position.x.saturating_sub(self.medium_origin_x);
        if let Some(cell) = grid.position_at(column, position.y) {
            return Region::Medium(cell);
        }
        if !escaped {
            if position.x <= self.far_mirror_x {
                return Region::FarMirror;
            }
            if position.x >= self.coupler_x {
                return Region::OutputCoupler;
            }
        } else if position.x >= self.domain_edge_x || position.x <= 0 {
            return Region::DomainEdge;
        }
        Region::Free
    }
}

fn overflow(what: &str) -> CavityError {
    CavityError::InvalidGeometry {
        reason: format!("{what} coordinate overflows"),
    }
}
