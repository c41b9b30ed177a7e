//! The live photon set and its per-tick movement and interaction rules.
//!
//! Each tick, every photon that was live at the start of the pass is
//! visited exactly once. The region it occupies decides what happens:
//!
//! 1. **Medium**: over a Lasing cell, draw against `cross`; on success the
//!    cell is forced to Ground and one new photon is spawned next to the
//!    trigger, with the same velocity. The trigger then moves on.
//! 2. **Far mirror**: reflect (lossless), then move.
//! 3. **Output coupler**: reflect with probability Q, otherwise transmit:
//!    the photon leaves the in-cavity count, joins the output count and
//!    keeps travelling outward.
//! 4. **Domain edge**: remove. This is the only removal point.
//! 5. **Free**: move.
//!
//! Removal and spawning are deferred to the end of the pass: removed slots
//! are compacted with one ordered `retain`, then spawned photons are
//! appended. Photons born during a pass first move on the next tick.

use lasing_medium::{FluorophoreGrid, Probability};
use lasing_types::{CellPosition, FluorophoreState, PhotonCounts, PhotonPosition, PhotonSnapshot};
use rand::Rng;
use tracing::{error, trace};

use crate::config::PhotonConfig;
use crate::controller::CavityController;
use crate::error::CavityError;
use crate::geometry::{CavityGeometry, Region};

/// A free-flying photon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Photon {
    /// Current position.
    pub position: PhotonPosition,
    /// Signed axial step per tick.
    pub velocity: i64,
    /// Emission generation: 0 for spontaneous photons, parent + 1 for
    /// stimulated ones. Visualization only.
    pub group: u32,
    /// Whether the photon has been transmitted by the output coupler.
    pub escaped: bool,
}

impl Photon {
    /// Move one step along the axis.
    const fn advance(&mut self) {
        self.position.x = self.position.x.saturating_add(self.velocity);
    }

    /// Invert the axial velocity.
    const fn reflect(&mut self) {
        self.velocity = self.velocity.saturating_neg();
    }

    /// Snapshot for rendering.
    pub const fn snapshot(&self) -> PhotonSnapshot {
        PhotonSnapshot {
            position: self.position,
            group: self.group,
            escaped: self.escaped,
        }
    }
}

/// Event counts from one [`PhotonPool::update_all`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassReport {
    /// Stimulated emissions (each de-excited one cell and added one photon).
    pub stimulated: u32,
    /// Photons transmitted through the output coupler.
    pub transmitted: u32,
    /// Photons removed at the domain edge.
    pub removed: u32,
}

/// Exclusive owner of every live photon.
#[derive(Debug, Clone)]
pub struct PhotonPool {
    /// Live photons.
    photons: Vec<Photon>,
    /// Live photons that have not been transmitted.
    in_cavity: u32,
    /// Cumulative transmissions since the last reset.
    output_total: u64,
    /// Stimulated emission probability per Lasing-cell encounter.
    cross: Probability,
    /// Velocity magnitude.
    speed: i64,
    /// Failsafe ceiling on live photons.
    max_live: u32,
    /// Cavity layout.
    geometry: CavityGeometry,
}

impl PhotonPool {
    /// Create an empty pool.
    ///
    /// # Errors
    ///
    /// Returns [`CavityError::Rate`] if `cross` is not a probability, or
    /// [`CavityError::InvalidParameter`] for a zero speed or ceiling.
    pub fn new(config: &PhotonConfig, geometry: CavityGeometry) -> Result<Self, CavityError> {
        let cross = Probability::new("photons.cross", config.cross)?;
        if config.speed == 0 {
            return Err(CavityError::InvalidParameter {
                name: "photons.speed",
                value: config.speed,
            });
        }
        if config.max_live == 0 {
            return Err(CavityError::InvalidParameter {
                name: "photons.max_live",
                value: config.max_live,
            });
        }
        Ok(Self {
            photons: Vec::new(),
            in_cavity: 0,
            output_total: 0,
            cross,
            speed: i64::from(config.speed),
            max_live: config.max_live,
            geometry,
        })
    }

    /// The cavity layout photons move in.
    pub const fn geometry(&self) -> &CavityGeometry {
        &self.geometry
    }

    /// Number of live photons.
    pub const fn len(&self) -> usize {
        self.photons.len()
    }

    /// Whether no photons are live.
    pub const fn is_empty(&self) -> bool {
        self.photons.is_empty()
    }

    /// Current photon counters.
    pub fn counts(&self) -> PhotonCounts {
        PhotonCounts {
            live: u32::try_from(self.photons.len()).unwrap_or(u32::MAX),
            in_cavity: self.in_cavity,
            output_total: self.output_total,
        }
    }

    /// Enumerate live photons for rendering.
    pub fn photons(&self) -> impl Iterator<Item = PhotonSnapshot> + '_ {
        self.photons.iter().map(Photon::snapshot)
    }

    /// Add a photon to the live set.
    ///
    /// # Errors
    ///
    /// Returns [`CavityError::Runaway`] if the live set now exceeds the
    /// ceiling. The photon is kept; the caller is expected to abort.
    pub fn insert(&mut self, photon: Photon) -> Result<(), CavityError> {
        if !photon.escaped {
            self.in_cavity = self.in_cavity.saturating_add(1);
        }
        self.photons.push(photon);
        self.check_ceiling()
    }

    /// Create a spontaneous-emission photon at a medium cell with a random
    /// direction.
    ///
    /// # Errors
    ///
    /// Returns [`CavityError::Runaway`] if the live set now exceeds the
    /// ceiling.
    pub fn emit_spontaneous(&mut self, cell: CellPosition, rng: &mut impl Rng) -> Result<(), CavityError> {
        let velocity = if rng.random::<bool>() {
            self.speed
        } else {
            self.speed.saturating_neg()
        };
        self.insert(Photon {
            position: self.geometry.cell_to_domain(cell),
            velocity,
            group: 0,
            escaped: false,
        })
    }

    /// Remove every photon and zero the counters.
    pub fn clear(&mut self) {
        self.photons.clear();
        self.in_cavity = 0;
        self.output_total = 0;
    }

    /// Advance every live photon by one step.
    ///
    /// `grid` supplies (and receives) the stimulated-emission interaction;
    /// `cavity` supplies the output coupler reflectivity for this tick.
    ///
    /// # Errors
    ///
    /// Returns [`CavityError::Runaway`] if the live set exceeds the ceiling
    /// after the pass.
    pub fn update_all(
        &mut self,
        grid: &mut FluorophoreGrid,
        cavity: &CavityController,
        rng: &mut impl Rng,
    ) -> Result<PassReport, CavityError> {
        let q = cavity.reflectivity();
        let mut report = PassReport::default();
        let mut keep = Vec::with_capacity(self.photons.len());
        let mut spawned = Vec::new();

        for photon in &mut self.photons {
            let region = self
                .geometry
                .classify(grid, photon.position, photon.escaped);

            match region {
                Region::Medium(cell) => {
                    if grid.state(cell) == Some(FluorophoreState::Lasing)
                        && self.cross.sample(rng)
                        && grid.stimulate(cell)
                    {
                        spawned.push(stimulated_copy(photon, &self.geometry, rng));
                        report.stimulated = report.stimulated.saturating_add(1);
                    }
                    photon.advance();
                }
                Region::FarMirror => {
                    photon.reflect();
                    photon.advance();
                }
                Region::OutputCoupler => {
                    if q.sample(rng) {
                        photon.reflect();
                    } else {
                        photon.escaped = true;
                        self.in_cavity = self.in_cavity.saturating_sub(1);
                        self.output_total = self.output_total.saturating_add(1);
                        report.transmitted = report.transmitted.saturating_add(1);
                    }
                    photon.advance();
                }
                Region::DomainEdge => {
                    report.removed = report.removed.saturating_add(1);
                    keep.push(false);
                    continue;
                }
                Region::Free => photon.advance(),
            }
            keep.push(true);
        }

        if report.removed > 0 {
            let mut flags = keep.into_iter();
            self.photons.retain(|_| flags.next().unwrap_or(true));
        }

        self.in_cavity = self
            .in_cavity
            .saturating_add(u32::try_from(spawned.len()).unwrap_or(u32::MAX));
        self.photons.extend(spawned);

        trace!(
            live = self.photons.len(),
            stimulated = report.stimulated,
            transmitted = report.transmitted,
            removed = report.removed,
            "Photon pass complete"
        );

        self.check_ceiling()?;
        Ok(report)
    }

    fn check_ceiling(&self) -> Result<(), CavityError> {
        let live = self.photons.len();
        if live > usize::try_from(self.max_live).unwrap_or(usize::MAX) {
            error!(live, ceiling = self.max_live, "Photon count exceeded failsafe ceiling");
            return Err(CavityError::Runaway {
                live,
                ceiling: self.max_live,
            });
        }
        Ok(())
    }
}

/// A stimulated photon next to `parent`: jittered by up to one cell on each
/// axis, rows clamped to the medium, same velocity.
///
/// The axial offset is not clamped, so a jittered photon may start just
/// outside the medium. Either offset may be zero, so a child can start on
/// its parent's cell.
fn stimulated_copy(parent: &Photon, geometry: &CavityGeometry, rng: &mut impl Rng) -> Photon {
    let dx: i64 = rng.random_range(-1..=1);
    let dy: i64 = rng.random_range(-1..=1);
    Photon {
        position: PhotonPosition {
            x: parent.position.x.saturating_add(dx),
            y: geometry.clamp_row(parent.position.y.saturating_add(dy)),
        },
        velocity: parent.velocity,
        group: parent.group.saturating_add(1),
        escaped: false,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use lasing_medium::MediumConfig;
    use lasing_types::{QLevel, QMode};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::config::CavityConfig;

    /// Medium 5x3 at x = 18..=22, far mirror at 10, coupler at 30, edge at 49.
    struct Fixture {
        grid: FluorophoreGrid,
        pool: PhotonPool,
        cavity: CavityController,
    }

    fn fixture(high_q: f64, cross: f64) -> Fixture {
        let cavity_config = CavityConfig {
            length: 21,
            offset: 10,
            domain_width: 50,
            high_q,
            low_q: 0.0,
            auto_switch_tail_length: 0,
            initial_mode: QMode::Manual,
            initial_level: QLevel::High,
        };
        let grid = FluorophoreGrid::new(&MediumConfig {
            width: 5,
            height: 3,
            ..MediumConfig::default()
        })
        .unwrap();
        let geometry = CavityGeometry::new(&cavity_config, 5, 3).unwrap();
        let cavity = CavityController::new(&cavity_config, &geometry).unwrap();
        let pool = PhotonPool::new(
            &PhotonConfig {
                cross,
                speed: 1,
                max_live: 1_000,
            },
            geometry,
        )
        .unwrap();
        Fixture { grid, pool, cavity }
    }

    fn photon(x: i64, y: i64, velocity: i64) -> Photon {
        Photon {
            position: PhotonPosition { x, y },
            velocity,
            group: 0,
            escaped: false,
        }
    }

    fn only(pool: &PhotonPool) -> PhotonSnapshot {
        pool.photons().next().unwrap()
    }

    #[test]
    fn free_photon_moves_one_step() {
        let mut f = fixture(1.0, 0.0);
        let mut rng = SmallRng::seed_from_u64(1);
        f.pool.insert(photon(12, 1, 1)).unwrap();
        f.pool.update_all(&mut f.grid, &f.cavity, &mut rng).unwrap();
        assert_eq!(only(&f.pool).position.x, 13);
    }

    #[test]
    fn far_mirror_reflects_without_loss() {
        let mut f = fixture(1.0, 0.0);
        let mut rng = SmallRng::seed_from_u64(2);
        f.pool.insert(photon(10, 0, -1)).unwrap();
        f.pool.update_all(&mut f.grid, &f.cavity, &mut rng).unwrap();
        assert_eq!(only(&f.pool).position.x, 11);
        assert_eq!(f.pool.counts().in_cavity, 1);
    }

    #[test]
    fn perfect_coupler_always_reflects() {
        let mut f = fixture(1.0, 0.0);
        let mut rng = SmallRng::seed_from_u64(3);
        for _ in 0..1_000 {
            f.pool.clear();
            f.pool.insert(photon(30, 2, 1)).unwrap();
            let report = f.pool.update_all(&mut f.grid, &f.cavity, &mut rng).unwrap();
            assert_eq!(report.transmitted, 0);
            let p = only(&f.pool);
            assert_eq!(p.position.x, 29);
            assert!(!p.escaped);
        }
        assert_eq!(f.pool.counts().output_total, 0);
    }

    #[test]
    fn zero_q_coupler_always_transmits() {
        let mut f = fixture(0.0, 0.0);
        let mut rng = SmallRng::seed_from_u64(4);
        for _ in 0..1_000 {
            f.pool.clear();
            f.pool.insert(photon(30, 2, 1)).unwrap();
            let before = f.pool.len();
            let report = f.pool.update_all(&mut f.grid, &f.cavity, &mut rng).unwrap();
            assert_eq!(report.transmitted, 1);
            // Transmitted photons stay live until they reach the edge.
            assert_eq!(f.pool.len(), before);
            assert_eq!(
                f.pool.counts(),
                PhotonCounts {
                    live: 1,
                    in_cavity: 0,
                    output_total: 1
                }
            );
        }
    }

    #[test]
    fn transmitted_photon_travels_to_edge_then_leaves() {
        let mut f = fixture(0.0, 0.0);
        let mut rng = SmallRng::seed_from_u64(5);
        f.pool.insert(photon(30, 1, 1)).unwrap();

        f.pool.update_all(&mut f.grid, &f.cavity, &mut rng).unwrap();
        let counts = f.pool.counts();
        assert_eq!(counts.live, 1);
        assert_eq!(counts.in_cavity, 0);
        assert_eq!(counts.output_total, 1);

        // From x = 31 it takes 18 steps to reach x = 49, then one to be removed.
        for _ in 0..18 {
            let report = f.pool.update_all(&mut f.grid, &f.cavity, &mut rng).unwrap();
            assert_eq!(report.removed, 0);
        }
        let report = f.pool.update_all(&mut f.grid, &f.cavity, &mut rng).unwrap();
        assert_eq!(report.removed, 1);
        assert!(f.pool.is_empty());
        assert_eq!(f.pool.counts().output_total, 1);
    }

    #[test]
    fn stimulated_emission_pairs_cell_and_photon() {
        let mut f = fixture(1.0, 1.0);
        let mut rng = SmallRng::seed_from_u64(6);
        let cell = CellPosition::new(1, 2);
        f.grid.set_state(cell, FluorophoreState::Lasing).unwrap();
        f.pool.insert(photon(20, 1, 1)).unwrap();

        let lasing_before = f.grid.counts().lasing;
        let report = f.pool.update_all(&mut f.grid, &f.cavity, &mut rng).unwrap();

        assert_eq!(report.stimulated, 1);
        assert_eq!(f.grid.counts().lasing, lasing_before - 1);
        assert_eq!(f.grid.state(cell), Some(FluorophoreState::Ground));
        assert_eq!(f.pool.len(), 2);
        assert_eq!(f.pool.counts().in_cavity, 2);

        let photons: Vec<_> = f.pool.photons().collect();
        let trigger = photons.first().unwrap();
        let child = photons.get(1).unwrap();
        assert_eq!(trigger.position.x, 21);
        assert_eq!(trigger.group, 0);
        assert_eq!(child.group, 1);
        assert!((19..=21).contains(&child.position.x));
        assert!((0..=2).contains(&child.position.y));
    }

    #[test]
    fn non_lasing_cells_never_stimulate() {
        let mut f = fixture(1.0, 1.0);
        let mut rng = SmallRng::seed_from_u64(7);
        f.grid.set_state(CellPosition::new(0, 0), FluorophoreState::Excited).unwrap();
        f.pool.insert(photon(18, 0, 1)).unwrap();
        let report = f.pool.update_all(&mut f.grid, &f.cavity, &mut rng).unwrap();
        assert_eq!(report.stimulated, 0);
        assert_eq!(f.pool.len(), 1);
        assert_eq!(f.grid.counts().excited, 1);
    }

    #[test]
    fn child_rows_are_clamped_to_medium() {
        let mut f = fixture(1.0, 1.0);
        let mut rng = SmallRng::seed_from_u64(8);
        for column in 0..5 {
            f.grid
                .set_state(CellPosition::new(0, column), FluorophoreState::Lasing)
                .unwrap();
        }
        f.pool.insert(photon(18, 0, 1)).unwrap();
        for _ in 0..5 {
            f.pool.update_all(&mut f.grid, &f.cavity, &mut rng).unwrap();
        }
        assert!(f.pool.photons().all(|p| (0..=2).contains(&p.position.y)));
    }

    #[test]
    fn removal_visits_every_survivor_once() {
        let mut f = fixture(0.0, 0.0);
        let mut rng = SmallRng::seed_from_u64(9);
        // Escaped photons at the edge interleaved with free ones.
        for i in 0..10_i64 {
            let mut p = if i % 2 == 0 {
                photon(49, 0, 1)
            } else {
                photon(12 + i, 0, 1)
            };
            p.escaped = i % 2 == 0;
            f.pool.insert(p).unwrap();
        }
        let report = f.pool.update_all(&mut f.grid, &f.cavity, &mut rng).unwrap();
        assert_eq!(report.removed, 5);
        let xs: Vec<_> = f.pool.photons().map(|p| p.position.x).collect();
        assert_eq!(xs, vec![14, 16, 18, 20, 22]);
    }

    #[test]
    fn spontaneous_photons_start_on_their_cell() {
        let mut f = fixture(1.0, 0.0);
        let mut rng = SmallRng::seed_from_u64(10);
        f.pool.emit_spontaneous(CellPosition::new(2, 4), &mut rng).unwrap();
        let p = only(&f.pool);
        assert_eq!(p.position, PhotonPosition { x: 22, y: 2 });
        assert_eq!(p.group, 0);
        assert_eq!(f.pool.counts().in_cavity, 1);
    }

    #[test]
    fn spontaneous_directions_are_mixed() {
        let mut f = fixture(1.0, 0.0);
        let mut rng = SmallRng::seed_from_u64(11);
        for _ in 0..200 {
            f.pool.emit_spontaneous(CellPosition::new(0, 0), &mut rng).unwrap();
        }
        f.pool.update_all(&mut f.grid, &f.cavity, &mut rng).unwrap();
        let right = f.pool.photons().filter(|p| p.position.x == 19).count();
        let left = f.pool.photons().filter(|p| p.position.x == 17).count();
        assert_eq!(left + right, 200);
        assert!(left > 50 && right > 50);
    }

    #[test]
    fn exceeding_ceiling_is_runaway() {
        let mut f = fixture(1.0, 0.0);
        let mut rng = SmallRng::seed_from_u64(12);
        for _ in 0..1_000 {
            f.pool.emit_spontaneous(CellPosition::new(0, 0), &mut rng).unwrap();
        }
        let err = f.pool.emit_spontaneous(CellPosition::new(0, 0), &mut rng);
        assert_eq!(
            err,
            Err(CavityError::Runaway {
                live: 1_001,
                ceiling: 1_000
            })
        );
    }

    #[test]
    fn clear_resets_counters() {
        let mut f = fixture(0.0, 0.0);
        let mut rng = SmallRng::seed_from_u64(13);
        f.pool.insert(photon(30, 0, 1)).unwrap();
        f.pool.update_all(&mut f.grid, &f.cavity, &mut rng).unwrap();
        assert_eq!(f.pool.counts().output_total, 1);
        f.pool.clear();
        assert_eq!(f.pool.counts(), PhotonCounts::default());
    }

    #[test]
    fn invalid_photon_config_is_rejected() {
        let geometry = CavityGeometry::new(&CavityConfig::default(), 51, 21).unwrap();
        let bad_speed = PhotonConfig {
            speed: 0,
            ..PhotonConfig::default()
        };
        assert!(PhotonPool::new(&bad_speed, geometry).is_err());
        let bad_cross = PhotonConfig {
            cross: 1.2,
            ..PhotonConfig::default()
        };
        assert!(PhotonPool::new(&bad_cross, geometry).is_err());
    }
}
