//! Reference scenarios: the 51x21 medium from rest, and a single photon at
//! the output coupler with the reflectivity pinned to 0 or 1.
//!
//! The full million-tick run is slow in debug builds and is marked
//! `#[ignore]`. Run it with:
//!
//! ```bash
//! cargo test -p lasing-core --release -- --ignored
//! ```

#![allow(clippy::unwrap_used, clippy::panic)]

use lasing_cavity::{
    CavityConfig, CavityController, CavityGeometry, Photon, PhotonConfig, PhotonPool,
};
use lasing_core::config::SimulationConfig;
use lasing_core::tick::Simulation;
use lasing_medium::{ConservationResult, FluorophoreGrid, MediumConfig};
use lasing_types::{PhotonCounts, PhotonPosition, PopulationCounts, QLevel, QMode};
use rand::SeedableRng;
use rand::rngs::SmallRng;

fn reference_simulation(seed: u64) -> Simulation {
    let mut config = SimulationConfig::default();
    config.simulation.seed = Some(seed);
    config.medium = MediumConfig {
        width: 51,
        height: 21,
        pump: 0.002,
        isc: 0.02,
        decay: 0.000_04,
        ..MediumConfig::default()
    };
    config.photons.cross = 0.15;
    Simulation::new(&config).unwrap()
}

fn run_reference(ticks: u64, seed: u64) -> Simulation {
    let mut sim = reference_simulation(seed);
    sim.reset();
    assert_eq!(
        sim.population(),
        PopulationCounts {
            ground: 1071,
            excited: 0,
            lasing: 0
        }
    );
    assert_eq!(sim.photon_counts().live, 0);

    for _ in 0..ticks {
        if let Err(err) = sim.step() {
            panic!("frame {}: {err}", sim.frame());
        }
    }
    assert_eq!(sim.audit(), ConservationResult::Balanced);
    assert_eq!(sim.population().total(), 1071);
    sim
}

#[test]
fn reference_medium_reaches_lasing() {
    let sim = run_reference(10_000, 2024);
    let population = sim.population();
    assert!(population.excited > 0);
    assert!(sim.photon_counts().output_total > 0);
    assert!(!sim.is_halted());
}

#[test]
#[ignore = "one million ticks; run with --release -- --ignored"]
fn reference_medium_one_million_ticks() {
    let sim = run_reference(1_000_000, 2024);
    let population = sim.population();
    assert!(population.ground > 0);
    assert!(population.excited > 0);
    assert!(population.lasing > 0);
    assert!(sim.photon_counts().output_total > 0);
}

#[test]
fn q_switched_reference_medium_stays_bounded() {
    let mut sim = reference_simulation(7);
    sim.set_q_mode(QMode::Automatic);
    for _ in 0..10_000 {
        let summary = sim.step().unwrap();
        assert!(summary.photons.live <= 50_000);
    }
    assert!(sim.photon_counts().output_total > 0);
}

// ---------------------------------------------------------------------------
// Output coupler boundary
// ---------------------------------------------------------------------------

struct Coupler {
    grid: FluorophoreGrid,
    pool: PhotonPool,
    cavity: CavityController,
    mirror_x: i64,
}

fn coupler(high_q: f64) -> Coupler {
    let cavity_config = CavityConfig {
        high_q,
        initial_mode: QMode::Manual,
        initial_level: QLevel::High,
        ..CavityConfig::default()
    };
    let grid = FluorophoreGrid::new(&MediumConfig::default()).unwrap();
    let geometry = CavityGeometry::new(&cavity_config, grid.width(), grid.height()).unwrap();
    let cavity = CavityController::new(&cavity_config, &geometry).unwrap();
    let pool = PhotonPool::new(&PhotonConfig::default(), geometry).unwrap();
    Coupler {
        grid,
        pool,
        cavity,
        mirror_x: geometry.coupler_x(),
    }
}

fn photon_at(x: i64) -> Photon {
    Photon {
        position: PhotonPosition { x, y: 10 },
        velocity: 1,
        group: 0,
        escaped: false,
    }
}

#[test]
fn perfect_reflectivity_never_transmits() {
    let mut c = coupler(1.0);
    let mut rng = SmallRng::seed_from_u64(1);
    for _ in 0..10_000 {
        c.pool.clear();
        c.pool.insert(photon_at(c.mirror_x)).unwrap();
        let report = c.pool.update_all(&mut c.grid, &c.cavity, &mut rng).unwrap();
        assert_eq!(report.transmitted, 0);
        let photon = c.pool.photons().next().unwrap();
        assert!(!photon.escaped);
        assert_eq!(photon.position.x, c.mirror_x - 1);
    }
}

#[test]
fn zero_reflectivity_always_transmits() {
    let mut c = coupler(0.0);
    let mut rng = SmallRng::seed_from_u64(2);
    for _ in 0..10_000 {
        c.pool.clear();
        c.pool.insert(photon_at(c.mirror_x)).unwrap();
        let report = c.pool.update_all(&mut c.grid, &c.cavity, &mut rng).unwrap();
        assert_eq!(report.transmitted, 1);
        assert_eq!(
            c.pool.counts(),
            PhotonCounts {
                live: 1,
                in_cavity: 0,
                output_total: 1
            }
        );
    }
}
