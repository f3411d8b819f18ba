//! Deterministic run simulation
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One fixed step per tick, no wall-clock time
//! - Seeded RNG only
//! - Stable iteration order (obstacles oldest first)
//! - No rendering or platform dependencies

pub mod collision;
pub mod state;
pub mod tick;

pub use collision::{Aabb, first_overlap};
pub use state::{Actor, Obstacle, RunPhase, RunResult, RunState};
pub use tick::{TickInput, tick};
