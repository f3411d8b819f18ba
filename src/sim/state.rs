//! Run state and core simulation types
//!
//! Everything one run mutates lives here; the tick is its only writer.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use crate::tuning::{ObstacleKind, RunConfig};

/// Lifecycle of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    /// Created, waiting for start
    Idle,
    /// Ticking
    Running,
    /// Hit an obstacle (terminal)
    Stopped,
}

/// The player character
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    /// Vertical velocity (pixels/tick, negative is up)
    pub vel_y: f32,
    pub jumping: bool,
}

impl Actor {
    /// Actor standing on the ground line
    pub fn on_ground(config: &RunConfig) -> Self {
        Self {
            pos: Vec2::new(config.actor_x, config.ground_y() - config.actor_height),
            size: Vec2::new(config.actor_width, config.actor_height),
            vel_y: 0.0,
            jumping: false,
        }
    }

    /// Resting y for the top edge
    #[inline]
    pub fn ground_top(&self, ground_y: f32) -> f32 {
        ground_y - self.size.y
    }

    /// Start a jump. Returns false (and changes nothing) while airborne.
    pub fn jump(&mut self, jump_velocity: f32) -> bool {
        if self.jumping {
            return false;
        }
        self.jumping = true;
        self.vel_y = jump_velocity;
        true
    }

    /// Semi-implicit Euler step. Returns true on the tick the actor lands.
    pub fn integrate(&mut self, gravity: f32, ground_y: f32) -> bool {
        if !self.jumping {
            return false;
        }
        self.vel_y += gravity;
        self.pos.y += self.vel_y;

        let rest = self.ground_top(ground_y);
        if self.pos.y >= rest {
            self.pos.y = rest;
            self.jumping = false;
            self.vel_y = 0.0;
            return true;
        }
        false
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }
}

/// An obstacle resting on the ground line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
}

impl Obstacle {
    pub fn new(id: u32, kind: ObstacleKind, x: f32, ground_y: f32) -> Self {
        Self {
            id,
            pos: Vec2::new(x, ground_y - kind.height),
            size: Vec2::new(kind.width, kind.height),
        }
    }

    /// Trailing (right) edge
    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }
}

/// Final numbers of a stopped run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub score: u64,
    pub distance: f64,
    pub ticks: u64,
}

/// Complete state of one run (deterministic for a given config, seed and input)
#[derive(Debug, Clone)]
pub struct RunState {
    pub config: RunConfig,
    /// Run seed for reproducibility
    pub seed: u64,
    pub phase: RunPhase,
    pub actor: Actor,
    /// Live obstacles, oldest first
    pub obstacles: Vec<Obstacle>,
    /// Elapsed distance (never decreases)
    pub distance: f64,
    /// floor(distance)
    pub score: u64,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub(crate) rng: Pcg32,
    next_id: u32,
}

impl RunState {
    /// Create an idle run
    pub fn new(config: RunConfig, seed: u64) -> Self {
        let config = config.sanitized();
        Self {
            actor: Actor::on_ground(&config),
            config,
            seed,
            phase: RunPhase::Idle,
            obstacles: Vec::new(),
            distance: 0.0,
            score: 0,
            time_ticks: 0,
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        }
    }

    /// Idle -> Running. Returns false from any other phase.
    pub fn start(&mut self) -> bool {
        if self.phase != RunPhase::Idle {
            return false;
        }
        self.phase = RunPhase::Running;
        log::info!("Run started (seed {})", self.seed);
        true
    }

    /// Jump command; only effective while running and grounded
    pub fn jump(&mut self) -> bool {
        if self.phase != RunPhase::Running {
            return false;
        }
        self.actor.jump(self.config.jump_velocity)
    }

    pub fn is_running(&self) -> bool {
        self.phase == RunPhase::Running
    }

    pub fn is_stopped(&self) -> bool {
        self.phase == RunPhase::Stopped
    }

    /// Ground line (y)
    pub fn ground_y(&self) -> f32 {
        self.config.ground_y()
    }

    /// Final numbers once stopped
    pub fn result(&self) -> Option<RunResult> {
        self.is_stopped().then(|| self.snapshot())
    }

    pub(crate) fn snapshot(&self) -> RunResult {
        RunResult {
            score: self.score,
            distance: self.distance,
            ticks: self.time_ticks,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_run_is_idle_and_grounded() {
        let state = RunState::new(RunConfig::default(), 7);
        assert_eq!(state.phase, RunPhase::Idle);
        assert!(state.obstacles.is_empty());
        assert!(!state.actor.jumping);
        assert_eq!(state.actor.pos.y + state.actor.size.y, state.ground_y());
        assert!(state.result().is_none());
    }

    #[test]
    fn test_start_only_from_idle() {
        let mut state = RunState::new(RunConfig::default(), 7);
        assert!(state.start());
        assert!(!state.start());
        state.phase = RunPhase::Stopped;
        assert!(!state.start());
        assert_eq!(state.phase, RunPhase::Stopped);
    }

    #[test]
    fn test_jump_requires_running() {
        let mut state = RunState::new(RunConfig::default(), 7);
        assert!(!state.jump());
        assert!(!state.actor.jumping);

        state.start();
        assert!(state.jump());
        assert!(state.actor.jumping);
        assert_eq!(state.actor.vel_y, state.config.jump_velocity);
    }

    #[test]
    fn test_jump_while_airborne_is_noop() {
        let config = RunConfig::default();
        let mut actor = Actor::on_ground(&config);
        assert!(actor.jump(config.jump_velocity));
        actor.integrate(config.gravity, config.ground_y());

        let before = actor.clone();
        assert!(!actor.jump(config.jump_velocity));
        assert_eq!(actor, before);
    }

    #[test]
    fn test_grounded_actor_does_not_move() {
        let config = RunConfig::default();
        let mut actor = Actor::on_ground(&config);
        let before = actor.clone();
        assert!(!actor.integrate(config.gravity, config.ground_y()));
        assert_eq!(actor, before);
    }

    #[test]
    fn test_obstacle_rests_on_ground() {
        let obstacle = Obstacle::new(1, ObstacleKind::low(), 300.0, 360.0);
        assert_eq!(obstacle.pos.y + obstacle.size.y, 360.0);
        assert_eq!(obstacle.right(), 400.0);
    }
}
