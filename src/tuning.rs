//! Data-driven run physics
//!
//! Every constant the tick reads comes through [`RunConfig`], so a run can be
//! replayed or re-tuned without touching the simulation code.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Footprint of one obstacle kind (always rests on the ground line)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObstacleKind {
    pub width: f32,
    pub height: f32,
}

impl ObstacleKind {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub const fn tall() -> Self {
        Self::new(TALL_OBSTACLE.0, TALL_OBSTACLE.1)
    }

    pub const fn low() -> Self {
        Self::new(LOW_OBSTACLE.0, LOW_OBSTACLE.1)
    }
}

/// Physics and spawn parameters for a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    // === Field ===
    pub field_width: f32,
    pub field_height: f32,
    pub ground_height: f32,

    // === Actor ===
    pub actor_x: f32,
    pub actor_width: f32,
    pub actor_height: f32,
    /// Added to vertical velocity every airborne tick
    pub gravity: f32,
    /// Vertical velocity assigned by a jump (negative is up)
    pub jump_velocity: f32,

    // === Scroll ===
    /// Constant for the whole run
    pub speed: f32,

    // === Obstacles ===
    /// Kinds to draw from; a single entry gives fixed-size obstacles
    pub obstacle_kinds: Vec<ObstacleKind>,
    pub spawn_offset: f32,
    pub despawn_margin: f32,
    pub max_live_obstacles: usize,
    pub min_spawn_spacing: f32,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            field_width: FIELD_WIDTH,
            field_height: FIELD_HEIGHT,
            ground_height: GROUND_HEIGHT,

            actor_x: ACTOR_X,
            actor_width: ACTOR_WIDTH,
            actor_height: ACTOR_HEIGHT,
            gravity: GRAVITY,
            jump_velocity: JUMP_VELOCITY,

            speed: GAME_SPEED,

            obstacle_kinds: vec![ObstacleKind::tall()],
            spawn_offset: OBSTACLE_SPAWN_OFFSET,
            despawn_margin: OBSTACLE_DESPAWN_MARGIN,
            max_live_obstacles: MAX_LIVE_OBSTACLES,
            min_spawn_spacing: MIN_SPAWN_SPACING,
        }
    }
}

impl RunConfig {
    /// Draw from both the tall and the low obstacle
    pub fn with_mixed_obstacles(mut self) -> Self {
        self.obstacle_kinds = vec![ObstacleKind::tall(), ObstacleKind::low()];
        self
    }

    /// Y coordinate of the ground line (screen space, y grows downward)
    pub fn ground_y(&self) -> f32 {
        self.field_height - self.ground_height
    }

    /// Number of ticks a jump spends in the air, counting the tick it starts on
    pub fn airborne_ticks(&self) -> u32 {
        (-2.0 * self.jump_velocity / self.gravity).ceil() as u32
    }

    /// Replace unusable values with defaults
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !(self.field_width.is_finite() && self.field_width > 0.0) {
            self.field_width = defaults.field_width;
        }
        if !(self.field_height.is_finite() && self.field_height > self.ground_height) {
            self.field_height = defaults.field_height;
            self.ground_height = defaults.ground_height;
        }
        if !(self.gravity.is_finite() && self.gravity > 0.0) {
            self.gravity = defaults.gravity;
        }
        if !(self.jump_velocity.is_finite() && self.jump_velocity < 0.0) {
            self.jump_velocity = defaults.jump_velocity;
        }
        if !(self.speed.is_finite() && self.speed >= 0.0) {
            self.speed = defaults.speed;
        }
        self.obstacle_kinds
            .retain(|k| k.width > 0.0 && k.height > 0.0);
        if self.obstacle_kinds.is_empty() {
            self.obstacle_kinds = defaults.obstacle_kinds;
        }
        self.max_live_obstacles = self.max_live_obstacles.max(1);
        self
    }
}
