//! Endless Runner - an auto-running jump game with a persisted leaderboard
//!
//! Core modules:
//! - `sim`: Deterministic run simulation (physics, obstacles, collisions)
//! - `leaderboard`: Read-time leaderboard protocol (dedup, rank, identity guard)
//! - `store`: Score store over a remote log or a local fallback
//! - `session`: Top-level owner of one run and one score store
//! - `persistence`: Key-value text storage (LocalStorage on web)
//! - `platform`: Frame scheduling and wall-clock time
//! - `tuning`: Data-driven run physics

pub mod identity;
pub mod leaderboard;
pub mod persistence;
pub mod platform;
pub mod session;
pub mod settings;
pub mod sim;
pub mod store;
pub mod tuning;

pub use identity::{DeviceId, Identity, IdentityError};
pub use leaderboard::ScoreRecord;
pub use session::{GameOverReport, Session, SessionError};
pub use settings::Settings;
pub use store::{ScoreStore, StoreError};
pub use tuning::RunConfig;

/// Game configuration constants
pub mod consts {
    /// Playfield dimensions (canvas pixels)
    pub const FIELD_WIDTH: f32 = 800.0;
    pub const FIELD_HEIGHT: f32 = 400.0;
    pub const GROUND_HEIGHT: f32 = 40.0;

    /// Actor defaults - runs in place, the world scrolls past
    pub const ACTOR_X: f32 = 100.0;
    pub const ACTOR_WIDTH: f32 = 40.0;
    pub const ACTOR_HEIGHT: f32 = 60.0;

    /// Per-tick gravity (pixels/tick², positive is down)
    pub const GRAVITY: f32 = 0.8;
    /// Initial jump velocity (pixels/tick, negative is up)
    pub const JUMP_VELOCITY: f32 = -15.0;

    /// Horizontal scroll per tick
    pub const GAME_SPEED: f32 = 5.0;
    /// Distance gained per unit of speed each tick
    pub const DISTANCE_PER_SPEED: f64 = 0.1;

    /// Obstacles spawn this far past the right edge
    pub const OBSTACLE_SPAWN_OFFSET: f32 = 50.0;
    /// Obstacles are dropped once their trailing edge is this far left of 0
    pub const OBSTACLE_DESPAWN_MARGIN: f32 = 50.0;
    pub const MAX_LIVE_OBSTACLES: usize = 1;
    /// Minimum gap between consecutive spawns when more than one is live
    pub const MIN_SPAWN_SPACING: f32 = 300.0;

    /// Obstacle footprints
    pub const TALL_OBSTACLE: (f32, f32) = (50.0, 100.0);
    pub const LOW_OBSTACLE: (f32, f32) = (100.0, 50.0);

    /// Leaderboard defaults
    pub const LEADERBOARD_SIZE: usize = 10;
    pub const LOCAL_HISTORY_CAP: usize = 100;

    /// Display name bounds (characters, after trimming)
    pub const USERNAME_MIN_LEN: usize = 3;
    pub const USERNAME_MAX_LEN: usize = 20;

    /// Storage keys
    pub const SCORES_STORAGE_KEY: &str = "endlessRunnerScores";
    pub const DEVICE_ID_STORAGE_KEY: &str = "endlessRunnerBrowserId";
    pub const SETTINGS_STORAGE_KEY: &str = "endlessRunnerSettings";

    /// Nominal display refresh period (ms)
    pub const FRAME_MS: f64 = 1000.0 / 60.0;
}
