//! Fixed-step simulation tick
//!
//! One call per display frame. Order within a tick: vertical integration,
//! jump input, obstacle advance, spawn, distance, collision.

use rand::Rng;

use super::collision::first_overlap;
use super::state::{Obstacle, RunPhase, RunResult, RunState};
use crate::consts::DISTANCE_PER_SPEED;
use crate::tuning::ObstacleKind;

/// Upper bound on ticks the autopilot looks ahead
const AUTOPILOT_HORIZON: u32 = 2_000;

/// Input commands for a single tick (one-shot, cleared by the caller)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Jump (tap/space/arrow up)
    pub jump: bool,
    /// Demo mode - the engine times its own jumps
    pub autopilot: bool,
}

/// Advance the run by one tick.
///
/// Returns the final result on the tick the run stops; `None` otherwise,
/// including every call made while the run is idle or already stopped.
pub fn tick(state: &mut RunState, input: &TickInput) -> Option<RunResult> {
    if state.phase != RunPhase::Running {
        return None;
    }

    state.time_ticks += 1;

    let ground_y = state.ground_y();
    if state.actor.integrate(state.config.gravity, ground_y) {
        log::trace!("Landed at tick {}", state.time_ticks);
    }

    // A jump arriving this tick starts rising on the next one
    let wants_jump = input.jump || (input.autopilot && autopilot_wants_jump(state));
    if wants_jump && state.jump() {
        log::trace!("Jump at tick {}", state.time_ticks);
    }

    advance_obstacles(state);
    spawn_obstacles(state);

    state.distance += f64::from(state.config.speed) * DISTANCE_PER_SPEED;
    state.score = state.distance.floor() as u64;

    let actor = state.actor.bounds();
    if let Some(index) = first_overlap(&actor, state.obstacles.iter().map(Obstacle::bounds)) {
        state.phase = RunPhase::Stopped;
        let result = state.snapshot();
        log::info!(
            "Run over: hit obstacle {} at tick {} (score {}, distance {:.1})",
            state.obstacles[index].id,
            result.ticks,
            result.score,
            result.distance
        );
        return Some(result);
    }

    None
}

/// Scroll obstacles left and drop the ones fully past the despawn margin
fn advance_obstacles(state: &mut RunState) {
    let speed = state.config.speed;
    let threshold = -state.config.despawn_margin;

    for obstacle in &mut state.obstacles {
        obstacle.pos.x -= speed;
    }
    state.obstacles.retain(|obstacle| {
        let keep = obstacle.right() >= threshold;
        if !keep {
            log::debug!("Obstacle {} cleared", obstacle.id);
        }
        keep
    });
}

/// Top the field up to `max_live_obstacles`, one spawn per tick
fn spawn_obstacles(state: &mut RunState) {
    let field_width = state.config.field_width;
    if state.obstacles.len() >= state.config.max_live_obstacles {
        return;
    }
    if let Some(last) = state.obstacles.last() {
        if last.pos.x >= field_width - state.config.min_spawn_spacing {
            return;
        }
    }

    let kind = pick_kind(state);
    let id = state.next_entity_id();
    let x = field_width + state.config.spawn_offset;
    let obstacle = Obstacle::new(id, kind, x, state.ground_y());
    log::debug!(
        "Obstacle {} spawned at x={} ({}x{})",
        id,
        x,
        kind.width,
        kind.height
    );
    state.obstacles.push(obstacle);
}

fn pick_kind(state: &mut RunState) -> ObstacleKind {
    let kinds = &state.config.obstacle_kinds;
    match kinds.len() {
        0 => ObstacleKind::tall(),
        1 => kinds[0],
        n => kinds[state.rng.random_range(0..n)],
    }
}

/// Jump now if a jump started this tick carries the actor over the next obstacle
fn autopilot_wants_jump(state: &RunState) -> bool {
    if state.actor.jumping {
        return false;
    }
    let actor_left = state.actor.pos.x;
    state
        .obstacles
        .iter()
        .filter(|o| o.right() > actor_left)
        .min_by(|a, b| a.pos.x.total_cmp(&b.pos.x))
        .is_some_and(|next| jump_clears(state, next))
}

/// Replay the tick order for one jump against a single obstacle
fn jump_clears(state: &RunState, obstacle: &Obstacle) -> bool {
    let config = &state.config;
    let ground_y = config.ground_y();
    let mut actor = state.actor.clone();
    let mut obstacle = obstacle.clone();

    actor.jump(config.jump_velocity);
    for _ in 0..AUTOPILOT_HORIZON {
        obstacle.pos.x -= config.speed;
        if actor.bounds().overlaps(&obstacle.bounds()) {
            return false;
        }
        if obstacle.right() <= actor.pos.x {
            return true;
        }
        actor.integrate(config.gravity, ground_y);
    }
    false
}
