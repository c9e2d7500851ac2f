/// Per-entity update rules.
///
/// Each function advances one entity by one tick in place and reports what
/// the session has to act on (a shot to spawn, a removal, the game ending).
/// Randomness comes in through the injected RNG only.

use rand::Rng;

use crate::config::{EnemyConfig, GameConfig};
use crate::entities::{Enemy, EnemyKind, Player, Projectile};
use crate::platform::InputState;

/// Offset from an invader's corner to where its shots appear.
const ENEMY_MUZZLE: (f32, f32) = (5.0, 10.0);

/// What an enemy asked for during its update.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EnemyUpdate {
    /// Spawn point of a shot fired this tick.
    pub shot: Option<(f32, f32)>,
    /// An invader crossed the line above the player.
    pub reached_bottom: bool,
    /// A bonus ship drifted off the bottom and should be dropped.
    pub off_screen: bool,
}

// ── Enemies ──────────────────────────────────────────────────────────────────

pub fn update_enemy(enemy: &mut Enemy, cfg: &GameConfig, rng: &mut impl Rng) -> EnemyUpdate {
    match &mut enemy.kind {
        EnemyKind::Standard { speed, .. } => {
            enemy.x += *speed;

            let e = &cfg.enemy;
            if enemy.x >= cfg.screen.width - e.right_margin || enemy.x <= e.left_margin {
                enemy.y += e.descent_step;
                *speed = -*speed;
            }

            EnemyUpdate {
                shot: roll_fire(enemy.x, enemy.y, e, rng),
                reached_bottom: enemy.y > cfg.screen.height - e.game_over_margin,
                off_screen: false,
            }
        }
        EnemyKind::Bonus { drift } => {
            enemy.y += *drift;
            EnemyUpdate {
                off_screen: enemy.y > cfg.screen.height,
                ..EnemyUpdate::default()
            }
        }
    }
}

fn roll_fire(x: f32, y: f32, cfg: &EnemyConfig, rng: &mut impl Rng) -> Option<(f32, f32)> {
    if rng.gen_bool(cfg.fire_chance) {
        Some((x + ENEMY_MUZZLE.0, y + ENEMY_MUZZLE.1))
    } else {
        None
    }
}

// ── Player ───────────────────────────────────────────────────────────────────

/// Wrap around the horizontal edges, then apply held direction keys.
///
/// The wrap check runs before movement, so the ship may sit one step past an
/// edge for a single tick.
pub fn update_player(player: &mut Player, input: &InputState, screen_width: f32) {
    if player.x < 0.0 {
        player.x = screen_width;
    } else if player.x > screen_width {
        player.x = 0.0;
    }

    if input.left {
        player.x -= player.speed;
    }
    if input.right {
        player.x += player.speed;
    }
}

// ── Projectiles ──────────────────────────────────────────────────────────────

/// Move a projectile; returns `false` once it has left the screen vertically.
pub fn update_projectile(projectile: &mut Projectile, screen_height: f32) -> bool {
    projectile.y -= projectile.speed;
    (0.0..=screen_height).contains(&projectile.y)
}
