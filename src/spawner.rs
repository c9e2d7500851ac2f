use rand::seq::SliceRandom;
use rand::Rng;
use tracing::info;

use crate::config::GameConfig;
use crate::entities::{EnemyKind, Sprite, World};

/// Summary of one freshly built wave.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Wave {
    pub invaders: usize,
    pub bonus: bool,
}

/// Lay out a full invader formation, row by row, and maybe a bonus ship.
///
/// Each invader's sprite is picked uniformly from the invader set. The bonus
/// ship appears at a random whole-pixel column in `[0, width)`.
pub fn spawn_wave(world: &mut World, cfg: &GameConfig, rng: &mut impl Rng) -> Wave {
    let wave = &cfg.wave;
    let mut invaders = 0;

    for row in 0..wave.rows {
        let y = wave.origin_y + wave.row_spacing * row as f32;
        for column in 0..wave.columns {
            let x = wave.origin_x + wave.column_spacing * column as f32;
            let sprite = *Sprite::INVADERS
                .choose(rng)
                .unwrap_or(&Sprite::InvaderA);
            world.add_enemy(
                x,
                y,
                sprite,
                EnemyKind::Standard {
                    speed: cfg.enemy.speed,
                    hit_points: cfg.enemy.hit_points,
                },
            );
            invaders += 1;
        }
    }

    let bonus = rng.gen_bool(wave.bonus_chance);
    if bonus {
        let x = rng.gen_range(0..cfg.screen.width.max(1.0) as u32) as f32;
        world.add_enemy(
            x,
            wave.bonus_y,
            Sprite::InvaderA,
            EnemyKind::Bonus {
                drift: wave.bonus_speed,
            },
        );
    }

    info!(invaders, bonus, "wave spawned");
    Wave { invaders, bonus }
}
