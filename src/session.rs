/// The game controller.
///
/// `GameSession` owns every entity plus score and status, and exposes the
/// three entry points a platform scheduler drives: `setup_session`,
/// `advance_tick` and `render`.

use rand::Rng;
use tracing::{debug, info, trace};

use crate::collision::collides;
use crate::compute::{update_enemy, update_player, update_projectile};
use crate::config::GameConfig;
use crate::entities::{
    EnemyKind, EntityId, Player, ProjectileOwner, SessionStatus, SoundCue, Sprite, World,
    PROJECTILE_HEIGHT, PROJECTILE_WIDTH, SHIP_HEIGHT, SHIP_WIDTH,
};
use crate::error::ConfigError;
use crate::platform::{AudioSink, Canvas, InputState, Prompt, SpriteReadiness};
use crate::spawner::spawn_wave;

pub const GAME_OVER_PROMPT: &str = "Game Over!\n\nWould you like to play again?";

/// Where the player's shot appears relative to the ship's corner.
const PLAYER_MUZZLE: (f32, f32) = (5.0, -3.0);

/// Offset of the ship from the horizontal centre and the bottom edge.
const PLAYER_START_OFFSET: (f32, f32) = (15.0, 20.0);

const SCORE_POSITION: (f32, f32) = (5.0, 10.0);
const HEALTH_BAR_HEIGHT: f32 = 2.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickOutcome {
    /// The session entered GameOver during this tick.
    pub game_over: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Continuation {
    Restarted,
    /// The player declined; the session stays over for good.
    Frozen,
}

pub struct GameSession {
    config: GameConfig,
    world: World,
    score: u32,
    status: SessionStatus,
    sprites: SpriteReadiness,
}

impl GameSession {
    /// Build a session and lay out its first wave.
    ///
    /// The config is checked here once; every later tick relies on its
    /// probabilities being in range and its wave grid being non-empty.
    pub fn new(config: GameConfig, rng: &mut impl Rng) -> Result<Self, ConfigError> {
        config.check()?;
        let world = World::new(spawn_player(&config));
        let mut session = GameSession {
            config,
            world,
            score: 0,
            status: SessionStatus::Running,
            sprites: SpriteReadiness::default(),
        };
        session.setup_session(rng);
        Ok(session)
    }

    /// Full reset: new player, new wave, score zero. Sprite readiness is kept.
    pub fn setup_session(&mut self, rng: &mut impl Rng) {
        self.world = World::new(spawn_player(&self.config));
        self.score = 0;
        self.status = SessionStatus::Running;
        spawn_wave(&mut self.world, &self.config, rng);
        info!(
            width = self.config.screen.width,
            height = self.config.screen.height,
            "session set up"
        );
    }

    // ── Read access for the HUD ───────────────────────────────────────────────

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn health(&self) -> u32 {
        self.world.player.hit_points()
    }

    pub fn max_health(&self) -> u32 {
        self.world.player.max_hit_points()
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_paused(&self) -> bool {
        self.status == SessionStatus::Paused
    }

    pub fn is_game_over(&self) -> bool {
        self.status == SessionStatus::GameOver
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Direct world access for setting up test scenarios. Frontends drive the
    /// world only through the session's operations.
    #[doc(hidden)]
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn sprites_mut(&mut self) -> &mut SpriteReadiness {
        &mut self.sprites
    }

    // ── State transitions ─────────────────────────────────────────────────────

    /// Running ⇄ Paused. Has no effect once the game is over.
    pub fn toggle_pause(&mut self) -> SessionStatus {
        self.status = match self.status {
            SessionStatus::Running => SessionStatus::Paused,
            SessionStatus::Paused => SessionStatus::Running,
            SessionStatus::GameOver => SessionStatus::GameOver,
        };
        info!(status = ?self.status, "pause toggled");
        self.status
    }

    fn enter_game_over(&mut self) {
        if self.status != SessionStatus::GameOver {
            self.status = SessionStatus::GameOver;
            info!(score = self.score, "game over");
        }
    }

    /// Ask whether to play again. `None` while the game is still going.
    pub fn conclude(
        &mut self,
        prompt: &mut impl Prompt,
        rng: &mut impl Rng,
    ) -> Option<Continuation> {
        if !self.is_game_over() {
            return None;
        }
        if prompt.confirm(GAME_OVER_PROMPT) {
            info!(final_score = self.score, "restarting");
            self.setup_session(rng);
            Some(Continuation::Restarted)
        } else {
            info!(final_score = self.score, "player declined restart");
            Some(Continuation::Frozen)
        }
    }

    // ── Tick ──────────────────────────────────────────────────────────────────

    /// Advance the simulation by one tick. A finished session does not move.
    ///
    /// Entities are visited through a snapshot of their ids, so removing one
    /// mid-pass never skips or repeats a neighbour, and nothing removed is
    /// touched again this tick.
    pub fn advance_tick(
        &mut self,
        input: &InputState,
        rng: &mut impl Rng,
        audio: &mut impl AudioSink,
    ) -> TickOutcome {
        if self.is_game_over() {
            return TickOutcome::default();
        }
        let mut game_over = false;

        // ── 1. Enemies ────────────────────────────────────────────────────────
        let enemy_ids: Vec<EntityId> = self.world.enemies.iter().map(|e| e.id).collect();
        for id in enemy_ids {
            let Some(enemy) = self.world.enemies.iter_mut().find(|e| e.id == id) else {
                continue;
            };
            let update = update_enemy(enemy, &self.config, rng);

            if let Some((x, y)) = update.shot {
                self.world.add_projectile(
                    x,
                    y,
                    -self.config.enemy.projectile_speed,
                    ProjectileOwner::Enemy,
                );
                audio.play(SoundCue::InvaderBullet);
            }
            if update.reached_bottom {
                game_over = true;
            }
            if update.off_screen {
                self.world.remove_enemy(id);
                debug!(id, "bonus ship left the screen");
            }
        }

        // ── 2. Projectiles ────────────────────────────────────────────────────
        let projectile_ids: Vec<EntityId> =
            self.world.projectiles.iter().map(|p| p.id).collect();
        for id in projectile_ids {
            let Some(projectile) = self.world.projectiles.iter_mut().find(|p| p.id == id) else {
                continue;
            };
            if !update_projectile(projectile, self.config.screen.height) {
                self.world.remove_projectile(id);
            }
        }

        // ── 3. Player movement ────────────────────────────────────────────────
        update_player(&mut self.world.player, input, self.config.screen.width);

        // ── 4. Player fire ────────────────────────────────────────────────────
        if input.fire && !self.world.player.has_fired && !self.is_paused() {
            self.fire_player_projectile(audio);
        }

        // ── 5. Replenish ──────────────────────────────────────────────────────
        if self.world.enemies.is_empty() {
            spawn_wave(&mut self.world, &self.config, rng);
        }

        // ── 6. Collisions ─────────────────────────────────────────────────────
        if self.resolve_collisions(audio) {
            game_over = true;
        }

        if game_over {
            self.enter_game_over();
        }
        TickOutcome { game_over }
    }

    fn fire_player_projectile(&mut self, audio: &mut impl AudioSink) {
        let player = &self.world.player;
        let (x, y) = (player.x + PLAYER_MUZZLE.0, player.y + PLAYER_MUZZLE.1);
        let id = self.world.add_projectile(
            x,
            y,
            self.config.player.projectile_speed,
            ProjectileOwner::Player,
        );
        self.world.player.has_fired = true;
        audio.play(SoundCue::ShipBullet);
        debug!(id, x, y, "player fired");

        // The new shot gets its first move right away.
        if let Some(projectile) = self.world.projectiles.iter_mut().find(|p| p.id == id) {
            if !update_projectile(projectile, self.config.screen.height) {
                self.world.remove_projectile(id);
            }
        }
    }

    /// Projectiles outer, enemies inner. Returns true if the player died.
    fn resolve_collisions(&mut self, audio: &mut impl AudioSink) -> bool {
        let mut player_died = false;
        let projectile_ids: Vec<EntityId> =
            self.world.projectiles.iter().map(|p| p.id).collect();

        for pid in projectile_ids {
            let Some(projectile) = self.world.projectile(pid).cloned() else {
                continue;
            };

            if collides(&projectile, &self.world.player) {
                let scoring = &self.config.scoring;
                self.score = self.score.saturating_sub(scoring.hit_penalty);
                self.world.player.damage(1);
                self.world.remove_projectile(pid);
                debug!(
                    hp = self.world.player.hit_points(),
                    score = self.score,
                    "player hit"
                );
                if self.world.player.is_dead() {
                    player_died = true;
                }
                continue;
            }

            // Invader shots pass through other invaders.
            if projectile.owner != ProjectileOwner::Player {
                continue;
            }

            let target = self
                .world
                .enemies
                .iter()
                .find(|e| collides(&projectile, *e))
                .map(|e| (e.id, e.kind.clone()));
            let Some((eid, kind)) = target else {
                continue;
            };

            let scoring = &self.config.scoring;
            match kind {
                EnemyKind::Standard { .. } => {
                    self.score += scoring.enemy_points;
                    audio.play(SoundCue::ShipHit);
                }
                EnemyKind::Bonus { .. } => {
                    self.score += scoring.bonus_points;
                    self.world.player.heal(scoring.bonus_heal);
                }
            }
            self.world.remove_projectile(pid);
            self.world.remove_enemy(eid);
            debug!(enemy = eid, score = self.score, "enemy destroyed");
        }

        player_died
    }

    // ── Render ────────────────────────────────────────────────────────────────

    pub fn render(&self, canvas: &mut impl Canvas) {
        let (width, height) = (self.config.screen.width, self.config.screen.height);
        canvas.clear(width, height);

        for enemy in &self.world.enemies {
            self.draw_ship(canvas, enemy.sprite, enemy.x, enemy.y);
        }
        for projectile in &self.world.projectiles {
            canvas.fill_rect(projectile.x, projectile.y, PROJECTILE_WIDTH, PROJECTILE_HEIGHT);
        }
        let player = &self.world.player;
        self.draw_ship(canvas, Sprite::Ship, player.x, player.y);

        canvas.draw_text(&self.score.to_string(), SCORE_POSITION.0, SCORE_POSITION.1);
        let health = player.hit_points() as f32 / player.max_hit_points() as f32;
        canvas.fill_rect(
            0.0,
            height - HEALTH_BAR_HEIGHT,
            width * health,
            HEALTH_BAR_HEIGHT,
        );
    }

    fn draw_ship(&self, canvas: &mut impl Canvas, sprite: Sprite, x: f32, y: f32) {
        if self.sprites.is_ready(sprite) {
            canvas.draw_sprite(sprite, x, y, SHIP_WIDTH, SHIP_HEIGHT);
        } else {
            trace!(?sprite, "sprite not loaded; skipping draw");
        }
    }
}

fn spawn_player(cfg: &GameConfig) -> Player {
    Player::new(
        cfg.screen.width / 2.0 - PLAYER_START_OFFSET.0,
        cfg.screen.height - PLAYER_START_OFFSET.1,
        cfg.player.speed,
        cfg.player.max_health,
    )
}
