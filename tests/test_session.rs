use space_defender::config::GameConfig;
use space_defender::entities::*;
use space_defender::error::ConfigError;
use space_defender::platform::*;
use space_defender::session::*;

use rand::rngs::StdRng;
use rand::SeedableRng;

// ── Test doubles ──────────────────────────────────────────────────────────────

#[derive(Default)]
struct RecordingAudio {
    cues: Vec<SoundCue>,
}

impl AudioSink for RecordingAudio {
    fn play(&mut self, cue: SoundCue) {
        self.cues.push(cue);
    }
}

#[derive(Debug, PartialEq)]
enum Op {
    Clear(f32, f32),
    Sprite(Sprite, f32, f32),
    Rect(f32, f32, f32, f32),
    Text(String, f32, f32),
}

#[derive(Default)]
struct RecordingCanvas {
    ops: Vec<Op>,
}

impl Canvas for RecordingCanvas {
    fn clear(&mut self, width: f32, height: f32) {
        self.ops.push(Op::Clear(width, height));
    }
    fn draw_sprite(&mut self, sprite: Sprite, x: f32, y: f32, _width: f32, _height: f32) {
        self.ops.push(Op::Sprite(sprite, x, y));
    }
    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.ops.push(Op::Rect(x, y, width, height));
    }
    fn draw_text(&mut self, text: &str, x: f32, y: f32) {
        self.ops.push(Op::Text(text.to_string(), x, y));
    }
}

struct ScriptedPrompt {
    answer: bool,
    asked: Vec<String>,
}

impl Prompt for ScriptedPrompt {
    fn confirm(&mut self, message: &str) -> bool {
        self.asked.push(message.to_string());
        self.answer
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// No random shots and no bonus ship, so only what a test places can collide.
fn quiet_config() -> GameConfig {
    let mut cfg = GameConfig::default();
    cfg.enemy.fire_chance = 0.0;
    cfg.wave.bonus_chance = 0.0;
    cfg
}

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

fn idle() -> InputState {
    InputState::default()
}

fn fire() -> InputState {
    InputState {
        fire: true,
        ..Default::default()
    }
}

/// A session whose only enemy is a motionless invader at (100, 100).
fn session_with_parked_invader(rng: &mut StdRng) -> (GameSession, EntityId) {
    let mut s = GameSession::new(quiet_config(), rng).expect("valid config");
    let w = s.world_mut();
    w.enemies.clear();
    let id = w.add_enemy(
        100.0,
        100.0,
        Sprite::InvaderB,
        EnemyKind::Standard {
            speed: 0.0,
            hit_points: 10,
        },
    );
    (s, id)
}

/// Put an invader shot where it will land on the player after this tick's move.
fn aim_at_player(s: &mut GameSession) -> EntityId {
    let w = s.world_mut();
    let (x, y) = (w.player.x + 5.0, w.player.y - 3.0);
    w.add_projectile(x, y, -3.0, ProjectileOwner::Enemy)
}

/// A player shot that lands exactly on the parked invader after its move.
fn aim_at_parked_invader(s: &mut GameSession) -> EntityId {
    let w = s.world_mut();
    w.player.has_fired = true;
    w.add_projectile(100.0, 103.0, 3.0, ProjectileOwner::Player)
}

// ── Setup ─────────────────────────────────────────────────────────────────────

#[test]
fn fresh_session_has_full_formation_and_full_health() {
    let mut rng = seeded_rng();
    let s = GameSession::new(GameConfig::default(), &mut rng).expect("valid config");
    let standard = s.world().enemies.iter().filter(|e| !e.is_bonus()).count();
    let bonus = s.world().enemies.iter().filter(|e| e.is_bonus()).count();

    assert_eq!(standard, 40);
    assert!(bonus <= 1);
    assert_eq!(s.health(), 10);
    assert_eq!(s.max_health(), 10);
    assert_eq!(s.score(), 0);
    assert_eq!(s.status(), SessionStatus::Running);
    assert!(s.world().projectiles.is_empty());
}

#[test]
fn player_starts_near_bottom_centre() {
    let mut rng = seeded_rng();
    let s = GameSession::new(quiet_config(), &mut rng).expect("valid config");
    let p = &s.world().player;
    assert_eq!((p.x, p.y), (145.0, 220.0));
    assert!(!p.has_fired);
}

#[test]
fn out_of_range_fire_chance_is_refused_at_construction() {
    let mut rng = seeded_rng();
    let mut cfg = quiet_config();
    cfg.enemy.fire_chance = 1.5;

    let err = GameSession::new(cfg, &mut rng).err();

    assert!(matches!(
        err,
        Some(ConfigError::Invalid {
            field: "enemy.fire_chance",
            ..
        })
    ));
}

#[test]
fn negative_bonus_chance_is_refused_at_construction() {
    let mut rng = seeded_rng();
    let mut cfg = quiet_config();
    cfg.wave.bonus_chance = -0.1;
    assert!(GameSession::new(cfg, &mut rng).is_err());
}

#[test]
fn empty_grid_is_refused_at_construction() {
    let mut rng = seeded_rng();
    let mut cfg = quiet_config();
    cfg.wave.rows = 0;
    assert!(GameSession::new(cfg, &mut rng).is_err());
}

// ── Firing ────────────────────────────────────────────────────────────────────

#[test]
fn fire_spawns_one_projectile_above_ship_and_moves_it() {
    let mut rng = seeded_rng();
    let mut s = GameSession::new(quiet_config(), &mut rng).expect("valid config");
    let mut audio = RecordingAudio::default();

    s.advance_tick(&fire(), &mut rng, &mut audio);

    let shots = &s.world().projectiles;
    assert_eq!(shots.len(), 1);
    assert_eq!(shots[0].owner, ProjectileOwner::Player);
    // Spawned at (x + 5, y - 3) and moved once by speed 3.
    assert_eq!((shots[0].x, shots[0].y), (150.0, 214.0));
    assert!(s.world().player.has_fired);
    assert_eq!(audio.cues, vec![SoundCue::ShipBullet]);
}

#[test]
fn held_fire_never_puts_two_player_shots_in_flight() {
    let mut rng = seeded_rng();
    let mut s = GameSession::new(GameConfig::default(), &mut rng).expect("valid config");
    let mut audio = Silent;

    for _ in 0..300 {
        s.advance_tick(&fire(), &mut rng, &mut audio);
        assert!(s.world().player_projectile_count() <= 1);
    }
}

#[test]
fn gun_rearms_after_shot_leaves_screen() {
    let mut rng = seeded_rng();
    let mut s = GameSession::new(quiet_config(), &mut rng).expect("valid config");
    let mut audio = RecordingAudio::default();
    s.world_mut().enemies.clear();
    s.world_mut().add_enemy(
        300.0,
        200.0,
        Sprite::InvaderA,
        EnemyKind::Standard {
            speed: 0.0,
            hit_points: 10,
        },
    );

    s.advance_tick(&fire(), &mut rng, &mut audio);
    // 214 / 3 more ticks carries the shot above y = 0.
    for _ in 0..72 {
        s.advance_tick(&idle(), &mut rng, &mut audio);
    }
    assert_eq!(s.world().player_projectile_count(), 0);
    assert!(!s.world().player.has_fired);

    s.advance_tick(&fire(), &mut rng, &mut audio);
    assert_eq!(s.world().player_projectile_count(), 1);
}

#[test]
fn pause_blocks_fire_even_with_gun_armed() {
    let mut rng = seeded_rng();
    let mut s = GameSession::new(quiet_config(), &mut rng).expect("valid config");
    let mut audio = RecordingAudio::default();

    assert_eq!(s.toggle_pause(), SessionStatus::Paused);
    assert!(s.is_paused());
    s.advance_tick(&fire(), &mut rng, &mut audio);

    assert!(s.world().projectiles.is_empty());
    assert!(!s.world().player.has_fired);
    assert!(audio.cues.is_empty());

    assert_eq!(s.toggle_pause(), SessionStatus::Running);
    s.advance_tick(&fire(), &mut rng, &mut audio);
    assert_eq!(s.world().player_projectile_count(), 1);
}

// ── Player hits an invader ────────────────────────────────────────────────────

#[test]
fn player_shot_on_invader_scores_and_rearms() {
    let mut rng = seeded_rng();
    let (mut s, invader) = session_with_parked_invader(&mut rng);
    let mut audio = RecordingAudio::default();
    let shot = aim_at_parked_invader(&mut s);

    s.advance_tick(&idle(), &mut rng, &mut audio);

    assert_eq!(s.score(), 100);
    assert!(s.world().enemy(invader).is_none());
    assert!(s.world().projectile(shot).is_none());
    assert!(s.world().enemies.is_empty());
    assert!(s.world().projectiles.is_empty());
    assert!(!s.world().player.has_fired);
    assert_eq!(audio.cues, vec![SoundCue::ShipHit]);
}

#[test]
fn one_shot_destroys_only_one_of_two_overlapping_invaders() {
    let mut rng = seeded_rng();
    let (mut s, first) = session_with_parked_invader(&mut rng);
    let mut audio = RecordingAudio::default();
    let second = s.world_mut().add_enemy(
        101.0,
        100.0,
        Sprite::InvaderC,
        EnemyKind::Standard {
            speed: 0.0,
            hit_points: 10,
        },
    );
    aim_at_parked_invader(&mut s);

    s.advance_tick(&idle(), &mut rng, &mut audio);

    assert_eq!(s.score(), 100);
    assert!(s.world().enemy(first).is_none());
    assert!(s.world().enemy(second).is_some());
}

#[test]
fn bonus_kill_scores_five_hundred_and_heals() {
    let mut rng = seeded_rng();
    let (mut s, _) = session_with_parked_invader(&mut rng);
    let mut audio = RecordingAudio::default();
    let w = s.world_mut();
    w.player.damage(7);
    let bonus = w.add_enemy(200.0, 100.0, Sprite::InvaderA, EnemyKind::Bonus { drift: 0.0 });
    w.player.has_fired = true;
    w.add_projectile(200.0, 103.0, 3.0, ProjectileOwner::Player);

    s.advance_tick(&idle(), &mut rng, &mut audio);

    assert_eq!(s.score(), 500);
    assert_eq!(s.health(), 8);
    assert!(s.world().enemy(bonus).is_none());
    assert!(!s.world().player.has_fired);
    // Bonus kills are silent.
    assert!(audio.cues.is_empty());
}

#[test]
fn bonus_heal_is_capped_at_max_health() {
    let mut rng = seeded_rng();
    let (mut s, _) = session_with_parked_invader(&mut rng);
    let mut audio = RecordingAudio::default();
    let w = s.world_mut();
    w.player.damage(1);
    w.add_enemy(200.0, 100.0, Sprite::InvaderA, EnemyKind::Bonus { drift: 0.0 });
    w.player.has_fired = true;
    w.add_projectile(200.0, 103.0, 3.0, ProjectileOwner::Player);

    s.advance_tick(&idle(), &mut rng, &mut audio);

    assert_eq!(s.health(), 10);
}

#[test]
fn invader_shots_pass_through_invaders() {
    let mut rng = seeded_rng();
    let (mut s, invader) = session_with_parked_invader(&mut rng);
    let mut audio = RecordingAudio::default();
    let shot = s
        .world_mut()
        .add_projectile(100.0, 97.0, -3.0, ProjectileOwner::Enemy);

    s.advance_tick(&idle(), &mut rng, &mut audio);

    assert!(s.world().enemy(invader).is_some());
    let p = s.world().projectile(shot).map(|p| (p.x, p.y));
    assert_eq!(p, Some((100.0, 100.0)));
    assert_eq!(s.score(), 0);
}

// ── Player gets hit ───────────────────────────────────────────────────────────

#[test]
fn hit_on_player_costs_health_and_score() {
    let mut rng = seeded_rng();
    let (mut s, _) = session_with_parked_invader(&mut rng);
    let mut audio = RecordingAudio::default();

    // Bank 100 points first.
    aim_at_parked_invader(&mut s);
    s.advance_tick(&idle(), &mut rng, &mut audio);
    assert_eq!(s.score(), 100);
    s.world_mut().add_enemy(
        100.0,
        100.0,
        Sprite::InvaderB,
        EnemyKind::Standard {
            speed: 0.0,
            hit_points: 10,
        },
    );

    let shot = aim_at_player(&mut s);
    s.advance_tick(&idle(), &mut rng, &mut audio);

    assert_eq!(s.health(), 9);
    assert_eq!(s.score(), 50);
    assert!(s.world().projectile(shot).is_none());
    assert_eq!(s.status(), SessionStatus::Running);
}

#[test]
fn score_penalty_floors_at_zero() {
    let mut rng = seeded_rng();
    let (mut s, _) = session_with_parked_invader(&mut rng);
    let mut audio = RecordingAudio::default();

    for expected_hp in (7..10).rev() {
        aim_at_player(&mut s);
        s.advance_tick(&idle(), &mut rng, &mut audio);
        assert_eq!(s.score(), 0);
        assert_eq!(s.health(), expected_hp);
    }
}

#[test]
fn two_shots_on_player_in_one_tick_both_count() {
    let mut rng = seeded_rng();
    let (mut s, _) = session_with_parked_invader(&mut rng);
    let mut audio = RecordingAudio::default();
    aim_at_player(&mut s);
    aim_at_player(&mut s);

    s.advance_tick(&idle(), &mut rng, &mut audio);

    assert_eq!(s.health(), 8);
    assert!(s.world().projectiles.is_empty());
}

#[test]
fn last_hit_point_lost_ends_the_game() {
    let mut rng = seeded_rng();
    let (mut s, _) = session_with_parked_invader(&mut rng);
    let mut audio = RecordingAudio::default();
    s.world_mut().player.damage(9);
    assert_eq!(s.health(), 1);

    aim_at_player(&mut s);
    let outcome = s.advance_tick(&idle(), &mut rng, &mut audio);

    assert!(outcome.game_over);
    assert_eq!(s.health(), 0);
    assert!(s.is_game_over());
    assert!(s.world().projectiles.is_empty());
}

// ── Other endings and removals ────────────────────────────────────────────────

#[test]
fn invader_crossing_bottom_line_ends_the_game() {
    let mut rng = seeded_rng();
    let (mut s, _) = session_with_parked_invader(&mut rng);
    let mut audio = RecordingAudio::default();
    s.world_mut().add_enemy(
        20.0,
        221.0,
        Sprite::InvaderC,
        EnemyKind::Standard {
            speed: 0.0,
            hit_points: 10,
        },
    );

    let outcome = s.advance_tick(&idle(), &mut rng, &mut audio);

    assert!(outcome.game_over);
    assert_eq!(s.status(), SessionStatus::GameOver);
}

#[test]
fn bonus_ship_drifting_off_screen_is_removed_without_effect() {
    let mut rng = seeded_rng();
    let (mut s, invader) = session_with_parked_invader(&mut rng);
    let mut audio = RecordingAudio::default();
    let bonus = s.world_mut().add_enemy(
        60.0,
        239.8,
        Sprite::InvaderA,
        EnemyKind::Bonus { drift: 0.5 },
    );

    let outcome = s.advance_tick(&idle(), &mut rng, &mut audio);

    assert!(s.world().enemy(bonus).is_none());
    assert!(s.world().enemy(invader).is_some());
    assert_eq!(s.score(), 0);
    assert_eq!(s.health(), 10);
    assert!(!outcome.game_over);
}

#[test]
fn removal_mid_pass_does_not_skip_the_next_enemy() {
    let mut rng = seeded_rng();
    let mut s = GameSession::new(quiet_config(), &mut rng).expect("valid config");
    let mut audio = RecordingAudio::default();
    let w = s.world_mut();
    w.enemies.clear();
    w.add_enemy(60.0, 239.8, Sprite::InvaderA, EnemyKind::Bonus { drift: 0.5 });
    let follower = w.add_enemy(
        100.0,
        50.0,
        Sprite::InvaderA,
        EnemyKind::Standard {
            speed: 1.0,
            hit_points: 10,
        },
    );

    s.advance_tick(&idle(), &mut rng, &mut audio);

    assert_eq!(s.world().enemy(follower).map(|e| e.x), Some(101.0));
}

#[test]
fn empty_field_is_refilled_within_the_tick() {
    let mut rng = seeded_rng();
    let mut s = GameSession::new(quiet_config(), &mut rng).expect("valid config");
    let mut audio = RecordingAudio::default();
    s.world_mut().enemies.clear();

    s.advance_tick(&idle(), &mut rng, &mut audio);

    assert_eq!(s.world().enemies.len(), 40);
}

// ── Game over resolution ──────────────────────────────────────────────────────

fn lost_session(rng: &mut StdRng) -> GameSession {
    let (mut s, _) = session_with_parked_invader(rng);
    let mut audio = RecordingAudio::default();
    s.world_mut().player.damage(9);
    aim_at_player(&mut s);
    s.advance_tick(&idle(), rng, &mut audio);
    assert!(s.is_game_over());
    s
}

#[test]
fn finished_session_does_not_advance() {
    let mut rng = seeded_rng();
    let mut s = lost_session(&mut rng);
    let mut audio = RecordingAudio::default();
    let before: Vec<(f32, f32)> = s.world().enemies.iter().map(|e| (e.x, e.y)).collect();
    s.world_mut().enemies.clear();

    let outcome = s.advance_tick(&fire(), &mut rng, &mut audio);

    assert!(!outcome.game_over);
    assert!(s.world().enemies.is_empty(), "no wave after game over");
    assert!(s.world().projectiles.is_empty());
    assert!(!before.is_empty());
}

#[test]
fn pause_toggle_is_ignored_after_game_over() {
    let mut rng = seeded_rng();
    let mut s = lost_session(&mut rng);
    assert_eq!(s.toggle_pause(), SessionStatus::GameOver);
}

#[test]
fn accepting_the_prompt_restarts_from_scratch() {
    let mut rng = seeded_rng();
    let mut s = lost_session(&mut rng);
    let mut prompt = ScriptedPrompt {
        answer: true,
        asked: Vec::new(),
    };

    let result = s.conclude(&mut prompt, &mut rng);

    assert_eq!(result, Some(Continuation::Restarted));
    assert_eq!(prompt.asked, vec![GAME_OVER_PROMPT.to_string()]);
    assert_eq!(s.status(), SessionStatus::Running);
    assert_eq!(s.health(), 10);
    assert_eq!(s.score(), 0);
    assert_eq!(s.world().enemies.len(), 40);
    assert!(s.world().projectiles.is_empty());
}

#[test]
fn declining_the_prompt_freezes_the_session() {
    let mut rng = seeded_rng();
    let mut s = lost_session(&mut rng);
    let mut prompt = ScriptedPrompt {
        answer: false,
        asked: Vec::new(),
    };

    assert_eq!(s.conclude(&mut prompt, &mut rng), Some(Continuation::Frozen));
    assert!(s.is_game_over());
    assert_eq!(s.health(), 0);
}

#[test]
fn conclude_does_nothing_while_playing() {
    let mut rng = seeded_rng();
    let mut s = GameSession::new(quiet_config(), &mut rng).expect("valid config");
    let mut prompt = ScriptedPrompt {
        answer: true,
        asked: Vec::new(),
    };
    assert_eq!(s.conclude(&mut prompt, &mut rng), None);
    assert!(prompt.asked.is_empty());
}

// ── Render ────────────────────────────────────────────────────────────────────

#[test]
fn unloaded_sprites_are_skipped() {
    let mut rng = seeded_rng();
    let s = GameSession::new(quiet_config(), &mut rng).expect("valid config");
    let mut canvas = RecordingCanvas::default();

    s.render(&mut canvas);

    assert!(!canvas.ops.iter().any(|op| matches!(op, Op::Sprite(..))));
    assert_eq!(canvas.ops[0], Op::Clear(320.0, 240.0));
    assert!(canvas.ops.contains(&Op::Text("0".into(), 5.0, 10.0)));
}

#[test]
fn ready_sprites_are_drawn_in_order() {
    let mut rng = seeded_rng();
    let mut s = GameSession::new(quiet_config(), &mut rng).expect("valid config");
    s.sprites_mut().mark_all_ready();
    let mut canvas = RecordingCanvas::default();

    s.render(&mut canvas);

    let sprites: Vec<&Op> = canvas
        .ops
        .iter()
        .filter(|op| matches!(op, Op::Sprite(..)))
        .collect();
    assert_eq!(sprites.len(), 41);
    assert_eq!(*sprites[40], Op::Sprite(Sprite::Ship, 145.0, 220.0));
}

#[test]
fn readiness_is_per_sprite() {
    let mut rng = seeded_rng();
    let mut s = GameSession::new(quiet_config(), &mut rng).expect("valid config");
    s.sprites_mut().mark_ready(Sprite::Ship);
    let mut canvas = RecordingCanvas::default();

    s.render(&mut canvas);

    let sprites: Vec<&Op> = canvas
        .ops
        .iter()
        .filter(|op| matches!(op, Op::Sprite(..)))
        .collect();
    assert_eq!(sprites, vec![&Op::Sprite(Sprite::Ship, 145.0, 220.0)]);
}

#[test]
fn health_bar_is_proportional() {
    let mut rng = seeded_rng();
    let mut s = GameSession::new(quiet_config(), &mut rng).expect("valid config");
    s.world_mut().player.damage(5);
    let mut canvas = RecordingCanvas::default();

    s.render(&mut canvas);

    assert_eq!(canvas.ops.last(), Some(&Op::Rect(0.0, 238.0, 160.0, 2.0)));
}

#[test]
fn projectiles_render_as_rects() {
    let mut rng = seeded_rng();
    let mut s = GameSession::new(quiet_config(), &mut rng).expect("valid config");
    s.world_mut()
        .add_projectile(33.0, 44.0, -3.0, ProjectileOwner::Enemy);
    let mut canvas = RecordingCanvas::default();

    s.render(&mut canvas);

    assert!(canvas.ops.contains(&Op::Rect(33.0, 44.0, 2.0, 3.0)));
}
