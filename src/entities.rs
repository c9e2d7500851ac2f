/// All game entity types: plain data plus the bookkeeping that keeps their
/// invariants. Per-tick movement rules live in `compute`.

use crate::collision::{Bounds, Hitbox};

pub type EntityId = u64;

/// Every ship (player, invader, bonus) shares one sprite size.
pub const SHIP_WIDTH: f32 = 12.0;
pub const SHIP_HEIGHT: f32 = 8.0;

pub const PROJECTILE_WIDTH: f32 = 2.0;
pub const PROJECTILE_HEIGHT: f32 = 3.0;

// ── Platform-facing handles ───────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Sprite {
    InvaderA,
    InvaderB,
    InvaderC,
    Ship,
}

impl Sprite {
    /// The pool a standard invader's look is drawn from.
    pub const INVADERS: [Sprite; 3] = [Sprite::InvaderA, Sprite::InvaderB, Sprite::InvaderC];

    pub const ALL: [Sprite; 4] = [
        Sprite::InvaderA,
        Sprite::InvaderB,
        Sprite::InvaderC,
        Sprite::Ship,
    ];
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SoundCue {
    InvaderBullet,
    ShipBullet,
    ShipHit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionStatus {
    Running,
    Paused,
    GameOver,
}

// ── Player ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Player {
    pub x: f32,
    pub y: f32,
    pub speed: f32,
    hit_points: u32,
    max_hit_points: u32,
    /// Set while the player's single projectile is in flight.
    pub has_fired: bool,
}

impl Player {
    pub fn new(x: f32, y: f32, speed: f32, max_hit_points: u32) -> Self {
        Player {
            x,
            y,
            speed,
            hit_points: max_hit_points,
            max_hit_points,
            has_fired: false,
        }
    }

    pub fn hit_points(&self) -> u32 {
        self.hit_points
    }

    pub fn max_hit_points(&self) -> u32 {
        self.max_hit_points
    }

    /// Lose `amount` hit points, stopping at zero.
    pub fn damage(&mut self, amount: u32) {
        self.hit_points = self.hit_points.saturating_sub(amount);
    }

    /// Gain `amount` hit points, capped at the maximum.
    pub fn heal(&mut self, amount: u32) {
        self.hit_points = self.hit_points.saturating_add(amount).min(self.max_hit_points);
    }

    pub fn is_dead(&self) -> bool {
        self.hit_points == 0
    }
}

impl Hitbox for Player {
    fn bounds(&self) -> Bounds {
        Bounds::new(self.x, self.y, SHIP_WIDTH, SHIP_HEIGHT)
    }
}

// ── Enemies ───────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub enum EnemyKind {
    /// A formation invader sweeping side to side.
    Standard {
        /// Signed horizontal speed; negated at each screen edge.
        speed: f32,
        /// Cosmetic: any player hit destroys the invader.
        hit_points: u32,
    },
    /// Drifts straight down and never fires. Worth extra score and health.
    Bonus { drift: f32 },
}

#[derive(Clone, Debug)]
pub struct Enemy {
    pub id: EntityId,
    pub x: f32,
    pub y: f32,
    pub sprite: Sprite,
    pub kind: EnemyKind,
}

impl Enemy {
    pub fn is_bonus(&self) -> bool {
        matches!(self.kind, EnemyKind::Bonus { .. })
    }
}

impl Hitbox for Enemy {
    fn bounds(&self) -> Bounds {
        Bounds::new(self.x, self.y, SHIP_WIDTH, SHIP_HEIGHT)
    }
}

// ── Projectiles ───────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProjectileOwner {
    Player,
    Enemy,
}

#[derive(Clone, Debug)]
pub struct Projectile {
    pub id: EntityId,
    pub x: f32,
    pub y: f32,
    /// Subtracted from `y` each tick: positive travels up, negative down.
    pub speed: f32,
    pub owner: ProjectileOwner,
}

impl Hitbox for Projectile {
    fn bounds(&self) -> Bounds {
        Bounds::new(self.x, self.y, PROJECTILE_WIDTH, PROJECTILE_HEIGHT)
    }
}

// ── World ─────────────────────────────────────────────────────────────────────

/// Every live entity of one session.
#[derive(Clone, Debug)]
pub struct World {
    pub player: Player,
    /// Standard invaders and bonus ships share this collection.
    pub enemies: Vec<Enemy>,
    pub projectiles: Vec<Projectile>,
    next_id: EntityId,
}

impl World {
    pub fn new(player: Player) -> Self {
        World {
            player,
            enemies: Vec::new(),
            projectiles: Vec::new(),
            next_id: 1,
        }
    }

    fn allocate_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn add_enemy(&mut self, x: f32, y: f32, sprite: Sprite, kind: EnemyKind) -> EntityId {
        let id = self.allocate_id();
        self.enemies.push(Enemy {
            id,
            x,
            y,
            sprite,
            kind,
        });
        id
    }

    pub fn add_projectile(
        &mut self,
        x: f32,
        y: f32,
        speed: f32,
        owner: ProjectileOwner,
    ) -> EntityId {
        let id = self.allocate_id();
        self.projectiles.push(Projectile {
            id,
            x,
            y,
            speed,
            owner,
        });
        id
    }

    pub fn enemy(&self, id: EntityId) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.id == id)
    }

    pub fn projectile(&self, id: EntityId) -> Option<&Projectile> {
        self.projectiles.iter().find(|p| p.id == id)
    }

    /// Remove an enemy by identity.
    pub fn remove_enemy(&mut self, id: EntityId) -> Option<Enemy> {
        let index = self.enemies.iter().position(|e| e.id == id)?;
        Some(self.enemies.remove(index))
    }

    /// Remove a projectile by identity.
    ///
    /// Removing the player's projectile re-arms the player's gun.
    pub fn remove_projectile(&mut self, id: EntityId) -> Option<Projectile> {
        let index = self.projectiles.iter().position(|p| p.id == id)?;
        let projectile = self.projectiles.remove(index);
        if projectile.owner == ProjectileOwner::Player {
            self.player.has_fired = false;
        }
        Some(projectile)
    }

    pub fn player_projectile_count(&self) -> usize {
        self.projectiles
            .iter()
            .filter(|p| p.owner == ProjectileOwner::Player)
            .count()
    }
}
