/// Entities: Player, Spider, Bullet, Coin.
///
/// Positions are box centers in world units; every entity carries its
/// own removal mark (`alive` / `collected`). Marks are set by the
/// resolution passes and acted on once per tick at the step function's
/// single compaction point.

use glam::Vec2;

use super::geometry::Rect;

pub const PLAYER_SIZE: Vec2 = Vec2::new(22.0, 30.0);
pub const SPIDER_SIZE: Vec2 = Vec2::new(26.0, 18.0);
pub const BULLET_SIZE: Vec2 = Vec2::new(8.0, 4.0);
pub const COIN_SIZE: Vec2 = Vec2::new(16.0, 16.0);

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Facing {
    Left,
    Right,
}

#[derive(Clone, Debug)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    pub facing: Facing,
    pub alive: bool,
    /// Resting on platform geometry from above; eligible to jump.
    pub grounded: bool,
    pub on_ladder: bool,
    /// One-shot latch: set when a jump fires, cleared only on a tick
    /// where the jump input is not held. Blocks key-repeat jumps.
    pub jump_latch: bool,
    /// Walk-cycle counter; advances while moving, reset when idle.
    pub walk_frame: u32,
}

impl Player {
    pub fn new(pos: Vec2) -> Self {
        Player {
            pos,
            vel: Vec2::ZERO,
            facing: Facing::Right,
            alive: true,
            grounded: false,
            on_ladder: false,
            jump_latch: false,
            walk_frame: 0,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::from_center(self.pos, PLAYER_SIZE)
    }
}

#[derive(Clone, Debug)]
pub struct Spider {
    pub pos: Vec2,
    pub vel: Vec2,
    pub facing: Facing,
    pub alive: bool,
}

impl Spider {
    pub fn new(pos: Vec2) -> Self {
        Spider { pos, vel: Vec2::ZERO, facing: Facing::Left, alive: true }
    }

    pub fn rect(&self) -> Rect {
        Rect::from_center(self.pos, SPIDER_SIZE)
    }
}

#[derive(Clone, Debug)]
pub struct Bullet {
    pub pos: Vec2,
    pub vel: Vec2,
    pub alive: bool,
}

impl Bullet {
    pub fn new(pos: Vec2, vel: Vec2) -> Self {
        Bullet { pos, vel, alive: true }
    }

    pub fn rect(&self) -> Rect {
        Rect::from_center(self.pos, BULLET_SIZE)
    }
}

#[derive(Clone, Debug)]
pub struct Coin {
    pub pos: Vec2,
    pub collected: bool,
}

impl Coin {
    pub fn new(pos: Vec2) -> Self {
        Coin { pos, collected: false }
    }

    pub fn rect(&self) -> Rect {
        Rect::from_center(self.pos, COIN_SIZE)
    }
}

/// Input sampled once per tick: held directional intents plus the
/// pending aim-and-fire target (world coordinates), recorded between
/// ticks and consumed at the start of the next one.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameInput {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub fire: Option<Vec2>,
}
