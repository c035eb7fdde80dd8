/// Spider AI — horizontal pursuit with a wall-climb override.
///
/// Driven once per spider per tick, after its physics pass:
///   1. Integrate position by current velocity.
///   2. With 1-in-`reaim_one_in` probability, re-aim the HORIZONTAL
///      velocity toward the player: `cos(atan2(dy, dx)) * speed`.
///      The vertical component is left to gravity — spiders do not
///      home vertically. Facing flips with the sign of dx.
///   3. Wall contact: for every platform the box overlaps (last one
///      wins), aim BOTH velocity components at a point a fixed rise
///      above that platform's top edge. This climb takes priority over
///      pursuit for the tick.
///
/// The RNG is injected so a fixed seed reproduces the exact re-aim
/// ticks. Removal (off-bounds, water contact) is owned by the step
/// function, which holds the bounds and zone collections.

use glam::Vec2;
use rand::Rng;

use super::entity::{Facing, Spider};
use super::geometry::Rect;

pub struct Pursuit {
    pub speed: f32,
    pub climb_rise: f32,
    /// Re-aim with probability 1-in-this per tick.
    pub reaim_one_in: u32,
}

pub fn drive(
    spider: &mut Spider,
    player_pos: Vec2,
    platforms: &[Rect],
    params: &Pursuit,
    rng: &mut impl Rng,
) {
    spider.pos += spider.vel;

    if rng.random_range(0..params.reaim_one_in) == 0 {
        let d = player_pos - spider.pos;
        let angle = d.y.atan2(d.x);
        spider.vel.x = angle.cos() * params.speed;
        spider.facing = if d.x > 0.0 { Facing::Right } else { Facing::Left };
    }

    for platform in platforms {
        if spider.rect().overlaps(platform) {
            let target = Vec2::new(platform.center().x, platform.top() - params.climb_rise);
            let d = target - spider.pos;
            let angle = d.y.atan2(d.x);
            spider.vel = Vec2::new(angle.cos(), angle.sin()) * params.speed;
        }
    }
}
