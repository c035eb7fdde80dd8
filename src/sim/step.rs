/// The step function: advances a level session by one tick.
///
/// Processing order:
///   1. Environment modifiers (pure recompute from water overlap)
///   2. Player velocity resolution (held keys, climb intent, jump latch)
///   3. Bullet spawn from the pending fire target
///   4. Player physics
///   5. Spider physics (gravity/grounding against platforms)
///   6. Spider AI (pursuit integrate, re-aim, wall-climb) + removal marks
///   7. Coin pickup
///   8. Bullet advance + impact marks
///   9. Compaction (the single removal point per collection)
///  10. End-of-tick evaluation: out-of-bounds → died, spider contact →
///      died, both sets empty → cleared
///
/// All passes are total over their inputs: empty collections and
/// zero-velocity actors fall through without special cases.

use rand::Rng;

use crate::config::Tuning;
use crate::domain::ai::{self, Pursuit};
use crate::domain::entity::{Bullet, Facing, FrameInput, PLAYER_SIZE, SPIDER_SIZE};
use crate::domain::geometry::{hits, overlaps_any};
use crate::domain::modifiers::Modifiers;
use crate::domain::physics;

use super::event::GameEvent;
use super::world::Session;

/// How the tick left the session, judged in order: death beats clear.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Outcome {
    Continue,
    Died,
    Cleared,
}

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(
    s: &mut Session,
    score: &mut u32,
    input: FrameInput,
    tuning: &Tuning,
    rng: &mut impl Rng,
) -> (Vec<GameEvent>, Outcome) {
    let mut events: Vec<GameEvent> = Vec::new();
    s.tick += 1;

    s.modifiers = Modifiers::resolve(&s.player.rect(), &s.water, tuning);

    let climb = resolve_player_velocity(s, &input, &mut events);
    resolve_fire(s, input.fire, &mut events);
    resolve_player_physics(s, climb);
    resolve_spider_physics(s, tuning);
    resolve_spider_ai(s, tuning, rng, &mut events);
    resolve_coin_pickup(s, score, &mut events);
    resolve_bullets(s, score, &mut events);
    compact(s);

    let outcome = evaluate(s, &mut events);
    (events, outcome)
}

// ══════════════════════════════════════════════════════════════
// Player
// ══════════════════════════════════════════════════════════════

/// Turn held directional intents into velocity. Returns the climb
/// velocity to hand the physics engine when vertical input is active.
fn resolve_player_velocity(
    s: &mut Session,
    input: &FrameInput,
    events: &mut Vec<GameEvent>,
) -> Option<f32> {
    let mods = s.modifiers;
    let in_ladder = overlaps_any(&s.player.rect(), &s.ladders);
    let p = &mut s.player;

    p.vel.x = if input.right && !input.left {
        p.facing = Facing::Right;
        mods.move_speed
    } else if input.left && !input.right {
        p.facing = Facing::Left;
        -mods.move_speed
    } else {
        0.0
    };

    if p.vel.x != 0.0 {
        p.walk_frame = p.walk_frame.wrapping_add(1);
    } else {
        p.walk_frame = 0;
    }

    let mut climb = None;
    if input.up && !input.down {
        if in_ladder {
            climb = Some(-mods.move_speed);
        } else if p.grounded && !p.jump_latch {
            p.vel.y = -mods.jump_speed;
            p.jump_latch = true;
            events.push(GameEvent::Jumped);
        }
    } else if input.down && !input.up {
        if in_ladder {
            climb = Some(mods.move_speed);
        }
    } else if input.down && input.up && in_ladder {
        climb = Some(0.0);
    }

    // The latch clears only when the jump input is released.
    if !input.up {
        p.jump_latch = false;
    }

    climb
}

fn resolve_fire(s: &mut Session, fire: Option<glam::Vec2>, events: &mut Vec<GameEvent>) {
    let Some(target) = fire else { return };
    let d = target - s.player.pos;
    let angle = d.y.atan2(d.x);
    let vel = glam::Vec2::new(angle.cos(), angle.sin()) * s.modifiers.bullet_speed;
    s.bullets.push(Bullet::new(s.player.pos, vel));
    events.push(GameEvent::ShotFired);
}

fn resolve_player_physics(s: &mut Session, climb: Option<f32>) {
    let contact = physics::advance(
        &mut s.player.pos,
        &mut s.player.vel,
        PLAYER_SIZE,
        &s.platforms,
        s.modifiers.gravity,
        &s.ladders,
        climb,
    );
    s.player.grounded = contact.grounded;
    s.player.on_ladder = contact.on_ladder;
}

// ══════════════════════════════════════════════════════════════
// Spiders
// ══════════════════════════════════════════════════════════════

/// Spiders run the same physics engine as the player for gravity and
/// grounding; they never use ladders and always fall at full gravity.
fn resolve_spider_physics(s: &mut Session, tuning: &Tuning) {
    for spider in s.spiders.iter_mut() {
        if !spider.alive {
            continue;
        }
        physics::advance(
            &mut spider.pos,
            &mut spider.vel,
            SPIDER_SIZE,
            &s.platforms,
            tuning.gravity,
            &[],
            None,
        );
    }
}

fn resolve_spider_ai(
    s: &mut Session,
    tuning: &Tuning,
    rng: &mut impl Rng,
    events: &mut Vec<GameEvent>,
) {
    let params = Pursuit {
        speed: tuning.spider_speed,
        climb_rise: tuning.climb_rise,
        reaim_one_in: tuning.reaim_one_in,
    };
    let player_pos = s.player.pos;

    for spider in s.spiders.iter_mut() {
        if !spider.alive {
            continue;
        }
        ai::drive(spider, player_pos, &s.platforms, &params, rng);

        let r = spider.rect();
        if r.outside(&s.bounds) {
            spider.alive = false;
        } else if overlaps_any(&r, &s.water) {
            spider.alive = false;
            events.push(GameEvent::SpiderDrowned { x: spider.pos.x, y: spider.pos.y });
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Pickups & bullets
// ══════════════════════════════════════════════════════════════

fn resolve_coin_pickup(s: &mut Session, score: &mut u32, events: &mut Vec<GameEvent>) {
    let pr = s.player.rect();
    for i in hits(&pr, &s.coins, |c| (!c.collected).then(|| c.rect())) {
        s.coins[i].collected = true;
        *score += 1;
        events.push(GameEvent::CoinCollected { x: s.coins[i].pos.x, y: s.coins[i].pos.y });
    }
}

/// Advance every bullet and apply its impacts. Platforms, spiders and
/// coins are all tested every tick (no short-circuit); any hit removes
/// the bullet, but only spider and coin hits score.
fn resolve_bullets(s: &mut Session, score: &mut u32, events: &mut Vec<GameEvent>) {
    for bi in 0..s.bullets.len() {
        if !s.bullets[bi].alive {
            continue;
        }
        let vel = s.bullets[bi].vel;
        s.bullets[bi].pos += vel;
        let r = s.bullets[bi].rect();

        let wall_hit = overlaps_any(&r, &s.platforms);
        let spider_hits = hits(&r, &s.spiders, |sp| sp.alive.then(|| sp.rect()));
        let coin_hits = hits(&r, &s.coins, |c| (!c.collected).then(|| c.rect()));

        if wall_hit || !spider_hits.is_empty() || !coin_hits.is_empty() {
            s.bullets[bi].alive = false;
        }

        for i in spider_hits {
            s.spiders[i].alive = false;
            *score += 1;
            events.push(GameEvent::SpiderKilled { x: s.spiders[i].pos.x, y: s.spiders[i].pos.y });
        }
        for i in coin_hits {
            s.coins[i].collected = true;
            *score += 1;
            events.push(GameEvent::CoinCollected { x: s.coins[i].pos.x, y: s.coins[i].pos.y });
        }

        if r.outside(&s.bounds) {
            s.bullets[bi].alive = false;
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Removal & evaluation
// ══════════════════════════════════════════════════════════════

/// The single removal point: everything marked dead this tick leaves
/// its collection here, before the end-of-tick evaluation.
fn compact(s: &mut Session) {
    s.spiders.retain(|sp| sp.alive);
    s.coins.retain(|c| !c.collected);
    s.bullets.retain(|b| b.alive);
}

fn evaluate(s: &mut Session, events: &mut Vec<GameEvent>) -> Outcome {
    let pr = s.player.rect();

    if pr.outside(&s.bounds) {
        s.player.alive = false;
        events.push(GameEvent::PlayerKilled);
        return Outcome::Died;
    }
    if s.spiders.iter().any(|sp| pr.overlaps(&sp.rect())) {
        s.player.alive = false;
        events.push(GameEvent::PlayerKilled);
        return Outcome::Died;
    }
    if s.spiders.is_empty() && s.coins.is_empty() {
        events.push(GameEvent::LevelCleared);
        return Outcome::Cleared;
    }
    Outcome::Continue
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::sim::level::{self, TILE};
    use crate::sim::world::Session;
    use glam::Vec2;
    use rand::{RngCore, SeedableRng};
    use rand_pcg::Pcg32;

    /// An RNG pinned at the top of its range: spiders never re-aim, so
    /// tests stay deterministic without fixing a seed per scenario.
    struct MaxRng;

    impl RngCore for MaxRng {
        fn next_u32(&mut self) -> u32 { u32::MAX }
        fn next_u64(&mut self) -> u64 { u64::MAX }
        fn fill_bytes(&mut self, dest: &mut [u8]) { dest.fill(0xff) }
    }

    fn session(rows: &[&str]) -> Session {
        Session::new(1, level::data_from(rows), &GameConfig::default())
    }

    fn tuning() -> Tuning {
        Tuning::default()
    }

    fn idle() -> FrameInput {
        FrameInput::default()
    }

    fn run(s: &mut Session, score: &mut u32, input: FrameInput) -> (Vec<GameEvent>, Outcome) {
        step(s, score, input, &tuning(), &mut MaxRng)
    }

    /// Step with no input until the player reports grounded.
    fn settle(s: &mut Session, score: &mut u32) {
        for _ in 0..100 {
            run(s, score, idle());
            if s.player.grounded {
                return;
            }
        }
        panic!("player never landed");
    }

    // ── Jump latch ──

    #[test]
    fn held_jump_fires_exactly_once_until_released() {
        // Tall map: the full jump arc must stay inside the playfield.
        let mut s = session(&[
            "           ",
            "           ",
            "           ",
            "P    $    E",
            "###########",
        ]);
        let mut score = 0;
        settle(&mut s, &mut score);

        let up = FrameInput { up: true, ..idle() };
        let mut jumps = 0;
        // Hold up through a full jump arc and well past landing.
        for _ in 0..120 {
            let (events, _) = run(&mut s, &mut score, up);
            jumps += events.iter().filter(|e| matches!(e, GameEvent::Jumped)).count();
        }
        assert_eq!(jumps, 1);
        assert!(s.player.grounded, "arc should have ended on the ground");

        // Release for one tick, then hold again: second jump allowed.
        run(&mut s, &mut score, idle());
        let (events, _) = run(&mut s, &mut score, up);
        assert!(events.iter().any(|e| matches!(e, GameEvent::Jumped)));
    }

    #[test]
    fn airborne_player_cannot_jump() {
        let mut s = session(&[
            "P    $    E",
            "           ",
            "###########",
        ]);
        let mut score = 0;
        // First tick: still falling, not grounded.
        let (events, _) = run(&mut s, &mut score, FrameInput { up: true, ..idle() });
        assert!(!events.iter().any(|e| matches!(e, GameEvent::Jumped)));
    }

    // ── Bullets ──

    #[test]
    fn wall_hit_removes_bullet_without_scoring() {
        let mut s = session(&[
            "P    $    E",
            "###########",
        ]);
        let mut score = 3;
        s.bullets.push(Bullet::new(Vec2::new(100.0, 58.0), Vec2::new(0.0, 7.0)));
        run(&mut s, &mut score, idle());
        assert!(s.bullets.is_empty());
        assert_eq!(score, 3);
    }

    #[test]
    fn spider_hit_scores_one_and_removes_both() {
        let mut s = session(&[
            "P    $    E",
            "###########",
        ]);
        let mut score = 0;
        let target = s.spiders[0].pos;
        s.bullets.push(Bullet::new(target - Vec2::new(8.0, 0.0), Vec2::new(7.0, 0.0)));
        let (events, _) = run(&mut s, &mut score, idle());
        assert_eq!(score, 1);
        assert!(s.spiders.is_empty());
        assert!(s.bullets.is_empty());
        assert!(events.iter().any(|e| matches!(e, GameEvent::SpiderKilled { .. })));
    }

    #[test]
    fn coin_hit_scores_one_and_removes_both() {
        let mut s = session(&[
            "P    $    E",
            "###########",
        ]);
        let mut score = 0;
        let target = s.coins[0].pos;
        s.bullets.push(Bullet::new(target - Vec2::new(8.0, 0.0), Vec2::new(7.0, 0.0)));
        run(&mut s, &mut score, idle());
        assert_eq!(score, 1);
        assert!(s.coins.is_empty());
        assert!(s.bullets.is_empty());
    }

    #[test]
    fn bullet_leaving_bounds_is_pruned() {
        let mut s = session(&[
            "P    $    E",
            "###########",
        ]);
        let mut score = 0;
        s.bullets.push(Bullet::new(Vec2::new(4.0, 16.0), Vec2::new(-40.0, 0.0)));
        run(&mut s, &mut score, idle());
        assert!(s.bullets.is_empty());
        assert_eq!(score, 0);
    }

    #[test]
    fn fire_input_spawns_bullet_toward_target() {
        let mut s = session(&[
            "P    $    E",
            "###########",
        ]);
        let mut score = 0;
        let target = Vec2::new(s.player.pos.x + 100.0, s.player.pos.y);
        let (events, _) = run(&mut s, &mut score, FrameInput { fire: Some(target), ..idle() });
        assert!(events.iter().any(|e| matches!(e, GameEvent::ShotFired)));
        assert_eq!(s.bullets.len(), 1);
        assert!(s.bullets[0].vel.x > 0.0);
        assert_eq!(s.bullets[0].vel.length(), tuning().bullet_speed);
    }

    // ── Pickups ──

    #[test]
    fn walking_over_a_coin_collects_it() {
        let mut s = session(&[
            "P $       E",
            "###########",
        ]);
        let mut score = 0;
        settle(&mut s, &mut score);
        let right = FrameInput { right: true, ..idle() };
        for _ in 0..60 {
            run(&mut s, &mut score, right);
            if s.coins.is_empty() {
                break;
            }
        }
        assert!(s.coins.is_empty());
        assert_eq!(score, 1);
    }

    // ── Hazards & outcome order ──

    #[test]
    fn exiting_left_edge_dies_same_tick_even_with_level_clear_pending() {
        // No spiders, no coins: the clear condition holds, but death is
        // evaluated first.
        let mut s = session(&[
            "P          ",
            "###########",
        ]);
        s.player.pos = Vec2::new(-60.0, 16.0);
        let mut score = 0;
        let (events, outcome) = run(&mut s, &mut score, idle());
        assert_eq!(outcome, Outcome::Died);
        assert!(!s.player.alive);
        assert!(events.iter().any(|e| matches!(e, GameEvent::PlayerKilled)));
        assert!(!events.iter().any(|e| matches!(e, GameEvent::LevelCleared)));
    }

    #[test]
    fn touching_a_spider_is_death() {
        let mut s = session(&[
            "P         E",
            "###########",
        ]);
        let mut score = 0;
        s.spiders[0].pos = s.player.pos;
        let (_, outcome) = run(&mut s, &mut score, idle());
        assert_eq!(outcome, Outcome::Died);
    }

    #[test]
    fn spider_killed_by_its_own_water_is_not_lethal_that_tick() {
        // Spider and player share a cell, but the spider is over water:
        // it drowns and is compacted before the contact check.
        let mut s = session(&[
            "P          ",
            "   ~~~     ",
            "###########",
        ]);
        let mut score = 0;
        s.spiders.push(crate::domain::entity::Spider::new(Vec2::new(112.0, 48.0)));
        s.player.pos = Vec2::new(112.0, 48.0);
        let (events, outcome) = run(&mut s, &mut score, idle());
        assert!(events.iter().any(|e| matches!(e, GameEvent::SpiderDrowned { .. })));
        assert_ne!(outcome, Outcome::Died);
    }

    #[test]
    fn spider_exiting_bounds_is_removed() {
        let mut s = session(&[
            "P       $ E",
            "###########",
        ]);
        let mut score = 0;
        s.spiders[0].pos = Vec2::new(-100.0, 16.0);
        run(&mut s, &mut score, idle());
        assert!(s.spiders.is_empty());
        assert_eq!(score, 0);
    }

    // ── Clear scenario ──

    #[test]
    fn killing_the_last_spider_clears_with_carried_score() {
        let mut s = session(&[
            "P         E",
            "###########",
        ]);
        let mut score = 5;
        let target = s.spiders[0].pos;
        s.bullets.push(Bullet::new(target - Vec2::new(8.0, 0.0), Vec2::new(7.0, 0.0)));
        let (events, outcome) = run(&mut s, &mut score, idle());
        assert_eq!(score, 6);
        assert_eq!(outcome, Outcome::Cleared);
        assert!(events.iter().any(|e| matches!(e, GameEvent::LevelCleared)));
    }

    // ── Water modifiers ──

    #[test]
    fn water_constants_apply_only_while_overlapping() {
        let mut s = session(&[
            "P          ",
            "     ~~~   ",
            "###########",
        ]);
        let mut score = 0;
        let t = tuning();

        s.player.pos = Vec2::new(6.0 * TILE, 1.5 * TILE);
        run(&mut s, &mut score, idle());
        assert_eq!(s.modifiers.move_speed, t.water_move_speed);
        assert_eq!(s.modifiers.jump_speed, t.water_jump_speed);
        assert_eq!(s.modifiers.bullet_speed, t.water_bullet_speed);
        assert_eq!(s.modifiers.gravity, t.gravity / 5.0);

        // Teleport clear of the pool: next tick reverts with no residue.
        s.player.pos = Vec2::new(1.0 * TILE, 0.5 * TILE);
        s.player.vel = Vec2::ZERO;
        run(&mut s, &mut score, idle());
        assert_eq!(s.modifiers.move_speed, t.move_speed);
        assert_eq!(s.modifiers.jump_speed, t.jump_speed);
        assert_eq!(s.modifiers.bullet_speed, t.bullet_speed);
        assert_eq!(s.modifiers.gravity, t.gravity);
    }

    #[test]
    fn submerged_shot_uses_water_bullet_speed() {
        let mut s = session(&[
            "P          ",
            "     ~~~   ",
            "###########",
        ]);
        let mut score = 0;
        s.player.pos = Vec2::new(6.0 * TILE, 1.5 * TILE);
        let target = s.player.pos + Vec2::new(100.0, 0.0);
        run(&mut s, &mut score, FrameInput { fire: Some(target), ..idle() });
        assert_eq!(s.bullets[0].vel.length(), tuning().water_bullet_speed);
    }

    // ── Determinism ──

    #[test]
    fn same_seed_same_world() {
        let play = |seed: u64| {
            let mut s = session(&[
                "P        E ",
                "     $     ",
                "###########",
            ]);
            let mut score = 0;
            let mut rng = Pcg32::seed_from_u64(seed);
            for _ in 0..300 {
                step(&mut s, &mut score, idle(), &tuning(), &mut rng);
            }
            (s.player.pos, s.spiders.len(), score)
        };
        assert_eq!(play(99), play(99));
    }
}
