/// Platformer physics — single source of truth for actor motion.
///
/// One `advance` call per actor per tick:
///   1. Vertical velocity: ladder climb (direct from input) or gravity.
///   2. Integrate position by velocity.
///   3. Resolve penetration against each overlapping platform along the
///      axis of least penetration, zeroing the pushed velocity
///      component. An upward push (landing from above) sets `grounded`.
///
/// Gravity arrives pre-modulated by the caller (full gravity normally,
/// reduced while the actor is submerged). `climb` is Some exactly when
/// vertical input is active; only then does a ladder zone override
/// gravity. On a ladder with no vertical input the actor slides under
/// gravity like anywhere else.
///
/// Jump legality is not decided here: the velocity-resolution step
/// checks `grounded` plus the jump latch before writing the impulse.

use glam::Vec2;

use super::geometry::{overlaps_any, Rect};

/// What the actor ended the tick touching.
#[derive(Clone, Copy, Debug, Default)]
pub struct Contact {
    pub grounded: bool,
    pub on_ladder: bool,
}

pub fn advance(
    pos: &mut Vec2,
    vel: &mut Vec2,
    size: Vec2,
    platforms: &[Rect],
    gravity: f32,
    ladders: &[Rect],
    climb: Option<f32>,
) -> Contact {
    let mut on_ladder = false;
    match climb {
        Some(v) if overlaps_any(&Rect::from_center(*pos, size), ladders) => {
            vel.y = v;
            on_ladder = true;
        }
        _ => vel.y += gravity,
    }

    *pos += *vel;

    let mut grounded = false;
    for platform in platforms {
        let body = Rect::from_center(*pos, size);
        if let Some(push) = body.penetration(platform) {
            *pos += push;
            if push.x != 0.0 {
                vel.x = 0.0;
            }
            if push.y != 0.0 {
                if push.y < 0.0 {
                    grounded = true;
                }
                vel.y = 0.0;
            }
        }
    }

    Contact { grounded, on_ladder }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIZE: Vec2 = Vec2::new(20.0, 20.0);

    fn floor() -> Vec<Rect> {
        vec![Rect::new(0.0, 100.0, 1000.0, 32.0)]
    }

    #[test]
    fn falling_actor_lands_with_zero_velocity() {
        // Holds for any gravity magnitude, including zero with initial speed.
        for gravity in [0.25_f32, 1.0, 2.5, 10.0] {
            let mut pos = Vec2::new(50.0, 40.0);
            let mut vel = Vec2::ZERO;
            let mut landed = false;
            for _ in 0..200 {
                let c = advance(&mut pos, &mut vel, SIZE, &floor(), gravity, &[], None);
                if c.grounded {
                    assert_eq!(vel.y, 0.0);
                    // Resting flush on the platform top.
                    assert_eq!(Rect::from_center(pos, SIZE).bottom(), 100.0);
                    landed = true;
                    break;
                }
            }
            assert!(landed, "never landed at gravity {gravity}");
        }
    }

    #[test]
    fn grounded_every_tick_while_resting() {
        let mut pos = Vec2::new(50.0, 90.0);
        let mut vel = Vec2::ZERO;
        advance(&mut pos, &mut vel, SIZE, &floor(), 1.0, &[], None);
        for _ in 0..5 {
            let c = advance(&mut pos, &mut vel, SIZE, &floor(), 1.0, &[], None);
            assert!(c.grounded);
            assert_eq!(vel.y, 0.0);
        }
    }

    #[test]
    fn wall_contact_zeroes_horizontal_velocity() {
        let wall = vec![Rect::new(100.0, 0.0, 32.0, 200.0)];
        let mut pos = Vec2::new(85.0, 50.0);
        let mut vel = Vec2::new(8.0, 0.0);
        advance(&mut pos, &mut vel, SIZE, &wall, 0.0, &[], None);
        assert_eq!(vel.x, 0.0);
        assert_eq!(Rect::from_center(pos, SIZE).right(), 100.0);
    }

    #[test]
    fn ladder_climb_overrides_gravity() {
        let ladder = vec![Rect::new(40.0, 0.0, 32.0, 200.0)];
        let mut pos = Vec2::new(56.0, 100.0);
        let mut vel = Vec2::ZERO;
        let c = advance(&mut pos, &mut vel, SIZE, &[], 1.0, &ladder, Some(-2.0));
        assert!(c.on_ladder);
        assert_eq!(vel.y, -2.0);
        assert_eq!(pos.y, 98.0);
    }

    #[test]
    fn climb_input_without_ladder_falls_normally() {
        let mut pos = Vec2::new(56.0, 100.0);
        let mut vel = Vec2::ZERO;
        let c = advance(&mut pos, &mut vel, SIZE, &[], 1.0, &[], Some(-2.0));
        assert!(!c.on_ladder);
        assert_eq!(vel.y, 1.0);
    }

    #[test]
    fn ladder_without_input_still_applies_gravity() {
        let ladder = vec![Rect::new(40.0, 0.0, 32.0, 200.0)];
        let mut pos = Vec2::new(56.0, 100.0);
        let mut vel = Vec2::ZERO;
        let c = advance(&mut pos, &mut vel, SIZE, &[], 1.0, &ladder, None);
        assert!(!c.on_ladder);
        assert_eq!(vel.y, 1.0);
    }

    #[test]
    fn empty_collections_are_total() {
        let mut pos = Vec2::new(0.0, 0.0);
        let mut vel = Vec2::ZERO;
        let c = advance(&mut pos, &mut vel, SIZE, &[], 0.0, &[], None);
        assert!(!c.grounded);
        assert!(!c.on_ladder);
        assert_eq!(pos, Vec2::ZERO);
    }
}
