/// Environment modifier: the active speed/jump/bullet/gravity constants
/// for the current tick.
///
/// A pure function of the player's water overlap, recomputed every tick
/// and stored on the session — never process-wide state, so parallel
/// sessions (tests) cannot interfere. No hysteresis: the tick the
/// player leaves water, every constant is back to its surfaced value.

use crate::config::Tuning;

use super::geometry::{overlaps_any, Rect};

/// Gravity divisor while submerged.
const WATER_GRAVITY_DIV: f32 = 5.0;

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Modifiers {
    pub move_speed: f32,
    pub jump_speed: f32,
    pub bullet_speed: f32,
    pub gravity: f32,
}

impl Modifiers {
    pub fn surfaced(t: &Tuning) -> Self {
        Modifiers {
            move_speed: t.move_speed,
            jump_speed: t.jump_speed,
            bullet_speed: t.bullet_speed,
            gravity: t.gravity,
        }
    }

    pub fn submerged(t: &Tuning) -> Self {
        Modifiers {
            move_speed: t.water_move_speed,
            jump_speed: t.water_jump_speed,
            bullet_speed: t.water_bullet_speed,
            gravity: t.gravity / WATER_GRAVITY_DIV,
        }
    }

    pub fn resolve(body: &Rect, water: &[Rect], t: &Tuning) -> Self {
        if overlaps_any(body, water) {
            Self::submerged(t)
        } else {
            Self::surfaced(t)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool() -> Vec<Rect> {
        vec![Rect::new(100.0, 100.0, 64.0, 64.0)]
    }

    #[test]
    fn overlapping_water_selects_water_constants() {
        let t = Tuning::default();
        let m = Modifiers::resolve(&Rect::new(110.0, 110.0, 20.0, 30.0), &pool(), &t);
        assert_eq!(m.move_speed, t.water_move_speed);
        assert_eq!(m.jump_speed, t.water_jump_speed);
        assert_eq!(m.bullet_speed, t.water_bullet_speed);
        assert_eq!(m.gravity, t.gravity / 5.0);
    }

    #[test]
    fn leaving_water_reverts_with_no_residue() {
        let t = Tuning::default();
        let wet = Modifiers::resolve(&Rect::new(110.0, 110.0, 20.0, 30.0), &pool(), &t);
        assert_eq!(wet, Modifiers::submerged(&t));
        // Same inputs, one tick later, now clear of the pool.
        let dry = Modifiers::resolve(&Rect::new(300.0, 110.0, 20.0, 30.0), &pool(), &t);
        assert_eq!(dry, Modifiers::surfaced(&t));
    }

    #[test]
    fn no_water_zones_means_surfaced() {
        let t = Tuning::default();
        let m = Modifiers::resolve(&Rect::new(0.0, 0.0, 20.0, 30.0), &[], &t);
        assert_eq!(m, Modifiers::surfaced(&t));
    }
}
