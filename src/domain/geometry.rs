/// Axis-aligned geometry and broad-phase collision queries.
///
/// World space is y-down (row 0 at the top, like the renderer), so a
/// rect's `top()` is its smallest y. Platforms and zones are plain
/// `Rect` collections; queries are naive all-pairs scans — collections
/// stay in the tens of rects, so an index would buy nothing.

use glam::Vec2;

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Rect { x, y, w, h }
    }

    /// Rect of the given size centered on `center`.
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        Rect {
            x: center.x - size.x / 2.0,
            y: center.y - size.y / 2.0,
            w: size.x,
            h: size.y,
        }
    }

    pub fn left(&self) -> f32 { self.x }
    pub fn right(&self) -> f32 { self.x + self.w }
    pub fn top(&self) -> f32 { self.y }
    pub fn bottom(&self) -> f32 { self.y + self.h }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Open-interval overlap: rects that merely share an edge do not
    /// overlap, so an actor resting exactly on a platform top is not
    /// re-resolved every tick.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    /// Push-out vector that moves `self` out of `other` along the axis
    /// of least penetration. None when the rects do not overlap.
    pub fn penetration(&self, other: &Rect) -> Option<Vec2> {
        if !self.overlaps(other) {
            return None;
        }
        let push_left = self.right() - other.left();
        let push_right = other.right() - self.left();
        let push_up = self.bottom() - other.top();
        let push_down = other.bottom() - self.top();

        let dx = if push_left < push_right { -push_left } else { push_right };
        let dy = if push_up < push_down { -push_up } else { push_down };

        if dx.abs() < dy.abs() {
            Some(Vec2::new(dx, 0.0))
        } else {
            Some(Vec2::new(0.0, dy))
        }
    }

    /// Has this rect fully exited `bounds` past any side?
    pub fn outside(&self, bounds: &Rect) -> bool {
        self.right() < bounds.left()
            || self.left() > bounds.right()
            || self.bottom() < bounds.top()
            || self.top() > bounds.bottom()
    }
}

/// Does `rect` overlap any member of `rects`?
pub fn overlaps_any(rect: &Rect, rects: &[Rect]) -> bool {
    rects.iter().any(|r| rect.overlaps(r))
}

/// Indices of collection members whose boxes overlap `rect`.
///
/// `rect_of` returns None for members that are already marked removed
/// this tick; those are never reported, so a removed entity is not
/// consulted by any later pass in the same tick.
pub fn hits<T>(rect: &Rect, items: &[T], rect_of: impl Fn(&T) -> Option<Rect>) -> Vec<usize> {
    items
        .iter()
        .enumerate()
        .filter(|(_, item)| rect_of(item).is_some_and(|r| rect.overlaps(&r)))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlap_basic() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        let c = Rect::new(20.0, 0.0, 5.0, 5.0);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn edge_contact_is_not_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        let below = Rect::new(0.0, 10.0, 10.0, 10.0);
        assert!(!a.overlaps(&b));
        assert!(!a.overlaps(&below));
    }

    #[test]
    fn penetration_pushes_up_from_shallow_top_overlap() {
        // Actor sunk 2 units into a platform top: least axis is vertical, up.
        let actor = Rect::new(10.0, 90.0, 10.0, 12.0);
        let platform = Rect::new(0.0, 100.0, 100.0, 20.0);
        let push = actor.penetration(&platform).unwrap();
        assert_eq!(push, Vec2::new(0.0, -2.0));
    }

    #[test]
    fn penetration_pushes_sideways_from_wall() {
        let actor = Rect::new(97.0, 10.0, 10.0, 10.0);
        let wall = Rect::new(100.0, 0.0, 20.0, 100.0);
        let push = actor.penetration(&wall).unwrap();
        assert_eq!(push, Vec2::new(-7.0, 0.0));
    }

    #[test]
    fn penetration_none_when_apart() {
        let a = Rect::new(0.0, 0.0, 5.0, 5.0);
        let b = Rect::new(50.0, 50.0, 5.0, 5.0);
        assert!(a.penetration(&b).is_none());
    }

    #[test]
    fn outside_requires_full_exit() {
        let bounds = Rect::new(0.0, 0.0, 100.0, 100.0);
        let straddling = Rect::new(-5.0, 10.0, 10.0, 10.0);
        let gone_left = Rect::new(-20.0, 10.0, 10.0, 10.0);
        let gone_below = Rect::new(10.0, 120.0, 10.0, 10.0);
        assert!(!straddling.outside(&bounds));
        assert!(gone_left.outside(&bounds));
        assert!(gone_below.outside(&bounds));
    }

    #[test]
    fn hits_skips_removed_members() {
        struct Item {
            rect: Rect,
            dead: bool,
        }
        let probe = Rect::new(0.0, 0.0, 10.0, 10.0);
        let items = vec![
            Item { rect: Rect::new(5.0, 5.0, 4.0, 4.0), dead: false },
            Item { rect: Rect::new(6.0, 6.0, 4.0, 4.0), dead: true },
            Item { rect: Rect::new(50.0, 50.0, 4.0, 4.0), dead: false },
        ];
        let found = hits(&probe, &items, |i| (!i.dead).then_some(i.rect));
        assert_eq!(found, vec![0]);
    }

    #[test]
    fn hits_on_empty_collection_is_empty() {
        let probe = Rect::new(0.0, 0.0, 10.0, 10.0);
        let none: Vec<Rect> = vec![];
        assert!(hits(&probe, &none, |r| Some(*r)).is_empty());
    }
}
