use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::PhysicsError;

/// Axis-aligned rectangle described by its minimum corner and size (Y-up).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, size: Vec2) -> Self {
        Self { min, size }
    }

    pub fn from_xywh(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::new(Vec2::new(x, y), Vec2::new(width, height))
    }

    pub fn from_min_max(min: Vec2, max: Vec2) -> Self {
        Self::new(min, max - min)
    }

    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        Self::new(center - size * 0.5, size)
    }

    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    pub fn center(&self) -> Vec2 {
        self.min + self.size * 0.5
    }

    pub fn width(&self) -> f32 {
        self.size.x
    }

    pub fn height(&self) -> f32 {
        self.size.y
    }

    pub fn translated(&self, delta: Vec2) -> Self {
        Self::new(self.min + delta, self.size)
    }

    /// Grows every side by `amount`; a negative amount shrinks, never past a zero size.
    pub fn expanded(&self, amount: f32) -> Self {
        let size = (self.size + Vec2::splat(amount * 2.0)).max(Vec2::ZERO);
        Self::from_center_size(self.center(), size)
    }

    pub fn contains_point(&self, point: Vec2) -> bool {
        let max = self.max();
        point.x >= self.min.x && point.x <= max.x && point.y >= self.min.y && point.y <= max.y
    }

    pub fn contains_rect(&self, other: &Rect) -> bool {
        let (max, other_max) = (self.max(), other.max());
        other.min.x >= self.min.x
            && other.min.y >= self.min.y
            && other_max.x <= max.x
            && other_max.y <= max.y
    }

    /// Inclusive overlap test: touching edges count as overlapping.
    pub fn overlaps(&self, other: &Rect) -> bool {
        let (max, other_max) = (self.max(), other.max());
        !(self.min.y > other_max.y
            || max.y < other.min.y
            || max.x < other.min.x
            || self.min.x > other_max.x)
    }

    /// Slab test of the segment `origin + direction * t`, `t in [0, max_distance]`.
    ///
    /// `direction` must be normalized. Returns the entry distance and the face
    /// normal; a segment starting inside the rectangle reports distance 0 and a
    /// zero normal.
    pub fn ray_intersection(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
    ) -> Option<(f32, Vec2)> {
        let min = self.min;
        let max = self.max();
        let mut t_min = 0.0f32;
        let mut t_max = max_distance;
        let mut normal = Vec2::ZERO;

        for i in 0..2 {
            let origin_component = origin[i];
            let dir_component = direction[i];

            if dir_component.abs() < 1e-6 {
                if origin_component < min[i] || origin_component > max[i] {
                    return None;
                }
            } else {
                let inv_dir = 1.0 / dir_component;
                let mut t1 = (min[i] - origin_component) * inv_dir;
                let mut t2 = (max[i] - origin_component) * inv_dir;
                let mut axis_normal = Vec2::ZERO;
                axis_normal[i] = -dir_component.signum();

                if t1 > t2 {
                    std::mem::swap(&mut t1, &mut t2);
                }

                if t1 > t_min {
                    t_min = t1;
                    normal = axis_normal;
                }

                t_max = t_max.min(t2);
                if t_min > t_max {
                    return None;
                }
            }
        }

        Some((t_min, normal))
    }
}

/// Side of a body on which a ray reported a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    pub fn horizontal(positive: bool) -> Self {
        if positive {
            Direction::Right
        } else {
            Direction::Left
        }
    }

    pub fn vertical(positive: bool) -> Self {
        if positive {
            Direction::Up
        } else {
            Direction::Down
        }
    }

    /// `+1` for Right/Up, `-1` for Left/Down.
    pub fn sign(self) -> f32 {
        match self {
            Direction::Right | Direction::Up => 1.0,
            Direction::Left | Direction::Down => -1.0,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }

    pub fn to_vec2(self) -> Vec2 {
        match self {
            Direction::Left => Vec2::NEG_X,
            Direction::Right => Vec2::X,
            Direction::Up => Vec2::Y,
            Direction::Down => Vec2::NEG_Y,
        }
    }
}

impl TryFrom<Vec2> for Direction {
    type Error = PhysicsError;

    fn try_from(vector: Vec2) -> Result<Self, Self::Error> {
        if vector == Vec2::NEG_X {
            Ok(Direction::Left)
        } else if vector == Vec2::X {
            Ok(Direction::Right)
        } else if vector == Vec2::Y {
            Ok(Direction::Up)
        } else if vector == Vec2::NEG_Y {
            Ok(Direction::Down)
        } else {
            Err(PhysicsError::InvalidDirection(vector))
        }
    }
}
