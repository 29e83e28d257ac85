//! Small vector type and the easing curves used by the intro and cycle stages

use std::ops::{Add, Mul, Sub};

/// Point or direction in globe space (y is up)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };
    pub const UP: Vec3 = Vec3 { x: 0.0, y: 1.0, z: 0.0 };

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn dot(self, other: Vec3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Vec3) -> Vec3 {
        Vec3::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    pub fn length_squared(self) -> f64 {
        self.dot(self)
    }

    pub fn length(self) -> f64 {
        self.length_squared().sqrt()
    }

    pub fn distance(self, other: Vec3) -> f64 {
        (self - other).length()
    }

    /// Unit vector in the same direction; zero stays zero
    pub fn normalized(self) -> Vec3 {
        let len = self.length();
        if len > 0.0 {
            self * (1.0 / len)
        } else {
            self
        }
    }

    pub fn lerp(self, other: Vec3, t: f64) -> Vec3 {
        self + (other - self) * t
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Vec3;
    fn mul(self, rhs: f64) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

// Easing curves, t in 0..=1

pub fn ease_in_out_cubic(t: f64) -> f64 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        (t - 1.0) * (2.0 * t - 2.0) * (2.0 * t - 2.0) + 1.0
    }
}

pub fn ease_out_cubic(t: f64) -> f64 {
    let t = t - 1.0;
    t * t * t + 1.0
}

pub fn ease_in_out_quad(t: f64) -> f64 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        -1.0 + (4.0 - 2.0 * t) * t
    }
}

/// Frame-counted stage progress. Runs while `current <= total`, so a stage
/// of `total` frames takes `total + 1` ticks and ends on exactly 1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameCounter {
    pub current: u32,
    pub total: u32,
}

impl FrameCounter {
    pub fn new(total: u32) -> Self {
        Self { current: 0, total }
    }

    pub fn progress(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            (self.current as f64 / self.total as f64).min(1.0)
        }
    }

    pub fn is_running(&self) -> bool {
        self.current <= self.total
    }

    /// True once `current` has reached `fraction` of `total`
    pub fn reached(&self, fraction: f64) -> bool {
        self.current as f64 >= self.total as f64 * fraction
    }

    pub fn advance(&mut self) {
        self.current = self.current.saturating_add(1);
    }

    pub fn reset(&mut self) {
        self.current = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn easing_endpoints() {
        for ease in [ease_in_out_cubic, ease_out_cubic, ease_in_out_quad] {
            assert!(ease(0.0).abs() < 1e-12);
            assert!((ease(1.0) - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn easing_midpoints() {
        assert!((ease_in_out_cubic(0.5) - 0.5).abs() < 1e-12);
        assert!((ease_in_out_quad(0.5) - 0.5).abs() < 1e-12);
        assert!((ease_out_cubic(0.5) - 0.875).abs() < 1e-12);
    }

    #[test]
    fn cross_product_is_orthogonal() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(-2.0, 0.5, 4.0);
        let c = a.cross(b);
        assert!(c.dot(a).abs() < 1e-12);
        assert!(c.dot(b).abs() < 1e-12);
    }

    #[test]
    fn frame_counter_runs_inclusive() {
        let mut counter = FrameCounter::new(3);
        let mut ticks = 0;
        while counter.is_running() {
            counter.advance();
            ticks += 1;
        }
        assert_eq!(ticks, 4);
        assert_eq!(counter.progress(), 1.0);
    }

    #[test]
    fn frame_counter_reached_fraction() {
        let mut counter = FrameCounter::new(170);
        counter.current = 118;
        assert!(!counter.reached(0.7));
        counter.current = 119;
        assert!(counter.reached(0.7));
    }
}
