use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Mul, Sub};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point<T> {
    pub x: T,
    pub y: T,
}

impl<T> Point<T> {
    pub fn new(x: T, y: T) -> Self {
        Self { x, y }
    }
}

impl<T: Add<Output = T>> Add for Point<T> {
    type Output = Point<T>;
    fn add(self, rhs: Point<T>) -> Point<T> {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl<T: Sub<Output = T>> Sub for Point<T> {
    type Output = Point<T>;
    fn sub(self, rhs: Point<T>) -> Point<T> {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl<T: Add<Output = T> + Copy> AddAssign for Point<T> {
    fn add_assign(&mut self, rhs: Point<T>) {
        self.x = self.x + rhs.x;
        self.y = self.y + rhs.y;
    }
}

impl<T: Mul<Output = T> + Copy> Mul<T> for Point<T> {
    type Output = Point<T>;
    fn mul(self, rhs: T) -> Point<T> {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

impl Point<f64> {
    pub fn dist(&self, other: Point<f64>) -> f64 {
        self.dist_sq(other).sqrt()
    }

    pub fn dist_sq(&self, other: Point<f64>) -> f64 {
        (self.x - other.x).powi(2) + (self.y - other.y).powi(2)
    }

    pub fn norm(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn dot(&self, other: Point<f64>) -> f64 {
        self.x * other.x + self.y * other.y
    }

    pub fn cross(&self, other: Point<f64>) -> f64 {
        self.x * other.y - self.y * other.x
    }

    // Zero vector for a degenerate input.
    pub fn normalized(&self) -> Point<f64> {
        let n = self.norm();
        if n <= f64::EPSILON {
            Point::new(0.0, 0.0)
        } else {
            Point::new(self.x / n, self.y / n)
        }
    }

    pub fn angle(&self) -> f64 {
        self.y.atan2(self.x)
    }
}
