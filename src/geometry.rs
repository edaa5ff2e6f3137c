use crate::error::Error;
use ordered_float::NotNan;
use std::ops::{Add, Sub};

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub(crate) struct Point {
    x: f32,
    y: f32,
}

impl Point {
    pub(crate) fn new(x: f32, y: f32) -> Result<Self, Error> {
        Ok(Self {
            x: NotNan::new(x)
                .map_err(|e| Error::ConstructNotNan(e, x))?
                .into_inner(),
            y: NotNan::new(y)
                .map_err(|e| Error::ConstructNotNan(e, y))?
                .into_inner(),
        })
    }

    #[inline]
    pub(crate) fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// z component of the 2D cross product.
    #[inline]
    pub(crate) fn cross(self, other: Self) -> f32 {
        self.x * other.y - self.y * other.x
    }

    #[inline]
    pub(crate) fn x(self) -> f32 {
        self.x
    }

    #[inline]
    pub(crate) fn y(self) -> f32 {
        self.y
    }
}

impl Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::Output {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::Output {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

/// An ordered pair of points; direction matters for angle signs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Segment {
    pub(crate) start: Point,
    pub(crate) end: Point,
}

impl Segment {
    pub(crate) fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    #[inline]
    fn direction(self) -> Point {
        self.end - self.start
    }
}

/// Signed angle from segment `a` to segment `b`, in degrees in (-180, 180],
/// truncated toward zero. The fractional part is discarded on purpose: the
/// reference pose tables were recorded with integral degrees.
///
/// Total over all inputs: a zero-length segment yields whatever `atan2`
/// defines for a zero vector (0 or 180).
pub(crate) fn signed_angle_between(a: Segment, b: Segment) -> f32 {
    let da = a.direction();
    let db = b.direction();
    da.cross(db).atan2(da.dot(db)).to_degrees().trunc()
}

/// Shortest angular distance between `a` and `b` on a 360-periodic scale,
/// in [0, 180]. Invariant under shifting either argument by whole turns.
pub(crate) fn circular_error(a: f32, b: f32) -> f32 {
    let diff = (a - b).abs().rem_euclid(360.0);
    if diff > 180.0 {
        360.0 - diff
    } else {
        diff
    }
}
