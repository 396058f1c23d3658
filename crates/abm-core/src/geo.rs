//! Planar location type.
//!
//! A `Location` is a point on a numbered floor.  Coordinates are in metres in
//! the floor's local frame; distances are only meaningful between two points
//! on the same floor.

/// An immutable `(x, y, floor)` position.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Location {
    pub x: f64,
    pub y: f64,
    pub floor: i32,
}

impl Location {
    #[inline]
    pub fn new(x: f64, y: f64, floor: i32) -> Self {
        Self { x, y, floor }
    }

    /// Straight-line distance in metres, or `None` when the two points are
    /// on different floors.
    pub fn distance_to(self, other: Location) -> Option<f64> {
        if self.floor != other.floor {
            return None;
        }
        Some(self.planar_distance(other))
    }

    /// Straight-line distance ignoring the floor component.
    #[inline]
    pub fn planar_distance(self, other: Location) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Point a fraction `t ∈ [0, 1]` of the way from `self` to `other`.
    ///
    /// Across floors there is no meaningful intermediate point, so `self` is
    /// returned until `t` reaches 1.
    pub fn lerp(self, other: Location, t: f64) -> Location {
        let t = t.clamp(0.0, 1.0);
        if self.floor != other.floor {
            return if t >= 1.0 { other } else { self };
        }
        Location {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
            floor: self.floor,
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.2}, {:.2}, floor {})", self.x, self.y, self.floor)
    }
}
