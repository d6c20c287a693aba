use crate::tables::realmod;

/// Camera pose owned by the host and handed to the renderer each frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub x: f64,     // world units
    pub y: f64,     // world units
    pub angle: i32, // degrees, kept in (-180, 180]
}

impl CameraPose {
    pub fn new(x: f64, y: f64, angle: i32) -> Self {
        Self {
            x,
            y,
            angle: wrap_angle(angle),
        }
    }

    /// Rotates by `degrees`, keeping the angle in (-180, 180].
    pub fn turn(&mut self, degrees: i32) {
        self.angle = wrap_angle(self.angle + degrees);
    }

    /// Moves `distance` units along the facing direction (negative walks
    /// backwards) and clamps into [1, extent - 1] on both axes.
    pub fn advance(&mut self, distance: f64, extent: f64) {
        let rad = (self.angle as f64).to_radians();
        self.x = clamp_axis(self.x + distance * rad.cos(), extent);
        self.y = clamp_axis(self.y + distance * rad.sin(), extent);
    }

    /// True when the pose lies strictly inside (0, extent) on both axes.
    #[inline]
    pub fn is_inside(&self, extent: f64) -> bool {
        self.x > 0.0 && self.x < extent && self.y > 0.0 && self.y < extent
    }
}

#[inline]
fn wrap_angle(angle: i32) -> i32 {
    let a = realmod(angle, 360);
    if a > 180 { a - 360 } else { a }
}

#[inline]
fn clamp_axis(v: f64, extent: f64) -> f64 {
    if v <= 0.0 {
        1.0
    } else if v >= extent {
        extent - 1.0
    } else {
        v
    }
}
