use log::debug;

/// Trig values this close to zero are stored as exact zero so axis-parallel
/// rays are recognised by the march.
const SNAP_EPSILON: f64 = 1e-12;

pub const DEGREES: usize = 360;

/// Modulo that always lands in [0, y) for positive `y`.
#[inline]
pub fn realmod(x: i32, y: i32) -> i32 {
    ((x % y) + y) % y
}

/// Integer-degree trig lookup plus the per-column angle offsets.
pub struct AngleTables {
    sin: [f64; DEGREES],
    cos: [f64; DEGREES],
    delta_angles: Vec<usize>,
}

impl AngleTables {
    pub fn build(viewport_width: usize, fov_degrees: f64) -> Self {
        let mut sin = [0.0; DEGREES];
        let mut cos = [0.0; DEGREES];
        for a in 0..DEGREES {
            let rad = std::f64::consts::PI * a as f64 / 180.0;
            sin[a] = snap(rad.sin());
            cos[a] = snap(rad.cos());
        }

        // tan(fov / 2)
        let fov_tan = (fov_degrees.to_radians() * 0.5).tan();
        let width = viewport_width as f64;
        let delta_angles = (0..viewport_width)
            .map(|x| {
                let delta = (fov_tan * (1.0 - 2.0 * x as f64 / width)).atan();
                realmod(delta.to_degrees().round() as i32, DEGREES as i32) as usize
            })
            .collect::<Vec<_>>();

        debug!(
            "built angle tables for {} columns, fov {}",
            viewport_width, fov_degrees
        );

        Self {
            sin,
            cos,
            delta_angles,
        }
    }

    #[inline]
    pub fn sin(&self, angle: usize) -> f64 {
        self.sin[angle]
    }

    #[inline]
    pub fn cos(&self, angle: usize) -> f64 {
        self.cos[angle]
    }

    /// Angle of column `x` relative to the view centre line, in [0, 360).
    /// `None` past the last column.
    #[inline]
    pub fn delta_angle(&self, x: usize) -> Option<usize> {
        self.delta_angles.get(x).copied()
    }

    /// Number of columns the tables were built for.
    #[inline]
    pub fn width(&self) -> usize {
        self.delta_angles.len()
    }

    /// Absolute ray angle for column `x` when the camera faces `facing`.
    #[inline]
    pub fn ray_angle(&self, facing: i32, x: usize) -> Option<usize> {
        let delta = self.delta_angle(x)? as i32;
        Some(realmod(facing + delta, DEGREES as i32) as usize)
    }
}

#[inline]
fn snap(v: f64) -> f64 {
    if v.abs() < SNAP_EPSILON { 0.0 } else { v }
}
