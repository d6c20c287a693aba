use log::{debug, trace, warn};
use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::camera::CameraPose;
use crate::config::RenderConfig;
use crate::error::RenderError;
use crate::framebuffer::PixelBuffer;
use crate::tables::AngleTables;
use crate::texture::TextureSampler;
use crate::world::{GridMap, WallKind};

/// Darkest a wall gets, however far away.
pub const MIN_FADE: f64 = 0.1;

/// Where a single-axis march met a wall.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct AxisHit {
    /// Signed distance along the ray, always growing as the march advances.
    pub(crate) distance: f64,
    /// World coordinate of the crossing on the other axis.
    pub(crate) along: f64,
}

/// Nearest wall on a ray after both marches are resolved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub kind: WallKind,
    pub distance: f64,
    /// Offset into the wall cell, in [0, grid_size).
    pub texture_u: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnHit {
    pub kind: WallKind,
    /// Radial distance, drives the fade.
    pub distance: f64,
    /// Perpendicular distance to the view plane, drives the slice height.
    pub corrected: f64,
    pub texture_u: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub painted: usize,
    pub empty: usize,
}

/// Axis roles for one march. The primary axis is the one whose grid lines
/// the ray crosses; the secondary axis picks the cell along that line.
struct AxisRole {
    kind: WallKind,
    origin_p: f64,
    origin_s: f64,
    dir_p: f64,
    dir_s: f64,
}

impl AxisRole {
    // Lines of constant X, stepped by cos.
    fn vertical(camera: &CameraPose, sin: f64, cos: f64) -> Self {
        Self {
            kind: WallKind::Vertical,
            origin_p: camera.x,
            origin_s: camera.y,
            dir_p: cos,
            dir_s: sin,
        }
    }

    // Lines of constant Y, stepped by sin.
    fn horizontal(camera: &CameraPose, sin: f64, cos: f64) -> Self {
        Self {
            kind: WallKind::Horizontal,
            origin_p: camera.y,
            origin_s: camera.x,
            dir_p: sin,
            dir_s: cos,
        }
    }

    /// (col, row) of the grid entry for line `line` crossed in cell `cross`.
    #[inline]
    fn grid_cell(&self, line: i64, cross: i64) -> (i64, i64) {
        match self.kind {
            WallKind::Vertical => (line, cross),
            WallKind::Horizontal => (cross, line),
        }
    }
}

/// Steps the ray line by line across one axis until it meets a wall or
/// leaves the grid. A ray parallel to the lines never crosses one.
fn march(map: &GridMap, role: &AxisRole) -> Option<AxisHit> {
    if role.dir_p == 0.0 {
        return None;
    }

    let grid = map.grid_size();
    let cell = (role.origin_p / grid).floor() as i64;
    let (mut line, step) = if role.dir_p > 0.0 {
        (cell + 1, 1)
    } else {
        (cell, -1)
    };

    let slope = role.dir_s / role.dir_p;
    let first = line as f64 * grid - role.origin_p;
    let mut along = role.origin_s + first * slope;
    let mut distance = first / role.dir_p;

    let step_along = step as f64 * grid * slope;
    let step_distance = grid / role.dir_p.abs();

    // The line index moves by one each step, so this ends within size + 1 steps.
    loop {
        let cross = (along / grid).floor() as i64;
        let (col, row) = role.grid_cell(line, cross);
        if !map.contains(role.kind, col, row) {
            return None;
        }
        if map.wall_at(role.kind, col, row) {
            return Some(AxisHit { distance, along });
        }
        line += step;
        along += step_along;
        distance += step_distance;
    }
}

/// Picks the nearer wall. The horizontal hit must be strictly nearer to win,
/// so equal distances resolve to the vertical wall.
pub(crate) fn resolve_hit(
    horizontal: Option<AxisHit>,
    vertical: Option<AxisHit>,
    grid_size: f64,
) -> Option<RayHit> {
    let horizontal_wins = match (horizontal, vertical) {
        (Some(h), Some(v)) => h.distance < v.distance,
        (Some(_), None) => true,
        _ => false,
    };

    let (kind, hit) = if horizontal_wins {
        (WallKind::Horizontal, horizontal?)
    } else {
        (WallKind::Vertical, vertical?)
    };

    Some(RayHit {
        kind,
        distance: hit.distance,
        texture_u: hit.along.rem_euclid(grid_size),
    })
}

/// Linear depth fade, never darker than [`MIN_FADE`].
#[inline]
pub fn fade(distance: f64, extent: f64) -> f64 {
    (1.0 - distance / extent).max(MIN_FADE)
}

/// Renderer state built once at startup: trig tables, map and wall texture.
pub struct RayCaster {
    tables: AngleTables,
    map: GridMap,
    texture: TextureSampler,
    viewport_height: usize,
}

impl RayCaster {
    pub fn new(
        config: &RenderConfig,
        map: GridMap,
        texture: TextureSampler,
    ) -> Result<Self, RenderError> {
        config.validate()?;
        let tables = AngleTables::build(config.viewport_width, config.fov_degrees);
        debug!(
            "raycaster ready: {}x{} viewport, {}x{} map, {}x{} texture",
            config.viewport_width,
            config.viewport_height,
            map.size(),
            map.size(),
            texture.width(),
            texture.height()
        );
        Ok(Self {
            tables,
            map,
            texture,
            viewport_height: config.viewport_height,
        })
    }

    #[inline]
    pub fn map(&self) -> &GridMap {
        &self.map
    }

    #[inline]
    pub fn tables(&self) -> &AngleTables {
        &self.tables
    }

    /// Casts one ray at absolute angle `angle` (degrees, [0, 360)).
    pub fn cast_ray(&self, camera: &CameraPose, angle: usize) -> Option<RayHit> {
        let sin = self.tables.sin(angle);
        let cos = self.tables.cos(angle);

        let vertical = march(&self.map, &AxisRole::vertical(camera, sin, cos));
        let horizontal = march(&self.map, &AxisRole::horizontal(camera, sin, cos));

        resolve_hit(horizontal, vertical, self.map.grid_size())
    }

    /// Casts the ray for screen column `x` and applies fisheye correction.
    /// Columns past the viewport width have no ray.
    pub fn cast_column(&self, camera: &CameraPose, x: usize) -> Option<ColumnHit> {
        let angle = self.tables.ray_angle(camera.angle, x)?;
        let relative = self.tables.cos(self.tables.delta_angle(x)?);
        let hit = self.cast_ray(camera, angle)?;
        Some(ColumnHit {
            kind: hit.kind,
            distance: hit.distance,
            corrected: hit.distance * relative,
            texture_u: hit.texture_u,
        })
    }

    /// Draws one frame of wall slices into `buffer`. Pixels outside the
    /// slices keep whatever the caller left there.
    pub fn update(
        &self,
        camera: &CameraPose,
        buffer: &mut PixelBuffer,
    ) -> Result<FrameStats, RenderError> {
        self.check_frame(camera, buffer)?;

        // Columns are independent; cast them in parallel, paint in order.
        let hits: Vec<Option<ColumnHit>> = (0..self.tables.width())
            .into_par_iter()
            .map(|x| self.cast_column(camera, x))
            .collect();

        let mut stats = FrameStats::default();
        for (x, hit) in hits.iter().enumerate() {
            match hit {
                Some(hit) if hit.distance > 0.0 => {
                    self.paint_column(buffer, x, hit);
                    stats.painted += 1;
                }
                _ => stats.empty += 1,
            }
        }

        trace!(
            "frame at ({:.1}, {:.1}) angle {}: {} painted, {} empty",
            camera.x, camera.y, camera.angle, stats.painted, stats.empty
        );
        Ok(stats)
    }

    fn check_frame(&self, camera: &CameraPose, buffer: &PixelBuffer) -> Result<(), RenderError> {
        if buffer.width() != self.tables.width() || buffer.height() != self.viewport_height {
            return Err(RenderError::ViewportMismatch {
                expected_w: self.tables.width(),
                expected_h: self.viewport_height,
                actual_w: buffer.width(),
                actual_h: buffer.height(),
            });
        }
        let extent = self.map.extent();
        if !camera.is_inside(extent) {
            warn!("camera ({}, {}) outside map, frame skipped", camera.x, camera.y);
            return Err(RenderError::CameraOutOfBounds {
                x: camera.x,
                y: camera.y,
                extent,
            });
        }
        Ok(())
    }

    fn paint_column(&self, buffer: &mut PixelBuffer, x: usize, hit: &ColumnHit) {
        let height = buffer.height() as f64;
        let grid = self.map.grid_size();
        let centre = height / 2.0;
        let half = centre * (grid / 2.0) / hit.corrected;
        if !(half.is_finite() && half > 0.0) {
            return;
        }

        let tex_w = self.texture.width() as f64;
        let tex_h = self.texture.height() as f64;
        let tex_x = (tex_w * hit.texture_u / grid).floor() as usize;
        let shade = fade(hit.distance, self.map.extent());

        // Coarse row range; the exact |centre - y| <= half test runs per row.
        let top = (centre - half).floor().max(0.0) as usize;
        let bottom = (centre + half).ceil().min(height - 1.0) as usize;
        let slice_top = (height - 2.0 * half) / 2.0;

        for y in top..=bottom {
            if (centre - y as f64).abs() > half {
                continue;
            }
            let v = (tex_h - 1.0) * (y as f64 - slice_top) / (2.0 * half);
            let texel = self.texture.sample(tex_x, v.floor() as usize);
            buffer.set_pixel(x, y, texel.scale(shade));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framebuffer::Rgba;

    const W: usize = 64;
    const H: usize = 48;

    fn config() -> RenderConfig {
        RenderConfig {
            viewport_width: W,
            viewport_height: H,
            fov_degrees: 90.0,
            ..RenderConfig::default()
        }
    }

    fn caster(map: GridMap, texture: TextureSampler) -> RayCaster {
        RayCaster::new(&config(), map, texture).unwrap()
    }

    fn demo() -> RayCaster {
        caster(GridMap::default(), TextureSampler::solid(16, 16, Rgba::WHITE))
    }

    #[test]
    fn centre_ray_hits_the_wall_ahead() {
        let rc = demo();
        let cam = CameraPose::new(32.0, 32.0, 0);
        let hit = rc.cast_column(&cam, W / 2).unwrap();
        // walls_v[3][0] is the first wall east of the start cell, at x = 192
        assert_eq!(hit.kind, WallKind::Vertical);
        assert_eq!(hit.distance, 160.0);
        assert_eq!(hit.corrected, 160.0);
        assert_eq!(hit.texture_u, 32.0);
    }

    #[test]
    fn ray_parallel_to_x_lines_skips_vertical_march() {
        let rc = demo();
        let cam = CameraPose::new(32.0, 32.0, 90);
        let (sin, cos) = (rc.tables().sin(90), rc.tables().cos(90));

        assert_eq!(march(rc.map(), &AxisRole::vertical(&cam, sin, cos)), None);

        let h = march(rc.map(), &AxisRole::horizontal(&cam, sin, cos)).unwrap();
        assert_eq!(h.distance, 32.0);
        assert_eq!(h.along, 32.0);

        let hit = rc.cast_ray(&cam, 90).unwrap();
        assert_eq!(hit.kind, WallKind::Horizontal);
        assert_eq!(hit.distance, 32.0);
    }

    #[test]
    fn equal_distances_resolve_to_vertical() {
        let h = AxisHit {
            distance: 50.0,
            along: 10.0,
        };
        let v = AxisHit {
            distance: 50.0,
            along: 84.0,
        };
        let hit = resolve_hit(Some(h), Some(v), 64.0).unwrap();
        assert_eq!(hit.kind, WallKind::Vertical);
        assert_eq!(hit.texture_u, 20.0);

        let nearer = AxisHit {
            distance: 49.5,
            ..h
        };
        let hit = resolve_hit(Some(nearer), Some(v), 64.0).unwrap();
        assert_eq!(hit.kind, WallKind::Horizontal);
        assert_eq!(hit.texture_u, 10.0);
    }

    #[test]
    fn missing_hit_never_wins() {
        let near = AxisHit {
            distance: 5.0,
            along: 1.0,
        };
        let far = AxisHit {
            distance: 500.0,
            along: 1.0,
        };
        assert_eq!(resolve_hit(None, None, 64.0), None);
        assert_eq!(
            resolve_hit(Some(far), None, 64.0).map(|h| h.kind),
            Some(WallKind::Horizontal)
        );
        assert_eq!(
            resolve_hit(None, Some(far), 64.0).map(|h| h.kind),
            Some(WallKind::Vertical)
        );
        assert_eq!(
            resolve_hit(Some(far), Some(near), 64.0).map(|h| h.kind),
            Some(WallKind::Vertical)
        );
    }

    #[test]
    fn texture_u_wraps_into_the_cell() {
        let rc = demo();
        let cam = CameraPose::new(32.0, 95.0, 0);
        let hit = rc.cast_column(&cam, W / 2).unwrap();
        // walls_v[1][1], crossed at world Y 95
        assert_eq!(hit.kind, WallKind::Vertical);
        assert_eq!(hit.distance, 32.0);
        assert_eq!(hit.texture_u, 31.0);

        let behind_origin = AxisHit {
            distance: 1.0,
            along: -1.0,
        };
        let hit = resolve_hit(None, Some(behind_origin), 64.0).unwrap();
        assert_eq!(hit.texture_u, 63.0);
    }

    #[test]
    fn open_map_lets_every_ray_escape() {
        let rc = caster(
            GridMap::open(4, 64.0).unwrap(),
            TextureSampler::solid(1, 1, Rgba::WHITE),
        );
        for cam in [
            CameraPose::new(100.0, 150.0, 0),
            CameraPose::new(1.0, 1.0, 0),
            CameraPose::new(64.0, 128.0, 0),
        ] {
            for angle in 0..360 {
                assert_eq!(rc.cast_ray(&cam, angle), None, "angle {angle}");
            }
        }

        let mut buf = PixelBuffer::new(W, H);
        let stats = rc.update(&CameraPose::new(100.0, 150.0, 33), &mut buf).unwrap();
        assert_eq!(stats, FrameStats { painted: 0, empty: W });
        assert!(buf.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn centre_column_needs_no_fisheye_correction() {
        let rc = caster(
            GridMap::enclosed(4, 64.0).unwrap(),
            TextureSampler::solid(1, 1, Rgba::WHITE),
        );
        let cam = CameraPose::new(100.0, 70.0, 37);
        let centre = rc.cast_column(&cam, W / 2).unwrap();
        assert_eq!(centre.corrected, centre.distance);

        let edge = rc.cast_column(&cam, 0).unwrap();
        assert!(edge.corrected < edge.distance);
    }

    #[test]
    fn fade_decreases_and_bottoms_out() {
        let extent = 256.0;
        for d in 0..230 {
            assert!(fade(d as f64, extent) > fade(d as f64 + 1.0, extent));
        }
        assert_eq!(fade(250.0, extent), MIN_FADE);
        assert_eq!(fade(10_000.0, extent), MIN_FADE);
        assert_eq!(fade(0.0, extent), 1.0);
    }

    #[test]
    fn update_paints_a_shaded_slice() {
        let rc = demo();
        let mut buf = PixelBuffer::new(W, H);
        let stats = rc.update(&CameraPose::new(32.0, 32.0, 0), &mut buf).unwrap();
        assert_eq!(stats.painted + stats.empty, W);
        assert!(stats.painted > 0);

        // distance 160 of 256 gives fade 0.375; half height 24 * 32 / 160 = 4.8
        let shaded = Rgba::new(96, 96, 96, 255);
        assert_eq!(buf.get_pixel(W / 2, 24), shaded);
        assert_eq!(buf.get_pixel(W / 2, 20), shaded);
        assert_eq!(buf.get_pixel(W / 2, 28), shaded);
        assert_eq!(buf.get_pixel(W / 2, 19), Rgba::TRANSPARENT);
        assert_eq!(buf.get_pixel(W / 2, 29), Rgba::TRANSPARENT);
        assert_eq!(buf.get_pixel(W / 2, 0), Rgba::TRANSPARENT);
    }

    #[test]
    fn update_samples_the_texture_column_at_u() {
        // One row, red channel encodes the texel column.
        let data: Vec<u8> = (0..64u8).flat_map(|x| [x * 4, 0, 0, 255]).collect();
        let texture = TextureSampler::from_rgba(64, 1, &data).unwrap();
        let rc = caster(GridMap::default(), texture);

        let mut buf = PixelBuffer::new(W, H);
        rc.update(&CameraPose::new(32.0, 95.0, 0), &mut buf).unwrap();
        // u = 31, fade 1 - 32/256 = 0.875, 124 * 0.875 = 108.5
        assert_eq!(buf.get_pixel(W / 2, 24), Rgba::new(109, 0, 0, 255));
        // slice covers the whole column at this distance
        assert_eq!(buf.get_pixel(W / 2, 0).a, 255);
        assert_eq!(buf.get_pixel(W / 2, H - 1).a, 255);
    }

    #[test]
    fn slice_rows_stay_within_half_height() {
        let cfg = RenderConfig {
            viewport_width: 120,
            viewport_height: 90,
            ..config()
        };
        let texture = TextureSampler::solid(16, 16, Rgba::WHITE);
        let rc = RayCaster::new(&cfg, GridMap::default(), texture).unwrap();
        let cam = CameraPose::new(32.0, 32.0, 0);

        // Half height lands a hair under 9, while 45 - half rounds to 36.
        let hit = rc.cast_column(&cam, 48).unwrap();
        let half = 45.0 * 32.0 / hit.corrected;
        assert!(half < 9.0 && half > 8.99, "half {half}");

        let mut buf = PixelBuffer::new(120, 90);
        rc.update(&cam, &mut buf).unwrap();
        assert_eq!(buf.get_pixel(48, 36), Rgba::TRANSPARENT);
        assert_eq!(buf.get_pixel(48, 54), Rgba::TRANSPARENT);
        for y in [37, 45, 53] {
            assert_eq!(buf.get_pixel(48, y).a, 255, "row {y}");
        }
        for y in (0..36).chain(55..90) {
            assert_eq!(buf.get_pixel(48, y), Rgba::TRANSPARENT, "row {y}");
        }
    }

    #[test]
    fn columns_past_the_viewport_cast_nothing() {
        let rc = demo();
        let cam = CameraPose::new(32.0, 32.0, 0);
        assert!(rc.cast_column(&cam, W - 1).is_some());
        assert_eq!(rc.cast_column(&cam, W), None);
        assert_eq!(rc.cast_column(&cam, usize::MAX), None);
    }

    #[test]
    fn rejects_camera_outside_the_map() {
        let rc = demo();
        let mut buf = PixelBuffer::new(W, H);
        let err = rc.update(&CameraPose::new(-5.0, 10.0, 0), &mut buf);
        assert!(matches!(err, Err(RenderError::CameraOutOfBounds { .. })));
        let err = rc.update(&CameraPose::new(10.0, 256.0, 0), &mut buf);
        assert!(matches!(err, Err(RenderError::CameraOutOfBounds { .. })));
        assert!(buf.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn rejects_mismatched_buffer() {
        let rc = demo();
        let mut buf = PixelBuffer::new(W / 2, H);
        let err = rc.update(&CameraPose::new(32.0, 32.0, 0), &mut buf);
        assert!(matches!(
            err,
            Err(RenderError::ViewportMismatch { expected_w: W, actual_w: 32, .. })
        ));
    }

    #[test]
    fn rejects_invalid_config() {
        let cfg = RenderConfig {
            viewport_width: 0,
            ..config()
        };
        let err = RayCaster::new(&cfg, GridMap::default(), TextureSampler::solid(1, 1, Rgba::WHITE));
        assert!(matches!(err, Err(RenderError::InvalidViewport { .. })));
    }
}
