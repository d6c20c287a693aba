use thiserror::Error;

use crate::world::WallKind;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("camera at ({x}, {y}) is outside the open map interior (0, {extent})")]
    CameraOutOfBounds { x: f64, y: f64, extent: f64 },
    #[error("pixel buffer is {actual_w}x{actual_h}, renderer was built for {expected_w}x{expected_h}")]
    ViewportMismatch {
        expected_w: usize,
        expected_h: usize,
        actual_w: usize,
        actual_h: usize,
    },
    #[error("viewport must be non-empty, got {width}x{height}")]
    InvalidViewport { width: usize, height: usize },
    #[error("field of view must lie in (0, 180) degrees, got {0}")]
    InvalidFov(f64),
    #[error("texture has no pixels")]
    EmptyTexture,
    #[error("texture data holds {actual} bytes, {width}x{height} RGBA needs {expected}")]
    TextureSize {
        width: usize,
        height: usize,
        expected: usize,
        actual: usize,
    },
    #[error("{kind:?} wall grid has wrong shape: {detail}")]
    MapShape { kind: WallKind, detail: String },
    #[error("grid size must be positive and finite, got {0}")]
    InvalidGridSize(f64),
    #[error("failed to decode texture: {0}")]
    TextureDecode(#[from] image::ImageError),
}
