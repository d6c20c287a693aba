use crate::error::RenderError;
use crate::framebuffer::Rgba;

pub const DEFAULT_FOV: f64 = 90.0;

/// Viewport and projection settings fixed for the life of a renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderConfig {
    pub viewport_width: usize,
    pub viewport_height: usize,
    pub fov_degrees: f64,
    /// Colour the host clears the buffer to before each frame.
    pub background: Rgba,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            viewport_width: 640,
            viewport_height: 400,
            fov_degrees: DEFAULT_FOV,
            background: Rgba::BLACK,
        }
    }
}

impl RenderConfig {
    pub fn validate(&self) -> Result<(), RenderError> {
        if self.viewport_width == 0 || self.viewport_height == 0 {
            return Err(RenderError::InvalidViewport {
                width: self.viewport_width,
                height: self.viewport_height,
            });
        }
        if !(self.fov_degrees > 0.0 && self.fov_degrees < 180.0) {
            return Err(RenderError::InvalidFov(self.fov_degrees));
        }
        Ok(())
    }
}
