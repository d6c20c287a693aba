use std::path::Path;

use log::info;

use crate::error::RenderError;
use crate::framebuffer::Rgba;

/// Immutable decoded image with nearest-neighbour lookup.
#[derive(Clone)]
pub struct TextureSampler {
    width: usize,
    height: usize,
    pixels: Vec<Rgba>,
}

impl TextureSampler {
    /// Wraps tightly packed RGBA8 bytes.
    pub fn from_rgba(width: usize, height: usize, data: &[u8]) -> Result<Self, RenderError> {
        if width == 0 || height == 0 {
            return Err(RenderError::EmptyTexture);
        }
        let expected = width * height * 4;
        if data.len() != expected {
            return Err(RenderError::TextureSize {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        let pixels = data
            .chunks_exact(4)
            .map(|p| Rgba::new(p[0], p[1], p[2], p[3]))
            .collect();
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn from_image(img: &image::RgbaImage) -> Result<Self, RenderError> {
        let (w, h) = img.dimensions();
        Self::from_rgba(w as usize, h as usize, img.as_raw())
    }

    /// Decodes an image file. Called by the host before the first frame.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RenderError> {
        let path = path.as_ref();
        let img = image::open(path)?.to_rgba8();
        let texture = Self::from_image(&img)?;
        info!(
            "loaded texture {} ({}x{})",
            path.display(),
            texture.width,
            texture.height
        );
        Ok(texture)
    }

    pub fn solid(width: usize, height: usize, color: Rgba) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            pixels: vec![color; width.max(1) * height.max(1)],
        }
    }

    /// Two-colour checkerboard of 8x8 tiles with a one pixel mortar line.
    pub fn checkerboard(size: usize, a: Rgba, b: Rgba) -> Self {
        let size = size.max(1);
        let mortar = Rgba::rgb(40, 40, 40);
        let pixels = (0..size * size)
            .map(|i| {
                let (x, y) = (i % size, i / size);
                if x % 8 == 0 || y % 8 == 0 {
                    mortar
                } else if (x / 8 + y / 8) % 2 == 0 {
                    a
                } else {
                    b
                }
            })
            .collect();
        Self {
            width: size,
            height: size,
            pixels,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Nearest texel; coordinates past the edge clamp to it.
    #[inline]
    pub fn sample(&self, x: usize, y: usize) -> Rgba {
        let x = x.min(self.width - 1);
        let y = y.min(self.height - 1);
        self.pixels[y * self.width + x]
    }
}
