use rayon::{
    iter::{IndexedParallelIterator, ParallelIterator},
    slice::ParallelSliceMut,
};

use crate::framebuffer::PixelBuffer;

/// Precomputed mapping from window pixels to the viewport texel they show
pub struct ScaleLut {
    xs: Vec<usize>,
    ys: Vec<usize>,
}

impl ScaleLut {
    pub fn empty() -> Self {
        Self {
            xs: Vec::new(),
            ys: Vec::new(),
        }
    }

    #[inline]
    pub fn dst_size(&self) -> (usize, usize) {
        (self.xs.len(), self.ys.len())
    }
}

pub fn build_scale_lut(dst_w: usize, dst_h: usize, src_w: usize, src_h: usize) -> ScaleLut {
    let axis = |dst: usize, src: usize| -> Vec<usize> {
        let ratio = src as f64 / dst as f64;
        (0..dst)
            .map(|d| ((d as f64 * ratio) as usize).min(src.saturating_sub(1)))
            .collect()
    };

    ScaleLut {
        xs: axis(dst_w, src_w),
        ys: axis(dst_h, src_h),
    }
}

/// Parallel nearest-neighbour stretch into a 0RGB window surface.
/// Rows are processed in parallel for cache friendly writes
pub fn blit_nearest_stretch(dst: &mut [u32], dw: usize, src: &PixelBuffer, lut: &ScaleLut) {
    if dw == 0 || lut.xs.len() != dw {
        return; // stale LUT, next resize rebuilds it
    }
    dst.par_chunks_mut(dw).enumerate().for_each(|(y, dst_row)| {
        let Some(&sy) = lut.ys.get(y) else {
            return;
        };
        for (out, &sx) in dst_row.iter_mut().zip(&lut.xs) {
            *out = src.get_pixel(sx, sy).to_xrgb();
        }
    });
}
