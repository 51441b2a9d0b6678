use image::{Rgba, RgbaImage};

/// Brush radius in surface pixels.
pub const BRUSH_RADIUS: f32 = 10.0;

/// Opacity of a single dab. Overlapping dabs accumulate source-over.
pub const BRUSH_ALPHA: f32 = 0.5;

/// Per-pixel paint coverage over a source-sized surface, row-major.
/// 0.0 is background, anything above is painted.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskBuffer {
    width: u32,
    height: u32,
    coverage: Vec<f32>,
}

impl MaskBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            coverage: vec![0.0; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn coverage_at(&self, x: u32, y: u32) -> Option<f32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.coverage[self.index(x, y)])
    }

    pub fn is_empty(&self) -> bool {
        self.coverage.iter().all(|&a| a == 0.0)
    }

    pub fn painted_pixels(&self) -> usize {
        self.coverage.iter().filter(|&&a| a > 0.0).count()
    }

    /// Fill a disc centered at (`cx`, `cy`). A pixel is covered when its
    /// center lies within `radius`. Parts outside the surface are dropped.
    pub fn paint_disc(&mut self, cx: f32, cy: f32, radius: f32, alpha: f32) {
        if !(cx.is_finite() && cy.is_finite()) || radius <= 0.0 || alpha <= 0.0 {
            return;
        }
        let alpha = alpha.min(1.0);
        let Some((x0, x1)) = clip_span(cx, radius, self.width) else {
            return;
        };
        let Some((y0, y1)) = clip_span(cy, radius, self.height) else {
            return;
        };
        let r2 = radius * radius;

        for y in y0..y1 {
            let dy = y as f32 + 0.5 - cy;
            for x in x0..x1 {
                let dx = x as f32 + 0.5 - cx;
                if dx * dx + dy * dy <= r2 {
                    let i = self.index(x, y);
                    let a = self.coverage[i];
                    self.coverage[i] = a + alpha * (1.0 - a);
                }
            }
        }
    }

    pub fn clear(&mut self) {
        self.coverage.iter_mut().for_each(|a| *a = 0.0);
    }

    /// Black opaque raster with every painted pixel erased by its coverage
    /// (destination-out).
    pub fn rasterize(&self) -> RgbaImage {
        RgbaImage::from_fn(self.width, self.height, |x, y| {
            let a = self.coverage[self.index(x, y)];
            let alpha = (255.0 * (1.0 - a)).round().clamp(0.0, 255.0) as u8;
            Rgba([0, 0, 0, alpha])
        })
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}

/// Pixel range `[lo, hi)` whose centers may fall within `radius` of
/// `center`, clamped to `[0, len)`.
fn clip_span(center: f32, radius: f32, len: u32) -> Option<(u32, u32)> {
    let lo = (center - radius - 0.5).floor().max(0.0);
    let hi = (center + radius + 0.5).ceil().min(len as f32);
    if hi <= lo {
        return None;
    }
    Some((lo as u32, hi as u32))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_buffer_rasterizes_all_black() {
        let buffer = MaskBuffer::new(13, 9);
        let raster = buffer.rasterize();
        assert_eq!(raster.dimensions(), (13, 9));
        assert!(raster.pixels().all(|p| *p == Rgba([0, 0, 0, 255])));
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_single_dab_cuts_half_alpha_disc() {
        let mut buffer = MaskBuffer::new(64, 64);
        buffer.paint_disc(32.0, 32.0, BRUSH_RADIUS, BRUSH_ALPHA);
        assert_eq!(buffer.coverage_at(32, 32), Some(0.5));
        assert_eq!(buffer.coverage_at(0, 0), Some(0.0));
        // just outside the radius along the axis
        assert_eq!(buffer.coverage_at(32 + 10, 32), Some(0.0));

        let raster = buffer.rasterize();
        assert_eq!(raster.get_pixel(32, 32)[3], 128);
        assert_eq!(raster.get_pixel(0, 0)[3], 255);

        // roughly pi * r^2 pixels
        let painted = buffer.painted_pixels();
        assert!((300..330).contains(&painted), "painted = {}", painted);
    }

    #[test]
    fn test_overlapping_dabs_accumulate() {
        let mut buffer = MaskBuffer::new(40, 40);
        buffer.paint_disc(20.0, 20.0, BRUSH_RADIUS, BRUSH_ALPHA);
        buffer.paint_disc(20.0, 20.0, BRUSH_RADIUS, BRUSH_ALPHA);
        assert_eq!(buffer.coverage_at(20, 20), Some(0.75));
        assert_eq!(buffer.rasterize().get_pixel(20, 20)[3], 64);
    }

    #[test]
    fn test_dabs_clip_at_edges() {
        let mut buffer = MaskBuffer::new(16, 16);
        buffer.paint_disc(-3.0, 8.0, BRUSH_RADIUS, BRUSH_ALPHA);
        assert!(buffer.coverage_at(0, 8).unwrap() > 0.0);
        buffer.paint_disc(500.0, 500.0, BRUSH_RADIUS, BRUSH_ALPHA);
        buffer.paint_disc(f32::NAN, 1.0, BRUSH_RADIUS, BRUSH_ALPHA);
        assert_eq!(buffer.coverage_at(15, 15), Some(0.0));
        assert_eq!(buffer.coverage_at(16, 0), None);
    }

    #[test]
    fn test_rasterize_is_repeatable() {
        let mut buffer = MaskBuffer::new(30, 20);
        buffer.paint_disc(5.0, 5.0, BRUSH_RADIUS, BRUSH_ALPHA);
        buffer.paint_disc(12.0, 9.0, BRUSH_RADIUS, BRUSH_ALPHA);
        assert_eq!(buffer.rasterize(), buffer.rasterize());

        buffer.clear();
        assert!(buffer.is_empty());
    }
}
