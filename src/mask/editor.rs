use image::{Rgba, RgbaImage};

use super::buffer::{MaskBuffer, BRUSH_ALPHA, BRUSH_RADIUS};
use crate::error::Result;
use crate::models::{MaskImage, SourceImage};

/// Painting session over a source image. Created fresh every time the
/// editor opens; dropping or cancelling it discards all strokes.
#[derive(Debug, Clone)]
pub struct MaskEditor {
    guide: RgbaImage,
    buffer: MaskBuffer,
    drawing: bool,
}

impl MaskEditor {
    pub fn open(source: &SourceImage) -> Self {
        log::debug!(
            "Opening mask editor over {}x{} source",
            source.width(),
            source.height()
        );
        Self {
            guide: source.pixels().clone(),
            buffer: MaskBuffer::new(source.width(), source.height()),
            drawing: false,
        }
    }

    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    pub fn is_drawing(&self) -> bool {
        self.drawing
    }

    pub fn buffer(&self) -> &MaskBuffer {
        &self.buffer
    }

    /// Begin a stroke and lay down the first dab at the pointer.
    pub fn pointer_down(&mut self, x: f32, y: f32) {
        self.drawing = true;
        self.dab(x, y);
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        if self.drawing {
            self.dab(x, y);
        }
    }

    pub fn pointer_up(&mut self) {
        self.drawing = false;
    }

    pub fn pointer_leave(&mut self) {
        self.drawing = false;
    }

    /// Source image with the strokes drawn over it in translucent white.
    /// Only for display; never part of the exported mask.
    pub fn preview(&self) -> RgbaImage {
        let mut out = self.guide.clone();
        for (x, y, px) in out.enumerate_pixels_mut() {
            let a = self.buffer.coverage_at(x, y).unwrap_or(0.0);
            if a > 0.0 {
                let blend = |c: u8| (c as f32 * (1.0 - a) + 255.0 * a).round() as u8;
                *px = Rgba([blend(px[0]), blend(px[1]), blend(px[2]), px[3]]);
            }
        }
        out
    }

    /// Rasterize the current strokes into a mask. Calling it again without
    /// new strokes yields the same pixels.
    pub fn save(&self) -> Result<MaskImage> {
        let mask = MaskImage::from_raster(self.buffer.rasterize())?;
        log::info!(
            "Saved mask {}x{} with {} painted pixels",
            mask.width(),
            mask.height(),
            self.buffer.painted_pixels()
        );
        Ok(mask)
    }

    pub fn cancel(self) {
        log::debug!("Mask editor cancelled, strokes discarded");
    }

    fn dab(&mut self, x: f32, y: f32) {
        self.buffer.paint_disc(x, y, BRUSH_RADIUS, BRUSH_ALPHA);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::images::tests::png_fixture;

    fn editor(width: u32, height: u32) -> MaskEditor {
        let source = SourceImage::from_bytes(png_fixture(width, height)).unwrap();
        MaskEditor::open(&source)
    }

    #[test]
    fn test_mask_matches_source_dimensions() {
        for (w, h) in [(1, 1), (37, 11), (64, 128)] {
            let mut editor = editor(w, h);
            editor.pointer_down(0.0, 0.0);
            let mask = editor.save().unwrap();
            assert_eq!((mask.width(), mask.height()), (w, h));
        }
    }

    #[test]
    fn test_no_strokes_exports_black() {
        let mask = editor(20, 20).save().unwrap();
        assert_eq!(mask.painted_pixels(), 0);
        assert!(mask.raster().pixels().all(|p| *p == Rgba([0, 0, 0, 255])));
    }

    #[test]
    fn test_moves_only_paint_while_drawing() {
        let mut editor = editor(100, 100);
        editor.pointer_move(50.0, 50.0);
        assert!(editor.buffer().is_empty());

        editor.pointer_down(20.0, 20.0);
        editor.pointer_move(60.0, 60.0);
        editor.pointer_leave();
        editor.pointer_move(90.0, 10.0);

        assert!(editor.buffer().coverage_at(20, 20).unwrap() > 0.0);
        assert!(editor.buffer().coverage_at(60, 60).unwrap() > 0.0);
        assert_eq!(editor.buffer().coverage_at(90, 10), Some(0.0));
        assert!(!editor.is_drawing());
    }

    #[test]
    fn test_resave_is_pixel_identical() {
        let mut editor = editor(48, 32);
        editor.pointer_down(10.0, 10.0);
        editor.pointer_move(14.0, 12.0);
        editor.pointer_up();
        let first = editor.save().unwrap();
        let second = editor.save().unwrap();
        assert_eq!(first.raster(), second.raster());
        assert_eq!(first.png_bytes(), second.png_bytes());
    }

    #[test]
    fn test_preview_keeps_guide_out_of_mask() {
        let mut editor = editor(30, 30);
        editor.pointer_down(15.0, 15.0);
        let preview = editor.preview();
        // guide (30, 120, 200) blended halfway to white
        assert_eq!(preview.get_pixel(15, 15), &Rgba([143, 188, 228, 255]));
        assert_eq!(preview.get_pixel(0, 0), &Rgba([30, 120, 200, 255]));

        let mask = editor.save().unwrap();
        assert_eq!(mask.raster().get_pixel(0, 0), &Rgba([0, 0, 0, 255]));
    }
}
