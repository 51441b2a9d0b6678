pub mod buffer;
pub mod editor;

pub use buffer::{MaskBuffer, BRUSH_ALPHA, BRUSH_RADIUS};
pub use editor::MaskEditor;
