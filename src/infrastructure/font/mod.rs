//! Caption font adapters.

mod rusttype_renderer;

pub use rusttype_renderer::{
    DEFAULT_DPI, DEFAULT_FONT_PATH, DEFAULT_FONT_SIZE, FontError, RusttypeCaptionRenderer,
};
