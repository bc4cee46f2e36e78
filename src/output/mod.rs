//! Output encoders (PNG, terminal).

mod png_encoder;
mod terminal;

pub use png_encoder::PngEncoder;
pub use terminal::{TerminalTable, NO_DATA};
