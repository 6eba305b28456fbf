//! Rendering module: writes composed sheets to an output backend.

mod pdf;

pub use pdf::{PdfFont, PdfRenderer};
