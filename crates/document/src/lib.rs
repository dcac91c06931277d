mod docx;
mod error;
pub mod font;
mod load;
mod paragraph;

pub use docx::{load_docx, parse_document_xml};
pub use error::*;
pub use font::{FontDescriptor, describe_font, is_arabic_font, is_red_color};
pub use load::{document_identity, load_json, load_paragraphs};
pub use paragraph::{Paragraph, Rgb, Run};
