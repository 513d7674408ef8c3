pub mod docx;
pub mod image;
pub mod markdown;
pub mod pdf;
pub mod plain;

pub use docx::DocxExtractor;
pub use image::ImageExtractor;
pub use markdown::MarkdownExtractor;
pub use pdf::PdfExtractor;
pub use plain::PlainTextExtractor;
