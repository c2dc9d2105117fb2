pub mod export;
pub mod pdf_document;
pub mod source;
