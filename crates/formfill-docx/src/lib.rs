//! Word document I/O: open a `.docx` package, read and replace paragraph and
//! table-cell text, save.

mod document;
mod error;
mod xml;

pub use document::{DOCUMENT_PART, Document, Slot};
pub use error::DocxError;
