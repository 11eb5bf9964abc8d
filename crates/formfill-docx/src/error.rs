use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocxError {
    #[error("cannot access {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("i/o error: {0}")]
    Stream(#[from] std::io::Error),

    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("xml error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("package has no word/document.xml part")]
    MissingDocumentPart,

    #[error("document part has no w:body element")]
    MissingBody,
}
