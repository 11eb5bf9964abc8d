pub mod intake;
pub mod model;
pub mod record;
pub mod types;

pub use intake::record_from_payload;
pub use model::{Block, CellInfo, ParagraphInfo, RowInfo, StructuralModel, TableInfo};
pub use record::{ApplicantRecord, Fields, RecordError, value_text};
pub use types::{AddressQualifier, FieldType, FormType};
