//! Form population engine.
//!
//! A template goes through structure extraction, form classification and
//! the fillers for its form type; values come from the applicant record
//! through the [`Resolver`].

pub mod classifier;
pub mod fill;
pub mod labels;
pub mod populate;
pub mod resolver;
pub mod structure;

pub use classifier::{SectionSet, TableKind, classify, classify_table, classify_text};
pub use fill::SectionCounters;
pub use labels::{LabelMatch, match_label};
pub use populate::{
    BatchReport, FillOutcome, OUTPUT_PREFIX, PopulateError, PopulateOptions, PopulateReport,
    Populator, SIMPLE_FORM_NAMES, TemplateFailure, list_templates,
};
pub use resolver::Resolver;
pub use structure::extract;
