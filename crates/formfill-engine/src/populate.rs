//! Per-template orchestration: extract, classify, fill, save.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use formfill_core::{ApplicantRecord, FormType};
use formfill_docx::{Document, DocxError};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::classifier::classify;
use crate::fill::{self, SectionCounters};
use crate::resolver::Resolver;
use crate::structure::extract;

/// Prefix for populated output files.
pub const OUTPUT_PREFIX: &str = "smart_";

/// Filename fragments (lowercase) of templates that always take the
/// six-field filler.
pub const SIMPLE_FORM_NAMES: &[&str] = &[
    "declarationforpfaccount linking with aadhar",
    "bounteous_hyd_letterhead template_april 2025",
    "declarationformforpfaccountpdf",
];

#[derive(Debug, Error)]
pub enum PopulateError {
    #[error(transparent)]
    Docx(#[from] DocxError),

    #[error("cannot read templates directory {path}: {source}")]
    TemplatesDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Clone)]
pub struct PopulateOptions {
    /// Date written into "Date:" fields and used for ages.
    pub today: NaiveDate,
    /// Lowercase filename fragments forcing the six-field filler.
    pub simple_form_names: Vec<String>,
}

impl Default for PopulateOptions {
    fn default() -> Self {
        Self {
            today: Local::now().date_naive(),
            simple_form_names: SIMPLE_FORM_NAMES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Result of filling one document in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FillOutcome {
    pub form_type: FormType,
    /// The six-field filler was forced by the filename.
    pub simple: bool,
    pub fixes: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct PopulateReport {
    pub template: PathBuf,
    pub output: PathBuf,
    pub form_type: FormType,
    pub simple: bool,
    pub fixes: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct TemplateFailure {
    pub template: PathBuf,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub reports: Vec<PopulateReport>,
    pub failures: Vec<TemplateFailure>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.reports.len()
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn total(&self) -> usize {
        self.succeeded() + self.failed()
    }

    pub fn total_fixes(&self) -> usize {
        self.reports.iter().map(|r| r.fixes).sum()
    }
}

pub struct Populator {
    record: ApplicantRecord,
    options: PopulateOptions,
}

impl Populator {
    pub fn new(record: ApplicantRecord, options: PopulateOptions) -> Self {
        Self { record, options }
    }

    pub fn record(&self) -> &ApplicantRecord {
        &self.record
    }

    pub fn options(&self) -> &PopulateOptions {
        &self.options
    }

    fn is_simple_form(&self, file_name: &str) -> bool {
        let name = file_name.to_lowercase();
        self.options
            .simple_form_names
            .iter()
            .any(|fragment| name.contains(fragment.as_str()))
    }

    /// Fill an open document. `file_name` only drives the six-field
    /// override.
    pub fn fill(&self, doc: &mut Document, file_name: &str) -> FillOutcome {
        let model = extract(doc);
        let form_type = classify(&model);
        let simple = self.is_simple_form(file_name);
        let res = Resolver::new(&self.record, self.options.today);
        let mut counters = SectionCounters::default();

        let mut fixes = if simple {
            fill::fill_simple_six_fields(doc, &res)
        } else {
            match form_type {
                FormType::BackgroundVerification => {
                    fill::fill_background_verification(doc, &model, &res, &mut counters)
                }
                FormType::Declaration => fill::fill_declaration(doc, &res),
                FormType::Nda => fill::fill_nda(doc, &res),
                FormType::Loa => fill::fill_loa(doc, &res),
                FormType::PfAccount => fill::fill_pf_account(doc, &res),
                FormType::Gratuity => fill::fill_gratuity(doc, &res),
                FormType::EpfNomination => fill::fill_epf_nomination(doc, &res),
                FormType::General => fill::fill_general(doc, &res),
            }
        };
        if form_type != FormType::BackgroundVerification {
            fixes += fill::fill_current_address_everywhere(doc, &res);
        }
        debug!(form_type = %form_type, simple, fixes, ?counters, "filled document");
        FillOutcome {
            form_type,
            simple,
            fixes,
        }
    }

    /// Populate one template and save the result. Zero fixes is not an
    /// error.
    pub fn populate(&self, template: &Path, output: &Path) -> Result<PopulateReport, PopulateError> {
        let mut doc = Document::open(template)?;
        let file_name = template
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let outcome = self.fill(&mut doc, &file_name);
        doc.save(output)?;
        info!(
            template = %file_name,
            form_type = %outcome.form_type,
            simple = outcome.simple,
            fixes = outcome.fixes,
            output = %output.display(),
            "populated template"
        );
        Ok(PopulateReport {
            template: template.to_path_buf(),
            output: output.to_path_buf(),
            form_type: outcome.form_type,
            simple: outcome.simple,
            fixes: outcome.fixes,
        })
    }

    /// Populate every `.docx` in `templates_dir` (sorted by name) into
    /// `output_dir` as `smart_<name>`. A failing template is logged and
    /// counted; the rest still run.
    pub fn populate_all(&self, templates_dir: &Path, output_dir: &Path) -> Result<BatchReport, PopulateError> {
        std::fs::create_dir_all(output_dir).map_err(|source| PopulateError::OutputDir {
            path: output_dir.to_path_buf(),
            source,
        })?;
        let templates = list_templates(templates_dir)?;
        if templates.is_empty() {
            warn!(dir = %templates_dir.display(), "no .docx templates found");
        }

        let mut batch = BatchReport::default();
        for template in templates {
            let Some(name) = template.file_name() else {
                continue;
            };
            let output = output_dir.join(format!("{OUTPUT_PREFIX}{}", name.to_string_lossy()));
            match self.populate(&template, &output) {
                Ok(report) => batch.reports.push(report),
                Err(e) => {
                    error!(template = %template.display(), error = %e, "template failed");
                    batch.failures.push(TemplateFailure {
                        template,
                        error: e.to_string(),
                    });
                }
            }
        }
        info!(
            succeeded = batch.succeeded(),
            failed = batch.failed(),
            fixes = batch.total_fixes(),
            "batch complete"
        );
        Ok(batch)
    }
}

/// `.docx` files directly inside `dir`, sorted by name. Word lock files
/// (`~$...`) are skipped.
pub fn list_templates(dir: &Path) -> Result<Vec<PathBuf>, PopulateError> {
    let to_err = |source| PopulateError::TemplatesDir {
        path: dir.to_path_buf(),
        source,
    };
    let mut out = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(to_err)? {
        let path = entry.map_err(to_err)?.path();
        let is_docx = path
            .extension()
            .is_some_and(|e| e.eq_ignore_ascii_case("docx"));
        let is_lock = path
            .file_name()
            .is_some_and(|n| n.to_string_lossy().starts_with("~$"));
        if path.is_file() && is_docx && !is_lock {
            out.push(path);
        }
    }
    out.sort();
    Ok(out)
}
