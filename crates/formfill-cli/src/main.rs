//! `formfill`: populate DOCX form templates from an applicant record.
//!
//! ```bash
//! formfill populate record.json templates/ [populated_forms_smart]
//! formfill intake payload.json -o record.json
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use formfill_core::{ApplicantRecord, record_from_payload};
use formfill_engine::{BatchReport, PopulateOptions, Populator};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Exit status when no template could be populated.
const EXIT_NONE_POPULATED: u8 = 2;

#[derive(Parser)]
#[command(name = "formfill")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Populate DOCX form templates from applicant data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fill every .docx template in a directory
    Populate {
        /// Applicant record (JSON; a top-level `form_fields` wrapper is optional)
        data: PathBuf,

        /// Directory holding the .docx templates
        templates: PathBuf,

        /// Directory for the populated copies
        #[arg(default_value = "populated_forms_smart")]
        output: PathBuf,

        /// Date written into date fields (YYYY-MM-DD); defaults to today
        #[arg(long, env = "FORMFILL_TODAY")]
        today: Option<NaiveDate>,

        /// Extra filename fragment that forces the six-field filler (repeatable)
        #[arg(long = "simple-form")]
        simple_form: Vec<String>,

        /// Print the batch report as JSON on stdout
        #[arg(long)]
        json: bool,
    },
    /// Convert a frontend payload into a record
    Intake {
        /// Frontend payload (JSON)
        payload: PathBuf,

        /// Where to write the record; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Populate {
            data,
            templates,
            output,
            today,
            simple_form,
            json,
        } => {
            let mut options = PopulateOptions::default();
            if let Some(today) = today {
                options.today = today;
            }
            options
                .simple_form_names
                .extend(simple_form.iter().map(|s| s.to_lowercase()));
            let batch = populate(&data, &templates, &output, options)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&batch)?);
            }
            if batch.succeeded() > 0 {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::from(EXIT_NONE_POPULATED))
            }
        }
        Commands::Intake { payload, output } => {
            intake(&payload, output.as_deref())?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn populate(
    data: &Path,
    templates: &Path,
    output: &Path,
    options: PopulateOptions,
) -> anyhow::Result<BatchReport> {
    // 1. Load the record.
    let record = ApplicantRecord::load(data)
        .with_context(|| format!("loading record {}", data.display()))?;

    // 2. Fill every template.
    let populator = Populator::new(record, options);
    tracing::info!(
        record = %data.display(),
        employment = populator.record().employment_history.len(),
        references = populator.record().references.len(),
        today = %populator.options().today,
        "loaded record"
    );
    let batch = populator
        .populate_all(templates, output)
        .with_context(|| format!("populating templates in {}", templates.display()))?;

    // 3. Summarise.
    for report in &batch.reports {
        eprintln!(
            "  {} [{}] {} fixes",
            report.output.display(),
            report.form_type,
            report.fixes
        );
    }
    for failure in &batch.failures {
        eprintln!("  FAILED {}: {}", failure.template.display(), failure.error);
    }
    eprintln!(
        "{} of {} templates populated, {} fixes, output in {}",
        batch.succeeded(),
        batch.total(),
        batch.total_fixes(),
        output.display()
    );
    Ok(batch)
}

fn intake(payload: &Path, output: Option<&Path>) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(payload)
        .with_context(|| format!("reading payload {}", payload.display()))?;
    let value: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("parsing payload {}", payload.display()))?;
    let record = serde_json::to_string_pretty(&record_from_payload(&value))?;
    match output {
        Some(path) => {
            std::fs::write(path, record).with_context(|| format!("writing {}", path.display()))?;
            tracing::info!(output = %path.display(), "wrote record");
        }
        None => println!("{record}"),
    }
    Ok(())
}
