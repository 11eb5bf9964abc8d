//! One form-processing job: payload to record, populator subprocess in a
//! scratch directory, outputs published to the download folder.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;

use formfill_core::record_from_payload;
use serde_json::Value;
use tokio::process::Command;
use tracing::{debug, info};

use crate::config::ServerConfig;
use crate::error::ServerError;

const RECORD_FILE: &str = "extracted_data.json";
const AVAILABLE_LISTED: usize = 5;

/// Run the populator for `payload` and return the published file names,
/// sorted.
pub async fn process_forms(config: &ServerConfig, payload: &Value) -> Result<Vec<String>, ServerError> {
    let record = record_from_payload(payload);
    let scratch = tempfile::tempdir()?;
    let data = scratch.path().join(RECORD_FILE);
    tokio::fs::write(&data, serde_json::to_vec_pretty(&record)?).await?;
    let out = scratch.path().join("output");
    tokio::fs::create_dir_all(&out).await?;

    run_populator(config, &data, &out).await?;

    tokio::fs::create_dir_all(&config.output_dir).await?;
    publish(&out, &config.output_dir).await
}

async fn run_populator(config: &ServerConfig, data: &Path, out: &Path) -> Result<(), ServerError> {
    let started = Instant::now();
    let mut cmd = Command::new(&config.populator_bin);
    cmd.arg("populate")
        .arg(data)
        .arg(&config.templates_dir)
        .arg(out)
        .stdin(Stdio::null())
        .kill_on_drop(true);

    let output = match tokio::time::timeout(config.timeout, cmd.output()).await {
        Ok(result) => result.map_err(|source| ServerError::Spawn {
            bin: config.populator_bin.clone(),
            source,
        })?,
        Err(_) => return Err(ServerError::Timeout(config.timeout.as_secs())),
    };

    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    if !output.status.success() {
        return Err(ServerError::PopulatorFailed {
            status: output.status.code(),
            stderr,
        });
    }
    debug!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        stderr = %stderr,
        "populator finished"
    );
    Ok(())
}

/// Copy every `.docx` in `from` into `to`.
async fn publish(from: &Path, to: &Path) -> Result<Vec<String>, ServerError> {
    let mut names = Vec::new();
    let mut entries = tokio::fs::read_dir(from).await?;
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        if !is_docx(&name) {
            continue;
        }
        tokio::fs::copy(entry.path(), to.join(&name)).await?;
        names.push(name);
    }
    names.sort();
    info!(published = names.len(), dir = %to.display(), "published forms");
    Ok(names)
}

fn is_docx(name: &str) -> bool {
    name.to_lowercase().ends_with(".docx")
}

// ── Downloads ──

/// A bare file name: no separators, no parent references.
pub fn validate_filename(name: &str) -> Result<(), ServerError> {
    let bad = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0']);
    if bad {
        return Err(ServerError::InvalidFilename(name.to_string()));
    }
    Ok(())
}

/// Whitespace-to-underscore form of a requested name.
fn underscored(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join("_")
}

/// Locate a published file. The name is tried as given, then with
/// whitespace runs replaced by `_`. A miss lists the first few `.docx`
/// files on offer.
pub async fn resolve_download(dir: &Path, filename: &str) -> Result<PathBuf, ServerError> {
    validate_filename(filename)?;
    for candidate in [filename.to_string(), underscored(filename)] {
        let path = dir.join(&candidate);
        if tokio::fs::metadata(&path).await.is_ok_and(|m| m.is_file()) {
            return Ok(path);
        }
    }
    Err(ServerError::NotFound {
        filename: filename.to_string(),
        available: available_files(dir).await,
    })
}

async fn available_files(dir: &Path) -> Vec<String> {
    let mut names = Vec::new();
    let Ok(mut entries) = tokio::fs::read_dir(dir).await else {
        return names;
    };
    while let Ok(Some(entry)) = entries.next_entry().await {
        let name = entry.file_name().to_string_lossy().into_owned();
        if is_docx(&name) {
            names.push(name);
        }
    }
    names.sort();
    names.truncate(AVAILABLE_LISTED);
    names
}
