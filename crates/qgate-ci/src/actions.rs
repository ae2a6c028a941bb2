//! CI runner command surface.
//!
//! Implements the workflow-command and file-based output protocol of
//! the hosting CI runner: named outputs append to `$GITHUB_OUTPUT`,
//! the rendered report appends to `$GITHUB_STEP_SUMMARY`, and log
//! groups / errors are emitted as `::`-prefixed commands on stdout.
//! Outside a runner (the target variables unset) everything degrades
//! to plain logging so local runs still show the same information.

use std::env;
use std::fs::OpenOptions;
use std::io::Write;
use tracing::{error, info};

use crate::error::Result;

fn append_to(var: &str, content: &str) -> Result<bool> {
    match env::var(var) {
        Ok(path) if !path.is_empty() => {
            let mut file = OpenOptions::new().create(true).append(true).open(path)?;
            file.write_all(content.as_bytes())?;
            Ok(true)
        }
        _ => Ok(false),
    }
}

/// Pick a heredoc delimiter that does not occur in the value.
fn delimiter_for(value: &str) -> String {
    let mut delimiter = String::from("ghadelimiter");
    while value.contains(&delimiter) {
        delimiter.push('_');
    }
    delimiter
}

/// Set a named output for the invoking pipeline.
///
/// Multiline values use the heredoc format. When no output file is
/// configured the value is logged instead.
pub fn set_output(name: &str, value: &str) -> Result<()> {
    let entry = if value.contains('\n') {
        let delimiter = delimiter_for(value);
        format!("{name}<<{delimiter}\n{value}\n{delimiter}\n")
    } else {
        format!("{name}={value}\n")
    };

    if !append_to("GITHUB_OUTPUT", &entry)? {
        info!(output = name, "{}", value);
    }
    Ok(())
}

/// Append markdown to the pipeline-visible summary surface.
pub fn write_summary(markdown: &str) -> Result<()> {
    if !append_to("GITHUB_STEP_SUMMARY", markdown)? {
        println!("{markdown}");
    }
    Ok(())
}

/// Open a labeled output group.
pub fn start_group(name: &str) {
    println!("::group::{name}");
}

/// Close the current output group.
pub fn end_group() {
    println!("::endgroup::");
}

/// Signal run failure to the invoking pipeline.
///
/// Emits an error annotation; the caller is responsible for mapping
/// this to a non-zero exit code after finalization.
pub fn set_failed(message: &str) {
    error!("Action failed with error: {}", message);
    println!("::error::{message}");
}
