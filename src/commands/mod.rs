//! Command implementations for the revdeploy binary

pub mod branches;
pub mod deploy;
pub mod status;

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use revdeploy::config::{self, Config, ConfigWarning};

/// Resolve, load and validate the configuration, reporting unknown keys
pub fn load_config(explicit: Option<&Path>, json: bool) -> Result<Config> {
    let path = config::resolve_config_path(explicit);
    let (config, warnings) = config::load_with_warnings(&path)
        .with_context(|| format!("cannot load configuration from {}", path.display()))?;

    for warning in &warnings {
        if json {
            write_json_line(&serde_json::json!({
                "event": "config_warning",
                "key": warning.key,
                "file": warning.file.display().to_string(),
                "line": warning.line,
                "suggestion": warning.suggestion,
            }));
        } else {
            eprintln!("warning: {}", describe_warning(warning));
        }
    }
    Ok(config)
}

fn describe_warning(warning: &ConfigWarning) -> String {
    let mut text = format!("unknown key '{}' in {}", warning.key, warning.file.display());
    if let Some(line) = warning.line {
        text.push_str(&format!(":{}", line));
    }
    if let Some(suggestion) = &warning.suggestion {
        text.push_str(&format!(" (did you mean '{}'?)", suggestion));
    }
    text
}

/// Write one NDJSON record to stdout
pub fn write_json_line(value: &serde_json::Value) {
    let mut out = std::io::stdout().lock();
    let _ = writeln!(out, "{}", value);
    let _ = out.flush();
}
