mod cli;

use std::fs::File;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use ichub_engine::{
    InterpretOptions, correlate_issues, interpret_schema, interpret_schema_with, is_known_path, load_document, load_error_list,
    validate_form,
};
use ichub_tui::FormSession;
use ichub_util::FormsConfig;
use serde_json::{Map, Value, json};
use tracing::info;

use crate::cli::{Cli, Cmd, EditArgs};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => FormsConfig::load_from(path),
        None => FormsConfig::load(),
    }
    .context("loading forms configuration")?;

    match cli.cmd {
        Cmd::Edit(args) => {
            init_tracing(Some(&config.resolved_log_file()));
            run_editor(args, config).await?;
            Ok(ExitCode::SUCCESS)
        }
        Cmd::Fields { schema, required_only } => {
            init_tracing(None);
            print_fields(&schema, required_only || config.required_only)?;
            Ok(ExitCode::SUCCESS)
        }
        Cmd::Validate { schema, data, errors } => {
            init_tracing(None);
            validate(&schema, &data, errors.as_deref())
        }
    }
}

/// Installs the fmt subscriber. The editor owns the terminal, so its logs go
/// to a file instead of stderr.
fn init_tracing(log_file: Option<&Path>) {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let file = log_file.and_then(|path| {
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        File::options().create(true).append(true).open(path).ok()
    });
    let _ = match file {
        Some(file) => builder.with_ansi(false).with_writer(Mutex::new(file)).try_init(),
        None if log_file.is_some() => builder.with_writer(std::io::sink).try_init(),
        None => builder.with_writer(std::io::stderr).try_init(),
    };
}

async fn run_editor(args: EditArgs, config: FormsConfig) -> Result<()> {
    let schema = load_document(&args.schema)?;
    let data = match &args.data {
        Some(path) if path.exists() => load_document(path)?,
        _ => Value::Null,
    };
    let errors = match &args.errors {
        Some(path) => load_error_list(path)?,
        None => Vec::new(),
    };
    let session = FormSession {
        schema,
        data,
        errors,
        output: args.output.or(args.data),
        required_only: args.required_only || config.required_only,
    };
    info!(schema = %args.schema.display(), "opening form editor");
    ichub_tui::run(session, config).await
}

fn print_fields(schema_path: &Path, required_only: bool) -> Result<()> {
    let schema = load_document(schema_path)?;
    let fields = interpret_schema_with(&schema, InterpretOptions { required_only })
        .with_context(|| format!("interpreting {}", schema_path.display()))?;
    println!("{}", serde_json::to_string_pretty(&fields)?);
    Ok(())
}

fn validate(schema_path: &Path, data_path: &Path, errors_path: Option<&Path>) -> Result<ExitCode> {
    let schema = load_document(schema_path)?;
    let fields = interpret_schema(&schema).with_context(|| format!("interpreting {}", schema_path.display()))?;
    let data = load_document(data_path)?;

    let issues = validate_form(&fields, &data);
    let external = match errors_path {
        Some(path) => load_error_list(path)?,
        None => Vec::new(),
    };
    let mut index = correlate_issues(&issues);
    for raw in &external {
        index.record_raw(raw, |path| is_known_path(&fields, path));
    }
    let valid = issues.is_empty() && external.is_empty();

    let mut by_path = Map::new();
    for path in index.error_paths() {
        if let Some(state) = index.get(path) {
            by_path.insert(path.to_string(), json!(state.messages));
        }
    }
    let report = json!({
        "valid": valid,
        "fields": by_path,
        "unattributed": index.unattributed(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(if valid { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
