use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "ichub", version, about = "Schema-driven form editor for Industry Core Hub documents")]
pub struct Cli {
    /// Configuration file (defaults to $ICHUB_FORMS_CONFIG or the user config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub cmd: Cmd,
}

#[derive(Debug, Subcommand)]
pub enum Cmd {
    /// Edit a document in the interactive form
    Edit(EditArgs),
    /// Print the field descriptors derived from a schema as JSON
    Fields {
        #[arg(long, short)]
        schema: PathBuf,
        /// Keep only required fields
        #[arg(long)]
        required_only: bool,
    },
    /// Validate a document and print per-field errors as JSON
    Validate {
        #[arg(long, short)]
        schema: PathBuf,
        #[arg(long, short)]
        data: PathBuf,
        /// Backend validation messages (JSON array) to merge in
        #[arg(long, short)]
        errors: Option<PathBuf>,
    },
}

#[derive(Debug, Args)]
pub struct EditArgs {
    /// JSON or YAML schema describing the form
    #[arg(long, short)]
    pub schema: PathBuf,
    /// Initial form data
    #[arg(long, short)]
    pub data: Option<PathBuf>,
    /// Backend validation messages (JSON array) to show on open
    #[arg(long, short)]
    pub errors: Option<PathBuf>,
    /// Where Ctrl+S writes the document (defaults to --data)
    #[arg(long, short)]
    pub output: Option<PathBuf>,
    /// Start with only required fields visible
    #[arg(long)]
    pub required_only: bool,
}
