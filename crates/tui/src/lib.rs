//! # Industry Core Hub form editor
//!
//! Terminal front end for schema-driven forms. The schema is interpreted into
//! field descriptors, laid out as collapsible sections, and edited in place.
//! Local validation and backend messages are correlated onto fields, and a
//! field can be brought into view with a short highlight.
//!
//! ## Architecture
//!
//! Components handle keys and render themselves; they report user intent as
//! `Effect`s which [`App`](app) applies as the host of the form. Field
//! navigation runs as a cancellable tokio task that feeds steps back into the
//! same event loop.

mod app;
mod ui;

use anyhow::Result;
use ichub_util::FormsConfig;

pub use app::FormSession;

/// Runs the form editor until the user quits.
///
/// # Errors
///
/// Fails when the schema cannot be interpreted or laid out, or when the
/// terminal cannot be set up.
///
/// # Example
///
/// ```no_run
/// use ichub_tui::{FormSession, run};
/// use ichub_util::FormsConfig;
/// use serde_json::json;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let session = FormSession {
///         schema: json!({ "type": "object", "properties": { "name": { "type": "string" } } }),
///         ..FormSession::default()
///     };
///     run(session, FormsConfig::default()).await
/// }
/// ```
pub async fn run(session: FormSession, config: FormsConfig) -> Result<()> {
    ui::runtime::run_app(session, config).await
}
