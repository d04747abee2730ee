pub mod cli;
pub mod replay;
pub mod serve;
pub mod show;

use proctor_core::api::TrustSnapshot;

use cli::OutputFormat;

/// Renders a snapshot for the terminal.
pub(crate) fn render_snapshot(snapshot: &TrustSnapshot, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(snapshot)?),
        OutputFormat::Text => {
            let mut out = format!(
                "Trust score: {:.1} ({})\n",
                snapshot.score, snapshot.label
            );
            for row in &snapshot.violations {
                out.push_str(&format!(
                    "  {:<18} {:>4}  (-{} each)\n",
                    row.category.label(),
                    row.count,
                    row.weight
                ));
            }
            Ok(out)
        }
    }
}
