use anyhow::{bail, Context, Result};

use lexdrill_lib::performance::Direction;
use lexdrill_lib::table::align_all;

use crate::app::App;
use crate::OutputFormat;

pub fn run(app: &App, direction: Option<Direction>, format: &OutputFormat) -> Result<()> {
    let Some(mut table) = app.table()? else {
        bail!("No backing table configured. Set [table] path in config.toml.");
    };

    let direction = direction.unwrap_or(app.config.session.direction);
    let rows = align_all(&mut table, &app.ledger, direction).context("Failed to align backing table")?;

    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "path": table.path().to_string_lossy(),
                    "rows": rows,
                    "direction": direction,
                })
            );
        }
        OutputFormat::Plain => {
            println!("Aligned {} rows in {} ({})", rows, table.path().display(), direction);
        }
    }

    Ok(())
}
