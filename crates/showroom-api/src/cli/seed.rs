//! `showroom seed` command.

use std::path::Path;

use anyhow::Result;
use console::style;
use showroom_infra::seed::{load_seed_file, seed_catalog};

use crate::state::AppState;

/// Create the categories and subcategories listed in a TOML seed file.
pub async fn seed(state: &AppState, path: &Path, json: bool) -> Result<()> {
    let file = load_seed_file(path).await?;
    let report = seed_catalog(state.catalog.as_ref(), &file).await?;

    if json {
        let out = serde_json::json!({
            "categories_created": report.categories_created,
            "subcategories_created": report.subcategories_created,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} Seeded from {}",
        style("✓").green().bold(),
        style(path.display()).cyan()
    );
    println!(
        "  Categories created:    {}",
        style(report.categories_created).bold()
    );
    println!(
        "  Subcategories created: {}",
        style(report.subcategories_created).bold()
    );
    println!();
    Ok(())
}
