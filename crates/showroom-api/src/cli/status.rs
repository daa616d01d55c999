//! Catalog and configuration status command.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use showroom_core::repository::catalog::CatalogRepository;

use crate::state::AppState;

/// One row of the catalog overview.
struct CategorySummary {
    name: String,
    subcategories: usize,
    products: usize,
}

async fn summarize(state: &AppState) -> Result<Vec<CategorySummary>> {
    let catalog = &state.catalog;
    let mut rows = Vec::new();
    for category in catalog.list_categories().await? {
        let subcategories = catalog.list_subcategories(category.id).await?;
        let mut products = catalog
            .list_products_by_category_only(category.id)
            .await?
            .len();
        for sub in &subcategories {
            products += catalog.list_products(sub.id).await?.len();
        }
        rows.push(CategorySummary {
            name: category.name,
            subcategories: subcategories.len(),
            products,
        });
    }
    Ok(rows)
}

/// Display the catalog overview and the effective configuration.
pub async fn status(state: &AppState, json: bool) -> Result<()> {
    let rows = summarize(state).await?;
    let total_products: usize = rows.iter().map(|r| r.products).sum();

    if json {
        let categories: Vec<serde_json::Value> = rows
            .iter()
            .map(|r| {
                serde_json::json!({
                    "name": r.name,
                    "subcategories": r.subcategories,
                    "products": r.products,
                })
            })
            .collect();
        let status = serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
            "data_dir": state.data_dir.display().to_string(),
            "database_file": state.config.database_file,
            "admins": state.config.admin_ids.len(),
            "session_idle_timeout_secs": state.config.session_idle_timeout_secs,
            "categories": categories,
            "products": total_products,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} Showroom v{}",
        style("*").bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!();

    println!("  {}", style("── Catalog ──").dim());
    if rows.is_empty() {
        println!(
            "  No categories yet. Run {} to create some.",
            style("showroom seed <file.toml>").yellow()
        );
    } else {
        let mut table = Table::new();
        table.load_preset(presets::UTF8_FULL_CONDENSED);
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec![
            Cell::new("Category").fg(Color::White),
            Cell::new("Subcategories").fg(Color::White),
            Cell::new("Products").fg(Color::White),
        ]);
        for row in &rows {
            table.add_row(vec![
                Cell::new(&row.name).fg(Color::Cyan),
                Cell::new(row.subcategories),
                Cell::new(row.products),
            ]);
        }
        println!("{table}");
        println!("  Products: {}", style(total_products).bold());
    }
    println!();

    println!("  {}", style("── System ──").dim());
    println!("  Data dir: {}", style(state.data_dir.display()).dim());
    println!(
        "  Database: {}",
        style(format!("{} (SQLite, WAL mode)", state.config.database_file)).dim()
    );
    let admins = state.config.admin_ids.len();
    if admins == 0 {
        println!(
            "  Admins:   {}",
            style("none (set admin_ids in config.toml)").yellow()
        );
    } else {
        println!("  Admins:   {}", style(admins).bold());
    }
    println!(
        "  Session idle timeout: {}s",
        state.config.session_idle_timeout_secs
    );
    println!();

    Ok(())
}
