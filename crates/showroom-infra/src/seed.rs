//! Catalog seeding from a TOML file.
//!
//! ```toml
//! [[categories]]
//! name = "Beds"
//! subcategories = ["Double beds", "Single beds"]
//!
//! [[categories]]
//! name = "Kitchens"
//! ```
//!
//! Seeding is additive and idempotent: names that already exist are
//! reused, nothing is ever deleted.

use std::path::Path;

use serde::Deserialize;
use showroom_core::repository::catalog::CatalogRepository;
use showroom_types::error::RepositoryError;

#[derive(Debug, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub categories: Vec<SeedCategory>,
}

#[derive(Debug, Deserialize)]
pub struct SeedCategory {
    pub name: String,
    #[serde(default)]
    pub subcategories: Vec<String>,
}

/// What a seeding run created.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub categories_created: usize,
    pub subcategories_created: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("failed to read seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid seed file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("empty name in seed file")]
    EmptyName,

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

pub async fn load_seed_file(path: &Path) -> Result<SeedFile, SeedError> {
    let content = tokio::fs::read_to_string(path).await?;
    Ok(toml::from_str(&content)?)
}

/// Create every category and subcategory of `seed` that does not exist yet.
pub async fn seed_catalog<R: CatalogRepository>(
    repo: &R,
    seed: &SeedFile,
) -> Result<SeedReport, SeedError> {
    let mut report = SeedReport::default();
    let mut existing = repo.list_categories().await?;

    for entry in &seed.categories {
        let name = entry.name.trim();
        if name.is_empty() {
            return Err(SeedError::EmptyName);
        }

        let category = match existing.iter().find(|c| c.name == name) {
            Some(category) => category.clone(),
            None => {
                let category = repo.create_category(name).await?;
                tracing::info!(category_id = category.id, name, "category created");
                report.categories_created += 1;
                existing.push(category.clone());
                category
            }
        };

        let mut subcategories = repo.list_subcategories(category.id).await?;
        for sub_name in &entry.subcategories {
            let sub_name = sub_name.trim();
            if sub_name.is_empty() {
                return Err(SeedError::EmptyName);
            }
            if subcategories.iter().any(|s| s.name == sub_name) {
                continue;
            }
            let sub = repo.create_subcategory(category.id, sub_name).await?;
            tracing::info!(
                category_id = category.id,
                subcategory_id = sub.id,
                name = sub_name,
                "subcategory created"
            );
            report.subcategories_created += 1;
            subcategories.push(sub);
        }
    }

    Ok(report)
}
