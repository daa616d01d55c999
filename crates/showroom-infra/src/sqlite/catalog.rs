//! SQLite catalog repository implementation.
//!
//! Implements `CatalogRepository` from `showroom-core` using sqlx with split
//! read/write pools. Products are read in two queries: the product rows,
//! then every image of those products in position order.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use showroom_core::repository::catalog::CatalogRepository;
use showroom_types::catalog::{
    Category, CategoryId, Image, ImageId, NewProduct, Product, ProductField, ProductId,
    Subcategory, SubcategoryId,
};
use showroom_types::error::RepositoryError;
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `CatalogRepository`.
pub struct SqliteCatalogRepository {
    pool: DatabasePool,
}

impl SqliteCatalogRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Load the images of `rows` and assemble products, keeping row order.
    async fn hydrate(&self, rows: Vec<ProductRow>) -> Result<Vec<Product>, RepositoryError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; rows.len()].join(", ");
        let sql = format!(
            "SELECT * FROM product_images WHERE product_id IN ({placeholders}) ORDER BY product_id, position"
        );
        let mut query = sqlx::query(&sql);
        for row in &rows {
            query = query.bind(row.id);
        }
        let image_rows = query
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut images: HashMap<ProductId, Vec<Image>> = HashMap::new();
        for row in &image_rows {
            let image = image_from_row(row)?;
            images.entry(image.product_id).or_default().push(image);
        }

        rows.into_iter()
            .map(|row| {
                let product_images = images.remove(&row.id).unwrap_or_default();
                row.into_product(product_images)
            })
            .collect()
    }

    async fn fetch_products(
        &self,
        sql: &str,
        bind: Option<i64>,
    ) -> Result<Vec<Product>, RepositoryError> {
        let mut query = sqlx::query(sql);
        if let Some(value) = bind {
            query = query.bind(value);
        }
        let rows = query
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        let rows = rows
            .iter()
            .map(ProductRow::from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        self.hydrate(rows).await
    }
}

/// Internal row type for mapping SQLite rows to a domain `Product`.
struct ProductRow {
    id: i64,
    name: String,
    short_description: String,
    additional_info: String,
    category_id: Option<i64>,
    subcategory_id: Option<i64>,
    created_at: String,
}

impl ProductRow {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            short_description: row.try_get("short_description")?,
            additional_info: row.try_get("additional_info")?,
            category_id: row.try_get("category_id")?,
            subcategory_id: row.try_get("subcategory_id")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_product(self, images: Vec<Image>) -> Result<Product, RepositoryError> {
        Ok(Product {
            id: self.id,
            name: self.name,
            short_description: self.short_description,
            additional_info: self.additional_info,
            category_id: self.category_id,
            subcategory_id: self.subcategory_id,
            images,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

fn image_from_row(row: &SqliteRow) -> Result<Image, RepositoryError> {
    let position: i64 = row
        .try_get("position")
        .map_err(|e| RepositoryError::Query(e.to_string()))?;
    Ok(Image {
        id: row
            .try_get("id")
            .map_err(|e| RepositoryError::Query(e.to_string()))?,
        product_id: row
            .try_get("product_id")
            .map_err(|e| RepositoryError::Query(e.to_string()))?,
        reference: row
            .try_get("reference")
            .map_err(|e| RepositoryError::Query(e.to_string()))?,
        position: u32::try_from(position)
            .map_err(|_| RepositoryError::Query(format!("invalid image position: {position}")))?,
    })
}

fn category_from_row(row: &SqliteRow) -> Result<Category, sqlx::Error> {
    Ok(Category {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
    })
}

fn subcategory_from_row(row: &SqliteRow) -> Result<Subcategory, sqlx::Error> {
    Ok(Subcategory {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        category_id: row.try_get("category_id")?,
    })
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

fn conflict_or_query(e: sqlx::Error, what: impl FnOnce() -> String) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e {
        if db_err.message().contains("UNIQUE") {
            return RepositoryError::Conflict(what());
        }
    }
    RepositoryError::Query(e.to_string())
}

impl CatalogRepository for SqliteCatalogRepository {
    async fn list_categories(&self) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM categories ORDER BY name")
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        rows.iter()
            .map(category_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| RepositoryError::Query(e.to_string()))
    }

    async fn get_category(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM categories WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        row.as_ref()
            .map(category_from_row)
            .transpose()
            .map_err(|e| RepositoryError::Query(e.to_string()))
    }

    async fn list_subcategories(
        &self,
        category_id: CategoryId,
    ) -> Result<Vec<Subcategory>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM subcategories WHERE category_id = ? ORDER BY name")
            .bind(category_id)
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        rows.iter()
            .map(subcategory_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| RepositoryError::Query(e.to_string()))
    }

    async fn get_subcategory(
        &self,
        id: SubcategoryId,
    ) -> Result<Option<Subcategory>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM subcategories WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        row.as_ref()
            .map(subcategory_from_row)
            .transpose()
            .map_err(|e| RepositoryError::Query(e.to_string()))
    }

    async fn list_products(
        &self,
        subcategory_id: SubcategoryId,
    ) -> Result<Vec<Product>, RepositoryError> {
        self.fetch_products(
            "SELECT * FROM products WHERE subcategory_id = ? ORDER BY name",
            Some(subcategory_id),
        )
        .await
    }

    async fn list_products_by_category_only(
        &self,
        category_id: CategoryId,
    ) -> Result<Vec<Product>, RepositoryError> {
        self.fetch_products(
            "SELECT * FROM products WHERE category_id = ? AND subcategory_id IS NULL ORDER BY name",
            Some(category_id),
        )
        .await
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let mut products = self
            .fetch_products("SELECT * FROM products WHERE id = ?", Some(id))
            .await?;
        Ok(products.pop())
    }

    async fn search_products_by_name(
        &self,
        term: &str,
        limit: u32,
    ) -> Result<Vec<Product>, RepositoryError> {
        // SQLite's LIKE only folds ASCII case, so names are matched here.
        let rows = sqlx::query("SELECT * FROM products ORDER BY name")
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let needle = term.trim().to_lowercase();
        let mut matches = Vec::new();
        for row in &rows {
            let name: String = row
                .try_get("name")
                .map_err(|e| RepositoryError::Query(e.to_string()))?;
            if !name.to_lowercase().contains(&needle) {
                continue;
            }
            matches.push(ProductRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?);
            if matches.len() >= limit as usize {
                break;
            }
        }
        self.hydrate(matches).await
    }

    async fn list_all_products(&self, limit: u32) -> Result<Vec<Product>, RepositoryError> {
        self.fetch_products(
            "SELECT * FROM products ORDER BY name LIMIT ?",
            Some(i64::from(limit)),
        )
        .await
    }

    async fn create_product(&self, product: &NewProduct) -> Result<Product, RepositoryError> {
        let mut tx = self
            .pool
            .writer
            .begin()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let created_at = Utc::now();
        let result = sqlx::query(
            "INSERT INTO products (name, short_description, additional_info, category_id, subcategory_id, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&product.name)
        .bind(&product.short_description)
        .bind(&product.additional_info)
        .bind(product.category_id)
        .bind(product.subcategory_id)
        .bind(format_datetime(&created_at))
        .execute(&mut *tx)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;
        let product_id = result.last_insert_rowid();

        let mut images = Vec::with_capacity(product.images.len());
        for (position, reference) in product.images.iter().enumerate() {
            let result = sqlx::query(
                "INSERT INTO product_images (product_id, reference, position) VALUES (?, ?, ?)",
            )
            .bind(product_id)
            .bind(reference)
            .bind(position as i64)
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
            images.push(Image {
                id: result.last_insert_rowid(),
                product_id,
                reference: reference.clone(),
                position: position as u32,
            });
        }

        // Dropping `tx` on any early return above rolls everything back.
        tx.commit()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(Product {
            id: product_id,
            name: product.name.clone(),
            short_description: product.short_description.clone(),
            additional_info: product.additional_info.clone(),
            category_id: product.category_id,
            subcategory_id: product.subcategory_id,
            images,
            created_at,
        })
    }

    async fn update_product_field(
        &self,
        id: ProductId,
        field: &ProductField,
    ) -> Result<(), RepositoryError> {
        let query = match field {
            ProductField::Name(name) => {
                sqlx::query("UPDATE products SET name = ? WHERE id = ?").bind(name)
            }
            ProductField::ShortDescription(text) => {
                sqlx::query("UPDATE products SET short_description = ? WHERE id = ?").bind(text)
            }
            ProductField::AdditionalInfo(text) => {
                sqlx::query("UPDATE products SET additional_info = ? WHERE id = ?").bind(text)
            }
            ProductField::Placement {
                category_id,
                subcategory_id,
            } => sqlx::query("UPDATE products SET category_id = ?, subcategory_id = ? WHERE id = ?")
                .bind(*category_id)
                .bind(*subcategory_id),
        };

        let result = query
            .bind(id)
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn add_image(
        &self,
        product_id: ProductId,
        reference: &str,
    ) -> Result<Image, RepositoryError> {
        let mut tx = self
            .pool
            .writer
            .begin()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let exists: Option<(i64,)> = sqlx::query_as("SELECT id FROM products WHERE id = ?")
            .bind(product_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        if exists.is_none() {
            return Err(RepositoryError::NotFound);
        }

        let (position,): (i64,) = sqlx::query_as(
            "SELECT COALESCE(MAX(position) + 1, 0) FROM product_images WHERE product_id = ?",
        )
        .bind(product_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let result = sqlx::query(
            "INSERT INTO product_images (product_id, reference, position) VALUES (?, ?, ?)",
        )
        .bind(product_id)
        .bind(reference)
        .bind(position)
        .execute(&mut *tx)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(Image {
            id: result.last_insert_rowid(),
            product_id,
            reference: reference.to_string(),
            position: u32::try_from(position)
                .map_err(|_| RepositoryError::Query(format!("invalid image position: {position}")))?,
        })
    }

    async fn delete_image(&self, id: ImageId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM product_images WHERE id = ?")
            .bind(id)
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn list_images(&self, product_id: ProductId) -> Result<Vec<Image>, RepositoryError> {
        let rows =
            sqlx::query("SELECT * FROM product_images WHERE product_id = ? ORDER BY position")
                .bind(product_id)
                .fetch_all(&self.pool.reader)
                .await
                .map_err(|e| RepositoryError::Query(e.to_string()))?;
        rows.iter().map(image_from_row).collect()
    }

    async fn create_category(&self, name: &str) -> Result<Category, RepositoryError> {
        let result = sqlx::query("INSERT INTO categories (name) VALUES (?)")
            .bind(name)
            .execute(&self.pool.writer)
            .await
            .map_err(|e| conflict_or_query(e, || format!("category '{name}' already exists")))?;

        Ok(Category {
            id: result.last_insert_rowid(),
            name: name.to_string(),
        })
    }

    async fn create_subcategory(
        &self,
        category_id: CategoryId,
        name: &str,
    ) -> Result<Subcategory, RepositoryError> {
        let result = sqlx::query("INSERT INTO subcategories (category_id, name) VALUES (?, ?)")
            .bind(category_id)
            .bind(name)
            .execute(&self.pool.writer)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db_err) if db_err.message().contains("FOREIGN KEY") => {
                    RepositoryError::NotFound
                }
                e => conflict_or_query(e, || format!("subcategory '{name}' already exists")),
            })?;

        Ok(Subcategory {
            id: result.last_insert_rowid(),
            name: name.to_string(),
            category_id,
        })
    }

    async fn delete_product(&self, id: ProductId) -> Result<(), RepositoryError> {
        // Images go with the product via ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
