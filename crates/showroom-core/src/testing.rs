//! In-memory catalog shared by the core tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use showroom_types::catalog::{
    Category, CategoryId, Image, ImageId, NewProduct, Product, ProductField, ProductId,
    Subcategory, SubcategoryId,
};
use showroom_types::error::RepositoryError;

use crate::repository::catalog::CatalogRepository;

#[derive(Default)]
struct State {
    next_id: i64,
    categories: Vec<Category>,
    subcategories: Vec<Subcategory>,
    /// Stored without images; `hydrate` attaches them on read.
    products: Vec<Product>,
    images: Vec<Image>,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn hydrate(&self, product: &Product) -> Product {
        let mut images: Vec<Image> = self
            .images
            .iter()
            .filter(|i| i.product_id == product.id)
            .cloned()
            .collect();
        images.sort_by_key(|i| i.position);
        Product {
            images,
            ..product.clone()
        }
    }

    fn sorted(&self, mut products: Vec<Product>) -> Vec<Product> {
        products.sort_by(|a, b| a.name.cmp(&b.name));
        products.iter().map(|p| self.hydrate(p)).collect()
    }
}

pub(crate) struct InMemoryCatalog {
    state: Mutex<State>,
    fail_writes: AtomicBool,
}

impl InMemoryCatalog {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Make every write fail with a query error until reset.
    pub(crate) fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn add_category(&self, name: &str) -> CategoryId {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        state.categories.push(Category {
            id,
            name: name.to_string(),
        });
        id
    }

    pub(crate) fn add_subcategory(&self, category_id: CategoryId, name: &str) -> SubcategoryId {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        state.subcategories.push(Subcategory {
            id,
            name: name.to_string(),
            category_id,
        });
        id
    }

    pub(crate) fn add_product(
        &self,
        name: &str,
        category_id: Option<CategoryId>,
        subcategory_id: Option<SubcategoryId>,
        images: &[&str],
    ) -> ProductId {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        state.products.push(Product {
            id,
            name: name.to_string(),
            short_description: format!("{name} for every home"),
            additional_info: String::new(),
            category_id,
            subcategory_id,
            images: Vec::new(),
            created_at: Utc::now(),
        });
        for (position, reference) in images.iter().enumerate() {
            let image_id = state.next_id();
            state.images.push(Image {
                id: image_id,
                product_id: id,
                reference: reference.to_string(),
                position: position as u32,
            });
        }
        id
    }

    pub(crate) fn remove_category(&self, id: CategoryId) {
        let mut state = self.state.lock().unwrap();
        state.categories.retain(|c| c.id != id);
        state.subcategories.retain(|s| s.category_id != id);
    }

    pub(crate) fn remove_subcategory(&self, id: SubcategoryId) {
        self.state
            .lock()
            .unwrap()
            .subcategories
            .retain(|s| s.id != id);
    }

    pub(crate) fn product_count(&self) -> usize {
        self.state.lock().unwrap().products.len()
    }

    pub(crate) fn image_count(&self) -> usize {
        self.state.lock().unwrap().images.len()
    }

    fn check_writable(&self) -> Result<(), RepositoryError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(RepositoryError::Query("disk I/O error".to_string()))
        } else {
            Ok(())
        }
    }
}

impl CatalogRepository for InMemoryCatalog {
    async fn list_categories(&self) -> Result<Vec<Category>, RepositoryError> {
        let mut categories = self.state.lock().unwrap().categories.clone();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn get_category(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        let state = self.state.lock().unwrap();
        Ok(state.categories.iter().find(|c| c.id == id).cloned())
    }

    async fn list_subcategories(
        &self,
        category_id: CategoryId,
    ) -> Result<Vec<Subcategory>, RepositoryError> {
        let state = self.state.lock().unwrap();
        let mut subs: Vec<Subcategory> = state
            .subcategories
            .iter()
            .filter(|s| s.category_id == category_id)
            .cloned()
            .collect();
        subs.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(subs)
    }

    async fn get_subcategory(
        &self,
        id: SubcategoryId,
    ) -> Result<Option<Subcategory>, RepositoryError> {
        let state = self.state.lock().unwrap();
        Ok(state.subcategories.iter().find(|s| s.id == id).cloned())
    }

    async fn list_products(
        &self,
        subcategory_id: SubcategoryId,
    ) -> Result<Vec<Product>, RepositoryError> {
        let state = self.state.lock().unwrap();
        let products = state
            .products
            .iter()
            .filter(|p| p.subcategory_id == Some(subcategory_id))
            .cloned()
            .collect();
        Ok(state.sorted(products))
    }

    async fn list_products_by_category_only(
        &self,
        category_id: CategoryId,
    ) -> Result<Vec<Product>, RepositoryError> {
        let state = self.state.lock().unwrap();
        let products = state
            .products
            .iter()
            .filter(|p| p.category_id == Some(category_id) && p.subcategory_id.is_none())
            .cloned()
            .collect();
        Ok(state.sorted(products))
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .products
            .iter()
            .find(|p| p.id == id)
            .map(|p| state.hydrate(p)))
    }

    async fn search_products_by_name(
        &self,
        term: &str,
        limit: u32,
    ) -> Result<Vec<Product>, RepositoryError> {
        let needle = term.to_lowercase();
        let state = self.state.lock().unwrap();
        let products = state
            .products
            .iter()
            .filter(|p| p.name.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        let mut found = state.sorted(products);
        found.truncate(limit as usize);
        Ok(found)
    }

    async fn list_all_products(&self, limit: u32) -> Result<Vec<Product>, RepositoryError> {
        let state = self.state.lock().unwrap();
        let mut all = state.sorted(state.products.clone());
        all.truncate(limit as usize);
        Ok(all)
    }

    async fn create_product(&self, product: &NewProduct) -> Result<Product, RepositoryError> {
        self.check_writable()?;
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        let row = Product {
            id,
            name: product.name.clone(),
            short_description: product.short_description.clone(),
            additional_info: product.additional_info.clone(),
            category_id: product.category_id,
            subcategory_id: product.subcategory_id,
            images: Vec::new(),
            created_at: Utc::now(),
        };
        state.products.push(row.clone());
        for (position, reference) in product.images.iter().enumerate() {
            let image_id = state.next_id();
            state.images.push(Image {
                id: image_id,
                product_id: id,
                reference: reference.clone(),
                position: position as u32,
            });
        }
        Ok(state.hydrate(&row))
    }

    async fn update_product_field(
        &self,
        id: ProductId,
        field: &ProductField,
    ) -> Result<(), RepositoryError> {
        self.check_writable()?;
        let mut state = self.state.lock().unwrap();
        let product = state
            .products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(RepositoryError::NotFound)?;
        match field {
            ProductField::Name(name) => product.name = name.clone(),
            ProductField::ShortDescription(text) => product.short_description = text.clone(),
            ProductField::AdditionalInfo(text) => product.additional_info = text.clone(),
            ProductField::Placement {
                category_id,
                subcategory_id,
            } => {
                product.category_id = Some(*category_id);
                product.subcategory_id = *subcategory_id;
            }
        }
        Ok(())
    }

    async fn add_image(
        &self,
        product_id: ProductId,
        reference: &str,
    ) -> Result<Image, RepositoryError> {
        self.check_writable()?;
        let mut state = self.state.lock().unwrap();
        if !state.products.iter().any(|p| p.id == product_id) {
            return Err(RepositoryError::NotFound);
        }
        let position = state
            .images
            .iter()
            .filter(|i| i.product_id == product_id)
            .map(|i| i.position + 1)
            .max()
            .unwrap_or(0);
        let id = state.next_id();
        let image = Image {
            id,
            product_id,
            reference: reference.to_string(),
            position,
        };
        state.images.push(image.clone());
        Ok(image)
    }

    async fn delete_image(&self, id: ImageId) -> Result<(), RepositoryError> {
        self.check_writable()?;
        let mut state = self.state.lock().unwrap();
        let before = state.images.len();
        state.images.retain(|i| i.id != id);
        if state.images.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn list_images(&self, product_id: ProductId) -> Result<Vec<Image>, RepositoryError> {
        let state = self.state.lock().unwrap();
        let mut images: Vec<Image> = state
            .images
            .iter()
            .filter(|i| i.product_id == product_id)
            .cloned()
            .collect();
        images.sort_by_key(|i| i.position);
        Ok(images)
    }

    async fn create_category(&self, name: &str) -> Result<Category, RepositoryError> {
        self.check_writable()?;
        let id = self.add_category(name);
        Ok(Category {
            id,
            name: name.to_string(),
        })
    }

    async fn create_subcategory(
        &self,
        category_id: CategoryId,
        name: &str,
    ) -> Result<Subcategory, RepositoryError> {
        self.check_writable()?;
        let id = self.add_subcategory(category_id, name);
        Ok(Subcategory {
            id,
            name: name.to_string(),
            category_id,
        })
    }

    async fn delete_product(&self, id: ProductId) -> Result<(), RepositoryError> {
        self.check_writable()?;
        let mut state = self.state.lock().unwrap();
        let before = state.products.len();
        state.products.retain(|p| p.id != id);
        if state.products.len() == before {
            return Err(RepositoryError::NotFound);
        }
        state.images.retain(|i| i.product_id != id);
        Ok(())
    }
}
