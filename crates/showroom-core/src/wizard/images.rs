//! Image collector logic.
//!
//! The `ImageCollector` struct lives in `showroom-types`; this module
//! provides an extension trait (`ImageCollectorExt`) with the bounded,
//! insertion-ordered operations both wizards use.

use showroom_types::error::CollectorError;
use showroom_types::session::{CollectedImage, ImageCollector};

/// Images shown per page when listing.
pub const IMAGE_PAGE_SIZE: usize = 10;

pub trait ImageCollectorExt {
    /// Append a reference under a fresh collector-local key.
    fn add(&mut self, reference: String) -> Result<u64, CollectorError>;

    /// Append an image that already has a key (a persisted image id).
    fn insert_keyed(&mut self, key: u64, reference: String) -> Result<(), CollectorError>;

    /// Fail with `CapacityExceeded` when no more images fit.
    fn ensure_room(&self) -> Result<(), CollectorError>;

    fn remove(&mut self, key: u64) -> Result<CollectedImage, CollectorError>;

    fn list(&self) -> &[CollectedImage];

    /// Zero-based page of at most `IMAGE_PAGE_SIZE` images. Out-of-range
    /// pages are empty.
    fn page(&self, page: u32) -> &[CollectedImage];

    fn page_count(&self) -> u32;

    /// Fail with `EmptyCollection` when fewer than the minimum are held.
    fn done(&self) -> Result<(), CollectorError>;

    /// References in insertion order.
    fn references(&self) -> Vec<String>;
}

impl ImageCollectorExt for ImageCollector {
    fn add(&mut self, reference: String) -> Result<u64, CollectorError> {
        self.ensure_room()?;
        let key = self.next_key;
        self.next_key += 1;
        self.items.push(CollectedImage { key, reference });
        Ok(key)
    }

    fn insert_keyed(&mut self, key: u64, reference: String) -> Result<(), CollectorError> {
        self.ensure_room()?;
        self.next_key = self.next_key.max(key + 1);
        self.items.push(CollectedImage { key, reference });
        Ok(())
    }

    fn ensure_room(&self) -> Result<(), CollectorError> {
        if self.items.len() >= self.capacity {
            Err(CollectorError::CapacityExceeded {
                capacity: self.capacity,
            })
        } else {
            Ok(())
        }
    }

    fn remove(&mut self, key: u64) -> Result<CollectedImage, CollectorError> {
        let index = self
            .items
            .iter()
            .position(|item| item.key == key)
            .ok_or(CollectorError::NotFound(key))?;
        Ok(self.items.remove(index))
    }

    fn list(&self) -> &[CollectedImage] {
        &self.items
    }

    fn page(&self, page: u32) -> &[CollectedImage] {
        self.items
            .chunks(IMAGE_PAGE_SIZE)
            .nth(page as usize)
            .unwrap_or(&[])
    }

    fn page_count(&self) -> u32 {
        self.items.len().div_ceil(IMAGE_PAGE_SIZE) as u32
    }

    fn done(&self) -> Result<(), CollectorError> {
        if self.items.len() < self.minimum {
            Err(CollectorError::EmptyCollection {
                minimum: self.minimum,
            })
        } else {
            Ok(())
        }
    }

    fn references(&self) -> Vec<String> {
        self.items.iter().map(|i| i.reference.clone()).collect()
    }
}
