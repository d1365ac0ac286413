//! Processed / unprocessed views derived from the catalog and the ledger.

use std::collections::HashSet;

use serde::Serialize;

use crate::catalog::ImageCatalog;
use crate::error::LabelResult;
use crate::ledger::{LabelEntry, LabelLedger};
use crate::natural::natural_sort;

/// Identifiers that have at least one ledger entry. Duplicates collapse.
pub fn processed_set(entries: &[LabelEntry]) -> HashSet<String> {
    entries.iter().map(|e| e.image_name.clone()).collect()
}

/// Catalog progress at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Progress {
    /// Catalog images in natural order.
    pub images: Vec<String>,
    /// Every identifier present in the ledger, stale ones included, in
    /// natural order.
    pub processed: Vec<String>,
    /// Catalog images with at least one label.
    pub processed_count: usize,
}

impl Progress {
    pub fn build(images: Vec<String>, processed: &HashSet<String>) -> Self {
        let processed_count = images.iter().filter(|name| processed.contains(*name)).count();
        let mut processed: Vec<String> = processed.iter().cloned().collect();
        natural_sort(&mut processed);
        Self {
            images,
            processed,
            processed_count,
        }
    }

    pub fn total(&self) -> usize {
        self.images.len()
    }

    pub fn remaining(&self) -> usize {
        self.total() - self.processed_count
    }
}

/// Result of asking for the next image to label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextImage {
    /// First catalog image, in natural order, without a label.
    Pending {
        image_name: String,
        total: usize,
        processed: usize,
    },
    /// Every catalog image has a label.
    Exhausted { total: usize, processed: usize },
}

pub struct ProgressTracker<'a> {
    catalog: &'a ImageCatalog,
    ledger: &'a LabelLedger,
}

impl<'a> ProgressTracker<'a> {
    pub fn new(catalog: &'a ImageCatalog, ledger: &'a LabelLedger) -> Self {
        Self { catalog, ledger }
    }

    pub async fn processed_set(&self) -> LabelResult<HashSet<String>> {
        Ok(processed_set(&self.ledger.read_all().await?))
    }

    pub async fn progress(&self) -> LabelResult<Progress> {
        let images = self.catalog.list_images().await?;
        let processed = self.processed_set().await?;
        Ok(Progress::build(images, &processed))
    }

    /// Next unlabeled image. `None` when the catalog is empty.
    pub async fn next_unprocessed(&self) -> LabelResult<Option<NextImage>> {
        let images = self.catalog.list_images().await?;
        if images.is_empty() {
            return Ok(None);
        }
        let done = self.processed_set().await?;
        let total = images.len();
        let processed = images.iter().filter(|name| done.contains(*name)).count();

        Ok(Some(match images.into_iter().find(|name| !done.contains(name)) {
            Some(image_name) => NextImage::Pending {
                image_name,
                total,
                processed,
            },
            None => NextImage::Exhausted { total, processed },
        }))
    }
}
