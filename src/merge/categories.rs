//! Category reconciliation across documents.
//!
//! The output category list is built incrementally. The first document's
//! categories are taken verbatim; each later document is reconciled against
//! what has been accumulated so far and yields a remap table from its own
//! category ids to output ids.

use std::collections::HashMap;

use crate::coco::{Category, CategoryId};
use crate::error::ValidationError;

/// Original category id (within one document) to output category id.
pub type CategoryMap = HashMap<CategoryId, CategoryId>;

#[derive(Debug, Default)]
pub struct CategoryTable {
    categories: Vec<Category>,
    by_id: HashMap<CategoryId, usize>,
    /// First output id recorded for each name.
    by_name: HashMap<String, CategoryId>,
}

impl CategoryTable {
    /// Seeds the table from the first document, ids preserved.
    pub fn seed(first: &[Category]) -> (Self, CategoryMap) {
        let mut table = Self::default();
        let mut map = CategoryMap::with_capacity(first.len());
        for cat in first {
            table.push(cat.clone());
            map.insert(cat.id, cat.id);
        }
        (table, map)
    }

    /// Reconciles a later document's categories.
    ///
    /// By name: a category joins the first output category of the same
    /// (case-sensitive) name, or is appended under a fresh id.
    ///
    /// By id: an id already recorded with the same name maps to itself. A
    /// name already recorded under a different id is a conflict. An id
    /// already taken by another name is moved to a fresh id. Anything else
    /// is appended unchanged.
    pub fn reconcile(
        &mut self,
        categories: &[Category],
        document: &str,
        align_by_name: bool,
    ) -> Result<CategoryMap, ValidationError> {
        let mut map = CategoryMap::with_capacity(categories.len());

        for cat in categories {
            let target = if align_by_name {
                match self.by_name.get(&cat.name) {
                    Some(&existing) => existing,
                    None => self.append_fresh(cat, document)?,
                }
            } else {
                self.reconcile_by_id(cat, document)?
            };
            map.insert(cat.id, target);
        }

        Ok(map)
    }

    pub fn into_categories(self) -> Vec<Category> {
        self.categories
    }

    fn reconcile_by_id(
        &mut self,
        cat: &Category,
        document: &str,
    ) -> Result<CategoryId, ValidationError> {
        let recorded_name = self
            .by_id
            .get(&cat.id)
            .map(|&idx| self.categories[idx].name.as_str());

        if recorded_name == Some(cat.name.as_str()) {
            return Ok(cat.id);
        }

        if let Some(&existing_id) = self.by_name.get(&cat.name) {
            return Err(ValidationError::CategoryConflict {
                document: document.to_string(),
                name: cat.name.clone(),
                id: cat.id.as_u64(),
                existing_id: existing_id.as_u64(),
            });
        }

        if let Some(taken_by) = recorded_name {
            let taken_by = taken_by.to_string();
            let fresh = self.append_fresh(cat, document)?;
            log::warn!(
                "{document}: category id {} is already used by '{}'; '{}' moved to id {}",
                cat.id,
                taken_by,
                cat.name,
                fresh
            );
            return Ok(fresh);
        }

        self.push(cat.clone());
        Ok(cat.id)
    }

    /// Appends `cat` under `max existing id + 1`.
    fn append_fresh(
        &mut self,
        cat: &Category,
        document: &str,
    ) -> Result<CategoryId, ValidationError> {
        let max = self
            .categories
            .iter()
            .map(|c| c.id.as_u64())
            .max()
            .unwrap_or(0);
        let id = max
            .checked_add(1)
            .map(CategoryId::new)
            .ok_or_else(|| ValidationError::CategoryIdExhausted {
                document: document.to_string(),
                name: cat.name.clone(),
            })?;
        let mut fresh = cat.clone();
        fresh.id = id;
        self.push(fresh);
        Ok(id)
    }

    fn push(&mut self, cat: Category) {
        self.by_id.entry(cat.id).or_insert(self.categories.len());
        self.by_name.entry(cat.name.clone()).or_insert(cat.id);
        self.categories.push(cat);
    }
}
