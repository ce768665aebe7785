// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Deduplicated product sets returned by closure computations

use ifc_toolbox_model::{EntityId, ObjectDefinition};
use rustc_hash::FxHashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

/// Set of products keyed by label
///
/// Inserting a product whose label is already present is a no-op, so the
/// same element reached from several seeds or paths appears once.
#[derive(Clone, Debug, Default)]
pub struct ProductSet {
    products: FxHashMap<u32, Arc<ObjectDefinition>>,
}

impl ProductSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a product, returning `true` if it was not present yet
    pub fn insert(&mut self, product: Arc<ObjectDefinition>) -> bool {
        debug_assert!(product.is_product(), "{} is not a product", product.id);
        match self.products.entry(product.id.0) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(product);
                true
            }
        }
    }

    /// Number of products
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Check if the set is empty
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Check membership by label
    pub fn contains(&self, id: EntityId) -> bool {
        self.products.contains_key(&id.0)
    }

    /// Get a product by label
    pub fn get(&self, id: EntityId) -> Option<&Arc<ObjectDefinition>> {
        self.products.get(&id.0)
    }

    /// Iterate products in arbitrary order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<ObjectDefinition>> {
        self.products.values()
    }

    /// Labels in ascending order
    pub fn ids(&self) -> Vec<EntityId> {
        let mut ids: Vec<EntityId> = self.products.keys().map(|&id| EntityId(id)).collect();
        ids.sort_unstable();
        ids
    }

    /// Products sorted by label
    pub fn into_products(self) -> Vec<Arc<ObjectDefinition>> {
        let mut products: Vec<_> = self.products.into_values().collect();
        products.sort_unstable_by_key(|p| p.id);
        products
    }
}

impl Extend<Arc<ObjectDefinition>> for ProductSet {
    fn extend<I: IntoIterator<Item = Arc<ObjectDefinition>>>(&mut self, iter: I) {
        for product in iter {
            self.insert(product);
        }
    }
}

impl FromIterator<Arc<ObjectDefinition>> for ProductSet {
    fn from_iter<I: IntoIterator<Item = Arc<ObjectDefinition>>>(iter: I) -> Self {
        let mut set = ProductSet::new();
        set.extend(iter);
        set
    }
}

impl IntoIterator for ProductSet {
    type Item = Arc<ObjectDefinition>;
    type IntoIter = std::vec::IntoIter<Arc<ObjectDefinition>>;

    fn into_iter(self) -> Self::IntoIter {
        self.into_products().into_iter()
    }
}

impl PartialEq for ProductSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.products.keys().all(|id| other.products.contains_key(id))
    }
}

impl Eq for ProductSet {}
