// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Entity graph trait for looking up objects and walking their relations

use crate::{EntityId, IfcType, ObjectDefinition};
use std::sync::Arc;

/// Read-only query surface over a loaded model
///
/// Exposes object definitions by label, global id and type, plus the two
/// relations the extraction algorithms reconcile: aggregation
/// (`decomposed_by` / `decomposes`) and spatial containment
/// (`contained_elements`). Implementations should provide O(1) lookup by
/// label.
///
/// # Example
///
/// ```ignore
/// use ifc_toolbox_model::{EntityGraph, EntityId};
///
/// fn print_children(graph: &dyn EntityGraph, id: EntityId) {
///     for child in graph.decomposed_by(id) {
///         if let Some(object) = graph.object(child) {
///             println!("{} {}", object.ifc_type, object.display_name());
///         }
///     }
/// }
/// ```
pub trait EntityGraph: Send + Sync {
    /// Get object definition by label
    fn object(&self, id: EntityId) -> Option<Arc<ObjectDefinition>>;

    /// Get all object definitions carrying a global id
    ///
    /// Global ids are not guaranteed unique within a load, hence the vector.
    fn objects_by_global_id(&self, global_id: &str) -> Vec<Arc<ObjectDefinition>>;

    /// Get all object definitions of a specific type
    fn objects_by_type(&self, ifc_type: &IfcType) -> Vec<Arc<ObjectDefinition>>;

    /// Get all object labels in the model, in ascending order
    fn all_ids(&self) -> Vec<EntityId>;

    /// Ordered children of an object in the aggregation tree
    fn decomposed_by(&self, id: EntityId) -> Vec<EntityId>;

    /// Parent of an object in the aggregation tree, if any
    fn decomposes(&self, id: EntityId) -> Option<EntityId>;

    /// Products directly housed by a spatial structure element
    fn contained_elements(&self, id: EntityId) -> Vec<EntityId>;

    /// Get total object count
    fn object_count(&self) -> usize {
        self.all_ids().len()
    }
}

/// Extension methods for EntityGraph
pub trait EntityGraphExt: EntityGraph {
    /// Get object by label, only if it is a product
    fn product(&self, id: EntityId) -> Option<Arc<ObjectDefinition>> {
        self.object(id).filter(|object| object.is_product())
    }

    /// Get all products carrying a global id
    fn products_by_global_id(&self, global_id: &str) -> Vec<Arc<ObjectDefinition>> {
        self.objects_by_global_id(global_id)
            .into_iter()
            .filter(|object| object.is_product())
            .collect()
    }

    /// Check if an object exists
    fn exists(&self, id: EntityId) -> bool {
        self.object(id).is_some()
    }

    /// Get object or return error
    fn object_or_err(&self, id: EntityId) -> crate::Result<Arc<ObjectDefinition>> {
        self.object(id).ok_or(crate::ToolboxError::EntityNotFound(id))
    }
}

// Blanket implementation for all EntityGraph types
impl<T: EntityGraph + ?Sized> EntityGraphExt for T {}
