// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ModelGraph - in-memory EntityGraph implementation

use ifc_toolbox_model::{EntityGraph, EntityId, IfcType, ObjectDefinition};
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Immutable in-memory entity graph
///
/// Holds every object definition of a model together with the aggregation
/// and containment relations. Built once through
/// [`ModelGraphBuilder`](crate::ModelGraphBuilder) or
/// [`ModelGraph::from_entities`]; safe to share across threads.
#[derive(Debug, Default)]
pub struct ModelGraph {
    /// Label -> object
    pub(crate) objects: FxHashMap<u32, Arc<ObjectDefinition>>,
    /// GlobalId -> labels (ascending)
    pub(crate) global_id_index: FxHashMap<String, Vec<EntityId>>,
    /// Type -> labels (ascending)
    pub(crate) type_index: FxHashMap<IfcType, Vec<EntityId>>,
    /// Parent label -> ordered children
    pub(crate) children: FxHashMap<u32, Vec<EntityId>>,
    /// Child label -> parent
    pub(crate) parents: FxHashMap<u32, EntityId>,
    /// Structure label -> directly contained elements
    pub(crate) contains: FxHashMap<u32, Vec<EntityId>>,
}

impl ModelGraph {
    /// Number of aggregation edges
    pub fn aggregation_count(&self) -> usize {
        self.parents.len()
    }

    /// Number of containment edges
    pub fn containment_count(&self) -> usize {
        self.contains.values().map(Vec::len).sum()
    }
}

impl EntityGraph for ModelGraph {
    fn object(&self, id: EntityId) -> Option<Arc<ObjectDefinition>> {
        self.objects.get(&id.0).cloned()
    }

    fn objects_by_global_id(&self, global_id: &str) -> Vec<Arc<ObjectDefinition>> {
        self.global_id_index
            .get(global_id)
            .map(|ids| ids.iter().filter_map(|id| self.object(*id)).collect())
            .unwrap_or_default()
    }

    fn objects_by_type(&self, ifc_type: &IfcType) -> Vec<Arc<ObjectDefinition>> {
        self.type_index
            .get(ifc_type)
            .map(|ids| ids.iter().filter_map(|id| self.object(*id)).collect())
            .unwrap_or_default()
    }

    fn all_ids(&self) -> Vec<EntityId> {
        let mut ids: Vec<EntityId> = self.objects.keys().map(|&id| EntityId(id)).collect();
        ids.sort_unstable();
        ids
    }

    fn decomposed_by(&self, id: EntityId) -> Vec<EntityId> {
        self.children.get(&id.0).cloned().unwrap_or_default()
    }

    fn decomposes(&self, id: EntityId) -> Option<EntityId> {
        self.parents.get(&id.0).copied()
    }

    fn contained_elements(&self, id: EntityId) -> Vec<EntityId> {
        self.contains.get(&id.0).cloned().unwrap_or_default()
    }

    fn object_count(&self) -> usize {
        self.objects.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ModelGraphBuilder;
    use ifc_toolbox_model::EntityGraphExt;

    fn small_graph() -> ModelGraph {
        let mut builder = ModelGraphBuilder::new();
        builder
            .add_object(ObjectDefinition::new(EntityId(1), "p", IfcType::IfcProject))
            .add_object(ObjectDefinition::new(EntityId(4), "s", IfcType::IfcSite))
            .add_object(ObjectDefinition::new(EntityId(10), "w", IfcType::IfcWall))
            .add_object(ObjectDefinition::new(EntityId(11), "w", IfcType::IfcWall))
            .aggregate(EntityId(1), [EntityId(4)])
            .contain(EntityId(4), [EntityId(10), EntityId(11)]);
        builder.build()
    }

    #[test]
    fn test_graph_lookups() {
        let graph = small_graph();

        assert_eq!(graph.object(EntityId(4)).unwrap().ifc_type, IfcType::IfcSite);
        assert!(graph.object(EntityId(99)).is_none());
        assert_eq!(
            graph.all_ids(),
            vec![EntityId(1), EntityId(4), EntityId(10), EntityId(11)]
        );
        assert_eq!(graph.object_count(), 4);
        assert_eq!(graph.objects_by_type(&IfcType::IfcWall).len(), 2);
        assert!(graph.objects_by_type(&IfcType::IfcDoor).is_empty());
    }

    #[test]
    fn test_duplicate_global_ids() {
        let graph = small_graph();

        let walls = graph.objects_by_global_id("w");
        assert_eq!(walls.len(), 2);
        assert_eq!(walls[0].id, EntityId(10));
        assert!(graph.objects_by_global_id("missing").is_empty());
    }

    #[test]
    fn test_relations() {
        let graph = small_graph();

        assert_eq!(graph.decomposed_by(EntityId(1)), vec![EntityId(4)]);
        assert_eq!(graph.decomposes(EntityId(4)), Some(EntityId(1)));
        assert_eq!(graph.decomposes(EntityId(1)), None);
        assert_eq!(
            graph.contained_elements(EntityId(4)),
            vec![EntityId(10), EntityId(11)]
        );
        assert!(graph.contained_elements(EntityId(10)).is_empty());
        assert_eq!(graph.aggregation_count(), 1);
        assert_eq!(graph.containment_count(), 2);
    }

    #[test]
    fn test_product_filter() {
        let graph = small_graph();

        // The project is an object definition but not a product
        assert!(graph.exists(EntityId(1)));
        assert!(graph.product(EntityId(1)).is_none());
        assert!(graph.product(EntityId(4)).is_some());
        assert!(graph.object_or_err(EntityId(42)).is_err());
    }

    #[test]
    fn test_graph_thread_safe() {
        use std::thread;

        let graph = Arc::new(small_graph());

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let graph = Arc::clone(&graph);
                thread::spawn(move || {
                    for id in [1, 4, 10, 11] {
                        assert!(graph.object(EntityId(id)).is_some());
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
    }
}
