// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ModelGraph construction from objects or decoded STEP entities

use crate::ModelGraph;
use ifc_toolbox_model::{
    DecodedEntity, EntityId, GlobalId, IfcType, ObjectDefinition, ObjectKind, Result,
    SpatialKind, ToolboxError,
};
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::Arc;

/// GlobalId attribute index shared by all rooted entities
const GLOBAL_ID_ATTR: usize = 0;
/// Name attribute index shared by all rooted entities
const NAME_ATTR: usize = 2;

/// IfcRelAggregates.RelatingObject
const AGGREGATES_RELATING: usize = 4;
/// IfcRelAggregates.RelatedObjects
const AGGREGATES_RELATED: usize = 5;
/// IfcRelContainedInSpatialStructure.RelatedElements
const CONTAINED_RELATED: usize = 4;
/// IfcRelContainedInSpatialStructure.RelatingStructure
const CONTAINED_RELATING: usize = 5;

/// Incremental builder for [`ModelGraph`]
///
/// Relations may reference labels that are never added as objects; such
/// edges are kept and simply resolve to nothing during traversal.
#[derive(Debug, Default)]
pub struct ModelGraphBuilder {
    objects: FxHashMap<u32, ObjectDefinition>,
    children: FxHashMap<u32, Vec<EntityId>>,
    parents: FxHashMap<u32, EntityId>,
    contains: FxHashMap<u32, Vec<EntityId>>,
}

impl ModelGraphBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object definition, replacing any object with the same label
    pub fn add_object(&mut self, object: ObjectDefinition) -> &mut Self {
        if let Some(previous) = self.objects.insert(object.id.0, object) {
            log::warn!("Object {} added twice, keeping the last definition", previous.id);
        }
        self
    }

    /// Record that `parent` is decomposed into `children` (in order)
    ///
    /// A child has at most one parent. A second, different parent is ignored
    /// with a warning.
    pub fn aggregate(
        &mut self,
        parent: EntityId,
        children: impl IntoIterator<Item = EntityId>,
    ) -> &mut Self {
        for child in children {
            match self.parents.get(&child.0) {
                Some(existing) if *existing == parent => continue,
                Some(existing) => {
                    log::warn!(
                        "{} already decomposes {}, ignoring second parent {}",
                        child,
                        existing,
                        parent
                    );
                    continue;
                }
                None => {}
            }
            self.parents.insert(child.0, parent);
            self.children.entry(parent.0).or_default().push(child);
        }
        self
    }

    /// Record that `structure` directly contains `elements`
    pub fn contain(
        &mut self,
        structure: EntityId,
        elements: impl IntoIterator<Item = EntityId>,
    ) -> &mut Self {
        let contained = self.contains.entry(structure.0).or_default();
        for element in elements {
            if !contained.contains(&element) {
                contained.push(element);
            }
        }
        self
    }

    /// Check whether an object with this label was added
    pub fn has_object(&self, id: EntityId) -> bool {
        self.objects.contains_key(&id.0)
    }

    /// Finish the graph and build its lookup indices
    pub fn build(self) -> ModelGraph {
        let mut global_id_index: FxHashMap<String, Vec<EntityId>> = FxHashMap::default();
        let mut type_index: FxHashMap<IfcType, Vec<EntityId>> = FxHashMap::default();

        for object in self.objects.values() {
            global_id_index
                .entry(object.global_id.as_str().to_string())
                .or_default()
                .push(object.id);
            type_index
                .entry(object.ifc_type.clone())
                .or_default()
                .push(object.id);
        }
        for ids in global_id_index.values_mut().chain(type_index.values_mut()) {
            ids.sort_unstable();
        }

        let objects = self
            .objects
            .into_iter()
            .map(|(id, object)| (id, Arc::new(object)))
            .collect();

        let graph = ModelGraph {
            objects,
            global_id_index,
            type_index,
            children: self.children,
            parents: self.parents,
            contains: self.contains,
        };
        log::debug!(
            "Built model graph: {} objects, {} aggregation edges, {} containment edges",
            graph.objects.len(),
            graph.aggregation_count(),
            graph.containment_count()
        );
        graph
    }
}

impl ModelGraph {
    /// Build a graph from already decoded STEP entities
    ///
    /// Object definitions are recognised by type; `IFCRELAGGREGATES` and
    /// `IFCRELCONTAINEDINSPATIALSTRUCTURE` instances become relations.
    /// Entities of unlisted types are classified from their use: the relating
    /// structure of a containment is spatial, anything else a relationship
    /// refers to is an element. Unreferenced entities of unlisted types are
    /// kept as elements when they carry a compressed GlobalId and are not a
    /// known non-product family (type objects, property sets, groups and
    /// the like).
    ///
    /// # Errors
    /// Returns [`ToolboxError::InvalidReference`] when a relationship lacks
    /// its relating reference or its related list.
    pub fn from_entities(entities: impl IntoIterator<Item = DecodedEntity>) -> Result<Self> {
        let mut relations = Vec::new();
        let mut unclassified: FxHashMap<u32, DecodedEntity> = FxHashMap::default();
        let mut builder = ModelGraphBuilder::new();

        for entity in entities {
            if entity.ifc_type.is_relationship() {
                if let Some(relation) = Relation::decode(&entity)? {
                    relations.push(relation);
                }
            } else if let Some(kind) = entity.ifc_type.object_kind() {
                builder.add_object(object_from_entity(&entity, kind));
            } else {
                unclassified.insert(entity.id.0, entity);
            }
        }

        let structures: FxHashSet<EntityId> = relations
            .iter()
            .filter(|relation| relation.containment)
            .map(|relation| relation.relating)
            .collect();

        for relation in &relations {
            for id in std::iter::once(relation.relating).chain(relation.related.iter().copied()) {
                if builder.has_object(id) {
                    continue;
                }
                match unclassified.remove(&id.0) {
                    Some(entity) => {
                        let kind = if structures.contains(&id) {
                            ObjectKind::Spatial(SpatialKind::Other)
                        } else {
                            ObjectKind::Element
                        };
                        builder.add_object(object_from_entity(&entity, kind));
                    }
                    None => log::warn!("{} refers to missing entity {}", relation.source, id),
                }
            }
        }

        let mut kept = 0usize;
        for entity in unclassified.into_values() {
            if is_unlisted_product(&entity) {
                builder.add_object(object_from_entity(&entity, ObjectKind::Element));
                kept += 1;
            }
        }
        if kept > 0 {
            log::debug!("Kept {} unreferenced products of unlisted types", kept);
        }

        for relation in relations {
            if relation.containment {
                builder.contain(relation.relating, relation.related);
            } else {
                builder.aggregate(relation.relating, relation.related);
            }
        }

        Ok(builder.build())
    }
}

/// Aggregation or containment edge set read from one relationship entity
struct Relation {
    source: EntityId,
    containment: bool,
    relating: EntityId,
    related: Vec<EntityId>,
}

impl Relation {
    /// Read the relation, or `None` for relationship types that are not
    /// part of the decomposition graphs
    fn decode(rel: &DecodedEntity) -> Result<Option<Self>> {
        let (relating, related, containment) = match rel.ifc_type {
            IfcType::IfcRelAggregates => (AGGREGATES_RELATING, AGGREGATES_RELATED, false),
            IfcType::IfcRelContainedInSpatialStructure => {
                (CONTAINED_RELATING, CONTAINED_RELATED, true)
            }
            _ => return Ok(None),
        };

        let relating_id = rel.get_ref(relating).ok_or(ToolboxError::InvalidReference {
            entity: rel.id,
            attribute: relating,
        })?;
        let related_ids = rel.get_refs(related).ok_or(ToolboxError::InvalidReference {
            entity: rel.id,
            attribute: related,
        })?;

        Ok(Some(Relation {
            source: rel.id,
            containment,
            relating: relating_id,
            related: related_ids,
        }))
    }
}

/// Rooted entity of an unlisted type that may be a product
fn is_unlisted_product(entity: &DecodedEntity) -> bool {
    !entity.ifc_type.is_non_product_root()
        && entity
            .get_string(GLOBAL_ID_ATTR)
            .is_some_and(GlobalId::is_compressed)
}

fn object_from_entity(entity: &DecodedEntity, kind: ObjectKind) -> ObjectDefinition {
    let global_id = entity.get_string(GLOBAL_ID_ATTR).unwrap_or_default();
    let mut object = ObjectDefinition::new(
        entity.id,
        GlobalId::new(global_id),
        entity.ifc_type.clone(),
    )
    .with_kind(kind);
    if let Some(name) = entity.get_string(NAME_ATTR) {
        object = object.with_name(name);
    }
    object
}
