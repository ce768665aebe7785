// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Hierarchy trees for presentation and selection

use crate::{EntityGraph, EntityId, GlobalId, ObjectDefinition, ObjectKind, Result, SpatialKind};
use serde::{Deserialize, Serialize};

/// Type of hierarchy node
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HierarchyNodeType {
    /// IfcProject - root of the hierarchy
    Project,
    /// IfcSite - geographic site
    Site,
    /// IfcBuilding - a building structure
    Building,
    /// IfcBuildingStorey - a floor/level
    Storey,
    /// IfcSpace - a room or area
    Space,
    /// IFC4x3 Facility (road, bridge, etc.)
    Facility,
    /// IFC4x3 Facility part
    FacilityPart,
    /// Spatial structure of an unlisted type
    Structure,
    /// Building element (wall, door, etc.)
    Element,
    /// Synthetic grouping node with no backing entity
    Group,
}

impl HierarchyNodeType {
    /// Get display name for UI
    pub fn display_name(&self) -> &'static str {
        match self {
            HierarchyNodeType::Project => "Project",
            HierarchyNodeType::Site => "Site",
            HierarchyNodeType::Building => "Building",
            HierarchyNodeType::Storey => "Storey",
            HierarchyNodeType::Space => "Space",
            HierarchyNodeType::Facility => "Facility",
            HierarchyNodeType::FacilityPart => "Facility Part",
            HierarchyNodeType::Structure => "Spatial Structure",
            HierarchyNodeType::Element => "Element",
            HierarchyNodeType::Group => "Group",
        }
    }

    /// Determine node type from an object classification
    pub fn from_kind(kind: ObjectKind) -> Self {
        match kind {
            ObjectKind::Context => HierarchyNodeType::Project,
            ObjectKind::Spatial(SpatialKind::Site) => HierarchyNodeType::Site,
            ObjectKind::Spatial(SpatialKind::Building) => HierarchyNodeType::Building,
            ObjectKind::Spatial(SpatialKind::Storey) => HierarchyNodeType::Storey,
            ObjectKind::Spatial(SpatialKind::Space) => HierarchyNodeType::Space,
            ObjectKind::Spatial(SpatialKind::Facility) => HierarchyNodeType::Facility,
            ObjectKind::Spatial(SpatialKind::FacilityPart) => HierarchyNodeType::FacilityPart,
            ObjectKind::Spatial(SpatialKind::Other) => HierarchyNodeType::Structure,
            ObjectKind::Element => HierarchyNodeType::Element,
        }
    }
}

/// Node in a hierarchy tree
///
/// Either backed by an object of the model (`id` is set) or a synthetic
/// group such as a type bucket.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HierarchyNode {
    /// Entity label, `None` for group nodes
    pub id: Option<EntityId>,
    /// IFC GlobalId, `None` for group nodes
    pub global_id: Option<GlobalId>,
    /// Type of node
    pub node_type: HierarchyNodeType,
    /// Display name
    pub name: String,
    /// IFC entity type name (e.g., "IFCWALL")
    pub entity_type: String,
    /// Child nodes
    pub children: Vec<HierarchyNode>,
}

impl HierarchyNode {
    /// Create a node for a model object
    pub fn from_object(object: &ObjectDefinition) -> Self {
        Self {
            id: Some(object.id),
            global_id: Some(object.global_id.clone()),
            node_type: HierarchyNodeType::from_kind(object.kind),
            name: object.display_name().to_string(),
            entity_type: object.ifc_type.name().to_string(),
            children: Vec::new(),
        }
    }

    /// Create a synthetic group node
    pub fn group(name: impl Into<String>, entity_type: impl Into<String>) -> Self {
        Self {
            id: None,
            global_id: None,
            node_type: HierarchyNodeType::Group,
            name: name.into(),
            entity_type: entity_type.into(),
            children: Vec::new(),
        }
    }

    /// Add a child node
    pub fn add_child(&mut self, child: HierarchyNode) {
        self.children.push(child);
    }

    /// Check if this is a synthetic group
    pub fn is_group(&self) -> bool {
        self.node_type == HierarchyNodeType::Group
    }

    /// Get total element count (recursive)
    pub fn element_count(&self) -> usize {
        self.iter()
            .filter(|n| n.node_type == HierarchyNodeType::Element)
            .count()
    }

    /// Find a node by label (depth-first)
    pub fn find(&self, id: EntityId) -> Option<&HierarchyNode> {
        self.iter().find(|n| n.id == Some(id))
    }

    /// Iterate all nodes (depth-first)
    pub fn iter(&self) -> HierarchyNodeIter<'_> {
        HierarchyNodeIter { stack: vec![self] }
    }

    /// Get all element labels in this subtree
    pub fn element_ids(&self) -> Vec<EntityId> {
        self.iter()
            .filter(|n| n.node_type == HierarchyNodeType::Element)
            .filter_map(|n| n.id)
            .collect()
    }
}

/// Iterator over hierarchy nodes (depth-first)
pub struct HierarchyNodeIter<'a> {
    stack: Vec<&'a HierarchyNode>,
}

impl<'a> Iterator for HierarchyNodeIter<'a> {
    type Item = &'a HierarchyNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        // Add children in reverse order so first child is processed first
        for child in node.children.iter().rev() {
            self.stack.push(child);
        }
        Some(node)
    }
}

/// Hierarchy-reading collaborator
///
/// Builds trees over an entity graph under named strategies. Callers wrap
/// the returned roots; they do not depend on how the reader shapes them
/// beyond the [`HierarchyNode`] type.
///
/// # Example
///
/// ```ignore
/// use ifc_toolbox_model::HierarchyReader;
///
/// let tree = reader.full_hierarchy(&graph)?;
/// for child in &tree.children {
///     println!("{}: {}", child.node_type.display_name(), child.name);
/// }
/// ```
pub trait HierarchyReader: Send + Sync {
    /// Full aggregation tree, with contained elements under their structure
    fn full_hierarchy(&self, model: &dyn EntityGraph) -> Result<HierarchyNode>;

    /// Elements grouped by entity type under a synthetic root
    fn typed_hierarchy(&self, model: &dyn EntityGraph) -> Result<HierarchyNode>;

    /// Sub-hierarchies of every object of one spatial type
    ///
    /// # Arguments
    /// * `type_name` - Spatial type name such as "IfcSite", "IfcBuilding" or
    ///   "IfcBuildingStorey" (case-insensitive)
    fn spatial_hierarchy(&self, model: &dyn EntityGraph, type_name: &str)
        -> Result<HierarchyNode>;
}
