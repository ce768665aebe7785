// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tree bundle for splitter selection UIs

use ifc_toolbox_graph::HierarchyReaderImpl;
use ifc_toolbox_model::{EntityGraph, HierarchyNode, HierarchyReader, Result};
use serde::{Deserialize, Serialize};

/// Spatial type names of the per-kind trees
const SITE_TYPE: &str = "IfcSite";
const BUILDING_TYPE: &str = "IfcBuilding";
const LEVEL_TYPE: &str = "IfcBuildingStorey";

/// Independent tree views over one model
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SpatialTrees {
    /// Full aggregation tree
    pub full_nodes: Vec<HierarchyNode>,
    /// Element groups, one per entity type
    pub typed_nodes: Vec<HierarchyNode>,
    /// Sites with their sub-hierarchies
    pub site_nodes: Vec<HierarchyNode>,
    /// Buildings with their sub-hierarchies
    pub building_nodes: Vec<HierarchyNode>,
    /// Storeys with their sub-hierarchies
    pub level_nodes: Vec<HierarchyNode>,
}

impl SpatialTrees {
    /// Encode the bundle as JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Assembles [`SpatialTrees`] from a hierarchy reader
pub struct TreesReader;

impl TreesReader {
    /// Build every tree view with the given reader
    ///
    /// Errors are those of the reader.
    pub fn spatial_trees(
        reader: &dyn HierarchyReader,
        model: &dyn EntityGraph,
    ) -> Result<SpatialTrees> {
        let trees = SpatialTrees {
            full_nodes: vec![reader.full_hierarchy(model)?],
            typed_nodes: reader.typed_hierarchy(model)?.children,
            site_nodes: vec![reader.spatial_hierarchy(model, SITE_TYPE)?],
            building_nodes: vec![reader.spatial_hierarchy(model, BUILDING_TYPE)?],
            level_nodes: vec![reader.spatial_hierarchy(model, LEVEL_TYPE)?],
        };
        log::debug!(
            "Assembled spatial trees: {} type groups",
            trees.typed_nodes.len()
        );
        Ok(trees)
    }
}

/// Build every tree view with the default reader
pub fn spatial_trees(model: &dyn EntityGraph) -> Result<SpatialTrees> {
    TreesReader::spatial_trees(&HierarchyReaderImpl, model)
}
