// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IFC Toolbox Core - Product closures and hierarchy bundles
//!
//! Given a selection of entities in a loaded model, this crate computes the
//! set of products an extraction has to carry so that the result remains a
//! valid, loadable hierarchy. It also bundles the tree views a selection UI
//! offers.
//!
//! # Example
//!
//! ```ignore
//! use ifc_toolbox_core::{required_products, spatial_trees};
//! use ifc_toolbox_graph::ModelGraph;
//!
//! let graph = ModelGraph::from_entities(decoded_entities)?;
//!
//! // Everything housed by storey #8, plus wall #42
//! let products = required_products(&graph, ["8", "42"]);
//!
//! let trees = spatial_trees(&graph)?;
//! println!("{} storeys", trees.level_nodes[0].children.len());
//! ```

pub mod analyse;
pub mod hierarchy;
mod product_set;

pub use analyse::{
    required_products, required_products_by_global_ids, AncestorMode, ProductAnalyse, SeedRef,
};
pub use hierarchy::{spatial_trees, SpatialTrees, TreesReader};
pub use product_set::ProductSet;
