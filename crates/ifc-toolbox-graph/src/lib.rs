// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IFC Toolbox Graph - In-memory entity graph
//!
//! This crate provides an immutable, thread-safe graph of IFC object
//! definitions with their aggregation and containment relations. It
//! implements the traits defined in `ifc-toolbox-model`.
//!
//! # Features
//!
//! - **Builder API** for assembling graphs in code
//! - **Decoded entity import** from `IFCRELAGGREGATES` and
//!   `IFCRELCONTAINEDINSPATIALSTRUCTURE` instances
//! - **Hash indices** by label, GlobalId and type
//! - **Hierarchy reader** producing full, typed and per-spatial-type trees
//!
//! # Example
//!
//! ```ignore
//! use ifc_toolbox_graph::ModelGraph;
//! use ifc_toolbox_model::EntityGraph;
//!
//! let graph = ModelGraph::from_entities(decoded_entities)?;
//! println!("{} objects", graph.object_count());
//! ```

mod builder;
mod hierarchy;
mod model;

pub use builder::ModelGraphBuilder;
pub use hierarchy::HierarchyReaderImpl;
pub use model::ModelGraph;
