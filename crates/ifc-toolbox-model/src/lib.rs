// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IFC Toolbox Model - Trait definitions and shared types for model extraction
//!
//! This crate provides the core abstractions for working with the object graph
//! of a loaded IFC (Industry Foundation Classes) model. It defines traits that
//! can be implemented by different graph backends, allowing the extraction
//! algorithms to work in a backend-agnostic way.
//!
//! # Architecture
//!
//! The crate is organized around two traits:
//!
//! - [`EntityGraph`] - Object lookup plus the aggregation and containment relations
//! - [`HierarchyReader`] - Tree views over a graph for presentation and selection
//!
//! # Example
//!
//! ```ignore
//! use ifc_toolbox_model::{EntityGraph, EntityGraphExt, EntityId};
//!
//! let graph: &dyn EntityGraph = get_graph();
//! if let Some(storey) = graph.product(EntityId(8)) {
//!     for element in graph.contained_elements(storey.id) {
//!         println!("contains {}", element);
//!     }
//! }
//! ```

pub mod error;
pub mod graph;
pub mod hierarchy;
pub mod types;

// Re-export all public types
pub use error::*;
pub use graph::*;
pub use hierarchy::*;
pub use types::*;
