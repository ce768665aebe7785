// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for graph queries and hierarchy building

use crate::EntityId;
use thiserror::Error;

/// Result type alias for toolbox operations
pub type Result<T> = std::result::Result<T, ToolboxError>;

/// Errors that can occur while querying or assembling model graphs
///
/// Unresolvable seeds and cyclic aggregation are not errors: they shrink or
/// truncate results instead.
#[derive(Error, Debug)]
pub enum ToolboxError {
    /// Caller supplied an argument that cannot be used
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Entity not found
    #[error("Entity {0} not found")]
    EntityNotFound(EntityId),

    /// Relationship attribute does not hold the expected reference(s)
    #[error("Invalid entity reference at {entity}: attribute {attribute}")]
    InvalidReference { entity: EntityId, attribute: usize },

    /// JSON encoding or decoding failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ToolboxError {
    /// Create a new invalid argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        ToolboxError::InvalidArgument(msg.into())
    }
}
