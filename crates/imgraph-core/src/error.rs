//! Error types for graph model operations

use std::fmt;

use thiserror::Error;

/// Result type alias for graph model operations.
pub type Result<T> = std::result::Result<T, GraphError>;

/// Which collection of the model an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Vertex,
    Edge,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Vertex => f.write_str("vertex"),
            EntityKind::Edge => f.write_str("edge"),
        }
    }
}

/// Errors surfaced synchronously by [`GraphModel`](crate::GraphModel).
///
/// Handles are only ever issued by the model, so there is no variant for a
/// foreign or malformed handle: such a handle simply fails to resolve and is
/// reported as [`GraphError::NotFound`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// An add or replace targets an identity already present.
    #[error("{kind} `{key}` already exists")]
    DuplicateKey { kind: EntityKind, key: String },

    /// A handle or key does not resolve to anything in the model.
    #[error("{kind} `{key}` does not belong to the graph")]
    NotFound { kind: EntityKind, key: String },

    /// The vertex is in the model but is not an endpoint of the edge.
    #[error("vertex `{vertex}` is not an endpoint of edge `{edge}`")]
    NotMember { vertex: String, edge: String },
}

impl GraphError {
    pub(crate) fn duplicate(kind: EntityKind, key: impl fmt::Display) -> Self {
        GraphError::DuplicateKey {
            kind,
            key: key.to_string(),
        }
    }

    pub(crate) fn not_found(kind: EntityKind, key: impl fmt::Display) -> Self {
        GraphError::NotFound {
            kind,
            key: key.to_string(),
        }
    }

    /// True for [`GraphError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, GraphError::NotFound { .. })
    }

    /// True for [`GraphError::DuplicateKey`].
    pub fn is_duplicate(&self) -> bool {
        matches!(self, GraphError::DuplicateKey { .. })
    }
}
