//! Imgraph Core — keyed graph model, key derivation, and presentation reconciliation

pub mod error;
pub mod keys;
pub mod model;
pub mod graph;
pub mod diff;
pub mod placement;
pub mod reconcile;


pub use error::{EntityKind, GraphError, Result};
pub use keys::{DisplayKey, FileNameKey, KeyDerivation};
pub use model::{Edge, EdgeId, EdgeKey, Vertex, VertexId};
pub use graph::GraphModel;
pub use diff::GraphDiff;
pub use placement::{Bounds, GridPlacement, Placement, Point, RandomPlacement};
pub use reconcile::{CreateVisuals, Presentation, Reconciler};
