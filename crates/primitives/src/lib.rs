//! Identifier and distance primitives for the portal content store.
//!
//! Content and nodes share one 256-bit identifier space. How close a piece of
//! content is to a node is measured by a [`Metric`]; stores keep the content
//! that is closest to their own [`NodeId`].

mod distance;
mod id;

pub use distance::{Distance, DistanceFunction, Metric, XorMetric};
pub use id::{ContentId, IdLengthError, NodeId};

/// Length in bytes of content and node identifiers.
pub const ID_LENGTH: usize = 32;
