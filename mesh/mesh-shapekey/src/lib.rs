//! Shape key (morph target) storage for mesh pipelines.
//!
//! This crate provides the foundational types for working with per-vertex
//! morph targets:
//!
//! - [`ShapeKey`] - A named full-mesh alternate pose, one position per vertex
//! - [`ShapeKeyStore`] - An ordered, named collection of shape keys for one mesh
//! - [`MeshSnapshot`] - A read-only view of a mesh's basis pose and world transform
//!
//! # Coordinate Spaces
//!
//! Two spaces matter throughout: *local* (mesh-object space, in which all
//! stored positions live) and *world* (after applying the mesh's transform).
//! [`MeshSnapshot`] owns the conversion between the two; nothing in this
//! crate mixes spaces implicitly.
//!
//! # The Basis Pose
//!
//! The key named `"Basis"` (or `"basis"`) represents the undisplaced pose.
//! When present it is always the first entry of a [`ShapeKeyStore`], and
//! stores synthesize it lazily from the mesh's current vertex positions via
//! [`ShapeKeyStore::ensure_basis`].
//!
//! # Example
//!
//! ```
//! use mesh_shapekey::{ShapeKeyStore, MeshSnapshot};
//! use nalgebra::Point3;
//!
//! let positions = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//! ];
//!
//! let mut store = ShapeKeyStore::new();
//! store.ensure_basis(&positions);
//!
//! let mut smile = positions.clone();
//! smile[1].z = 0.25;
//! store.add_key("Smile", smile).unwrap();
//!
//! assert_eq!(store.names().collect::<Vec<_>>(), vec!["Basis", "Smile"]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod error;
mod key;
mod snapshot;
mod store;

pub use error::{ShapeKeyError, ShapeKeyResult};
pub use key::{is_basis_name, ShapeKey, BASIS_ALIASES};
pub use snapshot::MeshSnapshot;
pub use store::ShapeKeyStore;

// Re-export nalgebra types for convenience
pub use nalgebra::{Matrix4, Point3, Vector3};
