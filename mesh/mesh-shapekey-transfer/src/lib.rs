//! Proximity-based shape key transfer between meshes.
//!
//! This crate moves shape keys (per-vertex morph targets) from a source mesh
//! onto a destination mesh with unrelated vertex ordering and count, so an
//! index-based copy is impossible. Correspondence is discovered spatially
//! instead: for every destination vertex an expanding-radius search collects
//! the nearby source vertices in the source's basis pose, and each shape key
//! then displaces the destination vertex by the averaged displacement those
//! source vertices undergo between the basis and the key.
//!
//! The pipeline, in order:
//!
//! - [`provision_shape_keys`] - decide which source keys exist on the
//!   destination, creating missing ones as no-op keys
//! - [`CorrespondenceFinder`] / [`find_correspondence`] - expanding-radius
//!   spatial search, computed once per destination vertex
//! - [`blend_delta`] - averaged-displacement blending for one vertex and key
//! - [`transfer_shape_keys`] - the orchestrator driving all of the above;
//!   [`copy_shape_keys`] stops after provisioning
//!
//! Not every destination vertex is guaranteed a correspondence; a vertex can
//! end its search empty-handed. That is a recognized terminal outcome
//! governed by [`TransferParams::skip_unmatched`], not a crash.
//!
//! # Example
//!
//! ```
//! use mesh_shapekey::{MeshSnapshot, ShapeKeyStore};
//! use mesh_shapekey_transfer::{transfer_shape_keys, TransferParams};
//! use nalgebra::Point3;
//!
//! // A two-vertex source mesh with one shape key raising vertex 1.
//! let positions = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)];
//! let source = MeshSnapshot::with_identity_transform(positions.clone());
//! let mut source_keys = ShapeKeyStore::new();
//! source_keys.ensure_basis(&positions);
//! let mut smile = positions.clone();
//! smile[1].z = 0.5;
//! source_keys.add_key("Smile", smile).unwrap();
//!
//! // The destination overlaps the source; its store starts empty.
//! let dest = MeshSnapshot::with_identity_transform(positions);
//! let mut dest_keys = ShapeKeyStore::new();
//!
//! let output = transfer_shape_keys(
//!     &source,
//!     &source_keys,
//!     &dest,
//!     &mut dest_keys,
//!     &TransferParams::default(),
//! )
//! .unwrap();
//!
//! assert_eq!(output.keys_transferred, vec!["Smile".to_owned()]);
//! assert_eq!(output.vertices_matched, 2);
//! let moved = dest_keys.vertex_position("Smile", 1).unwrap();
//! assert!((moved.z - 0.5).abs() < 1e-12);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod blend;
mod cancel;
mod error;
mod params;
mod provision;
mod result;
mod search;
mod transfer;

pub use blend::blend_delta;
pub use cancel::CancelToken;
pub use error::{TransferError, TransferResult};
pub use params::{InclusionMode, ResultSpace, TransferParams};
pub use provision::provision_shape_keys;
pub use result::TransferOutput;
pub use search::{find_correspondence, CorrespondenceFinder};
pub use transfer::{copy_shape_keys, transfer_shape_keys};
