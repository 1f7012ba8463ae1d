//! Read-only view of a mesh's basis pose.

use nalgebra::{Matrix4, Point3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Immutable basis-pose vertex positions plus the mesh's world transform.
///
/// A snapshot is the geometric input to correspondence queries: positions are
/// local-space and indexed by vertex id, and the 4x4 affine transform maps
/// them into world space. The snapshot never changes for the duration of a
/// transfer.
///
/// # Example
///
/// ```
/// use mesh_shapekey::MeshSnapshot;
/// use nalgebra::{Matrix4, Point3, Vector3};
///
/// let snapshot = MeshSnapshot::new(
///     vec![Point3::new(1.0, 0.0, 0.0)],
///     Matrix4::new_translation(&Vector3::new(0.0, 0.0, 2.0)),
/// );
///
/// let world = snapshot.to_world(snapshot.basis_positions()[0]);
/// assert!((world.z - 2.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MeshSnapshot {
    basis_positions: Vec<Point3<f64>>,
    world_transform: Matrix4<f64>,
}

impl MeshSnapshot {
    /// Creates a snapshot from local-space positions and a world transform.
    #[must_use]
    pub const fn new(basis_positions: Vec<Point3<f64>>, world_transform: Matrix4<f64>) -> Self {
        Self {
            basis_positions,
            world_transform,
        }
    }

    /// Creates a snapshot whose local space coincides with world space.
    #[must_use]
    pub fn with_identity_transform(basis_positions: Vec<Point3<f64>>) -> Self {
        Self::new(basis_positions, Matrix4::identity())
    }

    /// Number of vertices in the snapshot.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.basis_positions.len()
    }

    /// Returns whether the snapshot has no vertices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.basis_positions.is_empty()
    }

    /// The local-space basis positions, indexed by vertex id.
    #[must_use]
    pub fn basis_positions(&self) -> &[Point3<f64>] {
        &self.basis_positions
    }

    /// The mesh's local-to-world transform.
    #[must_use]
    pub const fn world_transform(&self) -> &Matrix4<f64> {
        &self.world_transform
    }

    /// Maps a local-space point into world space.
    #[must_use]
    pub fn to_world(&self, local: Point3<f64>) -> Point3<f64> {
        self.world_transform.transform_point(&local)
    }

    /// The world-to-local inverse transform, or `None` if the world
    /// transform is singular.
    #[must_use]
    pub fn world_inverse(&self) -> Option<Matrix4<f64>> {
        self.world_transform.try_inverse()
    }
}
