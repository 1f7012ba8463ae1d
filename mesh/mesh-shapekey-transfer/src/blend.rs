//! Delta blending of matched source vertices.

use mesh_shapekey::ShapeKey;
use nalgebra::{Point3, Vector3};

/// Derives a destination position for one shape key from matched source
/// vertices.
///
/// The matched vertices' positions are averaged in the source basis and in
/// the target key; the difference between the two averages is the
/// displacement the source edit applies in that neighborhood, and it is added
/// to the destination vertex's world position. With a single matched vertex
/// this degenerates to a closest-point delta copy.
///
/// The function is pure: the same inputs always produce the same output, and
/// the output does not depend on the order of `matched` beyond float
/// rounding. An empty `matched` slice returns the center unchanged; callers
/// treat that case as unmatched and never reach blending with it.
///
/// # Panics
///
/// Panics if an index in `matched` is out of range for either key.
///
/// # Example
///
/// ```
/// use mesh_shapekey::ShapeKey;
/// use mesh_shapekey_transfer::blend_delta;
/// use nalgebra::Point3;
///
/// let basis = ShapeKey::new("Basis", vec![Point3::new(1.0, 0.0, 0.0)]);
/// let smile = ShapeKey::new("Smile", vec![Point3::new(1.0, 0.0, 0.5)]);
///
/// let out = blend_delta(&[0], &basis, &smile, Point3::new(2.0, 0.0, 0.0));
/// assert_eq!(out, Point3::new(2.0, 0.0, 0.5));
/// ```
#[must_use]
pub fn blend_delta(
    matched: &[usize],
    basis: &ShapeKey,
    target: &ShapeKey,
    dest_vertex_world: Point3<f64>,
) -> Point3<f64> {
    if matched.is_empty() {
        return dest_vertex_world;
    }

    let mut avg_basis = Vector3::zeros();
    let mut avg_target = Vector3::zeros();
    for &i in matched {
        avg_basis += basis.positions[i].coords;
        avg_target += target.positions[i].coords;
    }
    #[allow(clippy::cast_precision_loss)]
    let inv = 1.0 / matched.len() as f64;

    dest_vertex_world + (avg_target - avg_basis) * inv
}
