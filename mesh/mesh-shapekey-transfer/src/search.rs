//! Expanding-radius vertex correspondence search.
//!
//! For one destination vertex the search finds the source vertices sitting
//! inside a sphere around it, growing the sphere by a fixed increment until
//! something is found or the retry budget runs out. The destination point and
//! the radius are both converted into the source mesh's local metric first,
//! so differing world transforms between the two meshes cannot skew the
//! comparison.

use crate::{TransferError, TransferParams, TransferResult};
use kiddo::{KdTree, SquaredEuclidean};
use mesh_shapekey::MeshSnapshot;
use nalgebra::{Matrix4, Point3, Vector3};

/// Spatial index over a source snapshot's basis-pose vertices.
///
/// Building the index costs one pass over the source vertices; every
/// subsequent [`find`](Self::find) reuses it. The finder never mutates the
/// snapshot and the same snapshot and parameters always produce the same
/// match set.
///
/// # Example
///
/// ```
/// use mesh_shapekey::MeshSnapshot;
/// use mesh_shapekey_transfer::{CorrespondenceFinder, TransferParams};
/// use nalgebra::Point3;
///
/// let source = MeshSnapshot::with_identity_transform(vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
/// ]);
///
/// let params = TransferParams::default();
/// let finder = CorrespondenceFinder::new(&source, &params).unwrap();
///
/// assert_eq!(finder.find(Point3::new(1.0, 0.0, 0.0)), vec![1]);
/// ```
pub struct CorrespondenceFinder<'a> {
    snapshot: &'a MeshSnapshot,
    world_inverse: Matrix4<f64>,
    /// Length of a unit world-space offset mapped through `world_inverse`;
    /// converts world radii into the source's local metric.
    unit_scale: f64,
    tree: KdTree<f64, 3>,
    increment_radius: f64,
    max_increments: u32,
    use_single_nearest: bool,
}

impl<'a> CorrespondenceFinder<'a> {
    /// Builds a finder over the snapshot's basis positions.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::InvalidIncrementRadius`] if the configured
    /// increment is not positive, or
    /// [`TransferError::NonInvertibleTransform`] if the snapshot's world
    /// transform is singular.
    pub fn new(snapshot: &'a MeshSnapshot, params: &TransferParams) -> TransferResult<Self> {
        if params.increment_radius <= 0.0 {
            return Err(TransferError::InvalidIncrementRadius(
                params.increment_radius,
            ));
        }
        let world_inverse = snapshot
            .world_inverse()
            .ok_or(TransferError::NonInvertibleTransform { mesh: "source" })?;
        let unit_scale = world_inverse.transform_vector(&Vector3::z()).norm();

        let mut tree: KdTree<f64, 3> = KdTree::new();
        for (i, p) in snapshot.basis_positions().iter().enumerate() {
            tree.add(&[p.x, p.y, p.z], i as u64);
        }

        Ok(Self {
            snapshot,
            world_inverse,
            unit_scale,
            tree,
            increment_radius: params.increment_radius,
            max_increments: params.max_increments,
            use_single_nearest: params.use_single_nearest,
        })
    }

    /// Finds the matched source vertex indices for one destination vertex.
    ///
    /// The first attempt probes at radius zero, so a destination vertex that
    /// coincides with a source vertex matches immediately; each retry widens
    /// the sphere by the configured increment. An exhausted retry budget
    /// yields an empty vector, the recognized unmatched outcome.
    ///
    /// Returned indices are ascending. In single-nearest mode the set is
    /// reduced to the strictly closest vertex, exact-distance ties going to
    /// the lowest index.
    #[must_use]
    pub fn find(&self, dest_vertex_world: Point3<f64>) -> Vec<usize> {
        if self.snapshot.is_empty() {
            return Vec::new();
        }
        let local_center = self.world_inverse.transform_point(&dest_vertex_world);

        for attempt in 0..=self.max_increments {
            let world_radius = f64::from(attempt) * self.increment_radius;
            let local_radius = world_radius * self.unit_scale;
            let matched = self.in_range(local_center, local_radius);
            if self.use_single_nearest {
                if let Some(closest) = self.closest(local_center, &matched) {
                    return vec![closest];
                }
            } else if !matched.is_empty() {
                return matched;
            }
        }
        Vec::new()
    }

    /// Source vertex indices within `local_radius` of `local_center`,
    /// ascending. The boundary is inclusive.
    fn in_range(&self, local_center: Point3<f64>, local_radius: f64) -> Vec<usize> {
        let query = [local_center.x, local_center.y, local_center.z];
        let radius_sq = local_radius * local_radius;
        // The tree query is padded; the exact inclusive test below decides
        // membership, zero-radius probes included.
        let padded = radius_sq * 1.01 + 1e-12;
        let mut hits: Vec<usize> = self
            .tree
            .within::<SquaredEuclidean>(&query, padded)
            .into_iter()
            .map(|n| {
                #[allow(clippy::cast_possible_truncation)]
                let index = n.item as usize;
                index
            })
            .filter(|&i| {
                (self.snapshot.basis_positions()[i] - local_center).norm_squared() <= radius_sq
            })
            .collect();
        hits.sort_unstable();
        hits
    }

    /// The strictly closest candidate to `local_center`; ties go to the
    /// lowest index because `candidates` is ascending.
    fn closest(&self, local_center: Point3<f64>, candidates: &[usize]) -> Option<usize> {
        let mut best_index = None;
        let mut best_dist = f64::INFINITY;
        for &i in candidates {
            let dist = (self.snapshot.basis_positions()[i] - local_center).norm_squared();
            if dist < best_dist {
                best_dist = dist;
                best_index = Some(i);
            }
        }
        best_index
    }
}

/// One-shot correspondence search for a single destination vertex.
///
/// Builds a throwaway index and runs one query. Callers processing many
/// destination vertices should construct a [`CorrespondenceFinder`] once and
/// reuse it instead.
///
/// # Errors
///
/// Same conditions as [`CorrespondenceFinder::new`].
pub fn find_correspondence(
    dest_vertex_world: Point3<f64>,
    source: &MeshSnapshot,
    params: &TransferParams,
) -> TransferResult<Vec<usize>> {
    Ok(CorrespondenceFinder::new(source, params)?.find(dest_vertex_world))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use nalgebra::Matrix4;

    fn triangle_snapshot() -> MeshSnapshot {
        MeshSnapshot::with_identity_transform(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ])
    }

    #[test]
    fn exact_position_matches_at_zero_radius() {
        let source = triangle_snapshot();
        let params = TransferParams::default();
        let finder = CorrespondenceFinder::new(&source, &params).unwrap();

        assert_eq!(finder.find(Point3::new(1.0, 0.0, 0.0)), vec![1]);
        assert_eq!(finder.find(Point3::new(0.0, 0.0, 0.0)), vec![0]);
    }

    #[test]
    fn single_nearest_tie_goes_to_lowest_index() {
        let source = MeshSnapshot::with_identity_transform(vec![
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(-1.0, 0.0, 0.0),
            Point3::new(0.0, 3.0, 0.0),
        ]);
        let params = TransferParams::new()
            .with_increment_radius(0.5)
            .with_max_increments(2);
        let finder = CorrespondenceFinder::new(&source, &params).unwrap();

        // Both axis vertices sit exactly 1.0 away from the query.
        assert_eq!(finder.find(Point3::origin()), vec![0]);
    }

    #[test]
    fn multi_mode_collects_everything_in_range() {
        let source = MeshSnapshot::with_identity_transform(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.2, 0.0, 0.0),
            Point3::new(5.0, 0.0, 0.0),
        ]);
        let params = TransferParams::new()
            .with_increment_radius(0.15)
            .with_max_increments(3)
            .with_single_nearest(false);
        let finder = CorrespondenceFinder::new(&source, &params).unwrap();

        assert_eq!(finder.find(Point3::new(0.1, 0.0, 0.0)), vec![0, 1]);
    }

    #[test]
    fn radius_grows_until_a_match_appears() {
        let source = MeshSnapshot::with_identity_transform(vec![Point3::new(0.9, 0.0, 0.0)]);
        let params = TransferParams::new()
            .with_increment_radius(0.25)
            .with_max_increments(4);
        let finder = CorrespondenceFinder::new(&source, &params).unwrap();

        // 0.9 away: radii 0, 0.25, 0.5, 0.75 miss, 1.0 hits.
        assert_eq!(finder.find(Point3::origin()), vec![0]);
    }

    #[test]
    fn exhausted_budget_yields_empty() {
        let source = MeshSnapshot::with_identity_transform(vec![Point3::new(10.0, 0.0, 0.0)]);
        let params = TransferParams::new()
            .with_increment_radius(1.0)
            .with_max_increments(3);
        let finder = CorrespondenceFinder::new(&source, &params).unwrap();

        assert!(finder.find(Point3::origin()).is_empty());
    }

    #[test]
    fn radius_is_measured_in_the_source_local_metric() {
        // The source is scaled up 2x in world space, so a world radius of r
        // covers only r/2 in source-local units.
        let source = MeshSnapshot::new(
            vec![Point3::new(1.0, 0.0, 0.0)],
            Matrix4::new_scaling(2.0),
        );
        let params = TransferParams::new()
            .with_increment_radius(0.25)
            .with_max_increments(2);
        let finder = CorrespondenceFinder::new(&source, &params).unwrap();

        // World (2.4, 0, 0) is local (1.2, 0, 0): 0.2 local units from the
        // vertex. World radius 0.25 maps to local 0.125 and misses; the
        // second increment maps to local 0.25 and hits.
        assert_eq!(finder.find(Point3::new(2.4, 0.0, 0.0)), vec![0]);

        // One increment of budget is not enough.
        let tight = TransferParams::new()
            .with_increment_radius(0.25)
            .with_max_increments(1);
        let finder = CorrespondenceFinder::new(&source, &tight).unwrap();
        assert!(finder.find(Point3::new(2.4, 0.0, 0.0)).is_empty());
    }

    #[test]
    fn exact_match_survives_a_nonuniform_transform() {
        let source = MeshSnapshot::new(
            vec![Point3::new(0.0, 0.0, 1.0), Point3::new(0.5, 0.5, 0.5)],
            Matrix4::new_nonuniform_scaling(&Vector3::new(1.0, 1.0, 4.0)),
        );
        let params = TransferParams::default();
        let finder = CorrespondenceFinder::new(&source, &params).unwrap();

        assert_eq!(finder.find(Point3::new(0.0, 0.0, 4.0)), vec![0]);
    }

    #[test]
    fn search_is_deterministic() {
        let source = triangle_snapshot();
        let params = TransferParams::new().with_single_nearest(false);
        let finder = CorrespondenceFinder::new(&source, &params).unwrap();

        let query = Point3::new(0.4, 0.4, 0.0);
        let first = finder.find(query);
        let second = finder.find(query);
        assert_eq!(first, second);

        let one_shot = find_correspondence(query, &source, &params).unwrap();
        assert_eq!(first, one_shot);
    }

    #[test]
    fn empty_snapshot_never_matches() {
        let source = MeshSnapshot::with_identity_transform(Vec::new());
        let params = TransferParams::default();
        let finder = CorrespondenceFinder::new(&source, &params).unwrap();

        assert!(finder.find(Point3::origin()).is_empty());
    }

    #[test]
    fn invalid_radius_is_rejected() {
        let source = triangle_snapshot();
        let params = TransferParams::new().with_increment_radius(0.0);

        assert!(matches!(
            CorrespondenceFinder::new(&source, &params),
            Err(TransferError::InvalidIncrementRadius(_))
        ));
    }

    #[test]
    fn singular_transform_is_rejected() {
        let source = MeshSnapshot::new(vec![Point3::origin()], Matrix4::zeros());
        let params = TransferParams::default();

        assert!(matches!(
            CorrespondenceFinder::new(&source, &params),
            Err(TransferError::NonInvertibleTransform { mesh: "source" })
        ));
    }
}
