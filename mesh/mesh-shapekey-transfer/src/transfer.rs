//! Transfer orchestration across destination vertices and shape keys.

use crate::search::CorrespondenceFinder;
use crate::{
    blend_delta, provision_shape_keys, ResultSpace, TransferError, TransferOutput,
    TransferParams, TransferResult,
};
use mesh_shapekey::{MeshSnapshot, Point3, ShapeKey, ShapeKeyError, ShapeKeyStore};
use rayon::prelude::*;
use tracing::{info, trace, warn};

/// Destination-vertex count above which per-vertex work runs in parallel.
///
/// Each vertex reads only the immutable source snapshot and writes only its
/// own slot of every destination key, so vertices parallelize freely; writes
/// still happen serially in index order afterwards.
const PARALLEL_THRESHOLD: usize = 1000;

/// Per-vertex result of the correspondence-and-blend stage.
enum VertexOutcome {
    /// One blended position per worklist key.
    Matched(Vec<Point3<f64>>),
    /// No source vertices in range after exhausting the retry budget.
    Unmatched,
    /// Cancellation observed before this vertex was computed.
    Cancelled,
}

/// Transfers the source mesh's shape keys onto the destination mesh by
/// geometric proximity.
///
/// For every destination vertex the source correspondence is searched once,
/// in the source's local metric, and the cached match set then feeds the
/// delta blend of every provisioned key. Keys missing on the destination are
/// created first; see [`provision_shape_keys`] for the inclusion policy.
///
/// A vertex whose search exhausts its retry budget either aborts the call
/// (`skip_unmatched = false`) or is left untouched for every key while the
/// transfer continues (`skip_unmatched = true`); the returned
/// [`TransferOutput`] lists the skipped vertices either way.
///
/// # Errors
///
/// - [`TransferError::EmptySourceMesh`] / [`TransferError::EmptyDestinationMesh`]
///   if either snapshot has no vertices
/// - [`TransferError::NoSourceShapeKeys`] if the source store is empty
/// - [`TransferError::InvalidIncrementRadius`] /
///   [`TransferError::NonInvertibleTransform`] /
///   [`TransferError::KeyLengthMismatch`] for inconsistent inputs
/// - [`TransferError::UnmatchedVertex`] when a vertex finds no correspondence
///   and skipping is disabled
/// - [`TransferError::Cancelled`] when the attached token fires
///
/// Input validation runs before the destination store is touched; validation
/// failures leave it exactly as it was.
///
/// # Example
///
/// ```
/// use mesh_shapekey::{MeshSnapshot, ShapeKeyStore};
/// use mesh_shapekey_transfer::{transfer_shape_keys, TransferParams};
/// use nalgebra::Point3;
///
/// let positions = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)];
///
/// let source = MeshSnapshot::with_identity_transform(positions.clone());
/// let mut source_keys = ShapeKeyStore::new();
/// source_keys.ensure_basis(&positions);
/// let mut smile = positions.clone();
/// smile[1].z = 0.5;
/// source_keys.add_key("Smile", smile).unwrap();
///
/// let dest = MeshSnapshot::with_identity_transform(positions.clone());
/// let mut dest_keys = ShapeKeyStore::new();
///
/// let output = transfer_shape_keys(
///     &source,
///     &source_keys,
///     &dest,
///     &mut dest_keys,
///     &TransferParams::default(),
/// )
/// .unwrap();
///
/// assert_eq!(output.keys_transferred, vec!["Smile".to_owned()]);
/// let moved = dest_keys.vertex_position("Smile", 1).unwrap();
/// assert!((moved.z - 0.5).abs() < 1e-12);
/// ```
pub fn transfer_shape_keys(
    source: &MeshSnapshot,
    source_keys: &ShapeKeyStore,
    dest: &MeshSnapshot,
    dest_keys: &mut ShapeKeyStore,
    params: &TransferParams,
) -> TransferResult<TransferOutput> {
    validate_inputs(source, source_keys, dest, params)?;

    let dest_inverse = match params.result_space {
        ResultSpace::World => None,
        ResultSpace::DestinationLocal => Some(dest.world_inverse().ok_or(
            TransferError::NonInvertibleTransform {
                mesh: "destination",
            },
        )?),
    };
    let finder = CorrespondenceFinder::new(source, params)?;

    let worklist = provision_worklist(source_keys, dest, dest_keys, params)?;
    if worklist.is_empty() {
        info!("no shape keys pass the inclusion policy; nothing to transfer");
        return Ok(TransferOutput::default());
    }

    let src_basis = source_keys
        .basis()
        .ok_or(TransferError::NoSourceShapeKeys)?;
    let mut src_targets: Vec<&ShapeKey> = Vec::with_capacity(worklist.len());
    for name in &worklist {
        let key = source_keys
            .key(name)
            .ok_or_else(|| TransferError::Store(ShapeKeyError::UnknownKey(name.clone())))?;
        src_targets.push(key);
    }

    let dest_basis: Vec<Point3<f64>> = dest_keys
        .basis()
        .map(|k| k.positions.clone())
        .unwrap_or_default();
    let vertex_count = dest_basis.len();

    info!(
        source_vertices = source.vertex_count(),
        dest_vertices = vertex_count,
        keys = worklist.len(),
        "transferring shape keys"
    );

    // Per vertex: correspondence once, then every key blends from the cached
    // match set.
    let process = |i: usize| -> VertexOutcome {
        if params.is_cancelled() {
            return VertexOutcome::Cancelled;
        }
        let world = dest.to_world(dest_basis[i]);
        let matched = finder.find(world);
        if matched.is_empty() {
            return VertexOutcome::Unmatched;
        }
        trace!(vertex = i, matched = matched.len(), "matched source vertices");

        let mut positions = Vec::with_capacity(src_targets.len());
        for &target in &src_targets {
            let mut blended = blend_delta(&matched, src_basis, target, world);
            if let Some(inverse) = &dest_inverse {
                blended = inverse.transform_point(&blended);
            }
            positions.push(blended);
        }
        VertexOutcome::Matched(positions)
    };

    let outcomes: Vec<VertexOutcome> = if vertex_count > PARALLEL_THRESHOLD {
        (0..vertex_count).into_par_iter().map(&process).collect()
    } else {
        (0..vertex_count).map(&process).collect()
    };

    let mut output = TransferOutput {
        keys_transferred: worklist.clone(),
        ..TransferOutput::default()
    };

    for (i, outcome) in outcomes.into_iter().enumerate() {
        match outcome {
            VertexOutcome::Cancelled => {
                info!(vertex = i, "transfer cancelled");
                return Err(TransferError::Cancelled { vertex: i });
            }
            VertexOutcome::Unmatched => {
                let key = worklist[0].clone();
                warn!(vertex = i, key = %key, "no source vertices in range");
                if !params.skip_unmatched {
                    return Err(TransferError::UnmatchedVertex { vertex: i, key });
                }
                output.vertices_skipped += 1;
                output.skipped_vertices.push(i);
                output.diagnostics.push(format!(
                    "failed to find surrounding vertices for destination vertex {i} \
                     at shape key \"{key}\"; try increasing the increment radius"
                ));
            }
            VertexOutcome::Matched(positions) => {
                for (name, position) in worklist.iter().zip(positions) {
                    dest_keys.set_vertex_position(name, i, position)?;
                }
                output.vertices_matched += 1;
            }
        }
    }

    info!(
        keys = output.keys_transferred.len(),
        matched = output.vertices_matched,
        skipped = output.vertices_skipped,
        "shape key transfer complete"
    );
    Ok(output)
}

/// Provisions the destination's shape keys without transferring geometry.
///
/// Runs the same validation and provisioning as [`transfer_shape_keys`] and
/// stops there: missing keys are stubbed in as no-op copies of the
/// destination basis, existing keys keep their geometry, and no blending
/// happens.
///
/// # Errors
///
/// Same input-validation conditions as [`transfer_shape_keys`].
pub fn copy_shape_keys(
    source: &MeshSnapshot,
    source_keys: &ShapeKeyStore,
    dest: &MeshSnapshot,
    dest_keys: &mut ShapeKeyStore,
    params: &TransferParams,
) -> TransferResult<TransferOutput> {
    validate_inputs(source, source_keys, dest, params)?;
    let worklist = provision_worklist(source_keys, dest, dest_keys, params)?;

    info!(keys = worklist.len(), "copied shape keys without geometry transfer");
    Ok(TransferOutput {
        keys_transferred: worklist,
        ..TransferOutput::default()
    })
}

/// Fatal-for-the-call input checks, run before any mutation.
fn validate_inputs(
    source: &MeshSnapshot,
    source_keys: &ShapeKeyStore,
    dest: &MeshSnapshot,
    params: &TransferParams,
) -> TransferResult<()> {
    if params.increment_radius <= 0.0 {
        return Err(TransferError::InvalidIncrementRadius(
            params.increment_radius,
        ));
    }
    if source.is_empty() {
        return Err(TransferError::EmptySourceMesh);
    }
    if dest.is_empty() {
        return Err(TransferError::EmptyDestinationMesh);
    }
    if source_keys.is_empty() {
        return Err(TransferError::NoSourceShapeKeys);
    }
    for key in source_keys {
        if key.len() != source.vertex_count() {
            return Err(TransferError::KeyLengthMismatch {
                name: key.name.clone(),
                expected: source.vertex_count(),
                got: key.len(),
            });
        }
    }
    Ok(())
}

/// Ensures the destination basis exists and matches the destination's vertex
/// count, then provisions the worklist.
fn provision_worklist(
    source_keys: &ShapeKeyStore,
    dest: &MeshSnapshot,
    dest_keys: &mut ShapeKeyStore,
    params: &TransferParams,
) -> TransferResult<Vec<String>> {
    {
        let basis = dest_keys.ensure_basis(dest.basis_positions());
        if basis.len() != dest.vertex_count() {
            return Err(TransferError::KeyLengthMismatch {
                name: basis.name.clone(),
                expected: dest.vertex_count(),
                got: basis.len(),
            });
        }
    }
    let source_names: Vec<String> = source_keys.names().map(str::to_owned).collect();
    provision_shape_keys(&source_names, dest_keys, dest.basis_positions(), params)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use nalgebra::Matrix4;

    fn source_with_keys(positions: &[Point3<f64>]) -> ShapeKeyStore {
        let mut store = ShapeKeyStore::new();
        store.ensure_basis(positions);
        store
    }

    #[test]
    fn empty_source_mesh_is_fatal() {
        let source = MeshSnapshot::with_identity_transform(Vec::new());
        let source_keys = ShapeKeyStore::new();
        let dest = MeshSnapshot::with_identity_transform(vec![Point3::origin()]);
        let mut dest_keys = ShapeKeyStore::new();

        let result = transfer_shape_keys(
            &source,
            &source_keys,
            &dest,
            &mut dest_keys,
            &TransferParams::default(),
        );
        assert!(matches!(result, Err(TransferError::EmptySourceMesh)));
        // Validation failed before provisioning could touch the store.
        assert!(dest_keys.is_empty());
    }

    #[test]
    fn missing_source_keys_are_fatal() {
        let positions = vec![Point3::origin()];
        let source = MeshSnapshot::with_identity_transform(positions.clone());
        let source_keys = ShapeKeyStore::new();
        let dest = MeshSnapshot::with_identity_transform(positions);
        let mut dest_keys = ShapeKeyStore::new();

        let result = transfer_shape_keys(
            &source,
            &source_keys,
            &dest,
            &mut dest_keys,
            &TransferParams::default(),
        );
        assert!(matches!(result, Err(TransferError::NoSourceShapeKeys)));
        assert!(dest_keys.is_empty());
    }

    #[test]
    fn source_key_length_mismatch_is_fatal() {
        let positions = vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0)];
        let source = MeshSnapshot::with_identity_transform(positions.clone());
        let mut source_keys = ShapeKeyStore::new();
        source_keys.ensure_basis(&positions[..1]);
        let dest = MeshSnapshot::with_identity_transform(positions);
        let mut dest_keys = ShapeKeyStore::new();

        let result = transfer_shape_keys(
            &source,
            &source_keys,
            &dest,
            &mut dest_keys,
            &TransferParams::default(),
        );
        assert!(matches!(
            result,
            Err(TransferError::KeyLengthMismatch { expected: 2, got: 1, .. })
        ));
    }

    #[test]
    fn singular_source_transform_is_fatal_before_provisioning() {
        let positions = vec![Point3::origin()];
        let source = MeshSnapshot::new(positions.clone(), Matrix4::zeros());
        let source_keys = source_with_keys(&positions);
        let dest = MeshSnapshot::with_identity_transform(positions);
        let mut dest_keys = ShapeKeyStore::new();

        let result = transfer_shape_keys(
            &source,
            &source_keys,
            &dest,
            &mut dest_keys,
            &TransferParams::default(),
        );
        assert!(matches!(
            result,
            Err(TransferError::NonInvertibleTransform { mesh: "source" })
        ));
        assert!(dest_keys.is_empty());
    }

    #[test]
    fn basis_only_source_transfers_nothing() {
        let positions = vec![Point3::origin()];
        let source = MeshSnapshot::with_identity_transform(positions.clone());
        let source_keys = source_with_keys(&positions);
        let dest = MeshSnapshot::with_identity_transform(positions);
        let mut dest_keys = ShapeKeyStore::new();

        let output = transfer_shape_keys(
            &source,
            &source_keys,
            &dest,
            &mut dest_keys,
            &TransferParams::default(),
        )
        .unwrap();

        assert!(output.keys_transferred.is_empty());
        assert_eq!(output.vertices_matched, 0);
    }
}
