//! Destination shape-key provisioning.

use crate::{TransferParams, TransferResult};
use mesh_shapekey::{Point3, ShapeKeyStore};
use tracing::debug;

/// Decides which source keys transfer and creates the missing ones.
///
/// If the destination store is empty, a basis is synthesized from
/// `dest_basis_positions` first. Each source key name is then run through the
/// inclusion policy in order: names that pass and are missing from the
/// destination are created as no-op copies of the destination basis, ready
/// for blending to fill in; names that pass and already exist keep their
/// geometry and are simply re-included, so a name collision means "refresh
/// this key". Basis aliases and the default-excluded set never pass,
/// regardless of mode.
///
/// Returns the ordered worklist of key names to blend.
///
/// # Errors
///
/// Returns a store error if a created key's position count disagrees with the
/// destination store's vertex count.
///
/// # Example
///
/// ```
/// use mesh_shapekey::ShapeKeyStore;
/// use mesh_shapekey_transfer::{provision_shape_keys, TransferParams};
/// use nalgebra::Point3;
///
/// let positions = vec![Point3::new(0.0, 0.0, 0.0)];
/// let mut dest = ShapeKeyStore::new();
///
/// let worklist = provision_shape_keys(
///     &["Basis".to_owned(), "Smile".to_owned()],
///     &mut dest,
///     &positions,
///     &TransferParams::default(),
/// )
/// .unwrap();
///
/// assert_eq!(worklist, vec!["Smile".to_owned()]);
/// assert_eq!(dest.names().collect::<Vec<_>>(), vec!["Basis", "Smile"]);
/// ```
pub fn provision_shape_keys(
    source_names: &[String],
    dest: &mut ShapeKeyStore,
    dest_basis_positions: &[Point3<f64>],
    params: &TransferParams,
) -> TransferResult<Vec<String>> {
    let template = dest.ensure_basis(dest_basis_positions).positions.clone();

    let mut worklist = Vec::new();
    for name in source_names {
        if !params.includes_key(name) {
            continue;
        }
        if !dest.contains(name) {
            debug!(key = %name, "creating destination shape key");
            dest.add_key(name.clone(), template.clone())?;
        }
        worklist.push(name.clone());
    }
    Ok(worklist)
}
