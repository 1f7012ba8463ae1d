//! Named shape key data.

use nalgebra::Point3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Names recognized as the undisplaced basis pose, case-sensitive.
pub const BASIS_ALIASES: [&str; 2] = ["Basis", "basis"];

/// Returns whether `name` refers to the basis pose.
///
/// # Example
///
/// ```
/// use mesh_shapekey::is_basis_name;
///
/// assert!(is_basis_name("Basis"));
/// assert!(is_basis_name("basis"));
/// assert!(!is_basis_name("BASIS"));
/// assert!(!is_basis_name("Smile"));
/// ```
#[must_use]
pub fn is_basis_name(name: &str) -> bool {
    BASIS_ALIASES.contains(&name)
}

/// A named morph target holding one displaced position per vertex.
///
/// Positions are in the owning mesh's local space, indexed by vertex id, and
/// the length always matches the owning mesh's vertex count.
///
/// # Example
///
/// ```
/// use mesh_shapekey::ShapeKey;
/// use nalgebra::Point3;
///
/// let key = ShapeKey::new("Smile", vec![Point3::new(0.0, 0.0, 0.1)]);
/// assert_eq!(key.name, "Smile");
/// assert_eq!(key.len(), 1);
/// assert!(!key.is_basis());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ShapeKey {
    /// Key name, unique within its store.
    pub name: String,

    /// Local-space position per vertex.
    pub positions: Vec<Point3<f64>>,
}

impl ShapeKey {
    /// Creates a shape key from a name and per-vertex positions.
    #[must_use]
    pub fn new(name: impl Into<String>, positions: Vec<Point3<f64>>) -> Self {
        Self {
            name: name.into(),
            positions,
        }
    }

    /// Number of per-vertex positions held by this key.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns whether the key holds no positions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Returns whether this key's name is a basis alias.
    #[must_use]
    pub fn is_basis(&self) -> bool {
        is_basis_name(&self.name)
    }
}
