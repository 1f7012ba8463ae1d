//! Ordered, named shape-key collection for one mesh.

use crate::{ShapeKey, ShapeKeyError, ShapeKeyResult};
use hashbrown::HashMap;
use nalgebra::Point3;

/// Ordered mapping from key name to [`ShapeKey`], scoped to one mesh.
///
/// Keys keep their insertion order and the basis key, when present, is always
/// the first entry. Every key holds exactly one position per vertex of the
/// owning mesh; the store's vertex count is fixed by the first key inserted.
///
/// # Example
///
/// ```
/// use mesh_shapekey::ShapeKeyStore;
/// use nalgebra::Point3;
///
/// let positions = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)];
///
/// let mut store = ShapeKeyStore::new();
/// store.ensure_basis(&positions);
/// store.add_key("Smile", positions.clone()).unwrap();
///
/// assert!(store.contains("Smile"));
/// assert_eq!(store.basis().unwrap().name, "Basis");
/// ```
#[derive(Debug, Clone, Default)]
pub struct ShapeKeyStore {
    keys: Vec<ShapeKey>,
    index: HashMap<String, usize>,
}

impl ShapeKeyStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys in the store, the basis included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns whether the store holds no keys at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Returns whether a key with this name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Looks up a key by name.
    #[must_use]
    pub fn key(&self, name: &str) -> Option<&ShapeKey> {
        self.index.get(name).map(|&i| &self.keys[i])
    }

    /// Looks up a key by name for mutation.
    ///
    /// Renaming through the returned reference is not supported; the name
    /// index would go stale.
    #[must_use]
    pub fn key_mut(&mut self, name: &str) -> Option<&mut ShapeKey> {
        self.index.get(name).map(|&i| &mut self.keys[i])
    }

    /// The basis key: the store's first entry, if any.
    #[must_use]
    pub fn basis(&self) -> Option<&ShapeKey> {
        self.keys.first()
    }

    /// Key names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(|k| k.name.as_str())
    }

    /// Keys in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &ShapeKey> {
        self.keys.iter()
    }

    /// Synthesizes a basis key from the mesh's current positions if the
    /// store is empty, then returns the basis.
    ///
    /// An existing basis is left untouched.
    pub fn ensure_basis(&mut self, positions: &[Point3<f64>]) -> &ShapeKey {
        if self.keys.is_empty() {
            self.index.insert("Basis".to_owned(), 0);
            self.keys.push(ShapeKey::new("Basis", positions.to_vec()));
        }
        &self.keys[0]
    }

    /// Appends a new key.
    ///
    /// # Errors
    ///
    /// Returns [`ShapeKeyError::DuplicateKey`] if the name is taken, or
    /// [`ShapeKeyError::PositionCountMismatch`] if the store is non-empty and
    /// `positions` disagrees with its vertex count.
    pub fn add_key(
        &mut self,
        name: impl Into<String>,
        positions: Vec<Point3<f64>>,
    ) -> ShapeKeyResult<()> {
        let name = name.into();
        if self.index.contains_key(&name) {
            return Err(ShapeKeyError::DuplicateKey(name));
        }
        if let Some(first) = self.keys.first() {
            if positions.len() != first.len() {
                return Err(ShapeKeyError::PositionCountMismatch {
                    name,
                    expected: first.len(),
                    got: positions.len(),
                });
            }
        }
        self.index.insert(name.clone(), self.keys.len());
        self.keys.push(ShapeKey::new(name, positions));
        Ok(())
    }

    /// Reads one vertex position of a named key.
    ///
    /// # Errors
    ///
    /// Returns [`ShapeKeyError::UnknownKey`] or
    /// [`ShapeKeyError::VertexOutOfRange`].
    pub fn vertex_position(&self, name: &str, vertex: usize) -> ShapeKeyResult<Point3<f64>> {
        let key = self
            .key(name)
            .ok_or_else(|| ShapeKeyError::UnknownKey(name.to_owned()))?;
        key.positions
            .get(vertex)
            .copied()
            .ok_or_else(|| ShapeKeyError::VertexOutOfRange {
                name: name.to_owned(),
                index: vertex,
                len: key.len(),
            })
    }

    /// Writes one vertex position of a named key.
    ///
    /// # Errors
    ///
    /// Returns [`ShapeKeyError::UnknownKey`] or
    /// [`ShapeKeyError::VertexOutOfRange`].
    pub fn set_vertex_position(
        &mut self,
        name: &str,
        vertex: usize,
        position: Point3<f64>,
    ) -> ShapeKeyResult<()> {
        let key = self
            .key_mut(name)
            .ok_or_else(|| ShapeKeyError::UnknownKey(name.to_owned()))?;
        let len = key.len();
        let slot = key
            .positions
            .get_mut(vertex)
            .ok_or_else(|| ShapeKeyError::VertexOutOfRange {
                name: name.to_owned(),
                index: vertex,
                len,
            })?;
        *slot = position;
        Ok(())
    }

    /// Removes a key by name and returns it.
    ///
    /// Later keys shift down, keeping insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`ShapeKeyError::UnknownKey`] if no such key exists.
    pub fn remove_key(&mut self, name: &str) -> ShapeKeyResult<ShapeKey> {
        let i = self
            .index
            .remove(name)
            .ok_or_else(|| ShapeKeyError::UnknownKey(name.to_owned()))?;
        let key = self.keys.remove(i);
        for slot in self.index.values_mut() {
            if *slot > i {
                *slot -= 1;
            }
        }
        Ok(key)
    }

    /// Removes every key, the basis included.
    pub fn clear(&mut self) {
        self.keys.clear();
        self.index.clear();
    }
}

impl<'a> IntoIterator for &'a ShapeKeyStore {
    type Item = &'a ShapeKey;
    type IntoIter = std::slice::Iter<'a, ShapeKey>;

    fn into_iter(self) -> Self::IntoIter {
        self.keys.iter()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn quad_positions() -> Vec<Point3<f64>> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn ensure_basis_synthesizes_once() {
        let mut store = ShapeKeyStore::new();
        assert!(store.is_empty());

        store.ensure_basis(&quad_positions());
        assert_eq!(store.len(), 1);
        assert_eq!(store.basis().unwrap().name, "Basis");

        // A second call leaves the store unchanged.
        store.ensure_basis(&[]);
        assert_eq!(store.len(), 1);
        assert_eq!(store.basis().unwrap().len(), 4);
    }

    #[test]
    fn keys_keep_insertion_order() {
        let mut store = ShapeKeyStore::new();
        store.ensure_basis(&quad_positions());
        store.add_key("Smile", quad_positions()).unwrap();
        store.add_key("Frown", quad_positions()).unwrap();

        let names: Vec<_> = store.names().collect();
        assert_eq!(names, vec!["Basis", "Smile", "Frown"]);
    }

    #[test]
    fn duplicate_key_rejected() {
        let mut store = ShapeKeyStore::new();
        store.ensure_basis(&quad_positions());
        store.add_key("Smile", quad_positions()).unwrap();

        let err = store.add_key("Smile", quad_positions()).unwrap_err();
        assert!(matches!(err, ShapeKeyError::DuplicateKey(name) if name == "Smile"));
    }

    #[test]
    fn length_mismatch_rejected() {
        let mut store = ShapeKeyStore::new();
        store.ensure_basis(&quad_positions());

        let err = store
            .add_key("Smile", vec![Point3::origin()])
            .unwrap_err();
        assert!(matches!(
            err,
            ShapeKeyError::PositionCountMismatch {
                expected: 4,
                got: 1,
                ..
            }
        ));
    }

    #[test]
    fn vertex_read_write_round_trip() {
        let mut store = ShapeKeyStore::new();
        store.ensure_basis(&quad_positions());
        store.add_key("Smile", quad_positions()).unwrap();

        let p = Point3::new(0.5, 0.5, 0.9);
        store.set_vertex_position("Smile", 2, p).unwrap();
        assert_relative_eq!(store.vertex_position("Smile", 2).unwrap(), p);

        // The basis stays untouched.
        assert_relative_eq!(
            store.vertex_position("Basis", 2).unwrap(),
            Point3::new(1.0, 1.0, 0.0)
        );
    }

    #[test]
    fn unknown_key_and_range_errors() {
        let mut store = ShapeKeyStore::new();
        store.ensure_basis(&quad_positions());

        assert!(matches!(
            store.vertex_position("Nope", 0),
            Err(ShapeKeyError::UnknownKey(_))
        ));
        assert!(matches!(
            store.set_vertex_position("Basis", 99, Point3::origin()),
            Err(ShapeKeyError::VertexOutOfRange { index: 99, .. })
        ));
    }

    #[test]
    fn remove_key_keeps_index_consistent() {
        let mut store = ShapeKeyStore::new();
        store.ensure_basis(&quad_positions());
        store.add_key("Smile", quad_positions()).unwrap();
        store.add_key("Frown", quad_positions()).unwrap();

        let removed = store.remove_key("Smile").unwrap();
        assert_eq!(removed.name, "Smile");
        assert_eq!(store.names().collect::<Vec<_>>(), vec!["Basis", "Frown"]);

        // The shifted key is still reachable by name.
        assert!(store.key("Frown").is_some());
        assert!(store.key("Smile").is_none());
    }

    #[test]
    fn clear_removes_everything() {
        let mut store = ShapeKeyStore::new();
        store.ensure_basis(&quad_positions());
        store.add_key("Smile", quad_positions()).unwrap();

        store.clear();
        assert!(store.is_empty());
        assert!(store.basis().is_none());
    }
}
