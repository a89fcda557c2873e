//! Named per-vertex property maps.

use hashbrown::HashMap;
use nalgebra::Vector3;

/// A dictionary of named per-vertex properties.
///
/// Each property is a dense vector sized to the current vertex count.
/// After any topology edit that changes the vertex count, call
/// [`VertexProperties::resize`] to keep every map consistent; new entries
/// are default-filled and must be recomputed by whoever owns the property.
///
/// # Example
///
/// ```
/// use mesh_types::VertexProperties;
///
/// let mut props = VertexProperties::new(3);
/// props.set_scalars("v:min_angle", vec![0.5, 0.6, 0.7]).unwrap();
///
/// props.resize(5);
/// assert_eq!(props.scalars("v:min_angle").unwrap().len(), 5);
/// ```
#[derive(Debug, Clone, Default)]
pub struct VertexProperties {
    len: usize,
    scalars: HashMap<String, Vec<f64>>,
    vectors: HashMap<String, Vec<Vector3<f64>>>,
    flags: HashMap<String, Vec<bool>>,
}

impl VertexProperties {
    /// Creates an empty property set for `vertex_count` vertices.
    #[must_use]
    pub fn new(vertex_count: usize) -> Self {
        Self {
            len: vertex_count,
            ..Self::default()
        }
    }

    /// Number of vertices every property is sized to.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// `true` if sized to zero vertices.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Stores a scalar property. Fails if the length does not match.
    ///
    /// # Errors
    ///
    /// Returns the rejected vector when its length differs from
    /// [`VertexProperties::len`].
    pub fn set_scalars(&mut self, name: &str, values: Vec<f64>) -> Result<(), Vec<f64>> {
        if values.len() != self.len {
            return Err(values);
        }
        self.scalars.insert(name.to_owned(), values);
        Ok(())
    }

    /// Stores a vector property. Fails if the length does not match.
    ///
    /// # Errors
    ///
    /// Returns the rejected vector when its length differs from
    /// [`VertexProperties::len`].
    pub fn set_vectors(
        &mut self,
        name: &str,
        values: Vec<Vector3<f64>>,
    ) -> Result<(), Vec<Vector3<f64>>> {
        if values.len() != self.len {
            return Err(values);
        }
        self.vectors.insert(name.to_owned(), values);
        Ok(())
    }

    /// Stores a flag property. Fails if the length does not match.
    ///
    /// # Errors
    ///
    /// Returns the rejected vector when its length differs from
    /// [`VertexProperties::len`].
    pub fn set_flags(&mut self, name: &str, values: Vec<bool>) -> Result<(), Vec<bool>> {
        if values.len() != self.len {
            return Err(values);
        }
        self.flags.insert(name.to_owned(), values);
        Ok(())
    }

    /// Looks up a scalar property.
    #[must_use]
    pub fn scalars(&self, name: &str) -> Option<&[f64]> {
        self.scalars.get(name).map(Vec::as_slice)
    }

    /// Looks up a vector property.
    #[must_use]
    pub fn vectors(&self, name: &str) -> Option<&[Vector3<f64>]> {
        self.vectors.get(name).map(Vec::as_slice)
    }

    /// Looks up a flag property.
    #[must_use]
    pub fn flags(&self, name: &str) -> Option<&[bool]> {
        self.flags.get(name).map(Vec::as_slice)
    }

    /// `true` if a property of any kind with this name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.scalars.contains_key(name)
            || self.vectors.contains_key(name)
            || self.flags.contains_key(name)
    }

    /// Removes a property of any kind. Returns `true` if one was removed.
    pub fn remove(&mut self, name: &str) -> bool {
        self.scalars.remove(name).is_some()
            | self.vectors.remove(name).is_some()
            | self.flags.remove(name).is_some()
    }

    /// Resizes every property to a new vertex count.
    ///
    /// Grown entries are default-filled (0.0 / zero vector / false) and
    /// carry no meaning until recomputed.
    pub fn resize(&mut self, vertex_count: usize) {
        self.len = vertex_count;
        for v in self.scalars.values_mut() {
            v.resize(vertex_count, 0.0);
        }
        for v in self.vectors.values_mut() {
            v.resize(vertex_count, Vector3::zeros());
        }
        for v in self.flags.values_mut() {
            v.resize(vertex_count, false);
        }
    }

    /// Names of all stored properties.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .scalars
            .keys()
            .chain(self.vectors.keys())
            .chain(self.flags.keys())
            .map(String::as_str)
            .collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_get_scalars() {
        let mut props = VertexProperties::new(2);
        assert!(props.set_scalars("v:q", vec![1.0, 2.0]).is_ok());
        assert_eq!(props.scalars("v:q"), Some(&[1.0, 2.0][..]));
        assert!(props.contains("v:q"));
    }

    #[test]
    fn wrong_length_rejected() {
        let mut props = VertexProperties::new(2);
        assert!(props.set_scalars("v:q", vec![1.0]).is_err());
        assert!(!props.contains("v:q"));
    }

    #[test]
    fn resize_fills_defaults() {
        let mut props = VertexProperties::new(2);
        props.set_flags("v:feature", vec![true, true]).unwrap();
        props.resize(4);
        assert_eq!(props.flags("v:feature"), Some(&[true, true, false, false][..]));

        props.resize(1);
        assert_eq!(props.flags("v:feature"), Some(&[true][..]));
    }

    #[test]
    fn remove_and_names() {
        let mut props = VertexProperties::new(1);
        props.set_scalars("a", vec![0.0]).unwrap();
        props.set_vectors("b", vec![Vector3::zeros()]).unwrap();
        assert_eq!(props.names(), vec!["a", "b"]);
        assert!(props.remove("a"));
        assert!(!props.remove("a"));
        assert_eq!(props.names(), vec!["b"]);
    }
}
