//! Copy-on-write value sequences

use std::ops::Index;
use std::sync::Arc;
use ahash::AHashSet;
use serde::{Serialize, Deserialize};

use crate::value::Value;

/// Immutable, cheaply clonable sequence of values.
///
/// Every "modifying" operation returns a new vector and leaves the
/// receiver (and anything sharing its storage) untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Value>", into = "Vec<Value>")]
pub struct ValueVector(Arc<[Value]>);

impl ValueVector {
    pub fn new(values: Vec<Value>) -> Self {
        Self(values.into())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Value] {
        &self.0
    }

    pub fn to_vec(&self) -> Vec<Value> {
        self.0.to_vec()
    }

    /// New vector holding these values followed by `value`
    pub fn appended(&self, value: Value) -> Self {
        let mut values = Vec::with_capacity(self.0.len() + 1);
        values.extend_from_slice(&self.0);
        values.push(value);
        Self::new(values)
    }

    /// New vector without the rows listed in `excluded`
    pub fn without_rows(&self, excluded: &AHashSet<usize>) -> Self {
        if excluded.is_empty() {
            return self.clone();
        }
        let values = self.0.iter()
            .enumerate()
            .filter(|(row, _)| !excluded.contains(row))
            .map(|(_, v)| v.clone())
            .collect();
        Self::new(values)
    }

    /// Whether both vectors share the same storage
    pub fn ptr_eq(&self, other: &ValueVector) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Index<usize> for ValueVector {
    type Output = Value;

    fn index(&self, index: usize) -> &Value {
        &self.0[index]
    }
}

impl From<Vec<Value>> for ValueVector {
    fn from(values: Vec<Value>) -> Self {
        Self::new(values)
    }
}

impl From<ValueVector> for Vec<Value> {
    fn from(vector: ValueVector) -> Self {
        vector.to_vec()
    }
}

impl FromIterator<Value> for ValueVector {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a ValueVector {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_appended_leaves_source_untouched() {
        let source: ValueVector = vec![Value::from(1.0), Value::from(2.0)].into();
        let shared = source.clone();
        let extended = source.appended(Value::Null);

        assert_eq!(source.len(), 2);
        assert!(source.ptr_eq(&shared));
        assert_eq!(extended.len(), 3);
        assert_eq!(extended[2], Value::Null);
    }

    #[test]
    fn test_without_rows() {
        let source: ValueVector = (0..5).map(|i| Value::from(i as f64)).collect();
        let excluded: AHashSet<usize> = [1, 3, 9].into_iter().collect();
        let clean = source.without_rows(&excluded);
        assert_eq!(clean.to_vec(), vec![Value::from(0.0), Value::from(2.0), Value::from(4.0)]);
    }
}
