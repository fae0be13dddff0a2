use serde::{Deserialize, Serialize};

/// A sparse vector of `f32` weights keyed by term index.
///
/// Indices are kept strictly increasing so that dot products are a single
/// merge pass and always sum in the same order, whichever side is `self`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SparseVector {
    indices: Vec<u32>,
    values: Vec<f32>,
}

impl SparseVector {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(index, value)` pairs in any order.
    ///
    /// Duplicate indices are summed and explicit zeros are dropped.
    #[must_use]
    pub fn from_pairs(mut pairs: Vec<(u32, f32)>) -> Self {
        pairs.sort_by_key(|&(idx, _)| idx);

        let mut indices = Vec::with_capacity(pairs.len());
        let mut values: Vec<f32> = Vec::with_capacity(pairs.len());
        for (idx, value) in pairs {
            if indices.last() == Some(&idx) {
                if let Some(last) = values.last_mut() {
                    *last += value;
                }
            } else {
                indices.push(idx);
                values.push(value);
            }
        }

        let mut vector = Self { indices, values };
        vector.prune_zeros();
        vector
    }

    #[inline]
    #[must_use]
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    #[inline]
    #[must_use]
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, f32)> + '_ {
        self.indices.iter().copied().zip(self.values.iter().copied())
    }

    /// Weight at `index`, zero when absent
    #[must_use]
    pub fn get(&self, index: u32) -> f32 {
        self.indices
            .binary_search(&index)
            .map(|pos| self.values[pos])
            .unwrap_or(0.0)
    }

    #[inline]
    #[must_use]
    pub fn norm(&self) -> f32 {
        self.values.iter().map(|v| v * v).sum::<f32>().sqrt()
    }

    /// Dot product with another sparse vector
    pub fn dot(&self, other: &SparseVector) -> f32 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0f32;
        while i < self.indices.len() && j < other.indices.len() {
            match self.indices[i].cmp(&other.indices[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += self.values[i] * other.values[j];
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }

    /// Cosine similarity, 0.0 when either side is all-zero
    pub fn cosine_similarity(&self, other: &SparseVector) -> f32 {
        let norm_a = self.norm();
        let norm_b = other.norm();
        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }
        let score = self.dot(other) / (norm_a * norm_b);
        if score.is_nan() {
            0.0
        } else {
            score
        }
    }

    /// Normalize the vector to unit length; all-zero vectors stay as they are
    #[inline]
    pub fn normalize(&mut self) {
        let norm = self.norm();
        if norm > f32::EPSILON {
            let inv_norm = 1.0 / norm;
            for v in &mut self.values {
                *v *= inv_norm;
            }
        }
    }

    #[inline]
    #[must_use]
    pub fn normalized(&self) -> Self {
        let mut v = self.clone();
        v.normalize();
        v
    }

    fn prune_zeros(&mut self) {
        if self.values.iter().all(|v| *v != 0.0) {
            return;
        }
        let (indices, values): (Vec<u32>, Vec<f32>) = self
            .iter()
            .filter(|&(_, v)| v != 0.0)
            .unzip();
        self.indices = indices;
        self.values = values;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_pairs_sorts_and_merges() {
        let v = SparseVector::from_pairs(vec![(5, 1.0), (1, 2.0), (5, 0.5), (3, 0.0)]);
        assert_eq!(v.indices(), &[1, 5]);
        assert_eq!(v.values(), &[2.0, 1.5]);
        assert_eq!(v.get(5), 1.5);
        assert_eq!(v.get(3), 0.0);
    }

    #[test]
    fn test_dot_product() {
        let a = SparseVector::from_pairs(vec![(0, 1.0), (2, 2.0), (7, 3.0)]);
        let b = SparseVector::from_pairs(vec![(2, 4.0), (7, 1.0), (9, 5.0)]);
        assert!((a.dot(&b) - 11.0).abs() < 1e-6);
        assert_eq!(a.dot(&b), b.dot(&a));
    }

    #[test]
    fn test_cosine_similarity() {
        let v1 = SparseVector::from_pairs(vec![(0, 1.0)]);
        let v2 = SparseVector::from_pairs(vec![(0, 3.0)]);
        assert!((v1.cosine_similarity(&v2) - 1.0).abs() < 1e-6);

        let v3 = SparseVector::from_pairs(vec![(1, 1.0)]);
        assert_eq!(v1.cosine_similarity(&v3), 0.0);

        // all-zero vectors never produce NaN
        assert_eq!(SparseVector::new().cosine_similarity(&v1), 0.0);
    }

    #[test]
    fn test_normalize() {
        let mut v = SparseVector::from_pairs(vec![(0, 3.0), (4, 4.0)]);
        v.normalize();
        assert!((v.norm() - 1.0).abs() < 1e-6);

        let mut empty = SparseVector::new();
        empty.normalize();
        assert!(empty.is_empty());
    }
}
