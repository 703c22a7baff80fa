use std::cmp::Ordering;

use num::Float;
use serde::{Deserialize, Serialize};

use crate::utils::sort::radix_sort_u32_soa;

/// Sparse non-negative vector over vocabulary indices.
///
/// Indices are kept strictly ascending and zero weights are never stored, so two
/// vectors can be combined with a single merge walk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermVector<N = f64>
where
    N: Float,
{
    indices: Vec<u32>,
    values: Vec<N>,
}

impl<N> Default for TermVector<N>
where
    N: Float,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<N> TermVector<N>
where
    N: Float,
{
    pub fn new() -> Self {
        Self { indices: Vec::new(), values: Vec::new() }
    }

    /// Build from unordered `(index, weight)` pairs.
    /// Duplicate indices are summed, zero and non-finite weights are skipped.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (u32, N)>,
        N: Default,
    {
        let (mut keys, mut vals): (Vec<u32>, Vec<N>) = pairs
            .into_iter()
            .filter(|(_, v)| v.is_finite() && *v != N::zero())
            .unzip();
        radix_sort_u32_soa(&mut keys, &mut vals);

        let mut out = Self { indices: Vec::with_capacity(keys.len()), values: Vec::with_capacity(keys.len()) };
        for (k, v) in keys.into_iter().zip(vals) {
            match out.indices.last() {
                Some(&last) if last == k => {
                    if let Some(acc) = out.values.last_mut() {
                        *acc = *acc + v;
                    }
                }
                _ => {
                    out.indices.push(k);
                    out.values.push(v);
                }
            }
        }
        out
    }

    #[inline]
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.indices.is_empty()
    }

    /// Indices strictly ascending and below `dims`, one finite non-negative
    /// weight per index.
    pub fn is_well_formed(&self, dims: usize) -> bool {
        self.indices.len() == self.values.len()
            && self.indices.windows(2).all(|w| w[0] < w[1])
            && self.indices.last().map_or(true, |&i| (i as usize) < dims)
            && self.values.iter().all(|v| v.is_finite() && *v >= N::zero())
    }

    /// `(index, weight)` in ascending index order
    pub fn iter(&self) -> impl Iterator<Item = (u32, N)> + '_ {
        self.indices.iter().copied().zip(self.values.iter().copied())
    }

    pub fn norm(&self) -> N {
        self.values
            .iter()
            .fold(N::zero(), |acc, &v| acc + v * v)
            .sqrt()
    }

    /// Scale to unit length. A zero vector stays zero.
    pub fn l2_normalized(mut self) -> Self {
        let norm = self.norm();
        if norm > N::zero() {
            for v in self.values.iter_mut() {
                *v = *v / norm;
            }
        }
        self
    }

    pub fn dot(&self, other: &Self) -> N {
        let mut a_it = self.iter();
        let mut b_it = other.iter();
        let mut a_next = a_it.next();
        let mut b_next = b_it.next();
        let mut dot = N::zero();
        while let (Some((ia, va)), Some((ib, vb))) = (a_next, b_next) {
            match ia.cmp(&ib) {
                Ordering::Equal => {
                    dot = dot + va * vb;
                    a_next = a_it.next();
                    b_next = b_it.next();
                }
                Ordering::Less => a_next = a_it.next(),
                Ordering::Greater => b_next = b_it.next(),
            }
        }
        dot
    }

    /// cosθ = A・B / (|A||B|), 0 when either side has zero magnitude.
    /// Clamped to [0, 1] since weights are non-negative.
    pub fn cosine(&self, other: &Self) -> N {
        let denom = self.norm() * other.norm();
        if denom <= N::zero() {
            return N::zero();
        }
        let score = self.dot(other) / denom;
        score.max(N::zero()).min(N::one())
    }
}
