//! Cosine similarity over sparse feature maps.
//!
//! Both measures take the dot product over the features present in both
//! maps. They differ in how the magnitudes are accumulated:
//!
//! - [`cosine_similarity`] sums squared weights of the shared features only,
//!   so two items are compared purely on the features they have in common.
//! - [`full_cosine_similarity`] uses each map's full L2 norm, which is the
//!   textbook definition and penalises features the other side lacks.
//!
//! Either way a zero denominator yields `0.0`, non-finite results yield
//! `0.0`, and the result is clamped to `[-1.0, 1.0]`.
//!
//! Weights are rescaled by a power of two near each map's largest absolute
//! weight before squaring, so finite weights as large as `1e200` or as small
//! as `1e-200` do not overflow or underflow the accumulators.

use std::collections::HashMap;
use std::hash::{BuildHasher, Hash};

/// Similarity measure applied by [`Table::similarity`](crate::Table::similarity).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Similarity {
	/// Cosine restricted to the intersection of feature keys.
	#[default]
	SharedFeatures,
	/// Cosine using each vector's full magnitude.
	FullMagnitude,
}

impl Similarity {
	/// Score two feature maps with this measure.
	pub fn compute<F, S1, S2>(self, a: &HashMap<F, f64, S1>, b: &HashMap<F, f64, S2>) -> f64
	where
		F: Hash + Eq,
		S1: BuildHasher,
		S2: BuildHasher,
	{
		match self {
			Self::SharedFeatures => cosine_similarity(a, b),
			Self::FullMagnitude => full_cosine_similarity(a, b),
		}
	}
}

/// Cosine similarity computed over shared features only.
///
/// Both the dot product and the two magnitude terms are accumulated over the
/// keys present in both maps. Maps with no shared key, or whose shared
/// weights are all zero on either side, score exactly `0.0`.
///
/// # Example
///
/// ```
/// use std::collections::HashMap;
/// use regommend::cosine_similarity;
///
/// let a = HashMap::from([("f1", 2.0), ("f2", 0.0)]);
/// let b = HashMap::from([("f1", 1.0), ("f3", 3.0)]);
///
/// // Only `f1` is shared: 2.0 / (2.0 * 1.0)
/// assert_eq!(cosine_similarity(&a, &b), 1.0);
/// ```
pub fn cosine_similarity<F, S1, S2>(a: &HashMap<F, f64, S1>, b: &HashMap<F, f64, S2>) -> f64
where
	F: Hash + Eq,
	S1: BuildHasher,
	S2: BuildHasher,
{
	let (scale_a, scale_b) = (scale(a), scale(b));

	// Walk the smaller map, probe the larger one
	let (dot, norm_a, norm_b) = if a.len() <= b.len() {
		shared_terms(a, scale_a, b, scale_b)
	} else {
		let (dot, norm_b, norm_a) = shared_terms(b, scale_b, a, scale_a);
		(dot, norm_a, norm_b)
	};

	normalize(dot, norm_a.sqrt() * norm_b.sqrt())
}

/// Cosine similarity using each map's full magnitude.
///
/// Features absent from one side contribute nothing to the dot product but
/// still count toward the other side's magnitude.
pub fn full_cosine_similarity<F, S1, S2>(a: &HashMap<F, f64, S1>, b: &HashMap<F, f64, S2>) -> f64
where
	F: Hash + Eq,
	S1: BuildHasher,
	S2: BuildHasher,
{
	let (scale_a, scale_b) = (scale(a), scale(b));

	let dot = if a.len() <= b.len() {
		shared_terms(a, scale_a, b, scale_b).0
	} else {
		shared_terms(b, scale_b, a, scale_a).0
	};

	normalize(dot, scaled_norm(a, scale_a) * scaled_norm(b, scale_b))
}

/// L2 norm of a feature map.
pub fn magnitude<F, S>(map: &HashMap<F, f64, S>) -> f64 {
	let factor = scale(map);
	factor * scaled_norm(map, factor)
}

/// Power of two at or below the largest absolute weight, or `1.0` when that
/// weight is zero or non-finite. Dividing by it is exact.
fn scale<F, S>(map: &HashMap<F, f64, S>) -> f64 {
	let max = map.values().fold(0.0_f64, |max, w| max.max(w.abs()));
	if max == 0.0 || !max.is_finite() {
		return 1.0;
	}
	2.0_f64.powi((max.log2().floor() as i32).clamp(-1022, 1023))
}

fn scaled_norm<F, S>(map: &HashMap<F, f64, S>, scale: f64) -> f64 {
	map.values()
		.map(|w| {
			let w = w / scale;
			w * w
		})
		.sum::<f64>()
		.sqrt()
}

/// Dot product and squared magnitudes over the keys `outer` shares with
/// `inner`, each side divided by its scale.
fn shared_terms<F, S1, S2>(
	outer: &HashMap<F, f64, S1>,
	scale_outer: f64,
	inner: &HashMap<F, f64, S2>,
	scale_inner: f64,
) -> (f64, f64, f64)
where
	F: Hash + Eq,
	S1: BuildHasher,
	S2: BuildHasher,
{
	let mut dot = 0.0;
	let mut norm_outer = 0.0;
	let mut norm_inner = 0.0;

	for (feature, &x) in outer {
		if let Some(&y) = inner.get(feature) {
			let (x, y) = (x / scale_outer, y / scale_inner);
			dot += x * y;
			norm_outer += x * x;
			norm_inner += y * y;
		}
	}

	(dot, norm_outer, norm_inner)
}

fn normalize(dot: f64, denominator: f64) -> f64 {
	if denominator == 0.0 {
		return 0.0;
	}

	let result = dot / denominator;
	if !result.is_finite() {
		return 0.0;
	}
	result.clamp(-1.0, 1.0)
}
