use std::collections::HashMap;
use std::hash::Hash;

/// Sparse feature vector: feature key to weight.
pub type FeatureMap<F> = HashMap<F, f64>;

/// Bound for item keys stored in a [`Table`](crate::Table).
///
/// Implemented for every type that is hashable, comparable, cloneable and
/// shareable across threads, so `String`, `u64` or a custom newtype all work
/// without extra code.
///
/// # Example
///
/// ```
/// use regommend::{ItemKey, Table};
///
/// #[derive(Hash, Eq, PartialEq, Clone)]
/// struct UserId(u64);
///
/// fn assert_item_key<K: ItemKey>() {}
/// assert_item_key::<UserId>();
///
/// let table: Table<UserId> = Table::new("users");
/// assert!(table.is_empty());
/// ```
pub trait ItemKey: Hash + Eq + Clone + Send + Sync + 'static {}

impl<T> ItemKey for T where T: Hash + Eq + Clone + Send + Sync + 'static {}

/// Bound for the feature keys of a [`FeatureMap`].
pub trait FeatureKey: Hash + Eq + Clone + Send + Sync + 'static {}

impl<T> FeatureKey for T where T: Hash + Eq + Clone + Send + Sync + 'static {}
