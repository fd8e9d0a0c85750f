use std::sync::Arc;

use crate::item::Item;
use crate::similarity::Similarity;
use crate::table::{FlushPolicy, Hooks, Table};
use crate::traits::{FeatureKey, ItemKey};

/// Builder for configuring a Table.
///
/// Every hook set here can be replaced later through the table's setters.
///
/// # Example
///
/// ```
/// use regommend::{FlushPolicy, Item, Similarity, TableBuilder};
///
/// let table = TableBuilder::<u64, String>::new("users")
///     .capacity(1024)
///     .similarity(Similarity::FullMagnitude)
///     .flush_policy(FlushPolicy::NotifyEach)
///     .data_loader(|key| Some(Item::new(*key, Default::default())))
///     .build();
///
/// assert_eq!(table.name(), "users");
/// assert!(table.value(&7).is_ok());
/// ```
pub struct TableBuilder<K, F = String> {
	name: String,
	capacity: usize,
	measure: Similarity,
	flush_policy: FlushPolicy,
	hooks: Hooks<K, F>,
}

impl<K: ItemKey, F: FeatureKey> TableBuilder<K, F> {
	/// Create a new builder for a table with the given name.
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			capacity: 0,
			measure: Similarity::default(),
			flush_policy: FlushPolicy::default(),
			hooks: Hooks::default(),
		}
	}

	/// Preallocate room for this many items.
	///
	/// Default: 0
	pub fn capacity(mut self, capacity: usize) -> Self {
		self.capacity = capacity;
		self
	}

	/// Set the measure used by [`Table::similarity`].
	///
	/// Default: [`Similarity::SharedFeatures`]
	pub fn similarity(mut self, measure: Similarity) -> Self {
		self.measure = measure;
		self
	}

	/// Set whether flushing notifies the about-to-delete callback.
	///
	/// Default: [`FlushPolicy::Silent`]
	pub fn flush_policy(mut self, policy: FlushPolicy) -> Self {
		self.flush_policy = policy;
		self
	}

	/// Set the callback invoked when a lookup misses.
	pub fn data_loader<L>(mut self, loader: L) -> Self
	where
		L: Fn(&K) -> Option<Item<K, F>> + Send + Sync + 'static,
	{
		self.hooks.load_data = Some(Arc::new(loader));
		self
	}

	/// Set the callback invoked after every add.
	pub fn added_item_callback<C>(mut self, callback: C) -> Self
	where
		C: Fn(&Arc<Item<K, F>>) + Send + Sync + 'static,
	{
		self.hooks.added_item = Some(Arc::new(callback));
		self
	}

	/// Set the callback invoked before every delete.
	pub fn about_to_delete_item_callback<C>(mut self, callback: C) -> Self
	where
		C: Fn(&Arc<Item<K, F>>) + Send + Sync + 'static,
	{
		self.hooks.about_to_delete_item = Some(Arc::new(callback));
		self
	}

	/// Set the diagnostic sink.
	pub fn logger<L>(mut self, logger: L) -> Self
	where
		L: Fn(&str) + Send + Sync + 'static,
	{
		self.hooks.logger = Some(Arc::new(logger));
		self
	}

	/// Build the table with the configured settings.
	pub fn build(self) -> Table<K, F> {
		Table::from_parts(self.name, self.capacity, self.measure, self.flush_policy, self.hooks)
	}
}

#[cfg(test)]
mod tests {
	use std::sync::atomic::{AtomicUsize, Ordering};

	use super::*;
	use crate::traits::FeatureMap;

	#[test]
	fn test_builder_default() {
		let table: Table<String> = TableBuilder::new("test").build();

		assert!(table.is_empty());
		assert_eq!(table.name(), "test");
		assert_eq!(table.measure(), Similarity::SharedFeatures);
		assert_eq!(table.flush_policy(), FlushPolicy::Silent);
	}

	#[test]
	fn test_builder_full_config() {
		let table: Table<String> = TableBuilder::new("test")
			.capacity(64)
			.similarity(Similarity::FullMagnitude)
			.flush_policy(FlushPolicy::NotifyEach)
			.build();

		assert!(table.is_empty());
		assert_eq!(table.measure(), Similarity::FullMagnitude);
		assert_eq!(table.flush_policy(), FlushPolicy::NotifyEach);
	}

	#[test]
	fn test_builder_hooks_are_installed() {
		let added = Arc::new(AtomicUsize::new(0));
		let deleted = Arc::new(AtomicUsize::new(0));
		let logged = Arc::new(AtomicUsize::new(0));

		let (a, d, l) = (added.clone(), deleted.clone(), logged.clone());
		let table: Table<u64> = TableBuilder::new("test")
			.data_loader(|key: &u64| Some(Item::new(*key, FeatureMap::new())))
			.added_item_callback(move |_| {
				a.fetch_add(1, Ordering::SeqCst);
			})
			.about_to_delete_item_callback(move |_| {
				d.fetch_add(1, Ordering::SeqCst);
			})
			.logger(move |_| {
				l.fetch_add(1, Ordering::SeqCst);
			})
			.build();

		table.value(&1).expect("loader should supply the item");
		table.delete(&1).expect("key should exist");

		assert_eq!(added.load(Ordering::SeqCst), 1);
		assert_eq!(deleted.load(Ordering::SeqCst), 1);
		// One line for the load, one for the delete
		assert_eq!(logged.load(Ordering::SeqCst), 2);
	}
}
