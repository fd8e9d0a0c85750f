use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::builder::TableBuilder;
use crate::error::{Result, TableError};
use crate::item::Item;
#[cfg(feature = "metrics")]
use crate::metrics::{Counters, TableMetrics};
use crate::similarity::Similarity;
use crate::traits::{FeatureKey, FeatureMap, ItemKey};

/// Called on a lookup miss to materialize the item for a key.
pub type DataLoader<K, F> = Arc<dyn Fn(&K) -> Option<Item<K, F>> + Send + Sync>;

/// Called with an item after it was added, or before it is deleted.
pub type ItemCallback<K, F> = Arc<dyn Fn(&Arc<Item<K, F>>) + Send + Sync>;

/// Diagnostic sink receiving human-readable lines.
pub type Logger = Arc<dyn Fn(&str) + Send + Sync>;

/// What [`Table::flush`] does with the about-to-delete callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FlushPolicy {
	/// Clear the table without notifying anyone about individual items.
	#[default]
	Silent,
	/// After clearing, call the about-to-delete callback once per item that was resident.
	NotifyEach,
}

/// Replaceable hooks. Captured under the table lock, invoked after it is released.
pub(crate) struct Hooks<K, F> {
	pub load_data: Option<DataLoader<K, F>>,
	pub added_item: Option<ItemCallback<K, F>>,
	pub about_to_delete_item: Option<ItemCallback<K, F>>,
	pub logger: Option<Logger>,
}

impl<K, F> Default for Hooks<K, F> {
	fn default() -> Self {
		Self {
			load_data: None,
			added_item: None,
			about_to_delete_item: None,
			logger: None,
		}
	}
}

struct State<K, F> {
	items: HashMap<K, Arc<Item<K, F>>, ahash::RandomState>,
	hooks: Hooks<K, F>,
}

/// Thread-safe table of items with lazy loading and lifecycle callbacks.
///
/// A single reader/writer lock guards the key to item mapping and the
/// configured callbacks. It never guards an item's contents; each [`Item`]
/// has its own lock for that.
///
/// Callbacks are always invoked with the table lock released, so they may
/// call back into the table. The table can change between the moment a
/// callback is captured and the moment it runs.
///
/// # Example
///
/// ```
/// use std::collections::HashMap;
/// use regommend::Table;
///
/// let table: Table<&str, &str> = Table::new("users");
///
/// table.add("u1", HashMap::from([("f1", 2.0), ("f2", 0.0)]));
/// table.add("u2", HashMap::from([("f1", 1.0), ("f3", 3.0)]));
///
/// assert_eq!(table.count(), 2);
/// assert_eq!(table.similarity(&"u1", &"u2").unwrap(), 1.0);
/// ```
pub struct Table<K, F = String> {
	/// Label used in diagnostics
	name: String,
	/// Items and hooks
	state: RwLock<State<K, F>>,
	/// Measure used by `similarity()`
	measure: Similarity,
	/// Whether `flush()` notifies the about-to-delete callback
	flush_policy: FlushPolicy,
	#[cfg(feature = "metrics")]
	counters: Counters,
}

impl<K: ItemKey, F: FeatureKey> Table<K, F> {
	/// Create an empty table with default configuration.
	pub fn new(name: impl Into<String>) -> Self {
		TableBuilder::new(name).build()
	}

	/// Start configuring a table.
	pub fn builder(name: impl Into<String>) -> TableBuilder<K, F> {
		TableBuilder::new(name)
	}

	pub(crate) fn from_parts(
		name: String,
		capacity: usize,
		measure: Similarity,
		flush_policy: FlushPolicy,
		hooks: Hooks<K, F>,
	) -> Self {
		Self {
			name,
			state: RwLock::new(State {
				items: HashMap::with_capacity_and_hasher(capacity, ahash::RandomState::new()),
				hooks,
			}),
			measure,
			flush_policy,
			#[cfg(feature = "metrics")]
			counters: Counters::default(),
		}
	}

	/// The table's name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// The measure used by [`similarity`](Self::similarity).
	pub fn measure(&self) -> Similarity {
		self.measure
	}

	/// The configured flush policy.
	pub fn flush_policy(&self) -> FlushPolicy {
		self.flush_policy
	}

	/// Number of resident items.
	pub fn count(&self) -> usize {
		self.state.read().items.len()
	}

	/// Check if the table holds no items.
	pub fn is_empty(&self) -> bool {
		self.count() == 0
	}

	/// Snapshot of the resident keys, in no particular order.
	pub fn keys(&self) -> Vec<K> {
		self.state.read().items.keys().cloned().collect()
	}

	/// Set the callback invoked when `value()` misses.
	///
	/// Takes effect for operations that start after this call returns.
	pub fn set_data_loader<L>(&self, loader: L)
	where
		L: Fn(&K) -> Option<Item<K, F>> + Send + Sync + 'static,
	{
		self.state.write().hooks.load_data = Some(Arc::new(loader));
	}

	/// Remove the data loader.
	pub fn clear_data_loader(&self) {
		self.state.write().hooks.load_data = None;
	}

	/// Set the callback invoked after every add, including loader-triggered ones.
	pub fn set_added_item_callback<C>(&self, callback: C)
	where
		C: Fn(&Arc<Item<K, F>>) + Send + Sync + 'static,
	{
		self.state.write().hooks.added_item = Some(Arc::new(callback));
	}

	/// Remove the added-item callback.
	pub fn clear_added_item_callback(&self) {
		self.state.write().hooks.added_item = None;
	}

	/// Set the callback invoked before every successful delete.
	pub fn set_about_to_delete_item_callback<C>(&self, callback: C)
	where
		C: Fn(&Arc<Item<K, F>>) + Send + Sync + 'static,
	{
		self.state.write().hooks.about_to_delete_item = Some(Arc::new(callback));
	}

	/// Remove the about-to-delete callback.
	pub fn clear_about_to_delete_item_callback(&self) {
		self.state.write().hooks.about_to_delete_item = None;
	}

	/// Set the diagnostic sink. Without one, diagnostic lines are discarded.
	///
	/// Independently of the sink, the table emits `tracing` events.
	pub fn set_logger<L>(&self, logger: L)
	where
		L: Fn(&str) + Send + Sync + 'static,
	{
		self.state.write().hooks.logger = Some(Arc::new(logger));
	}

	/// Remove the diagnostic sink.
	pub fn clear_logger(&self) {
		self.state.write().hooks.logger = None;
	}

	/// Insert an item, replacing any item already stored under `key`.
	///
	/// The added-item callback runs after the table lock is released.
	/// Returns the stored item.
	pub fn add(&self, key: K, data: FeatureMap<F>) -> Arc<Item<K, F>> {
		let item = Arc::new(Item::new(key.clone(), data));

		let (added_item, replaced) = {
			let mut state = self.state.write();
			let replaced = state.items.insert(key, item.clone());
			(state.hooks.added_item.clone(), replaced)
		};

		#[cfg(feature = "metrics")]
		{
			let counter = if replaced.is_some() {
				&self.counters.updates
			} else {
				&self.counters.inserts
			};
			Counters::bump(counter);
		}

		tracing::debug!(table = %self.name, replaced = replaced.is_some(), "Added item");

		// Drop the displaced item outside the lock
		drop(replaced);

		if let Some(callback) = added_item {
			callback(&item);
		}

		item
	}

	/// Remove the item stored under `key` and return it.
	///
	/// The about-to-delete callback runs first, with the table lock released.
	/// The item is unlinked only once no writer holds its data lock.
	///
	/// The entry removed is whatever `key` maps to at unlink time. If another
	/// thread re-adds `key` while the callback runs, that newer item is
	/// unlinked without passing through the callback, and the returned item is
	/// the older one the callback saw.
	pub fn delete(&self, key: &K) -> Result<Arc<Item<K, F>>> {
		let (item, about_to_delete) = {
			let state = self.state.read();
			let Some(item) = state.items.get(key) else {
				return Err(TableError::KeyNotFound);
			};
			(item.clone(), state.hooks.about_to_delete_item.clone())
		};

		if let Some(callback) = about_to_delete {
			callback(&item);
		}

		let logger = {
			// Wait out any writer of the item's data
			let _data = item.data();
			let mut state = self.state.write();
			state.items.remove(key);
			state.hooks.logger.clone()
		};

		#[cfg(feature = "metrics")]
		Counters::bump(&self.counters.removals);

		tracing::debug!(table = %self.name, "Deleted item");
		log(logger.as_ref(), &format!("Deleting item from table {}", self.name));

		Ok(item)
	}

	/// Check whether `key` is resident. Never invokes the data loader.
	pub fn exists(&self, key: &K) -> bool {
		self.state.read().items.contains_key(key)
	}

	/// Look up the item stored under `key`.
	///
	/// On a miss the data loader, if any, is invoked with the table lock
	/// released. A loaded item's data is stored through [`add`](Self::add),
	/// so the added-item callback fires and the stored item is returned.
	///
	/// # Errors
	///
	/// - [`TableError::KeyNotFound`] if the key is absent and no loader is set.
	/// - [`TableError::KeyNotLoadable`] if the loader returned nothing.
	pub fn value(&self, key: &K) -> Result<Arc<Item<K, F>>> {
		let (loader, logger) = {
			let state = self.state.read();
			if let Some(item) = state.items.get(key) {
				#[cfg(feature = "metrics")]
				Counters::bump(&self.counters.hits);
				return Ok(item.clone());
			}
			(state.hooks.load_data.clone(), state.hooks.logger.clone())
		};

		#[cfg(feature = "metrics")]
		Counters::bump(&self.counters.misses);

		let Some(loader) = loader else {
			tracing::trace!(table = %self.name, "Lookup missed");
			return Err(TableError::KeyNotFound);
		};

		tracing::debug!(table = %self.name, "Loading item");
		log(logger.as_ref(), &format!("Loading item into table {}", self.name));

		match loader(key) {
			Some(loaded) => {
				#[cfg(feature = "metrics")]
				Counters::bump(&self.counters.loads);
				Ok(self.add(key.clone(), loaded.into_data()))
			}
			None => {
				#[cfg(feature = "metrics")]
				Counters::bump(&self.counters.load_failures);
				tracing::debug!(table = %self.name, "Data loader returned nothing");
				Err(TableError::KeyNotLoadable)
			}
		}
	}

	/// Remove every item.
	///
	/// With [`FlushPolicy::Silent`] the about-to-delete callback is not
	/// invoked. With [`FlushPolicy::NotifyEach`] it is invoked for each removed
	/// item once the table is already empty.
	pub fn flush(&self) {
		let (removed, about_to_delete, logger) = {
			let mut state = self.state.write();
			let removed = std::mem::take(&mut state.items);
			(removed, state.hooks.about_to_delete_item.clone(), state.hooks.logger.clone())
		};

		#[cfg(feature = "metrics")]
		Counters::bump(&self.counters.flushes);

		tracing::debug!(table = %self.name, removed = removed.len(), "Flushed table");
		log(logger.as_ref(), &format!("Flushing table {}", self.name));

		if self.flush_policy == FlushPolicy::NotifyEach
			&& let Some(callback) = about_to_delete
		{
			for item in removed.values() {
				callback(item);
			}
		}
	}

	/// Score the items stored under `a` and `b` with the table's measure.
	///
	/// Both keys are resolved through [`value`](Self::value), so a miss may
	/// invoke the data loader.
	pub fn similarity(&self, a: &K, b: &K) -> Result<f64> {
		let first = self.value(a)?;
		let second = self.value(b)?;

		Ok(first.read_pair(&second, |x, y| self.measure.compute(x, y)))
	}

	/// Snapshot of the table's activity counters.
	#[cfg(feature = "metrics")]
	pub fn metrics(&self) -> TableMetrics {
		self.counters.snapshot(self.count())
	}
}

impl<K, F> fmt::Debug for Table<K, F> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Table")
			.field("name", &self.name)
			.field("items", &self.state.read().items.len())
			.field("measure", &self.measure)
			.field("flush_policy", &self.flush_policy)
			.finish()
	}
}

fn log(logger: Option<&Logger>, line: &str) {
	if let Some(logger) = logger {
		logger(line);
	}
}
