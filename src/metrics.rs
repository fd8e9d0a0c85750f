//! Table activity counters.

use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of a table's activity.
///
/// # Example
///
/// ```
/// use regommend::Table;
///
/// let table: Table<u64> = Table::new("users");
/// // ... perform table operations ...
///
/// let metrics = table.metrics();
/// println!("Hit rate: {:.2}%", metrics.hit_rate() * 100.0);
/// println!("Loads: {}", metrics.loads);
/// ```
#[non_exhaustive]
#[derive(Debug, Clone, Default)]
pub struct TableMetrics {
	/// Lookups through `value()` that found a resident item.
	pub hits: u64,
	/// Lookups through `value()` that found nothing resident.
	pub misses: u64,
	/// Misses the data loader resolved into a new item.
	pub loads: u64,
	/// Misses where the data loader returned nothing.
	pub load_failures: u64,
	/// Adds for keys that were not resident.
	pub inserts: u64,
	/// Adds that replaced a resident item.
	pub updates: u64,
	/// Successful deletes.
	pub removals: u64,
	/// Calls to `flush()`.
	pub flushes: u64,
	/// Items resident when the snapshot was taken.
	pub item_count: usize,
}

impl TableMetrics {
	/// Ratio of hits to all `value()` lookups, between 0.0 and 1.0.
	///
	/// Returns 0.0 if there have been no lookups.
	pub fn hit_rate(&self) -> f64 {
		let total = self.hits + self.misses;
		if total == 0 {
			0.0
		} else {
			self.hits as f64 / total as f64
		}
	}

	/// Total number of adds (inserts + updates).
	pub fn total_writes(&self) -> u64 {
		self.inserts + self.updates
	}
}

/// Live counters owned by a table.
#[derive(Debug, Default)]
pub(crate) struct Counters {
	pub hits: AtomicU64,
	pub misses: AtomicU64,
	pub loads: AtomicU64,
	pub load_failures: AtomicU64,
	pub inserts: AtomicU64,
	pub updates: AtomicU64,
	pub removals: AtomicU64,
	pub flushes: AtomicU64,
}

impl Counters {
	pub fn bump(counter: &AtomicU64) {
		counter.fetch_add(1, Ordering::Relaxed);
	}

	pub fn snapshot(&self, item_count: usize) -> TableMetrics {
		TableMetrics {
			hits: self.hits.load(Ordering::Relaxed),
			misses: self.misses.load(Ordering::Relaxed),
			loads: self.loads.load(Ordering::Relaxed),
			load_failures: self.load_failures.load(Ordering::Relaxed),
			inserts: self.inserts.load(Ordering::Relaxed),
			updates: self.updates.load(Ordering::Relaxed),
			removals: self.removals.load(Ordering::Relaxed),
			flushes: self.flushes.load(Ordering::Relaxed),
			item_count,
		}
	}
}
