use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::similarity::cosine_similarity;
use crate::traits::FeatureMap;

/// A keyed sparse feature vector.
///
/// The key is fixed at construction. The feature data sits behind the item's
/// own reader/writer lock, which is independent of the owning table's lock:
/// the table guards which items exist, the item guards what it contains.
///
/// Items handed out by a [`Table`](crate::Table) are `Arc<Item>`. Removing an
/// item from the table makes it unreachable through the table but does not
/// invalidate references callers already hold.
#[derive(Debug)]
pub struct Item<K, F = String> {
	key: K,
	data: RwLock<FeatureMap<F>>,
}

impl<K, F> Item<K, F> {
	/// Create an item from a key and its feature weights.
	pub fn new(key: K, data: FeatureMap<F>) -> Self {
		Self {
			key,
			data: RwLock::new(data),
		}
	}

	/// The item's key.
	pub fn key(&self) -> &K {
		&self.key
	}

	/// Shared access to the feature data. Do not hold it across `.await`.
	pub fn data(&self) -> RwLockReadGuard<'_, FeatureMap<F>> {
		self.data.read()
	}

	/// Exclusive access to the feature data.
	///
	/// While the guard is alive, [`Table::delete`](crate::Table::delete) for
	/// this item blocks before unlinking it.
	pub fn data_mut(&self) -> RwLockWriteGuard<'_, FeatureMap<F>> {
		self.data.write()
	}

	/// Number of features currently set on this item.
	pub fn feature_count(&self) -> usize {
		self.data.read().len()
	}

	/// Consume the item and return its feature data.
	pub fn into_data(self) -> FeatureMap<F> {
		self.data.into_inner()
	}

	/// Cloned copy of the feature data. Safe to hold across `.await` points.
	pub fn snapshot(&self) -> FeatureMap<F>
	where
		F: Clone,
	{
		self.data.read().clone()
	}

	/// Run `f` over this item's data and `other`'s, in that order, while
	/// both are read-locked.
	///
	/// The two locks are taken in address order, so callers pairing the same
	/// items in opposite orders cannot deadlock behind a queued writer.
	pub(crate) fn read_pair<R>(&self, other: &Self, f: impl FnOnce(&FeatureMap<F>, &FeatureMap<F>) -> R) -> R {
		if std::ptr::eq(self, other) {
			let data = self.data.read();
			return f(&*data, &*data);
		}

		if std::ptr::from_ref(self) < std::ptr::from_ref(other) {
			let ours = self.data.read();
			let theirs = other.data.read();
			f(&*ours, &*theirs)
		} else {
			let theirs = other.data.read();
			let ours = self.data.read();
			f(&*ours, &*theirs)
		}
	}
}

impl<K, F> Item<K, F>
where
	F: std::hash::Hash + Eq,
{
	/// Shared-feature cosine similarity between this item and `other`.
	///
	/// See [`cosine_similarity`] for the exact definition.
	pub fn similarity(&self, other: &Self) -> f64 {
		self.read_pair(other, |ours, theirs| cosine_similarity(ours, theirs))
	}
}

#[cfg(test)]
mod tests {
	use std::collections::HashMap;
	use std::sync::Arc;
	use std::sync::atomic::{AtomicBool, Ordering};
	use std::sync::mpsc;
	use std::thread;
	use std::time::Duration;

	use super::*;

	fn make_item(key: &str, pairs: &[(&str, f64)]) -> Item<String> {
		let data = pairs.iter().map(|(f, w)| (f.to_string(), *w)).collect();
		Item::new(key.to_string(), data)
	}

	#[test]
	fn test_item_key_and_data() {
		let item = make_item("u1", &[("f1", 2.0), ("f2", 0.5)]);

		assert_eq!(item.key(), "u1");
		assert_eq!(item.feature_count(), 2);
		assert_eq!(item.data().get("f1"), Some(&2.0));
	}

	#[test]
	fn test_item_data_mut() {
		let item = make_item("u1", &[("f1", 2.0)]);

		item.data_mut().insert("f2".to_string(), 3.0);

		assert_eq!(item.feature_count(), 2);
		assert_eq!(item.snapshot().get("f2"), Some(&3.0));
	}

	#[test]
	fn test_item_into_data() {
		let item = make_item("u1", &[("f1", 1.0)]);
		let data = item.into_data();

		assert_eq!(data, HashMap::from([("f1".to_string(), 1.0)]));
	}

	#[test]
	fn test_item_similarity() {
		let a = make_item("a", &[("f1", 2.0), ("f2", 0.0)]);
		let b = make_item("b", &[("f1", 1.0), ("f3", 3.0)]);

		assert!((a.similarity(&b) - 1.0).abs() < 1e-12);
	}

	#[test]
	fn test_item_self_similarity_does_not_deadlock() {
		let a = make_item("a", &[("f1", 2.0)]);

		assert!((a.similarity(&a) - 1.0).abs() < 1e-12);
	}

	#[test]
	fn test_cross_ordered_similarity_with_writers() {
		let a = Arc::new(make_item("a", &[("f1", 1.0)]));
		let b = Arc::new(make_item("b", &[("f1", 2.0)]));
		let (done_tx, done_rx) = mpsc::channel();

		for (x, y) in [(a.clone(), b.clone()), (b.clone(), a.clone())] {
			let done = done_tx.clone();
			thread::spawn(move || {
				for _ in 0..20_000 {
					let score = x.similarity(&y);
					assert!((-1.0..=1.0).contains(&score));
				}
				let _ = done.send(());
			});
		}

		for item in [a, b] {
			let done = done_tx.clone();
			thread::spawn(move || {
				for i in 0..20_000 {
					item.data_mut().insert(format!("w{}", i % 8), 1.0);
				}
				let _ = done.send(());
			});
		}
		drop(done_tx);

		for _ in 0..4 {
			done_rx.recv_timeout(Duration::from_secs(30)).expect("similarity and writers should make progress");
		}
	}

	#[test]
	fn test_writer_waits_for_reader() {
		let item = Arc::new(make_item("a", &[("f1", 1.0)]));
		let written = Arc::new(AtomicBool::new(false));

		let guard = item.data();

		let handle = {
			let item = item.clone();
			let written = written.clone();
			thread::spawn(move || {
				item.data_mut().insert("f2".to_string(), 2.0);
				written.store(true, Ordering::SeqCst);
			})
		};

		thread::sleep(Duration::from_millis(20));
		assert!(!written.load(Ordering::SeqCst));
		drop(guard);

		handle.join().expect("writer thread should not panic");
		assert!(written.load(Ordering::SeqCst));
		assert_eq!(item.feature_count(), 2);
	}

	#[test]
	fn test_item_is_send_sync() {
		fn assert_send<T: Send>() {}
		fn assert_sync<T: Sync>() {}

		assert_send::<Item<String>>();
		assert_sync::<Item<String>>();
	}
}
