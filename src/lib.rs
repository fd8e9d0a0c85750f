//! # Regommend
//!
//! A concurrent, in-memory item table for recommendation features:
//! - **Sparse feature vectors** keyed by any hashable feature type
//! - **Lazy loading** through a data-loader callback on lookup misses
//! - **Lifecycle hooks** fired after adds and before deletes
//! - **Cosine similarity** between stored items
//!
//! ## Quick Start
//!
//! ```rust
//! use std::collections::HashMap;
//! use regommend::{Table, cosine_similarity};
//!
//! let table: Table<&str> = Table::new("users");
//!
//! table.add("u1", HashMap::from([("f1".to_string(), 2.0), ("f2".to_string(), 0.0)]));
//! table.add("u2", HashMap::from([("f1".to_string(), 1.0), ("f3".to_string(), 3.0)]));
//!
//! let u1 = table.value(&"u1").unwrap();
//! let u2 = table.value(&"u2").unwrap();
//! assert_eq!(cosine_similarity(&*u1.data(), &*u2.data()), 1.0);
//! ```
//!
//! ## Lazy Loading
//!
//! ```rust
//! use regommend::{FeatureMap, Item, Table};
//!
//! let table: Table<u64> = Table::new("products");
//! table.set_data_loader(|id: &u64| {
//!     let mut features = FeatureMap::new();
//!     features.insert("popularity".to_string(), *id as f64);
//!     Some(Item::new(*id, features))
//! });
//!
//! // Not resident yet, so the loader supplies it and it becomes resident
//! let item = table.value(&42).unwrap();
//! assert_eq!(item.data()["popularity"], 42.0);
//! assert!(table.exists(&42));
//! ```
//!
//! ## Thread Safety
//!
//! The table is `Send + Sync` and can be shared across threads via `Arc`.
//! Callbacks run with the table lock released, so they may call back into
//! the table:
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use std::thread;
//!
//! let table = Arc::new(Table::<u64>::new("users"));
//!
//! let handles: Vec<_> = (0..4)
//!     .map(|i| {
//!         let table = table.clone();
//!         thread::spawn(move || {
//!             table.add(i, features);
//!         })
//!     })
//!     .collect();
//!
//! for handle in handles {
//!     handle.join().unwrap();
//! }
//! ```

mod builder;
mod error;
mod item;
#[cfg(feature = "metrics")]
mod metrics;
mod similarity;
mod table;
mod traits;

pub use builder::TableBuilder;
pub use error::{Result, TableError};
pub use item::Item;
#[cfg(feature = "metrics")]
pub use metrics::TableMetrics;
pub use similarity::{Similarity, cosine_similarity, full_cosine_similarity, magnitude};
pub use table::{DataLoader, FlushPolicy, ItemCallback, Logger, Table};
pub use traits::{FeatureKey, FeatureMap, ItemKey};
