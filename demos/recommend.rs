//! Wires a table to a backing store and compares listeners.

use std::collections::HashMap;
use std::sync::Arc;

use regommend::{FeatureMap, Item, Table};

fn backing_store(user: &str) -> Option<FeatureMap<&'static str>> {
	match user {
		"carol" => Some(HashMap::from([("jazz", 4.0), ("blues", 2.0)])),
		"dave" => Some(HashMap::from([("metal", 5.0)])),
		_ => None,
	}
}

fn main() {
	tracing_subscriber::fmt()
		.with_writer(std::io::stderr)
		.with_env_filter(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
		)
		.init();

	let table: Arc<Table<String, &'static str>> = Arc::new(
		Table::builder("listeners")
			.data_loader(|user: &String| backing_store(user).map(|data| Item::new(user.clone(), data)))
			.added_item_callback(|item| tracing::info!(user = %item.key(), "Listener added"))
			.about_to_delete_item_callback(|item| tracing::info!(user = %item.key(), "Listener leaving"))
			.logger(|line| println!("[log] {}", line))
			.build(),
	);

	table.add("alice".to_string(), HashMap::from([("jazz", 3.0), ("rock", 1.0)]));
	table.add("bob".to_string(), HashMap::from([("jazz", 1.5), ("rock", 4.0), ("pop", 2.0)]));

	// carol and dave are not resident yet; the loader fetches them on demand
	let users = ["alice", "bob", "carol", "dave"].map(String::from);
	for a in &users {
		for b in &users {
			if a >= b {
				continue;
			}
			match table.similarity(a, b) {
				Ok(score) => println!("{:>6} ~ {:<6} {:.3}", a, b, score),
				Err(e) => println!("{:>6} ~ {:<6} error: {}", a, b, e),
			}
		}
	}

	if let Err(e) = table.value(&"erin".to_string()) {
		println!("erin: {} ({})", e, e.code());
	}

	println!("{} listeners resident", table.count());
	let _ = table.delete(&"dave".to_string());
	table.flush();
	println!("{} listeners resident after flush", table.count());
}
