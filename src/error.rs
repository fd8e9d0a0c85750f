use thiserror::Error;

/// Errors returned by [`Table`](crate::Table) lookups and removals.
///
/// A failed operation never changes the table's contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TableError {
	/// The key is not resident and no data loader is configured.
	#[error("Key not found in table")]
	KeyNotFound,
	/// The key is not resident and the data loader returned nothing for it.
	#[error("Key not found and could not be loaded into table")]
	KeyNotLoadable,
}

impl TableError {
	/// Stable code for this error kind.
	pub fn code(&self) -> &'static str {
		match self {
			Self::KeyNotFound => "KEY_NOT_FOUND",
			Self::KeyNotLoadable => "KEY_NOT_LOADABLE",
		}
	}

	/// Whether the key was absent, regardless of whether a load was attempted.
	///
	/// Both variants mean the key is not resident after the call returned.
	pub fn is_not_found(&self) -> bool {
		matches!(self, Self::KeyNotFound | Self::KeyNotLoadable)
	}
}

/// Result alias for table operations.
pub type Result<T> = std::result::Result<T, TableError>;

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_error_messages() {
		assert_eq!(TableError::KeyNotFound.to_string(), "Key not found in table");
		assert_eq!(
			TableError::KeyNotLoadable.to_string(),
			"Key not found and could not be loaded into table"
		);
	}

	#[test]
	fn test_error_codes_are_distinct() {
		assert_ne!(TableError::KeyNotFound.code(), TableError::KeyNotLoadable.code());
	}

	#[test]
	fn test_both_kinds_count_as_not_found() {
		assert!(TableError::KeyNotFound.is_not_found());
		assert!(TableError::KeyNotLoadable.is_not_found());
	}
}
