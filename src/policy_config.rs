//! Policy descriptor detection and loading.
//!
//! Finds `namehint.json` or a `package.json` with a `"namehint"` key.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

use crate::charset::CharacterSetRules;

/// Name of the standalone policy file
pub const POLICY_FILE_NAME: &str = "namehint.json";

/// Key holding the policy inside `package.json`
pub const PACKAGE_JSON_KEY: &str = "namehint";

/// Contents of a policy descriptor
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyFile {
	#[serde(flatten)]
	pub rules: CharacterSetRules,
	/// Prefix for every generated name
	#[serde(default)]
	pub prefix: Option<String>,
}

/// Find a policy descriptor by searching upward from a starting directory.
///
/// Searches for:
/// 1. `namehint.json` in the directory or any parent
/// 2. `package.json` with a `"namehint"` key in the directory or any parent
///
/// Returns `None` if no descriptor is found.
pub fn find_policy_config(start_dir: &Path) -> Option<PathBuf> {
	for dir in start_dir.ancestors() {
		let policy_path = dir.join(POLICY_FILE_NAME);
		if policy_path.exists() {
			return Some(policy_path);
		}

		let package_json_path = dir.join("package.json");
		if package_json_path.exists() {
			let has_key = fs::read_to_string(&package_json_path)
				.ok()
				.and_then(|content| serde_json::from_str::<Value>(&content).ok())
				.map(|json| json.get(PACKAGE_JSON_KEY).is_some())
				.unwrap_or(false);
			if has_key {
				return Some(package_json_path);
			}
		}
	}

	None
}

/// Load a policy descriptor.
///
/// For `package.json` the descriptor is read from the `"namehint"` key.
pub fn load_policy_file(path: &Path) -> Result<PolicyFile> {
	let content =
		fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;

	let json: Value = serde_json::from_str(&content)
		.with_context(|| format!("Failed to parse {}", path.display()))?;

	let is_package_json = path
		.file_name()
		.map(|n| n == "package.json")
		.unwrap_or(false);

	let descriptor = if is_package_json {
		json.get(PACKAGE_JSON_KEY)
			.cloned()
			.ok_or_else(|| anyhow::anyhow!("No '{}' key found in package.json", PACKAGE_JSON_KEY))?
	} else {
		json
	};

	serde_json::from_value(descriptor)
		.with_context(|| format!("Invalid naming policy in {}", path.display()))
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::fs;
	use tempfile::tempdir;

	#[test]
	fn test_find_policy_config() {
		let temp = tempdir().unwrap();
		let nested = temp.path().join("a").join("b");
		fs::create_dir_all(&nested).unwrap();

		// No config → None
		assert!(find_policy_config(&nested).is_none());

		fs::write(
			temp.path().join(POLICY_FILE_NAME),
			r#"{ "allowUpper": true, "allowDigits": true, "extraChars": "_", "maxLength": 32 }"#,
		)
		.unwrap();

		let found = find_policy_config(&nested).unwrap();
		assert!(found.ends_with(POLICY_FILE_NAME));
	}

	#[test]
	fn test_package_json_without_key_is_skipped() {
		let temp = tempdir().unwrap();
		fs::write(temp.path().join("package.json"), r#"{ "name": "app" }"#).unwrap();
		assert!(find_policy_config(temp.path()).is_none());

		fs::write(
			temp.path().join("package.json"),
			r#"{ "namehint": { "allowLower": true, "allowDigits": true, "extraChars": "_", "maxLength": 64 } }"#,
		)
		.unwrap();
		let found = find_policy_config(temp.path()).unwrap();
		assert!(found.ends_with("package.json"));
	}

	#[test]
	fn test_load_policy_file() {
		let temp = tempdir().unwrap();
		let path = temp.path().join(POLICY_FILE_NAME);

		fs::write(
			&path,
			r#"{
				"allowUpper": true,
				"allowDigits": true,
				"extraChars": "_",
				"maxLength": 32,
				"prefix": "rx_"
			}"#,
		)
		.unwrap();

		let policy = load_policy_file(&path).unwrap();
		assert!(policy.rules.allow_upper);
		assert!(!policy.rules.allow_lower);
		assert_eq!(policy.rules.extra_chars, "_");
		assert_eq!(policy.prefix.as_deref(), Some("rx_"));
	}

	#[test]
	fn test_load_policy_from_package_json() {
		let temp = tempdir().unwrap();
		let path = temp.path().join("package.json");

		fs::write(&path, r#"{ "name": "app" }"#).unwrap();
		assert!(load_policy_file(&path).is_err());

		fs::write(
			&path,
			r#"{ "namehint": { "allowLower": true, "allowDigits": true, "extraChars": "-", "maxLength": 40 } }"#,
		)
		.unwrap();
		let policy = load_policy_file(&path).unwrap();
		assert_eq!(policy.rules.max_length, 40);
		assert_eq!(policy.prefix, None);
	}

	#[test]
	fn test_load_policy_file_missing_max_length() {
		let temp = tempdir().unwrap();
		let path = temp.path().join(POLICY_FILE_NAME);
		fs::write(&path, r#"{ "allowLower": true }"#).unwrap();
		assert!(load_policy_file(&path).is_err());
	}
}
