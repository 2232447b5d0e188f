//! Character-set policy for a target naming system.
//!
//! Describes which letters, digits and extra characters a target system
//! accepts, and derives the regexes the translator uses to clean up hints.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// Characters eligible to act as the split character.
const SPLIT_CANDIDATES: [char; 3] = ['_', '-', '#'];

/// Plain description of what a target system accepts in a name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterSetRules {
	#[serde(default)]
	pub allow_lower: bool,
	#[serde(default)]
	pub allow_upper: bool,
	#[serde(default)]
	pub allow_digits: bool,
	/// Extra characters allowed besides letters and digits
	#[serde(default)]
	pub extra_chars: String,
	pub max_length: usize,
}

impl Default for CharacterSetRules {
	fn default() -> Self {
		Self {
			allow_lower: true,
			allow_upper: false,
			allow_digits: true,
			extra_chars: "_".to_string(),
			max_length: 64,
		}
	}
}

/// The single letter case a policy folds names into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LetterCase {
	Lower,
	Upper,
}

/// Validated character-set policy with its derived regexes.
///
/// Immutable after construction. Cloning is cheap; compiled regexes are
/// reference counted internally.
#[derive(Debug, Clone)]
pub struct CharacterSetPolicy {
	rules: CharacterSetRules,
	split_character: Option<char>,
	invalid_characters: Regex,
	leading_invalid: Regex,
	trailing_invalid: Regex,
	repeated_split: Option<Regex>,
	valid_name: Regex,
}

impl CharacterSetPolicy {
	/// Validate the rules and build the policy's regexes.
	pub fn new(rules: CharacterSetRules) -> Result<Self, ConfigurationError> {
		if !rules.allow_lower && !rules.allow_upper {
			return Err(ConfigurationError::NoLetterCase);
		}

		let split_character = rules
			.extra_chars
			.chars()
			.find(|c| SPLIT_CANDIDATES.contains(c));

		let alphanumeric = alphanumeric_class(&rules);
		let valid = format!("{}{}", alphanumeric, escape_for_class(&rules.extra_chars));

		let invalid_characters = build_regex("invalid character", &format!("[^{valid}]+"))?;
		let leading_invalid = build_regex("leading trim", &format!("^[^{alphanumeric}]+"))?;
		let trailing_invalid = build_regex("trailing trim", &format!("[^{alphanumeric}]+$"))?;
		let valid_name = build_regex("valid name", &format!("^[{valid}]*$"))?;
		let repeated_split = split_character
			.map(|c| {
				let escaped = regex::escape(c.encode_utf8(&mut [0; 4]));
				build_regex("repeated split", &format!("(?:{escaped}){{2,}}"))
			})
			.transpose()?;

		Ok(Self {
			rules,
			split_character,
			invalid_characters,
			leading_invalid,
			trailing_invalid,
			repeated_split,
			valid_name,
		})
	}

	pub fn rules(&self) -> &CharacterSetRules {
		&self.rules
	}

	pub fn allows_lower(&self) -> bool {
		self.rules.allow_lower
	}

	pub fn allows_upper(&self) -> bool {
		self.rules.allow_upper
	}

	pub fn allows_digits(&self) -> bool {
		self.rules.allow_digits
	}

	pub fn max_length(&self) -> usize {
		self.rules.max_length
	}

	/// The word-boundary character, also used doubled as the suffix marker.
	pub fn split_character(&self) -> Option<char> {
		self.split_character
	}

	/// The only letter case allowed, or `None` when both cases are.
	pub fn single_case(&self) -> Option<LetterCase> {
		match (self.rules.allow_lower, self.rules.allow_upper) {
			(true, false) => Some(LetterCase::Lower),
			(false, true) => Some(LetterCase::Upper),
			_ => None,
		}
	}

	/// Check that `name` is non-empty, fits `max_length` and uses only
	/// characters the policy accepts.
	pub fn is_valid_name(&self, name: &str) -> bool {
		!name.is_empty()
			&& name.chars().count() <= self.rules.max_length
			&& self.valid_name.is_match(name)
	}

	pub(crate) fn has_only_valid_characters(&self, name: &str) -> bool {
		self.valid_name.is_match(name)
	}

	/// One or more characters outside the valid character class.
	pub(crate) fn invalid_characters(&self) -> &Regex {
		&self.invalid_characters
	}

	pub(crate) fn leading_invalid(&self) -> &Regex {
		&self.leading_invalid
	}

	pub(crate) fn trailing_invalid(&self) -> &Regex {
		&self.trailing_invalid
	}

	/// Two or more consecutive split characters.
	pub(crate) fn repeated_split(&self) -> Option<&Regex> {
		self.repeated_split.as_ref()
	}
}

/// Letter ranges in the allowed cases, plus digits when allowed.
fn alphanumeric_class(rules: &CharacterSetRules) -> String {
	let mut class = String::new();
	if rules.allow_lower {
		class.push_str("a-z");
	}
	if rules.allow_upper {
		class.push_str("A-Z");
	}
	if rules.allow_digits {
		class.push_str("0-9");
	}
	class
}

/// Escape characters so they are taken literally inside `[...]`.
///
/// `regex::escape` covers `-`, `]`, `\` and `^`. It leaves `_` alone, which
/// is literal in a class and rejected by the parser when escaped.
fn escape_for_class(chars: &str) -> String {
	let mut buf = [0; 4];
	chars
		.chars()
		.map(|c| regex::escape(c.encode_utf8(&mut buf)))
		.collect()
}

fn build_regex(what: &'static str, pattern: &str) -> Result<Regex, ConfigurationError> {
	Regex::new(pattern).map_err(|e| ConfigurationError::Regex {
		what,
		detail: e.to_string(),
	})
}
