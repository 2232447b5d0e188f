//! Translation of free-form hints into policy-legal names.
//!
//! Handles casing, replacement of illegal character runs, and trimming of
//! separators at the boundaries. No truncation happens here.

use regex::NoExpand;

use crate::charset::{CharacterSetPolicy, LetterCase};
use crate::error::TranslationError;

/// Pure string translator for a fixed character-set policy.
#[derive(Debug, Clone)]
pub struct Translator {
	policy: CharacterSetPolicy,
}

impl Translator {
	pub fn new(policy: CharacterSetPolicy) -> Self {
		Self { policy }
	}

	pub fn policy(&self) -> &CharacterSetPolicy {
		&self.policy
	}

	/// Translate `input` into a name that only uses characters the policy
	/// allows, never starts or ends with a separator, and never contains two
	/// split characters in a row.
	///
	/// May return an empty string when nothing usable is left.
	pub fn translate(&self, input: &str) -> Result<String, TranslationError> {
		let policy = &self.policy;
		let split = policy.split_character();

		let cased = match (policy.single_case(), split) {
			(Some(case), Some(split)) => fold_case(&split_case_boundaries(input, split), case),
			(Some(case), None) => fold_case(input, case),
			(None, None) => to_camel_case(input),
			(None, Some(_)) => input.to_string(),
		};

		let replacement = split.map(String::from).unwrap_or_default();
		let replaced = policy
			.invalid_characters()
			.replace_all(&cased, NoExpand(&replacement));
		let trimmed = policy.leading_invalid().replace(&replaced, "");
		let collapsed = match policy.repeated_split() {
			Some(repeated) => repeated
				.replace_all(&trimmed, NoExpand(&replacement))
				.into_owned(),
			None => trimmed.into_owned(),
		};
		let output = policy.trailing_invalid().replace(&collapsed, "").into_owned();

		if !policy.has_only_valid_characters(&output) {
			return Err(TranslationError::IllegalOutput {
				input: input.to_string(),
				output,
			});
		}

		Ok(output)
	}
}

/// Insert `split` between a lowercase letter and a following uppercase one.
fn split_case_boundaries(input: &str, split: char) -> String {
	let mut result = String::with_capacity(input.len() + input.len() / 4);
	let mut prev_lower = false;

	for c in input.chars() {
		if prev_lower && c.is_uppercase() {
			result.push(split);
		}
		result.push(c);
		prev_lower = c.is_lowercase();
	}

	result
}

fn fold_case(input: &str, case: LetterCase) -> String {
	match case {
		LetterCase::Lower => input.to_lowercase(),
		LetterCase::Upper => input.to_uppercase(),
	}
}

/// Drop non-alphanumerics and capitalize the character following each
/// dropped run. The first kept character keeps its case.
fn to_camel_case(input: &str) -> String {
	let mut result = String::with_capacity(input.len());
	let mut capitalize_next = false;

	for c in input.chars() {
		if !c.is_alphanumeric() {
			capitalize_next = !result.is_empty();
			continue;
		}
		if capitalize_next {
			result.extend(c.to_uppercase());
			capitalize_next = false;
		} else {
			result.push(c);
		}
	}

	result
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::charset::CharacterSetRules;

	fn translator(lower: bool, upper: bool, digits: bool, extra: &str) -> Translator {
		let policy = CharacterSetPolicy::new(CharacterSetRules {
			allow_lower: lower,
			allow_upper: upper,
			allow_digits: digits,
			extra_chars: extra.to_string(),
			max_length: 32,
		})
		.unwrap();
		Translator::new(policy)
	}

	#[test]
	fn test_lower_only_keeps_snake_case() {
		let t = translator(true, false, true, "_-!");
		assert_eq!(t.translate("the_first_access_provider").unwrap(), "the_first_access_provider");
	}

	#[test]
	fn test_single_case_splits_camel_case() {
		let t = translator(false, true, true, "_");
		assert_eq!(t.translate("fooBar").unwrap(), "FOO_BAR");
		assert_eq!(t.translate("MyDataRole2").unwrap(), "MY_DATA_ROLE2");

		let t = translator(true, false, true, "_");
		assert_eq!(t.translate("fooBar").unwrap(), "foo_bar");
	}

	#[test]
	fn test_replaces_illegal_runs_and_trims() {
		let t = translator(true, false, true, "_-!");
		assert_eq!(t.translate("  --Hello World!! ").unwrap(), "hello_world");
		assert_eq!(t.translate("sales / finance").unwrap(), "sales_finance");
	}

	#[test]
	fn test_collapses_repeated_split_characters() {
		let t = translator(false, true, true, "_");
		assert_eq!(t.translate("a__b___c").unwrap(), "A_B_C");
		assert_eq!(t.translate("a_ _b").unwrap(), "A_B");
	}

	#[test]
	fn test_dash_as_split_character() {
		let t = translator(true, false, true, "-");
		assert_eq!(t.translate("a-b c").unwrap(), "a-b-c");
		assert_eq!(t.translate("--a----b--").unwrap(), "a-b");
	}

	#[test]
	fn test_single_case_without_split_folds_and_drops() {
		let t = translator(true, false, true, "!");
		assert_eq!(t.translate("Foo Bar!").unwrap(), "foobar");
	}

	#[test]
	fn test_both_cases_with_split_keeps_case() {
		let t = translator(true, true, true, "_");
		assert_eq!(t.translate("Hello World").unwrap(), "Hello_World");
	}

	#[test]
	fn test_camel_case_without_split() {
		let t = translator(true, true, true, "!@$.*");
		assert_eq!(
			t.translate("@_Str!ng#With_$pecial.Charact*rs").unwrap(),
			"StrNgWithPecialCharactRs"
		);
		assert_eq!(t.translate("first name").unwrap(), "firstName");
	}

	#[test]
	fn test_digits_removed_when_not_allowed() {
		let t = translator(true, false, false, "_");
		assert_eq!(t.translate("role42_x").unwrap(), "role_x");
		assert_eq!(t.translate("42").unwrap(), "");
	}

	#[test]
	fn test_empty_after_stripping() {
		let t = translator(false, true, true, "_");
		assert_eq!(t.translate("").unwrap(), "");
		assert_eq!(t.translate("!!!___").unwrap(), "");
	}

	#[test]
	fn test_non_ascii_is_replaced() {
		let t = translator(true, false, true, "_");
		assert_eq!(t.translate("café crème").unwrap(), "caf_cr_me");
	}
}
