//! Error types for policy construction, translation and name assignment.

use thiserror::Error;

/// A character-set policy or generator could not be constructed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
	#[error("policy must allow lower-case or upper-case letters")]
	NoLetterCase,

	#[error("policy has no split character; extra characters must include one of '_', '-', '#'")]
	NoSplitCharacter,

	#[error("policy must allow digits to build numeric suffixes")]
	DigitsNotAllowed,

	#[error("max length {max_length} is too small, at least {minimum} is required")]
	MaxLengthTooSmall { max_length: usize, minimum: usize },

	#[error("failed to build {what} regex: {detail}")]
	Regex { what: &'static str, detail: String },
}

/// Translating a hint produced something the policy does not accept.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslationError {
	#[error("translation of {input:?} produced illegal name {output:?}")]
	IllegalOutput { input: String, output: String },
}

/// Errors surfaced while assigning names for a run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NamingError {
	#[error(transparent)]
	Configuration(#[from] ConfigurationError),

	#[error(transparent)]
	Translation(#[from] TranslationError),

	#[error("no suffixes left for base name {base:?}")]
	SuffixSpaceExhausted { base: String },

	#[error("candidate {id:?} arrived after {previous:?}; ids must not decrease")]
	OutOfOrder { previous: String, id: String },

	#[error("name {name:?} was assigned by both shard {first:?} and shard {second:?}")]
	ShardCollision {
		name: String,
		first: String,
		second: String,
	},
}
