//! Unique name generator for one synchronization run.
//!
//! Base names come from translating a candidate's hint and are truncated to
//! leave room for a suffix. Collisions get `<split><split><hex counter>`
//! appended, e.g. `the_same_name__0`, `the_same_name__1`. Names assigned in a
//! previous run are reused or used to seed counters so suffixes keep
//! increasing across runs.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::charset::CharacterSetPolicy;
use crate::error::{ConfigurationError, NamingError, TranslationError};
use crate::translate::Translator;

/// Characters kept free at the end of a base name for the suffix:
/// two split characters plus up to four hex digits.
pub const SUFFIX_RESERVE: usize = 6;

/// Smallest max length that still leaves room for a base name and a suffix.
pub const MIN_MAX_LENGTH: usize = 8;

/// Largest counter that fits in four hex digits.
pub const MAX_SUFFIX: u32 = 0xFFFF;

/// An object that needs a name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamingCandidate {
	pub id: String,
	#[serde(default)]
	pub naming_hint: String,
	/// Used when the naming hint is empty
	#[serde(default)]
	pub fallback_name: String,
	/// The name this object got in the previous run, if any
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub prior_actual_name: Option<String>,
}

/// How a generated name came about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameOrigin {
	/// The prior actual name was kept as is
	Reused,
	/// The base name was free
	Base,
	/// The base name was taken and a counter suffix was added
	Suffixed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedName {
	pub name: String,
	pub origin: NameOrigin,
	/// The base name was cut to fit
	pub truncated: bool,
	/// A suffix parsed from the prior name seeded the counter
	pub seeded: bool,
}

/// Allocates unique names within a single run.
///
/// Not meant to be shared between threads; run one generator per shard
/// (with distinct prefixes) or feed every candidate through one instance.
/// Candidates must be presented in non-decreasing id order for the output
/// to be stable from one run to the next.
#[derive(Debug, Clone)]
pub struct UniqueNameGenerator {
	translator: Translator,
	prefix: String,
	/// The split character, doubled
	marker: String,
	effective_max_length: usize,
	/// Base name -> next suffix counter
	reserved: HashMap<String, u32>,
	issued: HashSet<String>,
}

impl UniqueNameGenerator {
	/// Create a generator for `policy`. Every hint is translated with
	/// `prefix` prepended.
	pub fn new(
		policy: CharacterSetPolicy,
		prefix: impl Into<String>,
	) -> Result<Self, ConfigurationError> {
		let split = policy
			.split_character()
			.ok_or(ConfigurationError::NoSplitCharacter)?;
		if !policy.allows_digits() {
			return Err(ConfigurationError::DigitsNotAllowed);
		}
		if policy.max_length() < MIN_MAX_LENGTH {
			return Err(ConfigurationError::MaxLengthTooSmall {
				max_length: policy.max_length(),
				minimum: MIN_MAX_LENGTH,
			});
		}

		Ok(Self {
			effective_max_length: policy.max_length() - SUFFIX_RESERVE,
			marker: format!("{split}{split}"),
			translator: Translator::new(policy),
			prefix: prefix.into(),
			reserved: HashMap::new(),
			issued: HashSet::new(),
		})
	}

	pub fn policy(&self) -> &CharacterSetPolicy {
		self.translator.policy()
	}

	pub fn prefix(&self) -> &str {
		&self.prefix
	}

	/// Generate the name for `candidate`.
	pub fn generate(&mut self, candidate: &NamingCandidate) -> Result<String, NamingError> {
		self.generate_detailed(candidate).map(|generated| generated.name)
	}

	/// Like [`generate`](Self::generate), but also reports how the name was
	/// chosen.
	pub fn generate_detailed(
		&mut self,
		candidate: &NamingCandidate,
	) -> Result<GeneratedName, NamingError> {
		let (base, truncated) = self.base_name(candidate)?;
		let prior = candidate
			.prior_actual_name
			.as_deref()
			.filter(|prior| !prior.is_empty());

		if let Some(prior) = prior {
			// Hint unchanged since the prior run
			if prior == candidate.naming_hint
				&& !self.is_taken(prior)
				&& self.policy().is_valid_name(prior)
			{
				debug!(id = %candidate.id, name = prior, "reusing prior name");
				self.reserved.insert(prior.to_string(), 0);
				self.issued.insert(prior.to_string());
				return Ok(GeneratedName {
					name: prior.to_string(),
					origin: NameOrigin::Reused,
					truncated: false,
					seeded: false,
				});
			}
		}

		let floor = prior.and_then(|prior| self.prior_suffix_floor(&candidate.id, prior, &base));

		if let (Some(prior), Some(floor)) = (prior, floor) {
			if self.can_keep_suffixed(&base, prior, floor) {
				debug!(id = %candidate.id, name = prior, "keeping prior suffixed name");
				self.reserved.insert(base, floor);
				self.issued.insert(prior.to_string());
				return Ok(GeneratedName {
					name: prior.to_string(),
					origin: NameOrigin::Reused,
					truncated,
					seeded: true,
				});
			}
		}

		self.reserve(base, floor, truncated)
	}

	/// A prior `<base><marker><n>` name survives if no suffix at or above `n`
	/// was handed out for `base` in this run.
	fn can_keep_suffixed(&self, base: &str, prior: &str, floor: u32) -> bool {
		let below_counter = self.reserved.get(base).map_or(true, |next| *next < floor);
		below_counter && !self.issued.contains(prior) && self.policy().is_valid_name(prior)
	}

	/// Translate the hint (or fallback name) and cut it to the effective
	/// max length.
	fn base_name(&self, candidate: &NamingCandidate) -> Result<(String, bool), TranslationError> {
		let hint_source = if candidate.naming_hint.is_empty() {
			&candidate.fallback_name
		} else {
			&candidate.naming_hint
		};

		let mut base = self
			.translator
			.translate(&format!("{}{}", self.prefix, hint_source))?;
		if base.is_empty() && !candidate.naming_hint.is_empty() {
			base = self
				.translator
				.translate(&format!("{}{}", self.prefix, candidate.fallback_name))?;
		}

		let (base, truncated) = truncate_chars(base, self.effective_max_length);
		if !truncated {
			return Ok((base, false));
		}

		// A cut can leave a dangling separator, which would run into the
		// suffix marker.
		let trimmed = self.policy().trailing_invalid().replace(&base, "").into_owned();
		Ok((trimmed, true))
	}

	/// Parse `<base><marker><hex>` out of a prior name and return the counter
	/// value the next suffix for `base` must be at least.
	fn prior_suffix_floor(&self, id: &str, prior: &str, base: &str) -> Option<u32> {
		let segments: Vec<&str> = prior.split(self.marker.as_str()).collect();

		match segments.as_slice() {
			[_] => None,
			[left, suffix] => {
				if *left != base {
					return None;
				}
				match parse_hex_suffix(suffix) {
					Some(value) => {
						debug!(id, prior, base, value, "seeding suffix counter from prior name");
						Some(value + 1)
					}
					None => {
						debug!(id, prior, "prior name suffix is not a hex counter");
						None
					}
				}
			}
			_ => {
				warn!(
					id,
					prior,
					marker = %self.marker,
					"prior name contains the suffix marker more than once, ignoring it"
				);
				None
			}
		}
	}

	fn reserve(
		&mut self,
		base: String,
		floor: Option<u32>,
		truncated: bool,
	) -> Result<GeneratedName, NamingError> {
		let seeded = floor.is_some();

		if !self.is_taken(&base) {
			self.reserved.insert(base.clone(), floor.unwrap_or(0));
			self.issued.insert(base.clone());
			return Ok(GeneratedName {
				name: base,
				origin: NameOrigin::Base,
				truncated,
				seeded,
			});
		}

		let mut counter = self
			.reserved
			.get(&base)
			.copied()
			.unwrap_or(0)
			.max(floor.unwrap_or(0));

		loop {
			if counter > MAX_SUFFIX {
				return Err(NamingError::SuffixSpaceExhausted { base });
			}
			let name = self.suffixed(&base, counter);
			counter += 1;
			if self.issued.contains(&name) {
				continue;
			}

			debug!(base = %base, name = %name, "base name taken, adding suffix");
			self.reserved.insert(base, counter);
			self.issued.insert(name.clone());
			return Ok(GeneratedName {
				name,
				origin: NameOrigin::Suffixed,
				truncated,
				seeded,
			});
		}
	}

	fn suffixed(&self, base: &str, counter: u32) -> String {
		if self.policy().allows_upper() {
			format!("{}{}{:X}", base, self.marker, counter)
		} else {
			format!("{}{}{:x}", base, self.marker, counter)
		}
	}

	fn is_taken(&self, name: &str) -> bool {
		self.reserved.contains_key(name) || self.issued.contains(name)
	}
}

fn truncate_chars(mut s: String, max: usize) -> (String, bool) {
	match s.char_indices().nth(max) {
		Some((idx, _)) => {
			s.truncate(idx);
			(s, true)
		}
		None => (s, false),
	}
}

fn parse_hex_suffix(s: &str) -> Option<u32> {
	if s.is_empty() || !s.chars().all(|c| c.is_ascii_hexdigit()) {
		return None;
	}
	u32::from_str_radix(s, 16)
		.ok()
		.filter(|value| *value <= MAX_SUFFIX)
}
