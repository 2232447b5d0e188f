//! Naming Hint Library
//!
//! Turns free-form naming hints on access-control objects into short, unique
//! names that are legal in a target system, and keeps those names stable
//! from one synchronization run to the next.

pub mod charset;
pub mod error;
pub mod naming;
pub mod policy_config;
pub mod shard;
pub mod translate;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::info;

pub use charset::{CharacterSetPolicy, CharacterSetRules, LetterCase};
pub use error::{ConfigurationError, NamingError, TranslationError};
pub use naming::{GeneratedName, NameOrigin, NamingCandidate, UniqueNameGenerator};
pub use translate::Translator;

/// Configuration for a naming run
#[derive(Debug, Clone)]
pub struct Config {
	/// Naming rules of the target system
	pub rules: CharacterSetRules,
	/// Prepended to every hint before translation
	pub prefix: String,
	/// Sort candidates by id instead of rejecting out-of-order input
	pub sort_candidates: bool,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			rules: CharacterSetRules::default(),
			prefix: String::new(),
			sort_candidates: true,
		}
	}
}

/// Statistics about a naming run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Stats {
	pub assigned: usize,
	pub reused: usize,
	pub fresh: usize,
	pub suffixed: usize,
	pub truncated: usize,
	pub seeded: usize,
}

impl Stats {
	fn record(&mut self, generated: &GeneratedName) {
		self.assigned += 1;
		match generated.origin {
			NameOrigin::Reused => self.reused += 1,
			NameOrigin::Base => self.fresh += 1,
			NameOrigin::Suffixed => self.suffixed += 1,
		}
		if generated.truncated {
			self.truncated += 1;
		}
		if generated.seeded {
			self.seeded += 1;
		}
	}

	/// Add the counts of another run (e.g. another shard).
	pub fn merge(&mut self, other: &Stats) {
		self.assigned += other.assigned;
		self.reused += other.reused;
		self.fresh += other.fresh;
		self.suffixed += other.suffixed;
		self.truncated += other.truncated;
		self.seeded += other.seeded;
	}

	/// Share of names kept unchanged from the previous run
	pub fn reused_percent(&self) -> f64 {
		if self.assigned == 0 {
			0.0
		} else {
			(self.reused as f64 / self.assigned as f64) * 100.0
		}
	}
}

/// Final name for one candidate, as persisted between runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignedName {
	pub id: String,
	pub actual_name: String,
}

/// Result of a naming run
#[derive(Debug, Default)]
pub struct Assignment {
	/// One entry per candidate, in processing (id) order
	pub names: Vec<AssignedName>,
	pub stats: Stats,
}

/// Runs one naming cycle over a set of candidates
#[derive(Debug, Clone)]
pub struct NameAssigner {
	/// Generator with empty state, cloned for every run
	template: UniqueNameGenerator,
	sort_candidates: bool,
}

impl NameAssigner {
	/// Validate the configuration up front; no run can start with a policy
	/// the generator cannot work with.
	pub fn new(config: Config) -> Result<Self, ConfigurationError> {
		let policy = CharacterSetPolicy::new(config.rules)?;
		Self::with_policy(policy, config.prefix, config.sort_candidates)
	}

	/// Build from an already validated policy.
	pub fn with_policy(
		policy: CharacterSetPolicy,
		prefix: impl Into<String>,
		sort_candidates: bool,
	) -> Result<Self, ConfigurationError> {
		Ok(Self {
			template: UniqueNameGenerator::new(policy, prefix)?,
			sort_candidates,
		})
	}

	pub fn policy(&self) -> &CharacterSetPolicy {
		self.template.policy()
	}

	/// Assign a name to every candidate.
	///
	/// Candidates are processed in id order: either sorted here, or checked
	/// and rejected with [`NamingError::OutOfOrder`] when sorting is off.
	pub fn run(&self, candidates: &[NamingCandidate]) -> Result<Assignment, NamingError> {
		let mut ordered: Vec<&NamingCandidate> = candidates.iter().collect();
		if self.sort_candidates {
			ordered.sort_by(|a, b| a.id.cmp(&b.id));
		} else {
			check_order(&ordered)?;
		}

		let mut generator = self.template.clone();
		let mut assignment = Assignment {
			names: Vec::with_capacity(ordered.len()),
			stats: Stats::default(),
		};

		for candidate in ordered {
			let generated = generator.generate_detailed(candidate)?;
			assignment.stats.record(&generated);
			assignment.names.push(AssignedName {
				id: candidate.id.clone(),
				actual_name: generated.name,
			});
		}

		info!(
			prefix = generator.prefix(),
			assigned = assignment.stats.assigned,
			reused = assignment.stats.reused,
			suffixed = assignment.stats.suffixed,
			truncated = assignment.stats.truncated,
			"naming run finished"
		);

		Ok(assignment)
	}
}

/// Fill in missing prior names from the previous run's output.
///
/// A prior name already present on a candidate wins.
pub fn apply_previous(candidates: &mut [NamingCandidate], previous: &[AssignedName]) {
	let by_id: HashMap<&str, &str> = previous
		.iter()
		.map(|p| (p.id.as_str(), p.actual_name.as_str()))
		.collect();

	for candidate in candidates.iter_mut() {
		if candidate.prior_actual_name.is_some() {
			continue;
		}
		if let Some(name) = by_id.get(candidate.id.as_str()) {
			candidate.prior_actual_name = Some((*name).to_string());
		}
	}
}

fn check_order(candidates: &[&NamingCandidate]) -> Result<(), NamingError> {
	for pair in candidates.windows(2) {
		if pair[1].id < pair[0].id {
			return Err(NamingError::OutOfOrder {
				previous: pair[0].id.clone(),
				id: pair[1].id.clone(),
			});
		}
	}
	Ok(())
}
