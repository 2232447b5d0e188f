//! Parallel naming over independent shards.
//!
//! A generator must not be shared between threads, so parallel runs split
//! the candidates into shards, each with its own prefix and its own
//! generator. Shards run on the rayon pool; the merge afterwards checks that
//! no name came out of two shards.

use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap};

use crate::{
	Assignment, CharacterSetPolicy, Config, NameAssigner, NamingCandidate, NamingError,
};

/// A group of candidates named by one generator.
#[derive(Debug, Clone, Default)]
pub struct Shard {
	/// Appended to the run prefix for every candidate of this shard
	pub prefix: String,
	pub candidates: Vec<NamingCandidate>,
}

/// Group candidates into shards by a partition key.
///
/// The key doubles as the shard prefix. Shards come back ordered by key so
/// runs are deterministic.
pub fn partition_by<F>(candidates: Vec<NamingCandidate>, key: F) -> Vec<Shard>
where
	F: Fn(&NamingCandidate) -> String,
{
	let mut groups: BTreeMap<String, Vec<NamingCandidate>> = BTreeMap::new();
	for candidate in candidates {
		groups.entry(key(&candidate)).or_default().push(candidate);
	}

	groups
		.into_iter()
		.map(|(prefix, candidates)| Shard { prefix, candidates })
		.collect()
}

/// Name every shard in parallel and merge the results in shard order.
pub fn assign_sharded(config: &Config, shards: &[Shard]) -> Result<Assignment, NamingError> {
	let policy = CharacterSetPolicy::new(config.rules.clone())?;

	// Parallel: one generator per shard
	let results: Vec<Result<Assignment, NamingError>> = shards
		.par_iter()
		.map(|shard| {
			let prefix = format!("{}{}", config.prefix, shard.prefix);
			let assigner = NameAssigner::with_policy(policy.clone(), prefix, config.sort_candidates)?;
			assigner.run(&shard.candidates)
		})
		.collect();

	// Merge (sequential - needed for collision detection)
	let mut merged = Assignment::default();
	let mut owners: HashMap<String, &str> = HashMap::new();

	for (shard, result) in shards.iter().zip(results) {
		let assignment = result?;
		for assigned in &assignment.names {
			if let Some(first) = owners.insert(assigned.actual_name.clone(), shard.prefix.as_str()) {
				return Err(NamingError::ShardCollision {
					name: assigned.actual_name.clone(),
					first: first.to_string(),
					second: shard.prefix.clone(),
				});
			}
		}
		merged.stats.merge(&assignment.stats);
		merged.names.extend(assignment.names);
	}

	Ok(merged)
}
