//! Naming Hint CLI
//!
//! Assigns unique, target-legal names to a set of naming candidates and
//! writes them out so the next run can keep them stable.

use anyhow::{bail, Context, Result};
use clap::Parser;
use namehint::policy_config::{find_policy_config, load_policy_file};
use namehint::{apply_previous, AssignedName, CharacterSetRules, Config, NameAssigner, NamingCandidate};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "namehint")]
#[command(author = "Fellow <engineering@fellow.app>")]
#[command(version)]
#[command(about = "Assign unique target-legal names from naming hints", long_about = None)]
struct Args {
	/// JSON file with an array of candidates ({id, namingHint, fallbackName, priorActualName})
	#[arg(value_name = "CANDIDATES")]
	candidates: PathBuf,

	/// Policy descriptor (default: nearest namehint.json or package.json "namehint" key)
	#[arg(short, long, value_name = "FILE")]
	policy: Option<PathBuf>,

	/// Output of the previous run, used for prior names
	#[arg(long, value_name = "FILE")]
	previous: Option<PathBuf>,

	/// Where to write the assigned names (default: stdout)
	#[arg(short, long, value_name = "FILE")]
	output: Option<PathBuf>,

	/// Prefix for every generated name (overrides the policy file)
	#[arg(long)]
	prefix: Option<String>,

	/// Reject candidates that are not sorted by id instead of sorting them
	#[arg(long)]
	strict_order: bool,

	/// Allow lower-case letters (when no policy file is used)
	#[arg(long)]
	lower: bool,

	/// Allow upper-case letters (when no policy file is used)
	#[arg(long)]
	upper: bool,

	/// Disallow digits (when no policy file is used)
	#[arg(long)]
	no_digits: bool,

	/// Extra allowed characters (when no policy file is used)
	#[arg(long, default_value = "_")]
	extra: String,

	/// Maximum name length (when no policy file is used)
	#[arg(long, default_value = "64")]
	max_length: usize,

	/// Assign names without writing any output
	#[arg(short = 'n', long)]
	dry_run: bool,

	/// Print debug logging
	#[arg(short, long)]
	verbose: bool,
}

fn main() -> Result<()> {
	let args = Args::parse();
	init_logging(args.verbose);

	let cwd = env::current_dir()?;
	let policy_path = args.policy.clone().or_else(|| find_policy_config(&cwd));

	let (rules, file_prefix) = match policy_path {
		Some(ref path) => {
			let file = load_policy_file(path)?;
			tracing::debug!(path = %path.display(), "loaded naming policy");
			(file.rules, file.prefix)
		}
		None => {
			if !args.lower && !args.upper {
				bail!(
					"No naming policy found (namehint.json or package.json with 'namehint' key).\n\
					 Either pass one: namehint --policy ./namehint.json candidates.json\n\
					 Or describe it with flags: namehint --upper --extra _ --max-length 32 candidates.json"
				);
			}
			let rules = CharacterSetRules {
				allow_lower: args.lower,
				allow_upper: args.upper,
				allow_digits: !args.no_digits,
				extra_chars: args.extra.clone(),
				max_length: args.max_length,
			};
			(rules, None)
		}
	};

	let config = Config {
		rules,
		prefix: args.prefix.clone().or(file_prefix).unwrap_or_default(),
		sort_candidates: !args.strict_order,
	};

	let mut candidates: Vec<NamingCandidate> = read_json(&args.candidates)?;
	if let Some(ref previous_path) = args.previous {
		let previous: Vec<AssignedName> = read_json(previous_path)?;
		apply_previous(&mut candidates, &previous);
	}

	let start_time = Instant::now();
	let assigner = NameAssigner::new(config)?;
	let assignment = assigner.run(&candidates)?;
	let time_str = format!("{:.2}s", start_time.elapsed().as_secs_f64());

	if !args.dry_run {
		let json = serde_json::to_string_pretty(&assignment.names)?;
		match args.output {
			Some(ref path) => fs::write(path, json + "\n")
				.with_context(|| format!("Failed to write {}", path.display()))?,
			None => println!("{}", json),
		}
	}

	let stats = &assignment.stats;
	eprintln!(
		"Assigned {} names ({} reused, {} suffixed, {} truncated) in {}",
		stats.assigned, stats.reused, stats.suffixed, stats.truncated, time_str
	);
	if args.verbose {
		eprintln!("  Reused: {:.1}%", stats.reused_percent());
		eprintln!("  Seeded from prior suffix: {}", stats.seeded);
	}

	Ok(())
}

fn init_logging(verbose: bool) {
	let default_level = if verbose { "debug" } else { "warn" };
	let filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.init();
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
	let content =
		fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
	serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}
