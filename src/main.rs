use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::{
	Result,
	eyre::{bail, eyre},
};
use samatch::{
	AttemptState, MemoryPool, RandomShortAnswerMatch, StepData, VersionRemapper,
	config::{AppConfig, SettingsCommand, SettingsFlags},
	error::RemapError,
	matching::{self, Response},
	start_attempt,
};
use serde::de::DeserializeOwned;
use tracing_subscriber::EnvFilter;
use v_utils::{elog, log};

#[derive(Parser)]
#[command(name = "samatch")]
#[command(about = "Start, grade and regrade random short-answer matching attempts", long_about = None)]
struct Args {
	#[command(flatten)]
	settings: SettingsFlags,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand)]
enum Command {
	/// Draw a new attempt and print its step data
	Start {
		#[arg(long)]
		pool: PathBuf,
		#[arg(long)]
		question: PathBuf,
	},
	/// Move a stored attempt onto the latest ready versions of its items
	Regrade {
		#[arg(long)]
		pool: PathBuf,
		#[arg(long)]
		question: PathBuf,
		#[arg(long)]
		state: PathBuf,
	},
	/// Grade a response against a stored attempt
	Grade {
		#[arg(long)]
		state: PathBuf,
		#[arg(long)]
		response: PathBuf,
	},
	/// Print the plain-text summary of a stored attempt
	Summary {
		#[arg(long)]
		question: PathBuf,
		#[arg(long)]
		state: PathBuf,
	},
	/// Manage the config file
	#[command(subcommand)]
	Settings(SettingsCommand),
}

fn main() -> Result<()> {
	color_eyre::install()?;
	let args = Args::parse();

	let command = match args.command {
		Command::Settings(cmd) => AppConfig::handle_settings_command(cmd, args.settings),
		command => command,
	};
	let config = AppConfig::try_build(args.settings).map_err(|e| eyre!("Failed to load config: {e}"))?;
	init_tracing(&config.log_level);

	match command {
		Command::Start { pool, question } => {
			let pool: MemoryPool = read_json(&pool)?;
			let question: RandomShortAnswerMatch = read_json(&question)?;
			let mut rng = config.rng();
			let mut step = StepData::new();
			let state = start_attempt(&question, &pool, &mut rng, config.shuffle_choices, &mut step)?;
			log!("Started attempt with {} stems and {} choices", state.stem_count(), state.choice_count());
			eprint!("{state}");
			print_json(&step)?;
		}
		Command::Regrade { pool, question, state } => {
			let pool: MemoryPool = read_json(&pool)?;
			let question: RandomShortAnswerMatch = read_json(&question)?;
			let mut step: StepData = read_json(&state)?;

			let mut remapper = VersionRemapper::new(&pool);
			match remapper.regrade(&mut step, question.choose) {
				Ok(next) => {
					log!("Regraded attempt, now on items {:?}", next.stem_order);
					print_json(&step)?;
				}
				Err(RemapError::Rejected(diagnostic)) if !config.strict_regrade => {
					elog!("Regrade declined, attempt left unchanged: {diagnostic}");
					print_json(&step)?;
				}
				Err(e) => bail!("Regrade failed: {e}"),
			}
		}
		Command::Grade { state, response } => {
			let step: StepData = read_json(&state)?;
			let response: Response = read_json(&response)?;
			let state = AttemptState::load(&step)?;

			if !matching::is_gradable_response(&state, &response) {
				log!("Response answers no stem");
			} else if !matching::is_complete_response(&state, &response) {
				log!("Response is incomplete");
			}
			let (fraction, graded) = matching::grade_response(&state, &response);
			println!("{fraction:.4} {}", graded.name());
			println!("{}", matching::summarise_response(&state, &response));
		}
		Command::Summary { question, state } => {
			let question: RandomShortAnswerMatch = read_json(&question)?;
			let step: StepData = read_json(&state)?;
			let state = AttemptState::load(&step)?;
			println!("{}", matching::question_summary(&question.question_text, question.format, &state));
		}
		Command::Settings(_) => unreachable!("settings commands exit before the config is built"),
	}

	Ok(())
}

fn init_tracing(default_level: &str) {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
	tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
	let raw = std::fs::read_to_string(path).map_err(|e| eyre!("Failed to read {}: {e}", path.display()))?;
	serde_json::from_str(&raw).map_err(|e| eyre!("Failed to parse {}: {e}", path.display()))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
	println!("{}", serde_json::to_string_pretty(value)?);
	Ok(())
}
