use rand::{SeedableRng, rngs::StdRng};
use v_utils::macros::{MyConfigPrimitives, Settings};

#[derive(Clone, Debug, MyConfigPrimitives, Settings)]
pub struct AppConfig {
	/// Shuffle the choice order of new attempts (default: true)
	#[serde(default = "default_true")]
	pub shuffle_choices: bool,
	/// Seed for the attempt RNG. Unset draws a fresh seed on every run.
	#[serde(default)]
	pub seed: Option<u64>,
	/// Default tracing filter when RUST_LOG is not set (default: "info")
	#[settings(default = default_log_level())]
	pub log_level: String,
	/// Exit with an error when a regrade is declined, instead of only warning (default: true)
	#[serde(default = "default_true")]
	pub strict_regrade: bool,
}

fn default_true() -> bool {
	true
}

fn default_log_level() -> String {
	"info".to_owned()
}

impl Default for AppConfig {
	fn default() -> Self {
		Self {
			shuffle_choices: true,
			seed: None,
			log_level: default_log_level(),
			strict_regrade: true,
		}
	}
}

impl AppConfig {
	pub fn rng(&self) -> StdRng {
		StdRng::seed_from_u64(self.seed.unwrap_or_else(rand::random))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn missing_fields_take_defaults() {
		let config: AppConfig = serde_json::from_str(r#"{"seed": 4}"#).unwrap();
		assert!(config.shuffle_choices);
		assert!(config.strict_regrade);
		assert_eq!(config.log_level, "info");
		assert_eq!(config.seed, Some(4));
	}

	#[test]
	fn explicit_fields_override_defaults() {
		let config: AppConfig = serde_json::from_str(r#"{"shuffle_choices": false, "strict_regrade": false, "log_level": "debug"}"#).unwrap();
		assert!(!config.shuffle_choices);
		assert!(!config.strict_regrade);
		assert_eq!(config.log_level, "debug");
		assert_eq!(config.seed, None);
	}

	#[test]
	fn seeded_rng_repeats() {
		let config = AppConfig { seed: Some(9), ..AppConfig::default() };
		let draw = || rand::seq::index::sample(&mut config.rng(), 100, 5).into_vec();
		assert_eq!(draw(), draw());
	}
}
