//! Environment variable configuration
//!
//! Provides environment variable overrides for configuration.

use std::env;
use std::path::PathBuf;

use super::AppConfig;

/// Environment variable prefix
const ENV_PREFIX: &str = "RUSTOS_TEST";

/// Environment configuration from environment variables
#[derive(Clone, Debug, Default)]
pub struct EnvConfig {
    /// Emulator binary from RUSTOS_TEST_EMULATOR
    pub emulator: Option<String>,
    /// Config file from RUSTOS_TEST_CONFIG
    pub config_file: Option<PathBuf>,
    /// Output format from RUSTOS_TEST_FORMAT
    pub format: Option<String>,
    /// Verbose from RUSTOS_TEST_VERBOSE
    pub verbose: Option<bool>,
    /// Functional suite timeout from RUSTOS_TEST_FUNCTIONAL_TIMEOUT
    pub functional_timeout: Option<u64>,
    /// Stress suite timeout from RUSTOS_TEST_STRESS_TIMEOUT
    pub stress_timeout: Option<u64>,
    /// Skip builds from RUSTOS_TEST_NO_BUILD
    pub no_build: Option<bool>,
}

impl EnvConfig {
    /// Load configuration from environment variables
    pub fn load() -> Self {
        Self {
            emulator: get_env("EMULATOR"),
            config_file: get_env("CONFIG").map(PathBuf::from),
            format: get_env("FORMAT"),
            verbose: get_env_bool("VERBOSE"),
            functional_timeout: get_env_parse("FUNCTIONAL_TIMEOUT"),
            stress_timeout: get_env_parse("STRESS_TIMEOUT"),
            no_build: get_env_bool("NO_BUILD"),
        }
    }

    /// Overlay the variables that map onto file configuration
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(emulator) = &self.emulator {
            config.emulator.binary = emulator.clone();
        }
        if let Some(secs) = self.functional_timeout {
            config.timeouts.functional_secs = secs;
        }
        if let Some(secs) = self.stress_timeout {
            config.timeouts.stress_secs = secs;
        }
    }

    pub fn verbose_or(&self, default: bool) -> bool {
        self.verbose.unwrap_or(default)
    }

    pub fn no_build_or(&self, default: bool) -> bool {
        self.no_build.unwrap_or(default)
    }
}

/// Get environment variable with prefix
fn get_env(name: &str) -> Option<String> {
    env::var(format!("{ENV_PREFIX}_{name}")).ok()
}

/// Get environment variable and parse to type
fn get_env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    get_env(name).and_then(|v| v.parse().ok())
}

/// Get environment variable as boolean
fn get_env_bool(name: &str) -> Option<bool> {
    get_env(name).map(|v| {
        matches!(
            v.to_lowercase().as_str(),
            "1" | "true" | "yes" | "on" | "enabled"
        )
    })
}

/// Print all RUSTOS_TEST environment variables
pub fn env_help() -> String {
    [
        format!("  {ENV_PREFIX}_EMULATOR            Emulator executable"),
        format!("  {ENV_PREFIX}_CONFIG              Path to configuration file"),
        format!("  {ENV_PREFIX}_FORMAT              Report format (table, json, json-pretty, summary)"),
        format!("  {ENV_PREFIX}_VERBOSE             Enable debug logging (true/false)"),
        format!("  {ENV_PREFIX}_FUNCTIONAL_TIMEOUT  Functional suite timeout in seconds"),
        format!("  {ENV_PREFIX}_STRESS_TIMEOUT      Stress suite timeout in seconds"),
        format!("  {ENV_PREFIX}_NO_BUILD            Skip building suites (true/false)"),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Sets variables for the lifetime of the guard
    struct EnvGuard {
        previous: Vec<(String, Option<String>)>,
    }

    impl EnvGuard {
        fn set(vars: &[(&str, &str)]) -> Self {
            let previous = vars
                .iter()
                .map(|(name, value)| {
                    let key = format!("{ENV_PREFIX}_{name}");
                    let old = env::var(&key).ok();
                    env::set_var(&key, value);
                    (key, old)
                })
                .collect();
            Self { previous }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for (key, value) in &self.previous {
                match value {
                    Some(v) => env::set_var(key, v),
                    None => env::remove_var(key),
                }
            }
        }
    }

    #[test]
    fn test_env_config_default() {
        let config = EnvConfig::default();
        assert!(config.emulator.is_none());
        assert!(!config.verbose_or(false));
        assert!(config.no_build_or(true));
    }

    #[test]
    fn test_env_overrides_file_config() {
        let _guard = EnvGuard::set(&[
            ("EMULATOR", "/opt/qemu/bin/qemu-system-aarch64"),
            ("STRESS_TIMEOUT", "1200"),
        ]);

        let env_config = EnvConfig::load();
        let mut config = AppConfig::default();
        env_config.apply(&mut config);

        assert_eq!(config.emulator.binary, "/opt/qemu/bin/qemu-system-aarch64");
        assert_eq!(config.timeouts.stress_secs, 1200);
        assert_eq!(config.timeouts.functional_secs, 60);
    }

    #[test]
    fn test_env_bool_parsing() {
        let _guard = EnvGuard::set(&[("NO_BUILD", "yes")]);
        assert_eq!(EnvConfig::load().no_build, Some(true));
    }

    #[test]
    fn test_env_help_lists_variables() {
        let help = env_help();
        assert!(help.contains("RUSTOS_TEST_EMULATOR"));
        assert!(help.contains("RUSTOS_TEST_NO_BUILD"));
    }
}
