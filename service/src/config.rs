use clap::builder::TypedValueParser as _;
use clap::Parser;
use dotenvy::dotenv;
use log::LevelFilter;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

#[derive(Clone, Debug, PartialEq)]
pub enum RustEnv {
    Development,
    Production,
    Staging,
}

#[derive(Debug, PartialEq, Eq)]
pub struct RustEnvParseError;

impl FromStr for RustEnv {
    type Err = RustEnvParseError;
    fn from_str(level: &str) -> Result<RustEnv, Self::Err> {
        match level.to_lowercase().as_str() {
            "development" => Ok(RustEnv::Development),
            "production" => Ok(RustEnv::Production),
            "staging" => Ok(RustEnv::Staging),
            _ => Err(RustEnvParseError),
        }
    }
}

impl fmt::Display for RustEnv {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RustEnv::Development => write!(f, "development"),
            RustEnv::Production => write!(f, "production"),
            RustEnv::Staging => write!(f, "staging"),
        }
    }
}

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// A list of full CORS origin URLs that allowed to receive server responses.
    #[arg(
        long,
        env,
        value_delimiter = ',',
        use_value_delimiter = true,
        default_value = "http://localhost:3000,https://localhost:3000"
    )]
    pub allowed_origins: Vec<String>,

    /// The host interface to listen for incoming connections
    #[arg(short, long, env, default_value = "127.0.0.1")]
    pub interface: Option<String>,

    /// The host TCP port to listen for incoming connections
    #[arg(short, long, env, default_value_t = 4000)]
    pub port: u16,

    /// Set the log level verbosity threshold (level) to control what gets displayed on console output
    #[arg(
        short,
        long,
        env,
        default_value_t = LevelFilter::Info,
        value_parser = clap::builder::PossibleValuesParser::new(["OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE"])
            .map(|s| s.parse::<LevelFilter>().unwrap()),
        )]
    pub log_level_filter: LevelFilter,

    /// Set the Rust runtime environment to use.
    #[arg(
    short,
    long,
    env,
    default_value_t = RustEnv::Development,
    value_parser = clap::builder::PossibleValuesParser::new([
        "DEVELOPMENT", "PRODUCTION", "STAGING",
        "development", "production", "staging"
    ])
        .map(|s| s.parse::<RustEnv>().unwrap()),
    )]
    pub runtime_env: RustEnv,

    /// Number of people the item store is populated with at startup (keys 0..store_size)
    #[arg(long, env, default_value_t = 100)]
    pub store_size: i32,

    /// Artificial latency in milliseconds for single person lookups
    #[arg(long, env, default_value_t = 2000)]
    pub lookup_latency_ms: u64,

    /// Upper bound in milliseconds of the random delay before each streamed person
    #[arg(long, env, default_value_t = 2000)]
    pub stream_max_delay_ms: u64,

    /// Number of people emitted by the /person/sse stream (ids 1..=sse_item_count)
    #[arg(long, env, default_value_t = 9)]
    pub sse_item_count: i32,

    /// Seconds a response may wait for its next value before the subscription is cancelled
    #[arg(long, env, default_value_t = 30)]
    pub stream_idle_timeout_secs: u64,

    /// Value stored under the session key `code` when a session does not have one yet
    #[arg(long, env, default_value_t = 100)]
    pub default_session_code: i32,

    /// Session expiry duration in seconds (default: 24 hours = 86400 seconds)
    #[arg(long, env, default_value_t = 86400)]
    pub session_expiry_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        // Load .env file first
        dotenv().ok();
        // Then parse the command line parameters and flags
        Config::parse()
    }

    /// Parses only the given arguments, ignoring the process command line and
    /// `.env`. Environment variables still apply.
    pub fn from_args<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Config::parse_from(args)
    }

    pub fn lookup_latency(&self) -> Duration {
        Duration::from_millis(self.lookup_latency_ms)
    }

    pub fn stream_max_delay(&self) -> Duration {
        Duration::from_millis(self.stream_max_delay_ms)
    }

    pub fn stream_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.stream_idle_timeout_secs)
    }

    pub fn runtime_env(&self) -> RustEnv {
        self.runtime_env.clone()
    }

    pub fn is_production(&self) -> bool {
        self.runtime_env() == RustEnv::Production
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_demo_dataset() {
        let config = Config::from_args(["person_stream_rs"]);
        assert_eq!(config.store_size, 100);
        assert_eq!(config.sse_item_count, 9);
        assert_eq!(config.default_session_code, 100);
        assert_eq!(config.lookup_latency(), Duration::from_millis(2000));
        assert_eq!(config.stream_idle_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn flags_override_defaults() {
        let config = Config::from_args([
            "person_stream_rs",
            "--sse-item-count",
            "3",
            "--stream-max-delay-ms",
            "0",
            "--log-level-filter",
            "DEBUG",
            "--runtime-env",
            "PRODUCTION",
        ]);
        assert_eq!(config.sse_item_count, 3);
        assert_eq!(config.stream_max_delay(), Duration::ZERO);
        assert_eq!(config.log_level_filter, LevelFilter::Debug);
        assert!(config.is_production());
    }

    #[test]
    fn rust_env_parses_case_insensitively() {
        assert_eq!("Staging".parse::<RustEnv>(), Ok(RustEnv::Staging));
        assert_eq!("qa".parse::<RustEnv>(), Err(RustEnvParseError));
    }
}
