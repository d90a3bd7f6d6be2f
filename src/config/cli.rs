use clap::Parser;

/// Command line flags. Every flag can also come from a `SMALL_CALC_*`
/// environment variable; unset flags fall back to the TOML file, then to
/// built-in defaults.
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "small-calc")]
#[command(about = "Stack and independent calculator HTTP service")]
pub struct CliArgs {
    /// Path to a TOML configuration file
    #[arg(short, long, env = "SMALL_CALC_CONFIG")]
    pub config: Option<String>,

    #[arg(long, env = "SMALL_CALC_HOST")]
    pub host: Option<String>,

    #[arg(short, long, env = "SMALL_CALC_PORT")]
    pub port: Option<u16>,

    #[arg(long, env = "SMALL_CALC_POSTGRES_URL")]
    pub postgres_url: Option<String>,

    #[arg(long, env = "SMALL_CALC_MONGO_URL")]
    pub mongo_url: Option<String>,

    #[arg(long, env = "SMALL_CALC_MONGO_DATABASE")]
    pub mongo_database: Option<String>,

    #[arg(long, env = "SMALL_CALC_MONGO_COLLECTION")]
    pub mongo_collection: Option<String>,

    /// Directory for requests.log, stack.log and independent.log
    #[arg(long, env = "SMALL_CALC_LOG_DIR")]
    pub log_dir: Option<String>,

    #[arg(long, env = "SMALL_CALC_DB_CONNECT_ATTEMPTS")]
    pub db_connect_attempts: Option<usize>,

    #[arg(long, env = "SMALL_CALC_DB_RETRY_DELAY_SECS")]
    pub db_retry_delay_secs: Option<u64>,

    /// Keep persisted history in process memory instead of PostgreSQL/MongoDB
    #[arg(long, env = "SMALL_CALC_MEMORY_STORE")]
    pub memory_store: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}
