use clap::Parser;
use small_calc::app::bootstrap;
use small_calc::config::toml_config::FileConfig;
use small_calc::utils::error::{ErrorSeverity, ServiceError};
use small_calc::utils::logger::{self, LogLevels};
use small_calc::utils::validation::Validate;
use small_calc::{CliArgs, Settings};

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("🛑 Shutdown signal received, draining connections");
}

fn exit_code(e: &ServiceError) -> i32 {
    // 根據錯誤嚴重程度決定退出碼
    match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

fn fail(e: &ServiceError) -> ! {
    tracing::error!(
        "❌ small-calc failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(exit_code(e).max(1));
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // 載入 TOML 配置 (可選)
    let file_config = match &args.config {
        Some(path) => match FileConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("❌ Failed to load config file '{}': {}", path, e);
                eprintln!("💡 Make sure the file exists and is valid TOML format");
                std::process::exit(1);
            }
        },
        None => FileConfig::default(),
    };

    let settings = Settings::resolve(&args, &file_config);

    // 驗證配置
    if let Err(e) = settings.validate() {
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    let log_levels = LogLevels::new();
    if let Err(e) = logger::init_service_logger(&settings.log_dir, settings.verbose, &log_levels) {
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(exit_code(&e).max(1));
    }

    tracing::info!("Starting small-calc on {}:{}", settings.host, settings.port);
    if settings.verbose {
        tracing::debug!("Resolved settings: {:?}", settings.redacted());
    }

    if let Err(e) = bootstrap::run(&settings, log_levels, shutdown_signal()).await {
        fail(&e);
    }

    tracing::info!("✅ small-calc stopped");
    Ok(())
}
