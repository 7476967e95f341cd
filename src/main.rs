use clap::Parser;
use tracing::debug;

use pocketlink::cli::{Cli, Commands};
use pocketlink::config::{AppConfig, StorageBackend};
use pocketlink::interfaces::cli::{CliError, run_cli_command, run_config_command};
use pocketlink::logging::init_logging;
use pocketlink::runtime::StartupContext;

fn main() {
    let cli = Cli::parse();

    // 加载配置
    let mut config = match AppConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e.format_colored());
            std::process::exit(1);
        }
    };

    // --store 覆盖配置文件中的存储设置
    if let Some(path) = cli.store {
        config.storage.backend = StorageBackend::File;
        config.storage.path = path;
    }

    // guard 必须存活到进程结束，否则文件日志会丢失
    let _log_guard = match init_logging(&config.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{}", e.format_colored());
            std::process::exit(1);
        }
    };

    debug!("Using {:?} storage at {}", config.storage.backend, config.storage.path);

    if let Err(e) = run(config, cli.command) {
        eprintln!("{}", e.format_colored());
        std::process::exit(1);
    }
}

fn run(config: AppConfig, command: Commands) -> Result<(), CliError> {
    // 配置命令不需要打开存储
    if let Commands::Config { action } = command {
        return run_config_command(&config, action);
    }

    let ctx = StartupContext::prepare(config)
        .map_err(|e| CliError::StorageError(format!("{:#}", e)))?;
    run_cli_command(&ctx, command)
}
