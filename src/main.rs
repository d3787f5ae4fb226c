use anyhow::Result;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use todo_store::config;

mod cli;

fn main() -> Result<()> {
    let config = config::load_config()?;

    init_logging(&config.log_level);

    let args: Vec<String> = std::env::args().collect();
    if let Err(e) = cli::handle_cli(&args, &config) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// 日志输出到 stderr；RUST_LOG 优先于配置文件中的级别
fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}
