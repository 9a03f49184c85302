use clap::Parser;
use lead_insights::cli::Cli;
use lead_insights::config::StaticConfig;
use lead_insights::runtime::modes::{self, Mode};
use lead_insights::system::logging::init_logging;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = StaticConfig::load(cli.config.as_deref());

    match modes::detect_mode(cli.command.as_ref()) {
        #[cfg(feature = "server")]
        Mode::Server => {
            // 必须持有 guard，否则日志不会刷新
            let _guard = init_logging(&config.logging)?;
            modes::run_server(&config).await?;
        }
        #[cfg(feature = "cli")]
        Mode::Cli => {
            let Some(command) = cli.command else {
                return Ok(());
            };
            if let Err(e) = modes::run_cli(command, &config).await {
                eprintln!("{}", e.format_colored());
                std::process::exit(1);
            }
        }
        Mode::Unknown => {
            eprintln!("No execution mode available. Enable the `server` or `cli` feature.");
            std::process::exit(1);
        }
    }

    Ok(())
}
