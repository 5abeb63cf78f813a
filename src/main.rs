//! elmapp - Elm front-end host and UI regression driver
//!
//! Main entry point for the CLI application.

use std::path::PathBuf;

use anyhow::bail;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use elmapp::uitest::{cases, check_reachable, AgentBrowser, AnvioCases, Suite};
use elmapp::{Config, ElmAppError};

/// elmapp - Elm front-end host and UI regression driver
#[derive(Parser, Debug)]
#[command(name = "elmapp")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable debug output
    #[arg(long, short = 'd', global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the bundle on demand and serve the entry page
    Serve {
        /// Bind address
        #[arg(long)]
        host: Option<String>,

        /// Port number
        #[arg(long, short = 'p')]
        port: Option<u16>,

        /// Elm application directory
        #[arg(long)]
        app_dir: Option<PathBuf>,

        /// Rebuild on every request and keep temporary copies
        #[arg(long)]
        rebuild: bool,

        /// Open the system browser once listening
        #[arg(long)]
        open: bool,

        /// Project file handed to the application as flags
        #[arg(long)]
        project: Option<PathBuf>,
    },

    /// Run the UI regression suite against a running instance
    UiTest {
        /// Base URL of the instance
        #[arg(long)]
        url: Option<String>,

        /// Directory with the upload fixtures
        #[arg(long)]
        fixtures: Option<PathBuf>,

        /// Run in headed browser mode (visible window)
        #[arg(long)]
        headed: bool,

        /// Only run the named case (repeatable)
        #[arg(long = "case")]
        cases: Vec<String>,
    },

    /// Print the default configuration
    Config {
        /// Write it to the config file instead
        #[arg(long)]
        init: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = if args.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let mut config = Config::load();

    match args.command {
        Command::Serve {
            host,
            port,
            app_dir,
            rebuild,
            open,
            project,
        } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(app_dir) = app_dir {
                config.app.app_dir = app_dir;
            }
            if rebuild {
                config.build.debug = true;
            }
            if open {
                config.server.open_browser = true;
            }

            elmapp::server::serve(&config, project.as_deref()).await?;
        }

        Command::UiTest {
            url,
            fixtures,
            headed,
            cases: selected,
        } => {
            if let Some(url) = url {
                config.suite.base_url = url;
            }
            if let Some(fixtures) = fixtures {
                config.suite.fixtures_dir = fixtures;
            }
            if headed {
                config.browser.headed = true;
            }

            run_suite(&config, &selected).await?;
        }

        Command::Config { init } => {
            if init {
                let path = config.save()?;
                println!("Configuration written to {}", path.display());
            } else {
                print!("{}", Config::default_config_toml());
            }
        }
    }

    Ok(())
}

async fn run_suite(config: &Config, selected: &[String]) -> anyhow::Result<()> {
    if !AgentBrowser::is_available().await {
        return Err(ElmAppError::AgentBrowserNotFound.into());
    }

    let anvio = AnvioCases::new(&config.suite)?;
    check_reachable(anvio.base_url()).await?;

    for path in cases::missing_fixtures(&config.suite.fixtures_dir) {
        tracing::warn!("Missing fixture {}", path.display());
    }

    let suite = Suite::new(anvio.all(), &config.browser).select(selected)?;
    let headed = config.browser.headed;
    let report = suite
        .run(|session| AgentBrowser::new(session).with_headed(headed))
        .await;

    println!("{}", report.format_for_display());

    if !report.success() {
        bail!("{} case(s) failed", report.failed());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rebuild_is_separate_from_log_debug() {
        let args = Args::try_parse_from(["elmapp", "serve", "--rebuild"]).unwrap();
        assert!(!args.debug);
        assert!(matches!(args.command, Command::Serve { rebuild: true, .. }));

        let args = Args::try_parse_from(["elmapp", "serve", "--debug"]).unwrap();
        assert!(args.debug);
        assert!(matches!(args.command, Command::Serve { rebuild: false, .. }));
    }
}
