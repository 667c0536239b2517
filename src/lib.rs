mod cli;
mod config;
mod console;
mod entries;
mod logging;
mod notification;
mod session;
mod state_management;

use std::io;

use anyhow::Context;
use log::info;

pub use cli::Cli;
pub use config::Config;
pub use console::{Console, LineConsole};
pub use entries::{parse_recipients, Entry, SENTINEL};
pub use logging::init_logging;
pub use notification::{DispatchFailure, Dispatcher, ListEmail, SmtpDispatcher};
pub use session::{Credentials, Session, SessionReport};
pub use state_management::{SessionDriver, State};

pub fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load_or_default(cli.get_config_path().as_deref())
        .context("Failed to load config")?;
    info!("Using SMTP relay {}", config.smtp_relay);

    let console = LineConsole::new(io::stdin().lock(), io::stdout());
    let dispatcher = SmtpDispatcher::new(&config);
    let report = SessionDriver::new(console, dispatcher, &config)
        .run()
        .context("Interactive session failed")?;
    info!("Completed: {report}");
    Ok(())
}
