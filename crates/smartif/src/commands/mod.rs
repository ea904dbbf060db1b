//! Command dispatch: bridges CLI args to the controller client or a
//! session, then to output formatting.

pub mod actions;
pub mod config_cmd;
pub mod devices;
pub mod services;
pub mod state;
pub mod watch;

use smartif_api::{SmartIfClient, TransportConfig};
use smartif_core::SessionConfig;

use crate::cli::{Cli, Command, GlobalOpts};
use crate::config::build_session_config;
use crate::error::CliError;

/// Dispatch a parsed command to its handler.
///
/// Only commands that talk to a controller resolve a profile, so `config`
/// and `completions` work with no configuration at all.
pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    tracing::debug!(command = ?cmd, "dispatching command");
    match cmd {
        Command::State(args) => state::handle(args, build_session_config(global)?, global).await,
        Command::Watch(args) => watch::handle(args, build_session_config(global)?, global).await,
        Command::Devices(args) => devices::handle(args, &client(global)?, global).await,
        Command::Light(args) => actions::light(args, &client(global)?, global).await,
        Command::Cover(args) => actions::cover(args, &client(global)?, global).await,
        Command::Climate(args) => actions::climate(args, &client(global)?, global).await,
        Command::Switch(args) => actions::switch(args, &client(global)?, global).await,
        Command::Siren(args) => actions::siren(args, &client(global)?, global).await,
        Command::Alarm(args) => actions::alarm(args, &client(global)?, global).await,
        Command::Camera(args) => actions::camera(args, &client(global)?, global).await,
        Command::Services(args) => services::handle(args, &client(global)?, global).await,
        Command::Config(args) => config_cmd::handle(args, global),
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "smartif", &mut std::io::stdout());
            Ok(())
        }
    }
}

/// A bare HTTP client for one-shot commands that need no store.
fn client(global: &GlobalOpts) -> Result<SmartIfClient, CliError> {
    let config = build_session_config(global)?;
    client_for(&config)
}

pub(crate) fn client_for(config: &SessionConfig) -> Result<SmartIfClient, CliError> {
    let transport = TransportConfig::with_timeout(config.timeout);
    Ok(SmartIfClient::new(config.url.clone(), &transport)?)
}
