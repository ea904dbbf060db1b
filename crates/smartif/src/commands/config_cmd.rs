//! Config subcommand handlers.

use smartif_config::{Config, Profile};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            output::print_output(
                &smartif_config::config_path().display().to_string(),
                global.quiet,
            );
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = smartif_config::load_config()?;
            let text = toml::to_string_pretty(&cfg)?;
            let out = output::render_single(global.output, &cfg, |_| text.trim_end().to_owned())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Init {
            name,
            host,
            port,
            push_url,
            set_default,
        } => {
            let mut cfg = smartif_config::load_config()?;
            let profile = new_profile(host, port, push_url)?;
            add_profile(&mut cfg, &name, profile, set_default);

            let path = smartif_config::save_config(&cfg)?;
            if !global.quiet {
                eprintln!("profile '{name}' written to {}", path.display());
            }
            Ok(())
        }
    }
}

fn new_profile(
    host: String,
    port: Option<u16>,
    push_url: Option<String>,
) -> Result<Profile, CliError> {
    if let Some(ref raw) = push_url {
        smartif_config::parse_push_url(raw)?;
    }
    let mut profile = Profile::new(host);
    profile.port = port;
    profile.push_url = push_url;
    // Surface a bad host now rather than on first use
    profile.to_session_config(&smartif_config::Defaults::default())?;
    Ok(profile)
}

/// Insert or replace `name`. It becomes the default when asked, or when
/// the current default points at nothing.
fn add_profile(cfg: &mut Config, name: &str, profile: Profile, set_default: bool) {
    cfg.profiles.insert(name.to_owned(), profile);
    let default_missing = cfg
        .default_profile
        .as_ref()
        .is_none_or(|d| !cfg.profiles.contains_key(d));
    if set_default || default_missing {
        cfg.default_profile = Some(name.to_owned());
    }
}
