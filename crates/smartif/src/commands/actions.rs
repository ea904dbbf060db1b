//! Device action handlers: lights, covers, climates, switches, sirens,
//! alarm panels, and camera snapshots.

use serde::Serialize;

use smartif_api::SmartIfClient;

use crate::cli::{
    AlarmArgs, AlarmCommand, CameraArgs, CameraCommand, ClimateArgs, ClimateCommand, CoverArgs,
    CoverCommand, GlobalOpts, LightArgs, LightCommand, OnOffCommand, SirenArgs, SwitchArgs,
};
use crate::error::CliError;
use crate::output;

/// What got done, for structured output.
#[derive(Debug, Serialize)]
struct ActionOutcome<'a> {
    target: &'a str,
    action: &'a str,
}

fn report(global: &GlobalOpts, target: &str, action: &str) -> Result<(), CliError> {
    let outcome = ActionOutcome { target, action };
    let out = output::render_single(global.output, &outcome, |o| {
        format!("{}: {}", o.target, o.action)
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn light(
    args: LightArgs,
    client: &SmartIfClient,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        LightCommand::On { id, brightness } => {
            client.light_turn_on(&id, brightness).await?;
            match brightness {
                Some(b) => report(global, &id, &format!("on (brightness {b})")),
                None => report(global, &id, "on"),
            }
        }
        LightCommand::Off { id } => {
            client.light_turn_off(&id).await?;
            report(global, &id, "off")
        }
    }
}

pub async fn cover(
    args: CoverArgs,
    client: &SmartIfClient,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        CoverCommand::Open { id } => {
            client.open_cover(&id).await?;
            report(global, &id, "opening")
        }
        CoverCommand::Close { id } => {
            client.close_cover(&id).await?;
            report(global, &id, "closing")
        }
        CoverCommand::Stop { id } => {
            client.stop_cover(&id).await?;
            report(global, &id, "stopped")
        }
        CoverCommand::Position { id, position } => {
            client.set_cover_position(&id, position).await?;
            report(global, &id, &format!("moving to {position}%"))
        }
    }
}

pub async fn climate(
    args: ClimateArgs,
    client: &SmartIfClient,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        ClimateCommand::HvacMode { id, mode } => {
            client.set_hvac_mode(&id, &mode).await?;
            report(global, &id, &format!("hvac mode {mode}"))
        }
        ClimateCommand::FanMode { id, mode } => {
            client.set_fan_mode(&id, &mode).await?;
            report(global, &id, &format!("fan mode {mode}"))
        }
        ClimateCommand::Temperature { id, temperature } => {
            if !temperature.is_finite() {
                return Err(CliError::Validation {
                    field: "temperature".into(),
                    reason: format!("{temperature} is not a number"),
                });
            }
            client.set_temperature(&id, temperature).await?;
            report(global, &id, &format!("target {temperature}"))
        }
    }
}

pub async fn switch(
    args: SwitchArgs,
    client: &SmartIfClient,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let (id, on) = on_off(args.command);
    client.set_switch(&id, on).await?;
    report(global, &id, if on { "on" } else { "off" })
}

pub async fn siren(
    args: SirenArgs,
    client: &SmartIfClient,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let (id, on) = on_off(args.command);
    client.set_siren(&id, on).await?;
    report(global, &id, if on { "on" } else { "off" })
}

fn on_off(cmd: OnOffCommand) -> (String, bool) {
    match cmd {
        OnOffCommand::On { id } => (id, true),
        OnOffCommand::Off { id } => (id, false),
    }
}

pub async fn alarm(
    args: AlarmArgs,
    client: &SmartIfClient,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let (id, command, code, label) = match args.command {
        AlarmCommand::Disarm { id, code } => {
            (id, smartif_api::AlarmCommand::Disarm, code, "disarmed")
        }
        AlarmCommand::ArmHome { id, code } => {
            (id, smartif_api::AlarmCommand::ArmHome, code, "armed home")
        }
        AlarmCommand::ArmAway { id, code } => {
            (id, smartif_api::AlarmCommand::ArmAway, code, "armed away")
        }
    };
    client.alarm_command(&id, command, code.as_deref()).await?;
    report(global, &id, label)
}

pub async fn camera(
    args: CameraArgs,
    client: &SmartIfClient,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        CameraCommand::Snapshot { id, file } => {
            let image = client.camera_image(&id).await?;
            tokio::fs::write(&file, &image).await?;
            tracing::debug!(bytes = image.len(), path = %file.display(), "camera image saved");
            report(global, &id, &format!("saved to {}", file.display()))
        }
    }
}
