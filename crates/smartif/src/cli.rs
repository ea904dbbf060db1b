//! Clap derive structures for the `smartif` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// smartif -- watch and control a SmartIf home automation controller
#[derive(Debug, Parser)]
#[command(
    name = "smartif",
    version,
    about = "Watch and control SmartIf home automation controllers",
    long_about = "Reads device state from a SmartIf controller, follows changes \
        through polling and the optional push channel, and performs device actions.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Controller profile to use
    #[arg(long, short = 'p', env = "SMARTIF_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Controller host name or IP (overrides profile)
    #[arg(long, short = 'H', env = "SMARTIF_HOST", global = true)]
    pub host: Option<String>,

    /// Controller port (overrides profile)
    #[arg(long, env = "SMARTIF_PORT", global = true)]
    pub port: Option<u16>,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "SMARTIF_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "SMARTIF_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the current state of every device (or the given keys)
    #[command(alias = "st")]
    State(StateArgs),

    /// Follow state changes until interrupted
    #[command(alias = "w")]
    Watch(WatchArgs),

    /// List devices of one kind
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// Control a light
    Light(LightArgs),

    /// Control a cover (blind, shutter, garage door)
    Cover(CoverArgs),

    /// Control a climate device
    Climate(ClimateArgs),

    /// Control a switch
    Switch(SwitchArgs),

    /// Control a siren
    Siren(SirenArgs),

    /// Arm or disarm an alarm panel
    Alarm(AlarmArgs),

    /// Fetch camera images
    Camera(CameraArgs),

    /// List and call controller services (scenes)
    #[command(alias = "svc")]
    Services(ServicesArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── State / Watch ────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct StateArgs {
    /// Device keys to show (default: all)
    pub keys: Vec<String>,
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Device keys to follow (default: every key in the first snapshot)
    pub keys: Vec<String>,

    /// Push channel WebSocket URL (overrides profile)
    #[arg(long, env = "SMARTIF_PUSH_URL")]
    pub push_url: Option<String>,

    /// Poll period, e.g. "10s" or "1m" (overrides profile)
    #[arg(long, value_parser = humantime::parse_duration)]
    pub poll_interval: Option<Duration>,

    /// Also print this controller event (repeatable), e.g. VideoDoorCall
    #[arg(long = "event", value_name = "NAME")]
    pub events: Vec<String>,
}

// ── Devices ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DevicesArgs {
    /// Device kind to list
    pub kind: DeviceKindArg,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DeviceKindArg {
    Lights,
    Covers,
    Climates,
    Switches,
    Sirens,
    #[value(alias = "alarm-control-panels")]
    Alarms,
    BinarySensors,
    Cameras,
}

// ── Device actions ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct LightArgs {
    #[command(subcommand)]
    pub command: LightCommand,
}

#[derive(Debug, Subcommand)]
pub enum LightCommand {
    /// Turn a light on
    On {
        /// Light ID
        id: String,
        /// Brightness (0-255)
        #[arg(long, short = 'b')]
        brightness: Option<u8>,
    },
    /// Turn a light off
    Off {
        /// Light ID
        id: String,
    },
}

#[derive(Debug, Args)]
pub struct CoverArgs {
    #[command(subcommand)]
    pub command: CoverCommand,
}

#[derive(Debug, Subcommand)]
pub enum CoverCommand {
    /// Open a cover
    Open { id: String },
    /// Close a cover
    Close { id: String },
    /// Stop a moving cover
    Stop { id: String },
    /// Move a cover to a position (0 closed, 100 open)
    Position {
        id: String,
        #[arg(value_parser = clap::value_parser!(u8).range(0..=100))]
        position: u8,
    },
}

#[derive(Debug, Args)]
pub struct ClimateArgs {
    #[command(subcommand)]
    pub command: ClimateCommand,
}

#[derive(Debug, Subcommand)]
pub enum ClimateCommand {
    /// Set the HVAC mode (e.g. heat, cool, off)
    HvacMode { id: String, mode: String },
    /// Set the fan mode
    FanMode { id: String, mode: String },
    /// Set the target temperature
    Temperature { id: String, temperature: f64 },
}

#[derive(Debug, Args)]
pub struct SwitchArgs {
    #[command(subcommand)]
    pub command: OnOffCommand,
}

#[derive(Debug, Args)]
pub struct SirenArgs {
    #[command(subcommand)]
    pub command: OnOffCommand,
}

#[derive(Debug, Subcommand)]
pub enum OnOffCommand {
    /// Turn on
    On { id: String },
    /// Turn off
    Off { id: String },
}

#[derive(Debug, Args)]
pub struct AlarmArgs {
    #[command(subcommand)]
    pub command: AlarmCommand,
}

#[derive(Debug, Subcommand)]
pub enum AlarmCommand {
    /// Disarm the panel
    Disarm {
        id: String,
        #[arg(long)]
        code: Option<String>,
    },
    /// Arm in home mode
    ArmHome {
        id: String,
        #[arg(long)]
        code: Option<String>,
    },
    /// Arm in away mode
    ArmAway {
        id: String,
        #[arg(long)]
        code: Option<String>,
    },
}

#[derive(Debug, Args)]
pub struct CameraArgs {
    #[command(subcommand)]
    pub command: CameraCommand,
}

#[derive(Debug, Subcommand)]
pub enum CameraCommand {
    /// Save the current camera image
    Snapshot {
        id: String,
        /// Output file
        #[arg(long, short = 'f', default_value = "snapshot.jpg")]
        file: PathBuf,
    },
}

// ── Services ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ServicesArgs {
    #[command(subcommand)]
    pub command: ServicesCommand,
}

#[derive(Debug, Subcommand)]
pub enum ServicesCommand {
    /// List services
    #[command(alias = "ls")]
    List,
    /// Call a service by name
    Call { name: String },
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file path
    Path,
    /// Show the effective configuration
    Show,
    /// Create or update a profile
    Init {
        /// Profile name
        #[arg(long, default_value = "default")]
        name: String,
        /// Controller host name or IP
        #[arg(long = "controller-host")]
        host: String,
        /// Controller port
        #[arg(long = "controller-port")]
        port: Option<u16>,
        /// Push channel WebSocket URL
        #[arg(long)]
        push_url: Option<String>,
        /// Make this the default profile
        #[arg(long)]
        set_default: bool,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
