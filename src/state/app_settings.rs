use crate::views::{View, ViewRegistry};
use log::LevelFilter;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use trophy_api::DEFAULT_TOP_SCORERS;
use trophy_api::client::WarehouseTarget;
use trophy_api::source::{LoadOptions, SnapshotSource};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8060;
pub const DEFAULT_ROTATION_SECS: u64 = 30;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    /// Browser board over HTTP.
    #[default]
    Serve,
    /// Terminal kiosk.
    Tui,
}

#[derive(Debug, Clone)]
pub struct AppSettings {
    pub mode: Mode,
    pub host: String,
    pub port: u16,
    pub debug: bool,
    pub rotation_interval: Duration,
    /// Rotation state at session start.
    pub auto_rotate: bool,
    /// Views in rotation order.
    pub views: ViewRegistry,
    pub top_scorers: usize,
    pub assets_dir: PathBuf,
    pub snapshot_file: Option<PathBuf>,
    pub layout_file: Option<PathBuf>,
    pub warehouse: WarehouseTarget,
    pub full_screen: bool,
    pub log_level: Option<LevelFilter>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            debug: false,
            rotation_interval: Duration::from_secs(DEFAULT_ROTATION_SECS),
            auto_rotate: true,
            views: ViewRegistry::default(),
            top_scorers: DEFAULT_TOP_SCORERS,
            assets_dir: PathBuf::from("assets"),
            snapshot_file: None,
            layout_file: None,
            warehouse: WarehouseTarget::default(),
            full_screen: false,
            log_level: None,
        }
    }
}

/// What the command line asked for.
#[derive(Debug)]
pub enum CliCommand {
    Run(Box<AppSettings>),
    Help,
    Version,
}

#[derive(Debug, PartialEq, Eq)]
pub enum SettingsError {
    InvalidValue { name: String, value: String, reason: String },
    MissingValue(String),
    UnknownArgument(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::InvalidValue { name, value, reason } => {
                write!(f, "invalid value {value:?} for {name}: {reason}")
            }
            SettingsError::MissingValue(flag) => write!(f, "{flag} needs a value"),
            SettingsError::UnknownArgument(arg) => write!(f, "unknown argument: {arg}"),
        }
    }
}

impl std::error::Error for SettingsError {}

impl AppSettings {
    /// Defaults, then `.env`, then the process environment, then the command
    /// line.
    pub fn load() -> Result<CliCommand, SettingsError> {
        // a missing .env file is fine
        let _ = dotenvy::dotenv();
        Self::from_sources(|key| std::env::var(key).ok(), std::env::args().skip(1))
    }

    pub fn from_sources(
        env: impl Fn(&str) -> Option<String>,
        args: impl IntoIterator<Item = String>,
    ) -> Result<CliCommand, SettingsError> {
        let mut settings = Self::default();
        settings.apply_env(&env)?;
        settings.apply_args(args)
    }

    fn apply_env(&mut self, env: &impl Fn(&str) -> Option<String>) -> Result<(), SettingsError> {
        let var = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        if let Some(host) = var("TROPHY_HOST") {
            self.host = host;
        }
        if let Some(port) = var("TROPHY_PORT") {
            self.port = parse_port("TROPHY_PORT", &port)?;
        }
        if let Some(debug) = var("TROPHY_DEBUG") {
            self.set_debug(parse_bool("TROPHY_DEBUG", &debug)?);
        }
        if let Some(secs) = var("TROPHY_ROTATION_SECS") {
            self.rotation_interval = parse_interval("TROPHY_ROTATION_SECS", &secs)?;
        }
        if let Some(auto) = var("TROPHY_AUTO_ROTATE") {
            self.auto_rotate = parse_bool("TROPHY_AUTO_ROTATE", &auto)?;
        }
        if let Some(views) = var("TROPHY_VIEWS") {
            self.views = parse_views("TROPHY_VIEWS", &views)?;
        }
        if let Some(count) = var("TROPHY_TOP_SCORERS") {
            self.top_scorers = count.trim().parse().map_err(|e| invalid("TROPHY_TOP_SCORERS", &count, e))?;
        }
        if let Some(dir) = var("TROPHY_ASSETS_DIR") {
            self.assets_dir = PathBuf::from(dir);
        }
        if let Some(path) = var("TROPHY_SNAPSHOT_JSON") {
            self.snapshot_file = Some(PathBuf::from(path));
        }
        if let Some(path) = var("TROPHY_LAYOUT_JSON") {
            self.layout_file = Some(PathBuf::from(path));
        }
        if let Some(project) = var("TROPHY_GCP_PROJECT") {
            self.warehouse.project = project;
        }
        if let Some(dataset) = var("TROPHY_GCP_DATASET") {
            self.warehouse.dataset = dataset;
        }
        Ok(())
    }

    fn apply_args(mut self, args: impl IntoIterator<Item = String>) -> Result<CliCommand, SettingsError> {
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            let mut value_for = |flag: &str| args.next().ok_or_else(|| SettingsError::MissingValue(flag.to_string()));
            match arg.as_str() {
                "-h" | "--help" => return Ok(CliCommand::Help),
                "-V" | "--version" => return Ok(CliCommand::Version),
                "serve" => self.mode = Mode::Serve,
                "tui" => self.mode = Mode::Tui,
                "--host" => self.host = value_for("--host")?,
                "--port" => self.port = parse_port("--port", &value_for("--port")?)?,
                "--interval" => {
                    self.rotation_interval = parse_interval("--interval", &value_for("--interval")?)?
                }
                "--snapshot" => self.snapshot_file = Some(PathBuf::from(value_for("--snapshot")?)),
                "--views" => self.views = parse_views("--views", &value_for("--views")?)?,
                "--paused" => self.auto_rotate = false,
                "--debug" => self.set_debug(true),
                _ => return Err(SettingsError::UnknownArgument(arg)),
            }
        }
        Ok(CliCommand::Run(Box::new(self)))
    }

    fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
        self.log_level = debug.then_some(LevelFilter::Debug);
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Where snapshots come from: the local file when set, the warehouse
    /// otherwise.
    pub fn load_options(&self) -> LoadOptions {
        let source = match &self.snapshot_file {
            Some(path) => SnapshotSource::File(path.clone()),
            None => SnapshotSource::Warehouse(self.warehouse.clone()),
        };
        LoadOptions {
            source,
            layout_file: self.layout_file.clone(),
            top_scorers: self.top_scorers,
        }
    }
}

fn invalid(name: &str, value: &str, reason: impl fmt::Display) -> SettingsError {
    SettingsError::InvalidValue {
        name: name.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool, SettingsError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(name, value, "expected true or false")),
    }
}

fn parse_port(name: &str, value: &str) -> Result<u16, SettingsError> {
    value.trim().parse().map_err(|e| invalid(name, value, e))
}

/// Comma separated view names; duplicates are dropped.
fn parse_views(name: &str, value: &str) -> Result<ViewRegistry, SettingsError> {
    let views = value
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| View::from_name(v).ok_or_else(|| invalid(name, value, format!("unknown view {v:?}"))))
        .collect::<Result<Vec<_>, _>>()?;
    if views.is_empty() {
        return Err(invalid(name, value, "needs at least one view"));
    }
    Ok(ViewRegistry::new(views))
}

fn parse_interval(name: &str, value: &str) -> Result<Duration, SettingsError> {
    let secs: u64 = value.trim().parse().map_err(|e| invalid(name, value, e))?;
    if secs == 0 {
        return Err(invalid(name, value, "must be at least one second"));
    }
    Ok(Duration::from_secs(secs))
}
