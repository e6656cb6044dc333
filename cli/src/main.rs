use std::{error::Error, fs, path::PathBuf, time::Duration};

use clap::{Parser, Subcommand};
use log::{info, LevelFilter};
use milight_client::{Controller, ControllerConfig, ZoneHandle};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON file with controller settings
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Controller endpoint, e.g. udp://192.168.0.255:8899
    #[arg(short, long)]
    endpoint: Option<String>,
    #[arg(long)]
    host: Option<String>,
    #[arg(short, long)]
    port: Option<u16>,
    #[arg(short, long)]
    broadcast: bool,
    /// Minimum time between frames, in milliseconds
    #[arg(short, long)]
    delay: Option<u64>,
    /// Zone to act on, may be repeated. All zones when omitted.
    #[arg(short, long = "zone")]
    zones: Vec<u8>,
    #[arg(short, long)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    On,
    Off,
    /// Hex code, packed integer, rgb(...), hsv(...) or a JSON object
    Color { expression: String },
    Rgb { r: u8, g: u8, b: u8 },
    Hsv {
        hue: f64,
        #[arg(long)]
        value: Option<f64>,
    },
    Brightness { value: f64 },
    White { brightness: Option<f64> },
    Night,
    /// Hex encoded bytes, sent as is
    Raw { bytes: String },
}

impl Cli {
    fn controller_config(&self) -> Result<ControllerConfig, Box<dyn Error>> {
        let mut config: ControllerConfig = match (&self.config, &self.endpoint) {
            (Some(path), _) => serde_json::from_str(&fs::read_to_string(path)?)?,
            (None, Some(endpoint)) => ControllerConfig::from_endpoint(endpoint)?,
            (None, None) => ControllerConfig::default(),
        };
        if let (Some(_), Some(endpoint)) = (&self.config, &self.endpoint) {
            let endpoint = ControllerConfig::from_endpoint(endpoint)?;
            config.host = endpoint.host;
            config.port = endpoint.port;
        }
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if self.broadcast {
            config = config.with_broadcast(true);
        }
        if let Some(delay) = self.delay {
            config = config.with_min_delay(Duration::from_millis(delay));
        }
        Ok(config)
    }
}

async fn run(zones: &ZoneHandle, command: Command) -> Result<(), Box<dyn Error>> {
    match command {
        Command::On => zones.on().await?,
        Command::Off => zones.off().await?,
        Command::Color { expression } => zones.set_color(&expression).await?,
        Command::Rgb { r, g, b } => zones.set_rgb255(r, g, b).await?,
        Command::Hsv { hue, value } => zones.set_hsv(Some(hue), None, value).await?,
        Command::Brightness { value } => zones.brightness(value).await?,
        Command::White { brightness } => zones.set_white(brightness).await?,
        Command::Night => zones.set_night_mode().await?,
        Command::Raw { bytes } => {
            let frame = hex::decode(bytes.replace([' ', ':'], ""))?;
            zones.send_custom(&frame).await?
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    TermLogger::init(
        if cli.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        },
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )?;

    let controller = Controller::new(cli.controller_config()?);
    let zones = if cli.zones.is_empty() {
        controller.all_zones()
    } else {
        controller.zones(cli.zones.iter().copied())?
    };

    info!("Running {:?} on {:?}", cli.command, zones.zones());
    run(&zones, cli.command).await
}
