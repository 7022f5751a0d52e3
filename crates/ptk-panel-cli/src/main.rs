//! PTK Panel Control Tool
//!
//! CLI for controlling the PTK Panel daemon via D-Bus, plus an offline
//! encoder that writes panel reports to a file.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ptk_panel_client::{BusType, DaemonClient};
use ptk_panel_hw::{lcd, Flip, Panel};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
enum CliBusType {
    /// Try session bus first, fall back to system bus
    #[default]
    Auto,
    /// Use session bus (for user services)
    Session,
    /// Use system bus (for system services)
    System,
}

impl From<CliBusType> for BusType {
    fn from(bus: CliBusType) -> Self {
        match bus {
            CliBusType::Auto => BusType::Auto,
            CliBusType::Session => BusType::Session,
            CliBusType::System => BusType::System,
        }
    }
}

#[derive(Parser)]
#[command(name = "ptkpanelctl")]
#[command(about = "Control tool for PTK Panel daemon")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// D-Bus bus type to use
    #[arg(long, default_value = "auto", value_enum)]
    bus: CliBusType,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ring LED segment commands
    Ring {
        #[command(subcommand)]
        action: RingCommands,
    },
    /// Ring LED brightness commands
    Brightness {
        #[command(subcommand)]
        action: BrightnessCommands,
    },
    /// OLED panel commands
    Panel {
        #[command(subcommand)]
        action: PanelCommands,
    },
    /// Encode an image into panel reports without contacting the daemon
    Encode {
        /// Image file (at most 64x128)
        image: String,

        /// Target panel: top, bottom
        #[arg(long, default_value = "top")]
        panel: String,

        /// Mirror the image top to bottom
        #[arg(long)]
        flip_vertical: bool,

        /// Mirror the image left to right
        #[arg(long)]
        flip_horizontal: bool,

        /// Output file for the raw reports (default: <image>.reports)
        #[arg(short, long)]
        output: Option<String>,

        /// Print a JSON summary of the report addresses
        #[arg(long)]
        json: bool,
    },
    /// Daemon control commands
    Daemon {
        #[command(subcommand)]
        action: DaemonCommands,
    },
}

#[derive(Subcommand)]
enum RingCommands {
    /// Select the active ring segment
    Set {
        /// Segment 0-3 (values outside the range are clamped)
        #[arg(allow_hyphen_values = true)]
        segment: i32,
    },
    /// Show the active ring segment
    Show,
}

#[derive(Subcommand)]
enum BrightnessCommands {
    /// Set the ring LED brightness
    Set {
        /// Level 0-3 (values outside the range are clamped)
        #[arg(allow_hyphen_values = true)]
        level: i32,
    },
    /// Show the ring LED brightness
    Show,
}

#[derive(Subcommand)]
enum PanelCommands {
    /// Upload an image to a panel
    Upload {
        /// Panel: top, bottom
        panel: String,

        /// Image file (at most 64x128)
        image: String,

        /// Mirror the image top to bottom
        #[arg(long)]
        flip_vertical: bool,

        /// Mirror the image left to right
        #[arg(long)]
        flip_horizontal: bool,
    },
    /// Re-upload the images from the daemon configuration
    Reload,
}

#[derive(Subcommand)]
enum DaemonCommands {
    /// Check if daemon is running
    Status {
        /// Print status as JSON
        #[arg(long)]
        json: bool,
    },
    /// Request daemon shutdown
    Quit,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Offline encoding needs no daemon
    if let Commands::Encode {
        image,
        panel,
        flip_vertical,
        flip_horizontal,
        output,
        json,
    } = cli.command
    {
        let flip = Flip::new(flip_vertical, flip_horizontal);
        return handle_encode(&image, &panel, flip, output, json);
    }

    // Connect to daemon
    let client = DaemonClient::connect_with_bus(cli.bus.into())
        .await
        .context("Failed to connect to daemon. Is ptkpaneld running?")?;

    match cli.command {
        Commands::Ring { action } => handle_ring(action, &client).await,
        Commands::Brightness { action } => handle_brightness(action, &client).await,
        Commands::Panel { action } => handle_panel(action, &client).await,
        Commands::Daemon { action } => handle_daemon(action, &client).await,
        Commands::Encode { .. } => unreachable!("handled before connecting"),
    }
}

async fn handle_ring(action: RingCommands, client: &DaemonClient) -> Result<()> {
    match action {
        RingCommands::Set { segment } => {
            client.set_ring_led(segment).await?;
            let stored = client.get_ring_led().await?;
            println!("Active ring set to: {}", stored);
        }
        RingCommands::Show => {
            let ring = client.get_ring_led().await?;
            println!("Active ring: {}", ring);
        }
    }

    Ok(())
}

async fn handle_brightness(action: BrightnessCommands, client: &DaemonClient) -> Result<()> {
    match action {
        BrightnessCommands::Set { level } => {
            client.set_brightness(level).await?;
            let stored = client.get_brightness().await?;
            println!("Brightness set to: {}", stored);
        }
        BrightnessCommands::Show => {
            let brightness = client.get_brightness().await?;
            println!("Brightness: {}", brightness);
        }
    }

    Ok(())
}

async fn handle_panel(action: PanelCommands, client: &DaemonClient) -> Result<()> {
    match action {
        PanelCommands::Upload {
            panel,
            image,
            flip_vertical,
            flip_horizontal,
        } => {
            let panel: Panel = panel.parse()?;
            // The daemon runs elsewhere; hand it an absolute path
            let path = std::fs::canonicalize(&image)
                .with_context(|| format!("Cannot resolve image path {}", image))?;
            let path_str = path.to_string_lossy();

            client
                .upload_image(
                    &panel.to_string(),
                    &path_str,
                    flip_vertical,
                    flip_horizontal,
                )
                .await?;
            println!("{} panel updated from: {}", panel, path_str);
        }
        PanelCommands::Reload => {
            let updated = client.reload_images().await?;
            println!("Panels updated: {}", updated);
        }
    }

    Ok(())
}

async fn handle_daemon(action: DaemonCommands, client: &DaemonClient) -> Result<()> {
    match action {
        DaemonCommands::Status { json } => {
            let connected = client.is_connected().await?;
            let brightness = client.get_brightness().await?;
            let ring = client.get_ring_led().await?;

            if json {
                let status = serde_json::json!({
                    "running": true,
                    "connected": connected,
                    "brightness": brightness,
                    "ring": ring,
                });
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                println!("Daemon: running");
                println!("Tablet connected: {}", if connected { "yes" } else { "no" });
                println!("Brightness: {}", brightness);
                println!("Active ring: {}", ring);
            }
        }
        DaemonCommands::Quit => {
            client.quit().await?;
            println!("Shutdown request sent to daemon");
        }
    }

    Ok(())
}

fn handle_encode(
    image: &str,
    panel: &str,
    flip: Flip,
    output: Option<String>,
    json: bool,
) -> Result<()> {
    let panel: Panel = panel.parse()?;
    let bytes = lcd::load_image_source(image)?;
    let batch = lcd::encode_image(&bytes, flip, panel)
        .with_context(|| format!("Failed to encode {}", image))?;
    debug!("Encoded {} reports for {} panel", batch.len(), panel);

    let output = output.unwrap_or_else(|| format!("{}.reports", image));
    let data = batch.to_bytes();
    std::fs::write(&output, &data).context("Failed to write report file")?;

    if json {
        let frames: Vec<_> = batch
            .iter()
            .map(|f| {
                serde_json::json!({
                    "chunk": f.chunk_index(),
                    "block": f.block_index(),
                })
            })
            .collect();
        let summary = serde_json::json!({
            "panel": panel.to_string(),
            "flip": flip.to_string(),
            "output": output,
            "bytes": data.len(),
            "frames": frames,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "Wrote {} reports ({} bytes) for {} panel to: {}",
            batch.len(),
            data.len(),
            panel,
            output
        );
    }

    Ok(())
}
