//! smilegate — smile at the webcam to unlock the portfolio.

mod config;
mod engine;
mod stage;

use anyhow::Result;
use clap::{Parser, Subcommand};
use config::Config;
use engine::HardwareBackend;
use serde::Serialize;
use smilegate_core::scroll::init_horizontal_scroll;
use smilegate_core::timeline::{unlock_timeline, Element};
use smilegate_core::{run_gate, FaceMesh, GateOutcome, Scrubber, Session, Stage};
use smilegate_hw::{Camera, LiveVideo};
use stage::TerminalStage;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "smilegate", about = "Smile at the webcam to unlock the portfolio")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// V4L2 capture device
    #[arg(long, global = true)]
    device: Option<String>,

    /// Face mesh ONNX model
    #[arg(long, global = true)]
    model: Option<PathBuf>,

    /// Mouth width (pixels) that counts as a smile
    #[arg(long, global = true)]
    threshold: Option<f32>,

    /// Save the captured photo as PNG
    #[arg(long, global = true)]
    photo: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the smile gate (default)
    Run,
    /// Skip detection and play the unlock sequence
    Bypass,
    /// Print the resolved unlock timeline as JSON
    Timeline,
    /// List V4L2 capture devices
    Devices,
    /// Show the horizontal offset for page scroll positions
    Scroll {
        /// Page scroll positions in pixels
        positions: Vec<f32>,
    },
}

impl Cli {
    fn apply(&self, config: &mut Config) {
        if let Some(device) = &self.device {
            config.camera_device = device.clone();
        }
        if let Some(model) = &self.model {
            config.model_path = model.clone();
        }
        if let Some(threshold) = self.threshold {
            config.smile_threshold = threshold;
        }
        if let Some(photo) = &self.photo {
            config.photo_path = Some(photo.clone());
        }
    }
}

#[derive(Serialize)]
struct ScrollSample {
    scroll_y: f32,
    progress: f32,
    offset: f32,
    pinned: bool,
    /// Smoothed offset one frame after scrolling here from the previous sample.
    scrubbed: f32,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = Config::load()?;
    cli.apply(&mut config);

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            tracing::info!(
                device = %config.camera_device,
                model = %config.model_path.display(),
                threshold = config.smile_threshold,
                "smilegate starting"
            );
            let mut backend = HardwareBackend::new(config.clone());
            let mut stage = TerminalStage::stdio(config.layout(), config.photo_path.clone());
            match run_gate(&mut backend, &mut stage, config.gate_config()).await {
                GateOutcome::Unlocked { trigger, binding } => {
                    tracing::info!(?trigger, bound = binding.is_some(), "gate open");
                }
                GateOutcome::Abandoned => {
                    tracing::info!("gate abandoned; input closed before bypass");
                }
            }
        }
        Commands::Bypass => {
            let mut stage = TerminalStage::stdio(config.layout(), config.photo_path.clone());
            let mut session: Session<FaceMesh, LiveVideo> = Session::new(config.gate_config());
            let binding = session.unlock(&mut stage).await;
            tracing::info!(bound = binding.is_some(), "unlocked without detection");
        }
        Commands::Timeline => {
            println!("{}", serde_json::to_string_pretty(&unlock_timeline())?);
        }
        Commands::Devices => {
            let devices = Camera::list_devices();
            if devices.is_empty() {
                println!("No V4L2 capture devices found");
            }
            for dev in devices {
                println!("{}  {} ({}, {})", dev.path, dev.card, dev.driver, dev.bus);
            }
        }
        Commands::Scroll { positions } => {
            let mut stage = TerminalStage::new(
                std::io::sink(),
                tokio::io::empty(),
                config.layout(),
                None,
            );
            stage.set_visible(Element::PinWrapper, true);
            let binding = init_horizontal_scroll(&mut stage, config.scrub_secs);
            let mut scrubber = Scrubber::new(binding);
            let dt = config.gate_config().frame_period().as_secs_f32();

            for scroll_y in positions {
                let scrubbed = scrubber.advance(scroll_y, dt);
                let sample = ScrollSample {
                    scroll_y,
                    progress: binding.progress(scroll_y),
                    offset: binding.offset_for_scroll(scroll_y),
                    pinned: binding.is_pinned(scroll_y),
                    scrubbed,
                };
                println!("{}", serde_json::to_string(&sample)?);
            }
        }
    }

    Ok(())
}
