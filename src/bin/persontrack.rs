use std::path::PathBuf;

use clap::Parser;
use log::info;

use persontrack::{runner, Config, StopReason, VideoFileSource, WindowDisplay, YoloTracker};

#[derive(Parser)]
#[command(
    name = "persontrack",
    about = "Detect and highlight people in a video file",
    version = "0.1.0"
)]
struct Args {
    /// Path to the input video file
    video: PathBuf,

    /// Path to a JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to model weights (overrides the config)
    #[arg(short, long)]
    weights: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if let Some(weights) = &args.weights {
        config.model_path = weights.to_string_lossy().into_owned();
    }

    info!("Loading model from {}...", config.model_path);
    let mut tracker = YoloTracker::new(
        &config.model_path,
        &config.device,
        (config.input_size[0], config.input_size[1]),
        config.conf_threshold,
        config.nms_threshold,
    )?;

    info!("Opening video file: {}", args.video.display());
    let mut source = VideoFileSource::open(&args.video.to_string_lossy())?;
    let mut display = WindowDisplay::new(&config.window_name, config.key_poll_ms)?;

    match runner::run(&mut source, &mut tracker, &mut display)? {
        StopReason::EndOfStream => info!("Finished processing video."),
        StopReason::UserQuit => info!("Stopped by user."),
    }

    Ok(())
}
