use clap::{Parser, ValueEnum};
use mouthpiece::config::AppConfig;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TrackerKind {
    /// Animated synthetic face
    Simulated,
    /// Landmarks recorded as JSON lines (see --replay)
    Replay,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Camera Index (default 0)
    #[arg(short, long, default_value_t = 0)]
    pub cam_index: u32,

    /// Mirror the camera output (`--mirror false` to turn it off); overrides the config
    #[arg(long)]
    pub mirror: Option<bool>,

    /// List available cameras
    #[arg(long)]
    pub list: bool,

    /// Config file (created with defaults if missing)
    #[arg(long, default_value = AppConfig::PATH)]
    pub config: PathBuf,

    /// Landmark source
    #[arg(long, value_enum, default_value_t = TrackerKind::Simulated)]
    pub tracker: TrackerKind,

    /// Recording used by `--tracker replay`
    #[arg(long)]
    pub replay: Option<PathBuf>,

    /// Use a still image instead of the camera
    #[arg(long)]
    pub image: Option<PathBuf>,

    /// Stop after this many frames
    #[arg(long)]
    pub frames: Option<u64>,

    /// Save the last rendered frame as PNG on exit
    #[arg(long)]
    pub snapshot: Option<PathBuf>,
}

impl Args {
    /// `--mirror` when given, the config's default otherwise.
    pub fn mirror_mode(&self, config_default: bool) -> bool {
        self.mirror.unwrap_or(config_default)
    }
}
