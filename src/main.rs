use anyhow::{anyhow, Context};
use clap::Parser;
use colored::*;
use std::time::Instant;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

mod args;
mod camera;
mod output;

use args::{Args, TrackerKind};
use camera::{list_cameras, CameraSource, FrameSource, StillImageSource};
use image::RgbImage;
use mouthpiece::config::AppConfig;
use mouthpiece::glyphs::load_rasterizer;
use mouthpiece::render::{OverlayRenderer, RenderedFrame};
use mouthpiece::tracker::{
    ExpressionClassifier, FaceTracker, MouthOpennessClassifier, ReplayTracker, SimulatedTracker,
};
use output::WindowOutput;

fn open_source(args: &Args) -> anyhow::Result<Box<dyn FrameSource>> {
    if let Some(path) = &args.image {
        return Ok(Box::new(StillImageSource::open(path)?));
    }
    match CameraSource::new(args.cam_index) {
        Ok(camera) => Ok(Box::new(camera)),
        Err(e) => {
            warn!("Camera unavailable ({:#}); using synthetic frames", e);
            Ok(Box::new(StillImageSource::synthetic(640, 480)))
        }
    }
}

fn create_tracker(args: &Args) -> anyhow::Result<Box<dyn FaceTracker>> {
    match args.tracker {
        TrackerKind::Simulated => Ok(Box::new(SimulatedTracker::new())),
        TrackerKind::Replay => {
            let path = args
                .replay
                .as_ref()
                .ok_or_else(|| anyhow!("--tracker replay needs --replay <file>"))?;
            let tracker = ReplayTracker::from_path(path)
                .with_context(|| format!("Failed to load recording {}", path.display()))?;
            Ok(Box::new(tracker))
        }
    }
}

/// Source, tracker and renderer for one window.
struct FrameLoop {
    source: Box<dyn FrameSource>,
    tracker: Box<dyn FaceTracker>,
    classifier: MouthOpennessClassifier,
    renderer: OverlayRenderer,
    mirror_mode: bool,
    last_frame: Option<RgbImage>,
}

impl FrameLoop {
    fn new(
        source: Box<dyn FrameSource>,
        tracker: Box<dyn FaceTracker>,
        renderer: OverlayRenderer,
        mirror_mode: bool,
    ) -> Self {
        Self {
            source,
            tracker,
            classifier: MouthOpennessClassifier::default(),
            renderer,
            mirror_mode,
            last_frame: None,
        }
    }

    /// Renders one frame. A failed capture reuses the last good frame with
    /// no tracker update; before the first good frame a blank one of the
    /// source's size stands in.
    fn step(&mut self, elapsed: f32) -> RenderedFrame {
        let fresh = match self.source.capture() {
            Ok(mut frame) => {
                if self.mirror_mode {
                    image::imageops::flip_horizontal_in_place(&mut frame);
                }
                self.last_frame = Some(frame);
                true
            }
            Err(e) => {
                debug!("Reusing last frame: {:#}", e);
                false
            }
        };

        let (w, h) = (self.source.width().max(1), self.source.height().max(1));
        let frame = self.last_frame.get_or_insert_with(|| RgbImage::new(w, h));

        let tracked = if fresh {
            match self.tracker.track(frame) {
                Ok(t) => t,
                Err(e) => {
                    warn!("Tracker failed: {}", e);
                    None
                }
            }
        } else {
            None
        };
        let expression = tracked.as_ref().and_then(|t| self.classifier.classify(t));

        self.renderer
            .tick(frame, tracked.as_ref(), expression.as_deref(), elapsed)
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mouthpiece=info")),
        )
        .init();

    let args = Args::parse();

    if args.list {
        return list_cameras();
    }

    // 0. Config
    let config = AppConfig::load_from(&args.config)?;

    // 1. Frames and landmarks
    let source = open_source(&args)?;
    let tracker = create_tracker(&args)?;
    println!("Frame source: {}", source.name().green());
    println!("Tracker: {}", tracker.name().green());

    // 2. Glyphs and renderer
    let rasterizer = load_rasterizer(&config.ui.font_family, config.ui.font_size_px);
    let glyphs = rasterizer.rasterize(&config.ui.display_string);
    info!(
        "Rasterized {} glyphs for {:?} with {}",
        glyphs.len(),
        config.ui.display_string,
        rasterizer.name()
    );
    let renderer = OverlayRenderer::new(config.overlay_style(), glyphs);

    // 3. Window
    let mut window = WindowOutput::new("Mouthpiece", source.width() as usize, source.height() as usize)?;
    println!("Controls: [M] Mirror [S] Status [F] Frames [C] Callout [Esc] Quit");

    let mirror_mode = args.mirror_mode(config.defaults.mirror_mode);
    let mut frame_loop = FrameLoop::new(source, tracker, renderer, mirror_mode);
    let mut last_tick = Instant::now();
    let mut frame_count: u64 = 0;
    let mut last_image = None;

    while window.is_open() && !window.is_key_down(minifb::Key::Escape) {
        for key in window.keys_pressed() {
            let style = frame_loop.renderer.style_mut();
            match key {
                minifb::Key::M => frame_loop.mirror_mode = !frame_loop.mirror_mode,
                minifb::Key::S => style.show_status = !style.show_status,
                minifb::Key::F => style.show_frames = !style.show_frames,
                minifb::Key::C => style.show_callout = !style.show_callout,
                _ => {}
            }
        }

        let now = Instant::now();
        let elapsed = now.duration_since(last_tick).as_secs_f32();
        last_tick = now;

        // Presented every iteration so the window keeps pumping events.
        let rendered = frame_loop.step(elapsed);
        window.present(&rendered.image)?;
        last_image = Some(rendered.image);

        frame_count += 1;
        if args.frames.is_some_and(|n| frame_count >= n) {
            break;
        }
    }

    if let (Some(path), Some(image)) = (&args.snapshot, &last_image) {
        image
            .save(path)
            .with_context(|| format!("Failed to save snapshot {}", path.display()))?;
        println!("{}", format!("Saved snapshot to {}", path.display()).green());
    }

    info!("Rendered {} frames", frame_count);
    Ok(())
}
