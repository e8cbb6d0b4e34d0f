use anyhow::{anyhow, Context, Result};
use colored::*;
use image::{Rgb, RgbImage};
use nokhwa::{
    pixel_format::RgbFormat,
    utils::{ApiBackend, CameraIndex, RequestedFormat, RequestedFormatType},
    Camera,
};
use std::path::Path;
use tracing::info;

/// Anything that hands out RGB frames.
pub trait FrameSource {
    fn name(&self) -> String;
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn capture(&mut self) -> Result<RgbImage>;
}

pub struct CameraSource {
    camera: Camera,
}

impl CameraSource {
    pub fn new(index: u32) -> Result<Self> {
        let cam_index = CameraIndex::Index(index);
        let requested = RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestFrameRate);
        let mut camera = Camera::new(cam_index, requested).context("Failed to create camera instance")?;

        camera.open_stream().map_err(|e| anyhow!(e)).context("Failed to open camera stream")?;

        println!("{}", format!("Opened camera: {}", camera.info().human_name()).green());
        info!("Format: {}", camera.camera_format());

        Ok(Self { camera })
    }
}

impl FrameSource for CameraSource {
    fn name(&self) -> String {
        self.camera.info().human_name()
    }

    fn width(&self) -> u32 {
        self.camera.resolution().width()
    }

    fn height(&self) -> u32 {
        self.camera.resolution().height()
    }

    fn capture(&mut self) -> Result<RgbImage> {
        let frame = self.camera.frame().map_err(|e| anyhow!(e)).context("Failed to get frame")?;
        let decoded = frame.decode_image::<RgbFormat>().map_err(|e| anyhow!(e)).context("Failed to decode frame")?;
        Ok(decoded)
    }
}

pub fn list_cameras() -> Result<()> {
    let cameras = nokhwa::query(ApiBackend::Auto).map_err(|e| anyhow!(e)).context("Failed to query cameras")?;
    println!("{}", "Available Cameras:".bold());
    println!("{:<5} | {:<30} | {:<10}", "Index", "Name", "Misc");
    println!("{}", "-".repeat(60));
    for cam in cameras {
        println!("{:<5} | {:<30} | {:?}", cam.index(), cam.human_name(), cam.misc());
    }
    Ok(())
}

/// Serves the same picture every frame.
pub struct StillImageSource {
    image: RgbImage,
    label: String,
}

impl StillImageSource {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let image = image::open(path)
            .with_context(|| format!("Failed to open image {}", path.display()))?
            .to_rgb8();
        info!("Using still image {} ({}x{})", path.display(), image.width(), image.height());
        Ok(Self {
            image,
            label: path.display().to_string(),
        })
    }

    /// Soft vertical gradient, for running without camera or image.
    pub fn synthetic(width: u32, height: u32) -> Self {
        let image = RgbImage::from_fn(width, height, |x, y| {
            let v = (40 + y * 160 / height.max(1)) as u8;
            let w = (x * 30 / width.max(1)) as u8;
            Rgb([v, v.saturating_add(w), v])
        });
        Self {
            image,
            label: "Synthetic".to_string(),
        }
    }
}

impl FrameSource for StillImageSource {
    fn name(&self) -> String {
        self.label.clone()
    }

    fn width(&self) -> u32 {
        self.image.width()
    }

    fn height(&self) -> u32 {
        self.image.height()
    }

    fn capture(&mut self) -> Result<RgbImage> {
        Ok(self.image.clone())
    }
}
