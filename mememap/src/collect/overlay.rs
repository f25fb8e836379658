use anyhow::{Context, Result};
use image::DynamicImage;
use std::path::{Path, PathBuf};
use tracing::info;
use url::Url;

use crate::collect::fetch::Fetcher;

/// Where the overlay image comes from
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OverlaySource {
    /// The built-in meme, downloaded on every call
    #[default]
    Default,
    /// A raster file on disk
    Path(PathBuf),
}

impl OverlaySource {
    /// "default" selects the built-in overlay, anything else is a path
    pub fn parse(value: &str) -> Self {
        if value == "default" {
            OverlaySource::Default
        } else {
            OverlaySource::Path(PathBuf::from(value))
        }
    }
}

/// Fetch or read the overlay and decode it
pub fn load_overlay<F: Fetcher>(
    source: &OverlaySource,
    fetcher: &F,
    default_url: &str,
) -> Result<DynamicImage> {
    match source {
        OverlaySource::Default => {
            let url = Url::parse(default_url)
                .with_context(|| format!("Invalid overlay URL: {}", default_url))?;
            let download = fetcher
                .fetch(&url)
                .context("Failed to download default overlay")?;
            decode_image(download.path())
        }
        OverlaySource::Path(path) => decode_image(path),
    }
}

fn decode_image(path: &Path) -> Result<DynamicImage> {
    let image = image::io::Reader::open(path)
        .with_context(|| format!("Failed to open overlay image: {:?}", path))?
        .with_guessed_format()
        .with_context(|| format!("Failed to read overlay image: {:?}", path))?
        .decode()
        .with_context(|| format!("Failed to decode overlay image: {:?}", path))?;
    info!(
        "Overlay decoded: {}x{} pixels",
        image.width(),
        image.height()
    );
    Ok(image)
}
