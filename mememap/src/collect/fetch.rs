use anyhow::{Context, Result};
use reqwest::blocking::Client;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info};
use url::Url;

#[cfg(feature = "indicatif")]
use indicatif::{ProgressBar, ProgressStyle};

use crate::collect::global_variables::get_temp_path;

/// Source of remote bytes
/// Downloads land in a scoped temp file that is removed when dropped, on
/// success and failure alike.
pub trait Fetcher {
    fn fetch(&self, url: &Url) -> Result<NamedTempFile>;
}

/// Blocking HTTP download, no timeout and no retry
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        HttpFetcher {
            client: Client::new(),
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "indicatif")]
fn spinner(url: &Url) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner} [{elapsed}] {msg}") {
        pb.set_style(style);
    }
    pb.set_message(format!("Downloading {}", url));
    pb.enable_steady_tick(std::time::Duration::from_millis(120));
    pb
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &Url) -> Result<NamedTempFile> {
        info!("Downloading {}", url);

        #[cfg(feature = "indicatif")]
        let pb = spinner(url);

        let response = self
            .client
            .get(url.as_str())
            .send()
            .with_context(|| format!("Failed to send request to {}", url))?;

        if !response.status().is_success() {
            anyhow::bail!("{} returned {}", url, response.status());
        }

        let bytes = response
            .bytes()
            .with_context(|| format!("Failed to read response body from {}", url))?;

        #[cfg(feature = "indicatif")]
        pb.finish_and_clear();

        debug!("Fetched {} bytes from {}", bytes.len(), url);
        write_temp(&bytes, &suffix_for(url))
    }
}

/// Keep the remote extension so decoders can sniff the format from the name
pub fn suffix_for(url: &Url) -> String {
    url.path_segments()
        .and_then(|segments| segments.last())
        .and_then(|file| Path::new(file).extension())
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext))
        .unwrap_or_default()
}

/// Write bytes to a fresh uniquely-named temp file
pub fn write_temp(bytes: &[u8], suffix: &str) -> Result<NamedTempFile> {
    let temp_dir = get_temp_path();
    let mut builder = tempfile::Builder::new();
    builder.prefix("mememap-").suffix(suffix);

    let mut file = if temp_dir.is_dir() {
        builder.tempfile_in(&temp_dir)
    } else {
        builder.tempfile()
    }
    .context("Failed to create temporary download file")?;

    file.write_all(bytes)
        .context("Failed to write temporary download file")?;
    file.flush()?;
    Ok(file)
}
