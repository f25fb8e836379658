use anyhow::{Context, Result};
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;
use std::str::FromStr;
use tracing::info;
use url::Url;
use zip::ZipArchive;

use crate::collect::fetch::Fetcher;
use crate::commons::config::MemeMapConfig;
use crate::commons::error::MemeMapError;
use crate::geo_core::AdminShape;

const ZIP_MAGIC: [u8; 4] = [0x50, 0x4b, 0x03, 0x04];

/// Remote boundary dataset schemes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatasetScheme {
    /// GADM 2.x ("GADM2")
    Gadm2,
    /// GADM 3.x and later ("GADM3")
    Gadm3,
}

impl DatasetScheme {
    pub fn token(&self) -> &'static str {
        match self {
            DatasetScheme::Gadm2 => "GADM2",
            DatasetScheme::Gadm3 => "GADM3",
        }
    }

    pub fn template<'a>(&self, config: &'a MemeMapConfig) -> &'a str {
        match self {
            DatasetScheme::Gadm2 => &config.gadm2_url_template,
            DatasetScheme::Gadm3 => &config.gadm3_url_template,
        }
    }
}

impl fmt::Display for DatasetScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for DatasetScheme {
    type Err = MemeMapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GADM2" => Ok(DatasetScheme::Gadm2),
            "GADM3" => Ok(DatasetScheme::Gadm3),
            _ => Err(MemeMapError::ShapeRequired(s.to_string())),
        }
    }
}

/// Where the boundary geometry comes from
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    Remote(DatasetScheme),
    /// Geometry handed in by the caller; no network access
    Supplied(AdminShape),
}

impl Default for Lookup {
    fn default() -> Self {
        Lookup::Remote(DatasetScheme::Gadm3)
    }
}

impl Lookup {
    /// Map a lookup token to a variant
    /// "GADM2"/"GADM3" select a remote scheme; any other token means the
    /// caller brings the geometry, so `shape` must be present.
    pub fn parse(token: &str, shape: Option<AdminShape>) -> Result<Self, MemeMapError> {
        match token.parse::<DatasetScheme>() {
            Ok(scheme) => Ok(Lookup::Remote(scheme)),
            Err(err) => shape.map(Lookup::Supplied).ok_or(err),
        }
    }
}

/// Boundary geometry together with the name shown in the title
#[derive(Debug, Clone)]
pub struct ResolvedShape {
    pub shape: AdminShape,
    pub display_name: String,
}

/// Build the dataset URL for a scheme
/// `{iso}` and `{level}` in the template are replaced verbatim.
pub fn dataset_url(template: &str, iso: &str, level: u8) -> Result<Url> {
    let raw = template
        .replace("{iso}", iso)
        .replace("{level}", &level.to_string());
    Url::parse(&raw).with_context(|| format!("Invalid dataset URL: {}", raw))
}

/// GADM boundary collection
/// Resolves a `Lookup` into an `AdminShape`, downloading when needed
pub struct GadmCollect<'a, F: Fetcher> {
    fetcher: &'a F,
    config: &'a MemeMapConfig,
}

impl<'a, F: Fetcher> GadmCollect<'a, F> {
    pub fn new(fetcher: &'a F, config: &'a MemeMapConfig) -> Self {
        GadmCollect { fetcher, config }
    }

    pub fn url_for(&self, scheme: DatasetScheme, iso: &str, level: u8) -> Result<Url> {
        dataset_url(scheme.template(self.config), iso, level)
    }

    /// Download and deserialize one remote dataset
    pub fn fetch_shape(&self, scheme: DatasetScheme, iso: &str, level: u8) -> Result<AdminShape> {
        let url = self.url_for(scheme, iso, level)?;
        info!("Fetching {} level {} boundaries for {:?}", scheme, level, iso);

        let download = self
            .fetcher
            .fetch(&url)
            .with_context(|| format!("Failed to download {} dataset", scheme))?;

        read_boundary_file(download.path(), level)
            .with_context(|| format!("Failed to deserialize {} dataset from {}", scheme, url))
    }

    /// Resolve the shape and its display name
    /// `name` wins over anything derived from the data; a shape without
    /// name columns is titled by `iso`.
    pub fn resolve(
        &self,
        lookup: Lookup,
        iso: &str,
        level: u8,
        name: Option<&str>,
    ) -> Result<ResolvedShape> {
        let shape = match lookup {
            Lookup::Remote(scheme) => self.fetch_shape(scheme, iso, level)?,
            Lookup::Supplied(shape) => shape,
        };

        let display_name = match name {
            Some(name) => name.to_string(),
            None => shape
                .derive_display_name()
                .unwrap_or_else(|| iso.to_string()),
        };

        Ok(ResolvedShape {
            shape,
            display_name,
        })
    }
}

/// Read a downloaded boundary file: plain GeoJSON, or a zip holding one
pub fn read_boundary_file(path: &Path, level: u8) -> Result<AdminShape> {
    let mut file = File::open(path).with_context(|| format!("Failed to open {:?}", path))?;

    let mut magic = [0u8; 4];
    let is_zip = file.read_exact(&mut magic).is_ok() && magic == ZIP_MAGIC;
    file.seek(SeekFrom::Start(0))?;

    let content = if is_zip {
        read_geojson_from_zip(file, path)?
    } else {
        let mut content = String::new();
        BufReader::new(file)
            .read_to_string(&mut content)
            .with_context(|| format!("Boundary file is not valid UTF-8: {:?}", path))?;
        content
    };

    AdminShape::from_geojson_str(&content, level)
}

fn read_geojson_from_zip(file: File, path: &Path) -> Result<String> {
    let mut archive = ZipArchive::new(BufReader::new(file)).context("Failed to open zip archive")?;

    let member = archive
        .file_names()
        .find(|name| {
            let lower = name.to_ascii_lowercase();
            lower.ends_with(".json") || lower.ends_with(".geojson")
        })
        .map(str::to_string)
        .ok_or_else(|| MemeMapError::NoGeoJsonInArchive(path.display().to_string()))?;

    let mut content = String::new();
    archive
        .by_name(&member)?
        .read_to_string(&mut content)
        .with_context(|| format!("Failed to read {} from archive", member))?;
    Ok(content)
}
