use anyhow::{Context, Result};
use tracing::info;

use crate::collect::country::normalize_country;
use crate::collect::fetch::{Fetcher, HttpFetcher};
use crate::collect::gadm::gadm_collect::{GadmCollect, Lookup};
use crate::collect::global_variables::{DEFAULT_BG_COL, DEFAULT_COUNTRY, DEFAULT_LEVEL};
use crate::collect::overlay::{load_overlay, OverlaySource};
use crate::commons::config::MemeMapConfig;
use crate::geometric::simplify::{simplify_if_large, Simplifier, VwSimplifier};
use crate::render::color::parse_color;
use crate::render::figure::Figure;

/// Parameters of one meme map
/// Defaults: built-in overlay, GADM3, "USA", level 1, "green4", derived name.
#[derive(Debug, Clone)]
pub struct MemeMap {
    pub image: OverlaySource,
    pub lookup: Lookup,
    /// Country name or code; ignored for `Lookup::Supplied`
    pub country: String,
    /// Administrative depth, only used by remote lookups
    pub level: u8,
    pub bg_col: String,
    /// Overrides the name derived from the data
    pub name: Option<String>,
    pub config: MemeMapConfig,
}

impl Default for MemeMap {
    fn default() -> Self {
        MemeMap {
            image: OverlaySource::Default,
            lookup: Lookup::default(),
            country: DEFAULT_COUNTRY.to_string(),
            level: DEFAULT_LEVEL,
            bg_col: DEFAULT_BG_COL.to_string(),
            name: None,
            config: MemeMapConfig::default(),
        }
    }
}

impl MemeMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image(mut self, image: OverlaySource) -> Self {
        self.image = image;
        self
    }

    pub fn with_lookup(mut self, lookup: Lookup) -> Self {
        self.lookup = lookup;
        self
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = country.into();
        self
    }

    pub fn with_level(mut self, level: u8) -> Self {
        self.level = level;
        self
    }

    pub fn with_bg_col(mut self, bg_col: impl Into<String>) -> Self {
        self.bg_col = bg_col.into();
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_config(mut self, config: MemeMapConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the figure over HTTP with the default simplifier
    pub fn run(&self) -> Result<Figure> {
        self.run_with(&HttpFetcher::new(), &VwSimplifier)
    }

    /// Build the figure with explicit network and simplification seams
    pub fn run_with<F, S>(&self, fetcher: &F, simplifier: &S) -> Result<Figure>
    where
        F: Fetcher,
        S: Simplifier,
    {
        let fill = parse_color(&self.bg_col)?;

        let iso = normalize_country(&self.country);
        info!("Building meme map for {:?} (level {})", iso, self.level);

        let resolved = GadmCollect::new(fetcher, &self.config).resolve(
            self.lookup.clone(),
            &iso,
            self.level,
            self.name.as_deref(),
        )?;

        let shape = simplify_if_large(resolved.shape, self.config.size_threshold, simplifier);

        let overlay = load_overlay(&self.image, fetcher, &self.config.overlay_url)?;

        Figure::compose(shape, &resolved.display_name, fill, overlay)
            .context("Failed to compose meme map")
    }
}

/// One-call entry point with every parameter spelled out
pub fn meme_map(
    image: OverlaySource,
    lookup: Lookup,
    country: &str,
    level: u8,
    bg_col: &str,
    name: Option<&str>,
) -> Result<Figure> {
    let mut request = MemeMap::new()
        .with_image(image)
        .with_lookup(lookup)
        .with_country(country)
        .with_level(level)
        .with_bg_col(bg_col);
    request.name = name.map(str::to_string);
    request.run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collect::fetch::write_temp;
    use crate::collect::gadm::gadm_collect::DatasetScheme;
    use crate::geo_core::{AdminShape, BoundingBox};
    use image::{DynamicImage, ImageOutputFormat};
    use std::cell::{Cell, RefCell};
    use std::io::Cursor;
    use tempfile::NamedTempFile;
    use url::Url;

    const SWEDEN: &str = r#"{"type": "FeatureCollection", "features": [
        {"type": "Feature", "properties": {"NAME_0": "Sweden", "NAME_2": "Kiruna"},
         "geometry": {"type": "Polygon", "coordinates": [[[20.0, 67.0], [21.0, 67.0], [21.0, 68.0], [20.0, 67.0]]]}},
        {"type": "Feature", "properties": {"NAME_0": "Sweden", "NAME_2": "Malmo"},
         "geometry": {"type": "Polygon", "coordinates": [[[13.0, 55.5], [13.1, 55.5], [13.1, 55.7], [13.0, 55.5]]]}}
    ]}"#;

    fn png_bytes() -> Vec<u8> {
        let mut bytes = Vec::new();
        DynamicImage::new_rgb8(3, 3)
            .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
            .unwrap();
        bytes
    }

    /// Serves GeoJSON for dataset URLs and a PNG for everything else
    struct RoutingFetcher {
        urls: RefCell<Vec<String>>,
    }

    impl RoutingFetcher {
        fn new() -> Self {
            RoutingFetcher {
                urls: RefCell::new(Vec::new()),
            }
        }
    }

    impl Fetcher for RoutingFetcher {
        fn fetch(&self, url: &Url) -> Result<NamedTempFile> {
            self.urls.borrow_mut().push(url.to_string());
            if url.path().ends_with(".json") {
                write_temp(SWEDEN.as_bytes(), ".json")
            } else {
                write_temp(&png_bytes(), ".png")
            }
        }
    }

    struct CountingSimplifier {
        calls: Cell<usize>,
    }

    impl Simplifier for CountingSimplifier {
        fn simplify(&self, shape: AdminShape) -> AdminShape {
            self.calls.set(self.calls.get() + 1);
            shape
        }
    }

    fn counting() -> CountingSimplifier {
        CountingSimplifier {
            calls: Cell::new(0),
        }
    }

    #[test]
    fn test_defaults() {
        let request = MemeMap::default();
        assert_eq!(request.image, OverlaySource::Default);
        assert_eq!(request.lookup, Lookup::Remote(DatasetScheme::Gadm3));
        assert_eq!(request.country, "USA");
        assert_eq!(request.level, 1);
        assert_eq!(request.bg_col, "green4");
        assert!(request.name.is_none());
    }

    #[test]
    fn test_sweden_gadm3_level_two() {
        let fetcher = RoutingFetcher::new();
        let simplifier = counting();
        let figure = MemeMap::new()
            .with_country("Sweden")
            .with_level(2)
            .run_with(&fetcher, &simplifier)
            .unwrap();

        let urls = fetcher.urls.borrow();
        assert_eq!(
            urls[0],
            "https://geodata.ucdavis.edu/gadm/gadm4.1/json/gadm41_SWE_2.json"
        );
        assert_eq!(urls.len(), 2);
        assert_eq!(figure.title(), Some("Sweden Election Results"));
        assert_eq!(simplifier.calls.get(), 0);
    }

    #[test]
    fn test_name_override() {
        let fetcher = RoutingFetcher::new();
        let figure = MemeMap::new()
            .with_country("SWE")
            .with_name("Svealand")
            .run_with(&fetcher, &counting())
            .unwrap();
        assert_eq!(figure.title(), Some("Svealand Election Results"));
    }

    #[test]
    fn test_supplied_shape_never_downloads_boundaries() {
        let shape = AdminShape::from_geojson_str(SWEDEN, 0).unwrap();
        let bbox = shape.bbox().unwrap();
        let fetcher = RoutingFetcher::new();
        let overlay = write_temp(&png_bytes(), ".png").unwrap();

        let figure = MemeMap::new()
            .with_lookup(Lookup::Supplied(shape))
            .with_image(OverlaySource::Path(overlay.path().to_path_buf()))
            .run_with(&fetcher, &counting())
            .unwrap();

        assert!(fetcher.urls.borrow().is_empty());
        assert_eq!(figure.raster_extent(), Some(bbox.expanded()));
        assert_eq!(
            figure.shape().unwrap().bbox(),
            Some(BoundingBox::new(13.0, 55.5, 21.0, 68.0))
        );
    }

    #[test]
    fn test_oversized_shape_is_simplified_once() {
        let fetcher = RoutingFetcher::new();
        let simplifier = counting();
        let config = MemeMapConfig {
            size_threshold: 1,
            ..MemeMapConfig::default()
        };
        MemeMap::new()
            .with_country("SWE")
            .with_config(config)
            .run_with(&fetcher, &simplifier)
            .unwrap();
        assert_eq!(simplifier.calls.get(), 1);
    }

    #[test]
    fn test_bad_colour_fails_before_any_download() {
        let fetcher = RoutingFetcher::new();
        let result = MemeMap::new()
            .with_bg_col("not-a-colour")
            .run_with(&fetcher, &counting());
        assert!(result.is_err());
        assert!(fetcher.urls.borrow().is_empty());
    }

    #[test]
    fn test_unknown_country_fails_downstream() {
        struct BrokenFetcher;
        impl Fetcher for BrokenFetcher {
            fn fetch(&self, url: &Url) -> Result<NamedTempFile> {
                anyhow::bail!("{} returned 404 Not Found", url)
            }
        }
        let result = MemeMap::new()
            .with_country("Atlantis Prime")
            .run_with(&BrokenFetcher, &counting());
        let err = result.unwrap_err();
        assert!(format!("{:#}", err).contains("_1.json"));
    }
}
