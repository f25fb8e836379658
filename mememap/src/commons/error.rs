use thiserror::Error;

/// Domain failures worth matching on; everything else travels as `anyhow::Error`
#[derive(Debug, Error)]
pub enum MemeMapError {
    #[error("Unsupported GeoJSON value: {0}")]
    UnsupportedGeoJson(String),
    #[error("Feature {0} has no geometry")]
    MissingGeometry(usize),
    #[error("Shape has no geometry to draw")]
    EmptyShape,
    #[error("Unknown colour: {0}")]
    UnknownColor(String),
    #[error("No GeoJSON member found in archive {0}")]
    NoGeoJsonInArchive(String),
    #[error("Lookup method {0:?} needs a caller-supplied shape")]
    ShapeRequired(String),
}
