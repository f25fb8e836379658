use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for mememap
#[derive(Debug, Parser)]
#[command(
    name = "mememap",
    version,
    about = "Draw a country's administrative boundaries with a meme on top"
)]
pub struct CliArgs {
    /// Overlay image: "default" for the built-in meme, or a path to a raster file
    #[arg(short = 'i', long = "image", default_value = "default")]
    pub image: String,

    /// Boundary source: GADM2, GADM3 (exact), or anything else to use --shape
    #[arg(short = 'l', long = "lookup", default_value = "GADM3")]
    pub lookup: String,

    /// Country name or ISO3 code (e.g. Sweden, SWE)
    #[arg(short = 'c', long = "country", default_value = "USA")]
    pub country: String,

    /// Administrative level (0 = country outline, 1 = first-level regions, ...)
    #[arg(long = "level", default_value_t = 1)]
    pub level: u8,

    /// Fill colour of the map (X11 name or #rrggbb)
    #[arg(long = "bg-col", default_value = "green4")]
    pub bg_col: String,

    /// Name shown in the title instead of the one found in the data
    #[arg(short = 'n', long = "name")]
    pub name: Option<String>,

    /// GeoJSON file used when --lookup is not a GADM scheme
    #[arg(short = 's', long = "shape")]
    pub shape: Option<PathBuf>,

    /// Where to write the rendered map
    #[arg(short = 'o', long = "output", default_value = "mememap.png")]
    pub output: PathBuf,

    #[arg(long = "width", default_value_t = 1024)]
    pub width: u32,

    #[arg(long = "height", default_value_t = 768)]
    pub height: u32,
}
