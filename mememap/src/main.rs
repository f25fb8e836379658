//! mememap — draw a country map with a meme on top
//!
//! Usage examples
//! --------------
//!
//! - United States, first-level regions, built-in meme
//!   $ mememap
//!
//! - Swedish municipalities with a custom title
//!   $ mememap --country Sweden --level 2 --name "Svea" -o sweden.png
//!
//! - Your own GeoJSON and picture
//!   $ mememap --lookup local --shape regions.geojson --image doge.png
//!
//! Dataset and overlay URLs can be pointed elsewhere with the
//! `MEMEMAP_GADM2_URL`, `MEMEMAP_GADM3_URL` and `MEMEMAP_OVERLAY_URL`
//! environment variables. Log verbosity follows `RUST_LOG`.
mod args;

use crate::args::CliArgs;
use anyhow::Context;
use clap::Parser;
use mememap::{AdminShape, Lookup, MemeMap, MemeMapConfig, OverlaySource};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = CliArgs::parse();

    let shape = args
        .shape
        .as_deref()
        .map(|path| AdminShape::from_geojson_file(path, args.level))
        .transpose()?;
    let lookup = Lookup::parse(&args.lookup, shape)?;

    let mut request = MemeMap::new()
        .with_image(OverlaySource::parse(&args.image))
        .with_lookup(lookup)
        .with_country(args.country)
        .with_level(args.level)
        .with_bg_col(args.bg_col)
        .with_config(MemeMapConfig::from_env()?);
    request.name = args.name;

    let figure = request.run()?;
    figure
        .render_png(&args.output, (args.width, args.height))
        .with_context(|| format!("Failed to render {:?}", args.output))?;

    println!("Map written to {}", args.output.display());
    Ok(())
}
