use anyhow::Result;
use mememap::{AdminShape, Lookup, MemeMap, OverlaySource};
use std::path::PathBuf;

fn main() -> Result<()> {
    let shape = AdminShape::from_geojson_file(&PathBuf::from("regions.geojson"), 1)?;

    // No download for the boundaries: the shape comes from disk
    let figure = MemeMap::new()
        .with_lookup(Lookup::Supplied(shape))
        .with_image(OverlaySource::Path(PathBuf::from("doge.png")))
        .with_name("My Region")
        .run()?;

    figure.render_png("local.png", (800, 600))?;
    println!("Saved to local.png");
    Ok(())
}
