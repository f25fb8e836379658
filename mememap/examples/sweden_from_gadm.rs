use anyhow::Result;
use mememap::MemeMap;

fn main() -> Result<()> {
    tracing_subscriber::fmt().init();

    // Swedish municipalities (GADM level 2) under the built-in meme
    let figure = MemeMap::new()
        .with_country("Sweden")
        .with_level(2)
        .with_bg_col("steelblue4")
        .run()?;

    figure.render_png("sweden.png", (1024, 1280))?;
    println!("Saved to sweden.png");
    Ok(())
}
