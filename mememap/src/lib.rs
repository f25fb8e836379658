//! Administrative boundary maps with a meme on top.
//!
//! ```no_run
//! use mememap::MemeMap;
//!
//! let figure = MemeMap::new().with_country("Sweden").with_level(2).run()?;
//! figure.render_png("sweden.png", (1024, 768))?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod collect;
pub mod commons;
pub mod geo_core;
pub mod geometric;
pub mod meme_map;
pub mod render;

pub use collect::gadm::gadm_collect::{DatasetScheme, Lookup};
pub use collect::overlay::OverlaySource;
pub use commons::config::MemeMapConfig;
pub use commons::error::MemeMapError;
pub use geo_core::{AdminRecord, AdminShape, BoundingBox};
pub use meme_map::{meme_map, MemeMap};
pub use render::figure::Figure;
