use std::path::PathBuf;

/// Scratch directory for downloads; temp files are created inside the system
/// temp dir when this one does not exist.
pub const TEMP_PATH: &str = "./temp";

/// GADM 2.x boundary dataset (lookup token "GADM2")
pub const GADM2_URL_TEMPLATE: &str =
    "https://biogeo.ucdavis.edu/data/gadm2.8/json/{iso}_adm{level}.json";

/// GADM 3.x+ boundary dataset (lookup token "GADM3")
pub const GADM3_URL_TEMPLATE: &str =
    "https://geodata.ucdavis.edu/gadm/gadm4.1/json/gadm41_{iso}_{level}.json";

/// Overlay used when the caller does not bring their own image
pub const DEFAULT_OVERLAY_URL: &str = "https://i.imgflip.com/1ur9b0.jpg";

/// Estimated in-memory size above which the shape gets simplified
pub const SIZE_THRESHOLD: usize = 150_000_000;

/// Constant category every record is tagged with (single legend entry)
pub const LEGEND_LABEL: &str = "Meme";

pub const TITLE_SUFFIX: &str = "Election Results";

pub const DEFAULT_COUNTRY: &str = "USA";
pub const DEFAULT_LEVEL: u8 = 1;
pub const DEFAULT_BG_COL: &str = "green4";

pub fn get_temp_path() -> PathBuf {
    PathBuf::from(TEMP_PATH)
}
