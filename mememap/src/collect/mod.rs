pub mod country;
pub mod fetch;
pub mod gadm;
pub mod global_variables;
pub mod overlay;
