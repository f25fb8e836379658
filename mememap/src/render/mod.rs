pub mod color;
pub mod figure;
