pub mod simplify;
