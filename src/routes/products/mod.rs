pub mod product;
pub mod seed;
