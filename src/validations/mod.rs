pub mod product_name;
