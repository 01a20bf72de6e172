pub mod expr;
pub mod render;
pub mod types;
