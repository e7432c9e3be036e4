pub mod invoke;
pub mod render;
