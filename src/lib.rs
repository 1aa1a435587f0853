pub mod assistant;
pub mod component;
pub mod config;
pub mod render;
pub mod schema;
pub mod story;
