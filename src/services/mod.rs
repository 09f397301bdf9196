pub mod analytics;
pub mod data_loader;
pub mod periods;
