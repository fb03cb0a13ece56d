pub mod analytics;
pub mod project;
pub mod task;
