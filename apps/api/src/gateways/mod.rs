// Collaborator gateways consumed by the task generation pipeline.
// Each is a trait seam with a Postgres implementation; tests substitute mocks.

pub mod analytics;
pub mod project;
pub mod tasks;
