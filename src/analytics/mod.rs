mod model;
mod routes;

pub use model::compute_analytics;
pub use model::compute_staff_metrics;
pub use routes::router;
