mod export;
mod model;
mod routes;
mod seed;

pub use export::export_to_csv;
pub use model::Parcel;
pub use model::ParcelStatus;
pub use routes::fetch_by_date_range;
pub use routes::router;
pub use routes::FilterParams;
pub use seed::seed_database;

pub const PARCEL_PK: &str = "Parcel";
