pub mod topics;
pub mod hourly_data;
