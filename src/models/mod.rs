// Models module - Database entity representations

pub mod vehicle;

pub use vehicle::{Vehicle, VehicleData};
