//! Business logic services for the CropSight field dashboard

pub mod field;

pub use field::FieldService;
