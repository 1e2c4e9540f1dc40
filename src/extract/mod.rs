pub mod cost;
pub mod fields;
pub mod status;
