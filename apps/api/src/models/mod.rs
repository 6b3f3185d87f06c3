pub mod profile;
pub mod records;
