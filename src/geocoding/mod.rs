pub mod error;
pub mod geo_locator;
