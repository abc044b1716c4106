pub mod daily_record;
pub mod location;
pub mod resolution;
pub mod station;
