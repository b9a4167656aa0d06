// Small numeric and time helpers shared across the crate
pub mod maths_utils;
pub mod time_utils;

pub use time_utils::TimeUtils;
