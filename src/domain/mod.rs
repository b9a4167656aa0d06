// Domain types and value objects
pub mod bar;
pub mod pair_interval;
pub mod window;

// Re-export commonly used types
pub use bar::Bar;
pub use pair_interval::PairInterval;
pub use window::{WindowSpec, WindowSpecError};
