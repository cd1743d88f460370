pub mod frequency;
pub mod stats;
pub mod trend;
