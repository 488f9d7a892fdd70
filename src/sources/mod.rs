//! Ready-made work sources

mod range;

pub use range::{QueryPlanner, RangeSource};
