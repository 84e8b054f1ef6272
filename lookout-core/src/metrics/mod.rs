pub mod latest;

pub use latest::LatestValues;
