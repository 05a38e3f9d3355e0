//! Turns raw sale records into the feature layout the model was trained on.

pub mod demographics;
pub mod joiner;
pub mod record;

pub use demographics::Demographics;
pub use joiner::{join_demographics, FeatureTable};
pub use record::{RawRecord, SALES_COLUMN_SELECTION};
