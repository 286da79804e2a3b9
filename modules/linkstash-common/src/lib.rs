pub mod config;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::LinkStashError;
pub use types::{
    domain_of, AcquisitionResult, AcquisitionStatus, EnrichedMetadata, NewItem, Platform,
    SavedItem, CATEGORIES,
};
