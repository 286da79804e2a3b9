pub mod acquire;
pub mod enricher;
pub mod notify;
pub mod processor;
pub mod store;
pub mod synthesizer;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use enricher::Enricher;
pub use processor::Processor;
