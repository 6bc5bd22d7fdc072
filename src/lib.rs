// Module declarations in dependency order
pub mod utils;
pub mod core;
pub mod processing;
pub mod commands;

// Public exports for external consumers
pub use crate::core::{
    AppConfig, AppState, CompressOutcome, CompressionSettings, CompressionSummary, ImageFile,
    StateEvent, StateObserver,
};
pub use crate::processing::{DirectorySink, ImageCompressor, NativeCompressor, SaveSink};
pub use crate::utils::{CompressorError, CompressorResult};

// This library file is the public API; the command-line front-end lives in main.rs.
