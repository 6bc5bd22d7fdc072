//! Work the state layer delegates: compressing, bundling, saving.
//!
//! - [`ImageCompressor`] / [`NativeCompressor`]: size-targeted re-encoding
//! - [`build_archive`]: zip bundling with collision-free entry names
//! - [`SaveSink`] / [`DirectorySink`]: where downloads end up

mod archive;
mod compressor;
mod sink;

pub use archive::{build_archive, build_archive_async, unique_entry_names};
pub use compressor::{ImageCompressor, NativeCompressor, compress_image};
pub use sink::{DirectorySink, SaveSink};
