pub mod error;
pub mod validation;
pub mod formats;
pub mod fs;

pub use error::{CompressorError, CompressorResult, ValidationError};
pub use validation::{validate_batch, validate_settings, quality_from_percent};
pub use formats::{ImageFormat, format_file_size, mime_type_from_name};
pub use fs::{extract_filename, load_image_file, load_image_files};
