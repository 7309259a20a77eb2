//! Data loading and combining

pub mod combine;
pub mod loader;
pub mod sample;

pub use combine::{combine, Combined, CombineWarning, CombinedTable};
pub use loader::{
    load_directory, load_file, FileFormat, FileParseError, LoadError, LoadReport, ParseErrorKind,
};
pub use sample::{generate_sample_series, write_sample_csv};
