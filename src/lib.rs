pub mod cli;
pub mod colormap;
pub mod error;
pub mod mapping;
pub mod schema;

pub use crate::cli::Args;
pub use crate::colormap::{ClassEntry, ColormapTable, Rgb};
pub use crate::error::{ColormapError, Result};
pub use crate::mapping::{
    COLORMAP_FILE_NAME, ColormapLoader, LoaderConfig, available_selectors, load_colormap,
    parse_colormap_str,
};
