use clap::Parser;

use crate::mapping::{COLORMAP_FILE_NAME, LoaderConfig};

#[derive(Parser, Clone, Debug)]
#[command(author, version, about = "Print a class colormap from colormaps.toml", long_about = None)]
pub struct Args {
    /// Directory containing the colormap file
    #[arg(long, default_value = "data")]
    pub data_dir: String,

    /// Which `class_<N>` section to load
    #[arg(long, default_value_t = 0)]
    pub index: usize,

    /// Name of the colormap file inside the data directory
    #[arg(long, default_value = COLORMAP_FILE_NAME)]
    pub file_name: String,

    /// List the available section indices instead of printing a table
    #[arg(long)]
    pub list: bool,

    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    pub fn loader_config(&self) -> LoaderConfig {
        LoaderConfig {
            file_name: self.file_name.clone(),
            ..LoaderConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_data_dir() {
        let args = Args::parse_from(["colormap-inspect"]);
        assert_eq!(args.data_dir, "data");
        assert_eq!(args.index, 0);
        assert_eq!(args.loader_config(), LoaderConfig::default());
    }

    #[test]
    fn file_name_override_reaches_loader_config() {
        let args = Args::parse_from(["colormap-inspect", "--index", "2", "--file-name", "uavid.toml"]);
        assert_eq!(args.index, 2);
        assert_eq!(args.loader_config().file_name, "uavid.toml");
        assert_eq!(args.loader_config().section_prefix, "class_");
    }
}
