use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use colormap_loader::{Args, ColormapLoader};

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let loader = ColormapLoader::new(args.loader_config());

    if args.list {
        let selectors = loader
            .sections(&args.data_dir)
            .with_context(|| format!("listing colormaps in {}", args.data_dir))?;
        for selector in selectors {
            println!("{}", loader.section_key(selector));
        }
        return Ok(());
    }

    let table = loader
        .load(&args.data_dir, args.index)
        .with_context(|| format!("loading colormap {} from {}", args.index, args.data_dir))?;

    for (name, entry) in table.sorted_by_id() {
        let (r, g, b) = entry.color.as_tuple();
        println!("{}\t{}\t({}, {}, {})", entry.id, name, r, g, b);
    }

    Ok(())
}
