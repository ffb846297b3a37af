// Entrypoint for the MLCave CLI.
// - Keeps `main` small: load config, set up logging and hand over to the
//   UI loop.

use mlcave_client::{config::ClientConfig, ui::main_menu};
use std::path::PathBuf;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // `MLCAVE_CONFIG` points at a JSON file; otherwise the `MLCAVE_*`
    // variables are used. See `ClientConfig::from_env`.
    let config = match std::env::var_os("MLCAVE_CONFIG") {
        Some(path) => ClientConfig::from_file(&PathBuf::from(path))?,
        None => ClientConfig::from_env()?,
    };
    log::info!("using MLCave storage at {}", config.uri);

    // Blocks until the user exits.
    main_menu(config)?;
    Ok(())
}
