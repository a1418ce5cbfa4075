//! Editor binary: interactive terminal menus over the phototag library.

use anyhow::Result;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use phototag::app::App;
use phototag::config;

fn main() -> Result<()> {
    // The menus own the terminal, so logs go to a file instead
    let log_dir = config::log_dir();
    let _ = std::fs::create_dir_all(&log_dir);
    let log_path = log_dir.join("editor.log");
    let file = std::fs::File::create(&log_path)?;
    let (writer, _guard) = tracing_appender::non_blocking(file);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(env_filter)
        .init();
    // Tip: set RUST_LOG=phototag=debug to change verbosity

    tracing::info!("starting phototag editor");

    let mut app = App::new()?;
    app.run()?;

    tracing::info!("editor exiting");
    Ok(())
}
