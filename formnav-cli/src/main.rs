mod app;
mod order;
mod terminal;
mod view;
mod widgets;

use std::{
    fs::{self, File},
    path::{Path, PathBuf},
    sync::Mutex,
};

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use formnav::Keymap;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{app::App, order::Order};

#[derive(Debug, Parser)]
#[command(
    name = "formnav",
    version,
    about = "Keyboard-driven order entry form (formnav demo)"
)]
struct Cli {
    /// JSON keymap replacing the built-in bindings
    #[arg(short = 'k', long = "keymap", value_name = "PATH")]
    keymap: Option<PathBuf>,

    /// Do not register the global shortcut listener
    #[arg(long = "no-shortcuts")]
    no_shortcuts: bool,

    /// Write tracing output to this file (filter with RUST_LOG)
    #[arg(long = "log-file", value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Where to write the saved order as JSON ("-" or omitted for stdout)
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    if let Some(path) = cli.log_file.as_deref() {
        init_tracing(path)?;
    }

    let keymap = match cli.keymap.as_deref() {
        Some(path) => Keymap::load(path)
            .wrap_err_with(|| format!("failed to load keymap {}", path.display()))?,
        None => Keymap::standard(),
    };

    let mut app = App::new(keymap, !cli.no_shortcuts)?;
    let order = app.run()?;
    write_order(&order, cli.output.as_deref())
}

fn init_tracing(path: &Path) -> Result<()> {
    let file = File::create(path)
        .wrap_err_with(|| format!("failed to create log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("formnav=debug"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .init();
    Ok(())
}

fn write_order(order: &Order, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(order).wrap_err("failed to serialize order")?;
    match output {
        Some(path) if path != Path::new("-") => {
            fs::write(path, format!("{json}\n"))
                .wrap_err_with(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), "order written");
        }
        _ => println!("{json}"),
    }
    Ok(())
}
