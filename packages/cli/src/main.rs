use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser};

use flashcfg_core_store::WearSettings;
use flashcfg_json_store::DEFAULT_CONFIG_PATH;

mod commands;
mod error;

use commands::{Command, Session};
use error::CliError;

/// flashcfg - inspect and edit device configuration stores on a host
#[derive(Parser, Debug)]
#[command(name = "flashcfg")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory standing in for the device filesystem
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Config file path on the device filesystem
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    file: String,

    /// JSON file with wear tracker settings
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// More log output (repeat for debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    match session(&args).and_then(|session| commands::execute(&args.command, &session)) {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn init_logging(verbose: u8) {
    let default_filter = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

fn session(args: &Args) -> Result<Session, CliError> {
    let root = match &args.root {
        Some(root) => root.clone(),
        None => default_root()?,
    };
    let settings = match &args.settings {
        Some(path) => read_settings(path)?,
        None => WearSettings::default(),
    };
    Ok(Session::new(root, args.file.clone(), settings))
}

fn default_root() -> Result<PathBuf, CliError> {
    dirs::data_local_dir()
        .map(|dir| dir.join("flashcfg"))
        .ok_or(CliError::NoDataDir)
}

fn read_settings(path: &Path) -> Result<WearSettings, CliError> {
    let text = std::fs::read_to_string(path).map_err(|source| CliError::SettingsRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| CliError::SettingsFormat {
        path: path.to_path_buf(),
        source,
    })
}
