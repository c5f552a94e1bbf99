use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
    thread,
};

mod backend_bridge;
mod config;
mod controller;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use crossbeam_channel::bounded;
use tracing_subscriber::EnvFilter;

use backend_bridge::commands::BackendCommand;
use controller::{
    events::UiEvent,
    input::{parse_input, Input, HELP},
    orchestration::dispatch_backend_command,
};

#[derive(Parser, Debug)]
#[command(about = "Admin console for a remote product catalog")]
struct Args {
    /// Optional TOML file with flat string settings.
    #[arg(long, default_value = "console.toml")]
    config: PathBuf,
    #[arg(long)]
    base_url: Option<String>,
    #[arg(long)]
    api_path: Option<String>,
    #[arg(long)]
    credentials_file: Option<PathBuf>,
    #[arg(long)]
    timeout_secs: Option<u64>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = config::load_settings(&args.config)?;
    if let Some(v) = args.base_url {
        settings.base_url = v;
    }
    if let Some(v) = args.api_path {
        settings.api_path = v;
    }
    if let Some(v) = args.credentials_file {
        settings.credentials_path = v;
    }
    if let Some(v) = args.timeout_secs {
        settings.request_timeout_secs = v;
    }
    let gateway_config = settings
        .gateway_config()
        .context("unusable catalog settings")?;

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(64);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(256);
    let backend = backend_bridge::runtime::launch(
        gateway_config,
        settings.credentials_path.clone(),
        cmd_rx,
        ui_tx,
    );
    let renderer = thread::spawn(move || {
        for event in ui_rx {
            println!("{}", ui::render::render_event(&event));
        }
    });

    let stdin = io::stdin();
    let mut status = String::new();
    print_prompt()?;
    for line in stdin.lock().lines() {
        let line = line.context("failed to read prompt input")?;
        match parse_input(&line) {
            Ok(Input::Command(cmd)) => {
                if !dispatch_backend_command(&cmd_tx, cmd, &mut status) {
                    eprintln!("{status}");
                    break;
                }
                if !status.is_empty() {
                    eprintln!("{status}");
                }
            }
            Ok(Input::Help) => println!("{HELP}"),
            Ok(Input::Quit) => break,
            Ok(Input::Empty) => {}
            Err(message) => eprintln!("{message}"),
        }
        print_prompt()?;
    }

    drop(cmd_tx);
    if backend.join().is_err() {
        tracing::error!("backend worker panicked");
    }
    if renderer.join().is_err() {
        tracing::error!("renderer panicked");
    }
    Ok(())
}

fn print_prompt() -> Result<()> {
    let mut stdout = io::stdout();
    write!(stdout, "> ")?;
    stdout.flush()?;
    Ok(())
}
