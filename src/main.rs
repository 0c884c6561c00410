mod analyzer;
mod app;
mod clipboard;
mod config;
mod decode;
mod document;
mod grid;
mod intake;
mod mode;
mod style;
mod ui;
mod view;
mod workspace;

use std::fs::File;
use std::io;
use std::panic;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use app::App;
use decode::PlaceholderDecoder;

struct Args {
    files: Vec<PathBuf>,
    log_file: Option<PathBuf>,
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut files = Vec::new();
    let mut log_file = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--log" => {
                if i + 1 < args.len() {
                    log_file = Some(PathBuf::from(&args[i + 1]));
                    i += 2;
                } else {
                    eprintln!("Error: --log requires an argument");
                    std::process::exit(1);
                }
            }
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            arg if arg.starts_with('-') => {
                eprintln!("Unknown option: {}", arg);
                std::process::exit(1);
            }
            _ => {
                files.push(PathBuf::from(&args[i]));
                i += 1;
            }
        }
    }

    Args { files, log_file }
}

fn print_help() {
    eprintln!("mdview - A terminal-based viewer for Access database files");
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("    mdview [OPTIONS] [FILE ...]");
    eprintln!();
    eprintln!("OPTIONS:");
    eprintln!("    --log <FILE>  Write logs to FILE (filtered by RUST_LOG)");
    eprintln!("    -h, --help    Print this help message");
    eprintln!();
    eprintln!("Accepted files: .mdb and .accdb (any case). Several files can be");
    eprintln!("opened at once; each loads in the background.");
}

/// Restore the terminal before the default panic output so the message
/// is readable
fn install_panic_hook() {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);

        if let Some(location) = info.location() {
            error!(
                file = location.file(),
                line = location.line(),
                "panic occured"
            );
        } else {
            error!("panic occured");
        }

        default_hook(info);
    }));
}

fn init_tracing(path: &PathBuf) -> io::Result<()> {
    let file = File::create(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mdview=info")),
        )
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn main() -> io::Result<()> {
    let args = parse_args();
    if let Some(path) = &args.log_file {
        init_tracing(path)?;
    }
    info!("mdview started");

    install_panic_hook();

    let mut app = App::new(Arc::new(PlaceholderDecoder));
    for path in args.files {
        app.open_path(path);
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = app.run(&mut terminal);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;

    result
}
