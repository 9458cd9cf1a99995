mod app;
mod ui;

use anyhow::Result;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use std::io;
use std::path::PathBuf;

use camlabel::config::Config;
use camlabel::cursor::WindowPolicy;
use camlabel::logging;
use camlabel::session::{Session, SessionOrigin};

use app::App;
use ui::ImageCache;

/// Command-line values; each one overrides the config file.
#[derive(Debug, Default)]
struct CliArgs {
    config: Option<PathBuf>,
    images: Option<PathBuf>,
    schema: Option<PathBuf>,
    output: Option<PathBuf>,
    width: Option<usize>,
    active: Option<usize>,
    policy: Option<WindowPolicy>,
    no_resume: bool,
}

impl CliArgs {
    fn apply(self, config: &mut Config) {
        if let Some(images) = self.images {
            config.session.images = Some(images);
        }
        if let Some(schema) = self.schema {
            config.session.schema = Some(schema);
        }
        if let Some(output) = self.output {
            config.session.output = output;
        }
        if let Some(width) = self.width {
            config.display.width = width;
        }
        if let Some(active) = self.active {
            config.display.active = active;
        }
        if let Some(policy) = self.policy {
            config.display.policy = policy;
        }
        if self.no_resume {
            config.session.resume = false;
        }
    }
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs::default();

    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            "--version" | "-V" => {
                println!("camlabel {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--no-resume" => cli.no_resume = true,
            "--config" | "-c" | "--images" | "-i" | "--schema" | "-s" | "--output" | "-o"
            | "--width" | "-w" | "--active" | "-k" | "--policy" => {
                let Some(value) = args.get(i + 1) else {
                    eprintln!("Error: {flag} requires a value");
                    std::process::exit(1);
                };
                if let Err(message) = set_value(&mut cli, flag, value) {
                    eprintln!("Error: {message}");
                    std::process::exit(1);
                }
                i += 1;
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_help();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    cli
}

fn set_value(cli: &mut CliArgs, flag: &str, value: &str) -> Result<(), String> {
    let number = |value: &str| {
        value
            .parse::<usize>()
            .map_err(|_| format!("{flag} expects a non-negative integer, got '{value}'"))
    };
    match flag {
        "--config" | "-c" => cli.config = Some(PathBuf::from(value)),
        "--images" | "-i" => cli.images = Some(PathBuf::from(value)),
        "--schema" | "-s" => cli.schema = Some(PathBuf::from(value)),
        "--output" | "-o" => cli.output = Some(PathBuf::from(value)),
        "--width" | "-w" => cli.width = Some(number(value)?),
        "--active" | "-k" => cli.active = Some(number(value)?),
        "--policy" => cli.policy = Some(value.parse()?),
        _ => return Err(format!("unknown option {flag}")),
    }
    Ok(())
}

fn print_help() {
    println!(
        r#"camlabel - annotate wearable-camera photo sequences

USAGE:
    camlabel [OPTIONS]

OPTIONS:
    --config, -c PATH    Path to config file
    --images, -i DIR     Photo root containing P<id> directories
    --schema, -s FILE    Label schema, one label per line
    --output, -o FILE    Annotation CSV to write (and resume from)
    --width, -w N        Photos shown at once
    --active, -k K       Position of the annotated photo, from 0
    --policy POLICY      Window policy: clamped or strict
    --no-resume          Rescan photos even if the output file exists
    --version, -V        Show version
    --help, -h           Show this help message

ENVIRONMENT:
    CAMLABEL_CONFIG      Path to config file (overrides default location)
    CAMLABEL_LOG         Log filter (trace, debug, info, warn, error)

Config file location: $XDG_CONFIG_HOME/camlabel/config.toml"#
    );
}

fn main() -> Result<()> {
    let mut cli = parse_args();

    // Initialize logging (uses journald on Linux, file fallback otherwise)
    if let Err(e) = logging::init(None) {
        eprintln!("Warning: logging disabled: {e}");
    }

    let mut config = Config::load(cli.config.take().as_deref())?;
    cli.apply(&mut config);

    let session = Session::open(&config)?;
    match &session.origin {
        SessionOrigin::Scanned {
            discovered,
            skipped,
            replaces_existing,
        } => {
            if *replaces_existing {
                eprintln!(
                    "Warning: resume is off; {} will be overwritten on the first save",
                    config.session.output.display()
                );
            }
            if !skipped.is_empty() {
                eprintln!(
                    "Skipped {} of {} files without a P<id> directory or timestamp",
                    skipped.len(),
                    discovered
                );
            }
        }
        SessionOrigin::Resumed { path } => eprintln!("Resuming from {}", path.display()),
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let images = if config.display.image_preview {
        ImageCache::detect(config.display.rotate, config.display.width)
    } else {
        None
    };

    let result = App::new(session.controller, config.display.clone(), images)
        .map_err(anyhow::Error::from)
        .and_then(|mut app| app.run(&mut terminal));

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}
