//! hiveexplorer - an interactive terminal viewer for Windows Registry hives.

use hiveexplorer::app::{App, Config};
use hiveexplorer::ui;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "hiveexplorer", disable_version_flag = true)]
#[command(about = "An interactive terminal viewer for Windows Registry hive files", long_about = None)]
struct Args {
    /// Path to the hive file to open
    hive_file: PathBuf,

    /// Enable debug logging to ./hiveexplorer.log
    #[arg(short, long)]
    debug: bool,

    /// Print version and exit
    #[arg(short = 'v', long = "version", action = clap::ArgAction::Version)]
    version: (),
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.debug {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_writer(|| {
                std::fs::OpenOptions::new()
                    .create(true)
                    .write(true)
                    .truncate(true)
                    .open("hiveexplorer.log")
                    .expect("failed to open log file")
            })
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
        tracing::info!("starting hiveexplorer");
    }

    if !args.hive_file.exists() {
        eprintln!("Error: hive file not found: {}", args.hive_file.display());
        std::process::exit(1);
    }

    let config = Config::new(args.hive_file, args.debug);
    let app = match App::new(config) {
        Ok(app) => app,
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(if err.is_fatal() { 1 } else { 2 });
        }
    };

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = &res {
        eprintln!("Error: {err}");
    }

    if args.debug {
        tracing::info!("hiveexplorer exited");
    }

    res
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, mut app: App) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, &mut app))?;

        app.tick();
        if app.should_quit() {
            return Ok(());
        }

        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key);
            }
        }

        if app.should_quit() {
            return Ok(());
        }
    }
}
