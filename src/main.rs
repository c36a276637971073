mod app;
mod config;
mod editor;
mod logging;
mod recent_files;
mod shortcuts;
mod ui;

use std::io::stdout;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::{
    event::{
        self, Event, KeyEventKind, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
        PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
        supports_keyboard_enhancement,
    },
};
use ratatui::prelude::*;
use tracing::{info, warn};

use mmdpad_core::{DiagramId, DiagramStore, find_template, system_templates};
use mmdpad_export::{ExportFormat, export_to_dir, render};

use app::App;
use config::Config;
use recent_files::RecentFiles;

/// Terminal editor for Mermaid diagrams
#[derive(Parser, Debug)]
#[command(name = "mmdpad")]
#[command(version, about, long_about = None)]
struct Args {
    /// Directory holding saved diagrams and the log file
    #[arg(long, value_name = "DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Undo steps to keep while editing
    #[arg(long, value_name = "N")]
    max_history: Option<usize>,

    /// Start from a template
    #[arg(long, value_name = "ID", conflicts_with = "open")]
    template: Option<String>,

    /// Open a saved diagram
    #[arg(long, value_name = "ID")]
    open: Option<DiagramId>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List saved diagrams
    List,
    /// List built-in templates
    Templates,
    /// Export a saved diagram to a file
    Export {
        id: DiagramId,
        /// mermaid, markdown or html (defaults to the configured format)
        #[arg(long)]
        format: Option<ExportFormat>,
        /// Output directory (defaults to the configured export dir)
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,
    },
    /// Print a shared diagram by its token
    View { token: String },
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Reported once logging is up
    let (mut config, config_error) = match Config::load() {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };
    if let Some(dir) = args.data_dir.clone() {
        config.data_dir = Some(dir);
    }
    if let Some(max_history) = args.max_history {
        config.max_history = max_history;
    }

    let data_dir = config.data_dir();
    let store = DiagramStore::open(&data_dir)?;

    if let Some(command) = args.command {
        logging::init_stderr();
        if let Some(e) = &config_error {
            warn!("using default config: {:#}", e);
        }
        return run_command(command, &store, &config);
    }

    logging::init_file(&data_dir)?;
    info!(data_dir = %data_dir.display(), max_history = config.max_history, "starting editor");

    let mut app = App::new(config, store, RecentFiles::load());
    if let Some(id) = &args.template {
        match find_template(id) {
            Some(template) => app.use_template(template),
            None => app.set_status(format!("Unknown template: {id}")),
        }
    } else if let Some(id) = args.open.or_else(|| app.recent_files.latest().map(|r| r.id)) {
        match app.store.get(id) {
            Ok(diagram) => app.open_diagram(diagram),
            Err(e) => {
                warn!("could not open {id}: {:#}", e);
                app.recent_files.remove(id);
                app.set_status(format!("{:#}", e));
            }
        }
    }
    app.refresh_preview();
    if let Some(e) = &config_error {
        warn!("using default config: {:#}", e);
        app.set_status(format!("Using default config: {:#}", e));
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    // Lets ctrl+shift chords reach us intact where the terminal supports it
    let enhanced = supports_keyboard_enhancement().unwrap_or(false);
    if enhanced {
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
        )?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app);

    if let Err(e) = app.recent_files.save() {
        warn!("failed to save recent files: {:#}", e);
    }

    // Cleanup terminal
    if enhanced {
        execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags)?;
    }
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {:?}", e);
    }
    info!("editor closed");

    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>, app: &mut App) -> Result<()> {
    while app.running {
        terminal.draw(|frame| ui::render(frame, app))?;

        if event::poll(Duration::from_millis(250))? {
            match event::read()? {
                Event::Key(key) if matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) => {
                    app.handle_key(key);
                }
                _ => {}
            }
        }
    }
    Ok(())
}

fn run_command(command: Command, store: &DiagramStore, config: &Config) -> Result<()> {
    match command {
        Command::List => {
            for diagram in store.list()? {
                let shared = if diagram.is_public { " shared" } else { "" };
                println!(
                    "{}  {:<10} {}  {}{}",
                    diagram.id,
                    diagram.diagram_type,
                    diagram.updated_at.format("%Y-%m-%d %H:%M"),
                    diagram.title,
                    shared
                );
            }
        }
        Command::Templates => {
            for template in system_templates() {
                println!(
                    "{:<20} {:<10} {:<10} {}",
                    template.id,
                    template.category.name(),
                    template.diagram_type,
                    template.title
                );
            }
        }
        Command::Export { id, format, out } => {
            let diagram = store.get(id)?;
            let format = format.unwrap_or(config.default_export_format);
            let dir = out.unwrap_or_else(|| config.export_dir());
            let path = export_to_dir(&diagram, format, &dir)
                .with_context(|| format!("Failed to export {id}"))?;
            println!("{}", path.display());
        }
        Command::View { token } => {
            let diagram = store.open_shared(&token)?;
            print!("{}", render(&diagram, ExportFormat::Markdown));
        }
    }
    Ok(())
}
