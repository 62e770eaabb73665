mod cli;
mod config;
mod core;
mod error;
mod tui;

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::cli::{Cli, Commands};
use crate::config::Config;
use crate::core::{CloudRenderer, NotesPipeline, NotesRequest, format_notes};
use crate::error::{Error, Result};
use crate::tui::{App, EventHandler, init as tui_init, restore as tui_restore, ui};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Notes {
            url,
            languages,
            preserve_formatting,
            keywords,
            top_n,
            cloud,
        }) => {
            init_tracing()?;
            run_cli_notes(url, languages, preserve_formatting, keywords, top_n, cloud).await?;
        }
        Some(Commands::Tui) | None => {
            run_tui().await?;
        }
    }

    Ok(())
}

// Logging stays off in TUI mode so nothing writes over the alternate screen.
fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber).map_err(Error::custom)?;
    Ok(())
}

async fn run_cli_notes(
    url: String,
    languages: String,
    preserve_formatting: bool,
    keywords: bool,
    top_n: usize,
    cloud: Option<PathBuf>,
) -> Result<()> {
    let config = Config::from_env()?;
    let pipeline = NotesPipeline::from_config(&config)?;

    let mut request = NotesRequest::new(url);
    let parsed = Commands::parse_languages(&languages);
    if !parsed.is_empty() {
        request.languages = parsed;
    }
    request.preserve_formatting = preserve_formatting;
    request.extract_keywords = keywords || cloud.is_some();
    request.keyword_count = top_n;

    let notes = pipeline.run(&request).await?;
    print!("{}", format_notes(&notes));

    if let Some(path) = cloud {
        let renderer = CloudRenderer::new(config.font_path.as_deref())?;
        renderer.render_to_file(&notes.keyword_tokens(), &path)?;
        println!();
        println!("Keyword cloud saved to: {}", path.display());
    }

    Ok(())
}

async fn run_tui() -> Result<()> {
    // Create the app first so configuration errors surface before the
    // terminal enters the alternate screen.
    let mut app = App::new()?;
    let event_handler = EventHandler::new();

    let mut terminal = tui_init()?;

    // Main event loop
    loop {
        let event = event_handler.next_event()?;
        app.handle_event(event)?;

        terminal.draw(|f| {
            ui::draw(f, &mut app);
        })?;

        if app.should_quit {
            break;
        }
    }

    tui_restore()?;
    Ok(())
}
