use anyhow::{anyhow, Result};
use clap::{ArgAction, Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tagsieve::app::{App, Event, LoadState, Rendered};
use tagsieve::config::Config;
use tagsieve::logging::{init_logging, LogConfig};
use tagsieve::render::Renderer;
use tagsieve::theme::{Document, FileStorage, Theme, ThemePreference};
use tracing::{error, warn};

/// Filters and renders a static blog's post listing.
#[derive(Parser)]
#[command(name = "tagsieve", version, about)]
struct Cli {
    /// The project directory; `tagsieve.yaml` is searched for here and in
    /// its parents.
    #[arg(short, long, global = true, default_value = ".")]
    project: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Disable colored log output.
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render the listing page once.
    Render {
        /// Select this tag's filter control.
        #[arg(long)]
        tag: Option<String>,

        /// Type this into the search box.
        #[arg(long)]
        query: Option<String>,

        /// Write the page here instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the tag filter controls in display order.
    Tags,

    /// Show or toggle the persisted theme.
    Theme {
        #[command(subcommand)]
        action: Option<ThemeAction>,
    },

    /// Read events from stdin (`type <text>`, `tag <name>`, `theme`, `quit`)
    /// and re-render after each one.
    Browse {
        /// Rewrite the page here after every render.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum ThemeAction {
    Show,
    Toggle,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&LogConfig::from_verbosity(cli.verbose).with_ansi(!cli.no_color));
    let config = Config::from_directory(&cli.project)?;

    match cli.command {
        Command::Render { tag, query, output } => render(&config, tag, query, output),
        Command::Tags => tags(&config),
        Command::Theme { action } => theme(&config, action.unwrap_or(ThemeAction::Show)),
        Command::Browse { output } => browse(&config, output),
    }
}

fn build_app(config: &Config) -> Result<App<FileStorage>> {
    let mut renderer = Renderer::new(&config.post_page)?;
    if !config.page_template.is_empty() {
        renderer = renderer.with_page_template(config.page_template.iter())?;
    }
    let storage = FileStorage::open(&config.storage_path)?;
    Ok(App::new(renderer, ThemePreference::new(storage)))
}

fn ensure_loaded(app: &App<FileStorage>) -> Result<()> {
    match app.state() {
        LoadState::Failed(message) => Err(anyhow!("Failed to load posts: {}", message)),
        _ => Ok(()),
    }
}

fn write_page(output: Option<&Path>, rendered: &Rendered) -> io::Result<()> {
    match output {
        Some(path) => std::fs::write(path, &rendered.page),
        None => io::stdout().write_all(rendered.page.as_bytes()),
    }
}

fn render(
    config: &Config,
    tag: Option<String>,
    query: Option<String>,
    output: Option<PathBuf>,
) -> Result<()> {
    let mut app = build_app(config)?;
    let mut rendered = app.load(&config.source)?;
    if let Err(e) = ensure_loaded(&app) {
        // the failure page is still written so the listing shows the message
        write_page(output.as_deref(), &rendered)?;
        return Err(e);
    }
    if let Some(tag) = tag {
        rendered = app.dispatch(Event::TagClicked(tag))?.unwrap_or(rendered);
    }
    if let Some(query) = query {
        rendered = app.dispatch(Event::Input(query))?.unwrap_or(rendered);
    }
    write_page(output.as_deref(), &rendered)?;
    Ok(())
}

fn tags(config: &Config) -> Result<()> {
    let mut app = build_app(config)?;
    app.load(&config.source)?;
    ensure_loaded(&app)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for tag in app.tags().iter() {
        writeln!(out, "{}", tag)?;
    }
    Ok(())
}

fn theme(config: &Config, action: ThemeAction) -> Result<()> {
    let mut preference = ThemePreference::new(FileStorage::open(&config.storage_path)?);
    let current = match action {
        ThemeAction::Show => preference.current(),
        ThemeAction::Toggle => preference.toggle(&mut Document::default())?,
    };
    println!(
        "{} {}",
        current.label(),
        match current {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    );
    Ok(())
}

fn parse_event(line: &str) -> Option<Event> {
    let (command, rest) = match line.split_once(' ') {
        Some((command, rest)) => (command, rest),
        None => (line, ""),
    };
    match command {
        "type" => Some(Event::Input(rest.to_owned())),
        "tag" => Some(Event::TagClicked(rest.trim().to_owned())),
        "theme" => Some(Event::ThemeToggled),
        _ => None,
    }
}

fn browse(config: &Config, output: Option<PathBuf>) -> Result<()> {
    let mut app = build_app(config)?;
    if let Some(path) = output.clone() {
        app.subscribe(move |rendered: &Rendered| {
            if let Err(e) = write_page(Some(path.as_path()), rendered) {
                error!(path = %path.display(), %e, "writing page");
            }
        });
    }
    app.subscribe(|rendered: &Rendered| {
        println!("{} visible: {}", rendered.visible.len(), rendered.visible.join(", "));
    });
    app.load(&config.source)?;

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let line = line.trim_end();
        if line == "quit" {
            break;
        }
        match parse_event(line) {
            Some(event) => match app.dispatch(event) {
                Ok(_) => {}
                Err(tagsieve::app::Error::UnknownTag(tag)) => {
                    println!("no such tag: {}", tag);
                }
                Err(e) => return Err(e.into()),
            },
            None => warn!(line, "unrecognized event"),
        }
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_event() {
        assert_eq!(
            parse_event("type Dedup Tool"),
            Some(Event::Input("Dedup Tool".to_owned()))
        );
        assert_eq!(parse_event("type"), Some(Event::Input(String::new())));
        assert_eq!(
            parse_event("tag rust"),
            Some(Event::TagClicked("rust".to_owned()))
        );
        assert_eq!(parse_event("theme"), Some(Event::ThemeToggled));
        assert_eq!(parse_event("jump"), None);
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from(["tagsieve", "-vv", "render", "--tag", "rust", "--no-color"])
            .expect("valid arguments");
        assert_eq!(cli.verbose, 2);
        assert!(cli.no_color);
        assert!(matches!(
            cli.command,
            Command::Render { tag: Some(ref t), query: None, output: None } if t == "rust"
        ));
    }
}
