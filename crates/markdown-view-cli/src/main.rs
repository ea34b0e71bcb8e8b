mod view;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use markdown_view_config::Config;
use markdown_view_engine::{Document, RenderContext, describe, io, render_document};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use std::{
    env,
    io::{Stdout, stdout},
    path::{Path, PathBuf},
    process,
};
use url::Url;

struct Args {
    file: PathBuf,
    search: String,
    dump: bool,
}

impl Args {
    fn parse(args: &[String]) -> Option<Self> {
        let mut file = None;
        let mut search = String::new();
        let mut dump = false;

        let mut rest = args.iter().skip(1);
        while let Some(arg) = rest.next() {
            match arg.as_str() {
                "--dump" => dump = true,
                "--search" => search = rest.next()?.clone(),
                _ if file.is_none() && !arg.starts_with("--") => file = Some(PathBuf::from(arg)),
                _ => return None,
            }
        }

        Some(Self {
            file: file?,
            search,
            dump,
        })
    }
}

#[derive(PartialEq)]
enum Mode {
    Normal,
    Search,
}

struct App {
    file: PathBuf,
    document: Document,
    ctx: RenderContext,
    mode: Mode,
    search_input: String,
    lines: Vec<Line<'static>>,
    match_count: usize,
    scroll: u16,
}

impl App {
    fn new(file: PathBuf, document: Document, ctx: RenderContext) -> Self {
        let search_input = ctx.search_text.clone();
        let mut app = Self {
            file,
            document,
            ctx,
            mode: Mode::Normal,
            search_input,
            lines: Vec::new(),
            match_count: 0,
            scroll: 0,
        };
        app.rerender();
        app
    }

    fn rerender(&mut self) {
        let blocks = render_document(&self.document, &self.ctx);
        self.match_count = view::count_matches(&blocks);
        self.lines = view::document_lines(&blocks, &self.ctx.theme);
        log::debug!(
            "Rendered {} lines, {} matches for {:?}",
            self.lines.len(),
            self.match_count,
            self.ctx.search_text
        );
    }

    fn apply_search(&mut self) {
        self.ctx.search_text = self.search_input.clone();
        self.rerender();
    }

    fn clear_search(&mut self) {
        self.search_input.clear();
        self.apply_search();
    }

    fn scroll_down(&mut self, by: u16) {
        let max = self.lines.len().saturating_sub(1) as u16;
        self.scroll = self.scroll.saturating_add(by).min(max);
    }

    fn scroll_up(&mut self, by: u16) {
        self.scroll = self.scroll.saturating_sub(by);
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let Some(args_parsed) = Args::parse(&args) else {
        eprintln!(
            "Usage: {} <file.md> [--search TERM] [--dump]",
            env!("CARGO_PKG_NAME")
        );
        process::exit(1);
    };

    let config = match Config::load() {
        Ok(Some(config)) => config,
        Ok(None) => Config::default(),
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            eprintln!("Fix or remove {}", Config::config_path().display());
            process::exit(1);
        }
    };

    let document = match io::load_document(&args_parsed.file) {
        Ok(document) => document,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    let mut ctx = config.render_context().with_search_text(args_parsed.search);
    if ctx.base_url.is_none()
        && let Some(base_url) = document_base_url(&args_parsed.file)
    {
        ctx = ctx.with_base_url(base_url);
    }

    if args_parsed.dump {
        print!("{}", describe(&render_document(&document, &ctx)));
        return Ok(());
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(args_parsed.file, document, ctx);

    // Main loop
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

/// Directory URL of the document, so relative links and images resolve next to it.
fn document_base_url(file: &Path) -> Option<Url> {
    let file = file.canonicalize().ok()?;
    Url::from_directory_path(file.parent()?).ok()
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match app.mode {
            Mode::Search => match key.code {
                KeyCode::Enter => {
                    app.mode = Mode::Normal;
                    app.apply_search();
                }
                KeyCode::Esc => {
                    app.mode = Mode::Normal;
                    app.clear_search();
                }
                KeyCode::Backspace => {
                    app.search_input.pop();
                }
                KeyCode::Char(c) => app.search_input.push(c),
                _ => {}
            },
            Mode::Normal => match key.code {
                KeyCode::Char('q') => return Ok(()),
                KeyCode::Char('/') => {
                    app.mode = Mode::Search;
                    app.search_input.clear();
                }
                KeyCode::Esc => app.clear_search(),
                KeyCode::Down | KeyCode::Char('j') => app.scroll_down(1),
                KeyCode::Up | KeyCode::Char('k') => app.scroll_up(1),
                KeyCode::PageDown | KeyCode::Char(' ') => app.scroll_down(20),
                KeyCode::PageUp => app.scroll_up(20),
                KeyCode::Home | KeyCode::Char('g') => app.scroll = 0,
                _ => {}
            },
        }
    }
}

fn ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([Constraint::Min(0), Constraint::Length(1)].as_ref())
        .split(f.area());

    let content = Paragraph::new(app.lines.clone())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(app.file.display().to_string()),
        )
        .wrap(Wrap { trim: false })
        .scroll((app.scroll, 0));

    f.render_widget(content, chunks[0]);

    let status = match app.mode {
        Mode::Search => Line::from(vec![Span::raw("/"), Span::raw(app.search_input.clone())]),
        Mode::Normal if !app.ctx.search_text.is_empty() => Line::from(vec![
            Span::raw(format!("\"{}\": {} matches | ", app.ctx.search_text, app.match_count)),
            Span::raw("Esc: Clear | /: Search | q: Quit"),
        ]),
        Mode::Normal => Line::from(vec![
            Span::raw("q: Quit | "),
            Span::raw("↑/k ↓/j: Scroll | "),
            Span::raw("/: Search"),
        ]),
    };

    f.render_widget(Paragraph::new(status), chunks[1]);
}
