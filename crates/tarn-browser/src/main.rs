//! tarn-browser: terminal scene browser for tarn projects.
//!
//! Lists the `.tscene` files of a scenes directory with their header
//! metadata, and shows the actor table of the selected scene.
//!
//! Run with: `cargo run -p tarn-browser -- Assets/Scenes`

use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use tarn::scene::file::SceneFile;
use tarn::scene_manager::{SceneManager, SceneMeta};

// ── App state ────────────────────────────────────────────────────────────

struct App {
    dir: PathBuf,
    scenes: Vec<SceneMeta>,
    cursor: usize,
    /// Parsed body of the selected scene, or the error that stopped it.
    detail: Result<SceneFile, String>,
}

impl App {
    fn new(dir: PathBuf) -> Self {
        let mut app = Self {
            dir,
            scenes: Vec::new(),
            cursor: 0,
            detail: Err(String::new()),
        };
        app.refresh();
        app
    }

    fn refresh(&mut self) {
        self.scenes = SceneManager::list_scenes_meta(&self.dir);
        log::debug!("{} scene(s) in {}", self.scenes.len(), self.dir.display());
        if self.cursor >= self.scenes.len() {
            self.cursor = self.scenes.len().saturating_sub(1);
        }
        self.load_detail();
    }

    fn load_detail(&mut self) {
        self.detail = match self.scenes.get(self.cursor) {
            None => Err("no scene selected".to_owned()),
            Some(meta) => fs::read_to_string(&meta.path)
                .map_err(|e| e.to_string())
                .and_then(|text| serde_json::from_str::<SceneFile>(&text).map_err(|e| e.to_string())),
        };
    }

    fn select(&mut self, cursor: usize) {
        if cursor < self.scenes.len() && cursor != self.cursor {
            self.cursor = cursor;
            self.load_detail();
        }
    }
}

fn main() -> io::Result<()> {
    env_logger::init();

    let dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("Assets/Scenes"));
    let mut app = App::new(dir);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    loop {
        terminal.draw(|f| ui(f, &app))?;

        if event::poll(Duration::from_millis(250))?
            && let Event::Key(key) = event::read()?
            && handle_key(&mut app, key)
        {
            break;
        }
    }

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

// ── Key handling ─────────────────────────────────────────────────────────

/// Returns `true` if the app should quit.
fn handle_key(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return true,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return true,
        KeyCode::Up | KeyCode::Char('k') => app.select(app.cursor.saturating_sub(1)),
        KeyCode::Down | KeyCode::Char('j') => app.select(app.cursor + 1),
        KeyCode::Home => app.select(0),
        KeyCode::End => app.select(app.scenes.len().saturating_sub(1)),
        KeyCode::Char('r') => app.refresh(),
        _ => {}
    }
    false
}

// ── Drawing ──────────────────────────────────────────────────────────────

fn ui(f: &mut ratatui::Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // header
            Constraint::Min(6),    // content
            Constraint::Length(1), // help bar
        ])
        .split(f.area());

    draw_header(f, app, chunks[0]);

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(chunks[1]);
    draw_scene_list(f, app, panes[0]);
    draw_scene_detail(f, app, panes[1]);

    draw_help_bar(f, chunks[2]);
}

fn draw_header(f: &mut ratatui::Frame, app: &App, area: Rect) {
    let text = Line::from(vec![
        Span::styled("Dir: ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.dir.display().to_string(), Style::default().fg(Color::White)),
        Span::raw("  |  "),
        Span::styled("Scenes: ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!("{}", app.scenes.len()),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
    ]);

    let block = Block::default()
        .title(" tarn-browser ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    f.render_widget(Paragraph::new(text).block(block), area);
}

fn draw_scene_list(f: &mut ratatui::Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Scenes ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    if app.scenes.is_empty() {
        let empty = Paragraph::new(Line::from(Span::styled(
            " no .tscene files found",
            Style::default().fg(Color::DarkGray),
        )))
        .block(block);
        f.render_widget(empty, area);
        return;
    }

    // Keep the cursor inside the visible window.
    let visible = area.height.saturating_sub(2) as usize;
    let scroll = app.cursor.saturating_sub(visible.saturating_sub(1));

    let lines: Vec<Line> = app
        .scenes
        .iter()
        .enumerate()
        .skip(scroll)
        .take(visible)
        .map(|(i, meta)| {
            let selected = i == app.cursor;
            let marker = if selected { "\u{25b6} " } else { "  " };
            let name_style = if selected {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            Line::from(vec![
                Span::styled(marker, Style::default().fg(Color::Cyan)),
                Span::styled(meta.file_name.clone(), name_style),
                Span::styled(format!("  ({} actors)", meta.actor_count), Style::default().fg(Color::DarkGray)),
            ])
        })
        .collect();

    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_scene_detail(f: &mut ratatui::Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Detail ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let Some(meta) = app.scenes.get(app.cursor) else {
        f.render_widget(Paragraph::new("").block(block), area);
        return;
    };

    let label = Style::default().fg(Color::DarkGray);
    let mut lines = vec![
        Line::from(vec![Span::styled("Name:      ", label), Span::raw(meta.name.clone())]),
        Line::from(vec![
            Span::styled("Modified:  ", label),
            Span::raw(if meta.last_modified.is_empty() { "-".to_owned() } else { meta.last_modified.clone() }),
        ]),
        Line::from(vec![
            Span::styled("Thumbnail: ", label),
            Span::raw(if meta.thumbnail.is_empty() { "-".to_owned() } else { meta.thumbnail.clone() }),
        ]),
        Line::from(""),
    ];

    match &app.detail {
        Err(err) => lines.push(Line::from(Span::styled(
            format!("unreadable: {err}"),
            Style::default().fg(Color::Red),
        ))),
        Ok(file) => {
            lines.push(Line::from(Span::styled(
                format!(" {:>4}  {:<18} {:<14} {:>6}  position", "id", "name", "type", "comps"),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )));
            for actor in &file.actors {
                let p = &actor.position;
                lines.push(Line::from(format!(
                    " {:>4}  {:<18} {:<14} {:>6}  ({:.2}, {:.2}, {:.2})",
                    actor.id.raw(),
                    truncate(&actor.name, 18),
                    truncate(&actor.type_name, 14),
                    actor.components.len(),
                    p.x,
                    p.y,
                    p.z,
                )));
            }
            if file.actors.len() != file.actor_count {
                lines.push(Line::from(Span::styled(
                    format!("header says {} actors, body has {}", file.actor_count, file.actors.len()),
                    Style::default().fg(Color::Yellow),
                )));
            }
        }
    }

    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_help_bar(f: &mut ratatui::Frame, area: Rect) {
    let help = Line::from(vec![
        Span::styled(" [\u{2191}\u{2193}]", Style::default().fg(Color::Cyan)),
        Span::raw(" navigate  "),
        Span::styled("[r]", Style::default().fg(Color::Cyan)),
        Span::raw(" refresh  "),
        Span::styled("[q]", Style::default().fg(Color::Cyan)),
        Span::raw(" quit"),
    ]);
    f.render_widget(Paragraph::new(help), area);
}

// ── Helpers ──────────────────────────────────────────────────────────────

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_owned()
    } else {
        let mut out: String = s.chars().take(max_chars.saturating_sub(1)).collect();
        out.push('\u{2026}');
        out
    }
}
