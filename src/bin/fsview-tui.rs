use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Layout, Rect as UiRect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::{Line, Span};
use ratatui::widgets::canvas::{Canvas, Circle, Points};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::{Frame, Terminal};
use std::io::{self, stdout};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use fsview::canvas::Camera;
use fsview::cli::Args;
use fsview::config::Config;
use fsview::logging::{self, LogTarget};
use fsview::navigation::{NavCommand, Navigator};
use fsview::watch::RootWatcher;

const FRAME_BUDGET: Duration = Duration::from_millis(33);
const LABEL_OFFSET: (f64, f64) = (13.0, -13.0);

/// Braille cells hold 2x4 dots; the camera works in dots.
const DOTS_PER_CELL_X: f32 = 2.0;
const DOTS_PER_CELL_Y: f32 = 4.0;

struct App {
    navigator: Navigator,
    watcher: Option<RootWatcher>,
    status: String,
    should_quit: bool,
}

impl App {
    fn new(navigator: Navigator, watcher: Option<RootWatcher>) -> Self {
        Self {
            navigator,
            watcher,
            status: String::from("Ready"),
            should_quit: false,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && matches!(key.code, KeyCode::Char('c')) {
            self.should_quit = true;
            return;
        }

        let command = match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
                return;
            }
            KeyCode::Char('u') => NavCommand::Rescan,
            KeyCode::Char('x') => NavCommand::Reroot,
            KeyCode::Char('z') => NavCommand::Ascend,
            KeyCode::Char('c') | KeyCode::Down => NavCommand::MoveToChild,
            KeyCode::Char('p') | KeyCode::Up => NavCommand::MoveToParent,
            KeyCode::Char('l') | KeyCode::Left => NavCommand::MovePreviousSibling,
            KeyCode::Char('r') | KeyCode::Right => NavCommand::MoveNextSibling,
            _ => return,
        };
        self.navigator.queue(command);
    }

    fn poll_watcher(&mut self) {
        let Some(watcher) = self.watcher.as_mut() else {
            return;
        };
        if let Err(err) = watcher.rearm(self.navigator.root_path()) {
            warn!(%err, "watch disabled");
            self.status = format!("Watch disabled: {err}");
            self.watcher = None;
            return;
        }
        if watcher.poll_changed() {
            self.navigator.queue(NavCommand::Rescan);
        }
    }
}

fn draw_ui(frame: &mut Frame, app: &App) {
    let rows = Layout::vertical([Constraint::Min(5), Constraint::Length(4)]).split(frame.area());

    let block = Block::default()
        .title(format!(" {} ", app.navigator.root_path().display()))
        .borders(Borders::ALL);
    let inner = block.inner(rows[0]);
    draw_tree(frame, app, block, rows[0], inner);
    draw_status(frame, app, rows[1]);
}

fn draw_tree(frame: &mut Frame, app: &App, block: Block, area: UiRect, inner: UiRect) {
    let camera = Camera::new(
        inner.width as f32 * DOTS_PER_CELL_X,
        inner.height as f32 * DOTS_PER_CELL_Y,
    );
    let (min, max) = camera.visible_world();
    // One braille dot, in world units.
    let dot = 1.0 / camera.zoom.max(f32::EPSILON) as f64;
    let views = app.navigator.views();

    // Canvas y grows upward; world y grows downward.
    let canvas = Canvas::default()
        .block(block)
        .marker(Marker::Braille)
        .x_bounds([min.x as f64, max.x as f64])
        .y_bounds([-(max.y as f64), -(min.y as f64)])
        .paint(|ctx| {
            for view in &views {
                let x = view.position.x as f64;
                let y = -(view.position.y as f64);
                let color = if view.is_dir { Color::Blue } else { Color::Green };
                let radius = view.radius as f64;
                if radius < dot {
                    ctx.draw(&Points {
                        coords: &[(x, y)],
                        color,
                    });
                } else {
                    ctx.draw(&Circle { x, y, radius, color });
                }
                if view.selected {
                    ctx.draw(&Circle {
                        x,
                        y,
                        radius: (radius + 5.0).max(2.0 * dot),
                        color: Color::Red,
                    });
                }
            }

            ctx.layer();
            for view in views.iter().filter(|v| v.show_label) {
                let style = if view.selected {
                    Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::White)
                };
                ctx.print(
                    view.position.x as f64 + LABEL_OFFSET.0,
                    -(view.position.y as f64 + LABEL_OFFSET.1),
                    Span::styled(view.name.to_string(), style),
                );
            }
        });
    frame.render_widget(canvas, area);
}

fn draw_status(frame: &mut Frame, app: &App, area: UiRect) {
    let selected = app
        .navigator
        .selected_node()
        .map(|node| node.path.display().to_string())
        .unwrap_or_else(|| "(none)".to_string());
    let watching = if app.watcher.is_some() { "on" } else { "off" };

    let lines = vec![
        Line::from(vec![
            Span::styled("Selected: ", Style::default().fg(Color::Gray)),
            Span::raw(selected),
        ]),
        Line::from(vec![
            Span::styled("Nodes: ", Style::default().fg(Color::Gray)),
            Span::raw(app.navigator.tree().node_count().to_string()),
            Span::raw("  "),
            Span::styled("Watch: ", Style::default().fg(Color::Gray)),
            Span::raw(watching),
            Span::raw("  "),
            Span::raw(app.status.as_str()),
        ]),
        Line::from("c/p/l/r or arrows: move   x: reroot   z: up   u: rescan   q: quit"),
    ];
    frame.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::TOP)),
        area,
    );
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>, app: &mut App) -> io::Result<()> {
    let mut last_frame = Instant::now();

    loop {
        app.poll_watcher();

        let now = Instant::now();
        let dt = now.duration_since(last_frame).as_secs_f64();
        last_frame = now;
        app.navigator.tick(dt);

        terminal.draw(|frame| draw_ui(frame, app))?;

        if app.should_quit {
            break;
        }

        let timeout = FRAME_BUDGET.saturating_sub(last_frame.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                app.on_key(key);
            }
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let log_target = LogTarget::file_or_default(args.log_file.as_deref(), "fsview-tui.log");
    logging::init(&log_target).context("failed to open log file")?;

    let mut config = Config::resolve(args.config.as_deref()).context("invalid configuration")?;
    args.apply_overrides(&mut config);
    let root: PathBuf = args.root_path().context("failed to resolve root path")?;

    let mut navigator = Navigator::with_config(&root, &config).context("invalid configuration")?;
    navigator.on_target_lost(|path| info!(path = %path.display(), "selection removed from disk"));

    let watcher = if args.watch {
        Some(RootWatcher::new(&root).context("failed to watch root")?)
    } else {
        None
    };
    info!(root = %root.display(), watch = args.watch, "starting");
    let mut app = App::new(navigator, watcher);

    enable_raw_mode()?;
    crossterm::execute!(stdout(), EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let app_result = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    crossterm::execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    app_result.context("terminal error")
}
