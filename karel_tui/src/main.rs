use anyhow::{Context, Result};
use clap::Parser;
use karel_core::{
    Position,
    world::{Action, World, WorldConfig},
};
use ratatui::{
    crossterm::{
        self,
        event::{self, Event, KeyCode, KeyEventKind},
        execute,
        terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
    },
    prelude::*,
    widgets::*,
};
use std::{
    fs::File,
    io::{self, Stdout},
    path::{Path, PathBuf},
    time::Duration,
};

#[derive(Parser, Debug)]
#[command(version, about = "Drive Karel the robot around a 10x10 board", long_about = None)]
struct Args {
    /// Write logs to this file (filter with RUST_LOG, default "info")
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Input poll timeout in milliseconds
    #[arg(long, value_name = "MS", default_value_t = 100)]
    tick_rate: u64,
}

struct App {
    /// The robot's world.
    world: World,
    /// Flag to control the main loop.
    should_quit: bool,
}

impl App {
    fn new(world: World) -> Self {
        App {
            world,
            should_quit: false,
        }
    }

    /// Handles a single key press.
    fn on_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.quit(),
            code => {
                // Rejected actions leave the world as it was; the redraw shows it.
                if let Some(action) = key_action(code) {
                    self.world.process_action(action);
                }
            }
        }
    }

    /// Sets the quit flag.
    fn quit(&mut self) {
        self.should_quit = true;
    }
}

/// Maps a key to the robot action it triggers.
fn key_action(code: KeyCode) -> Option<Action> {
    match code {
        KeyCode::Char('w') => Some(Action::Move),
        KeyCode::Char('a') => Some(Action::TurnLeft),
        KeyCode::Char('d') => Some(Action::TurnRight),
        KeyCode::Char('p') => Some(Action::PickBeeper),
        KeyCode::Char('t') => Some(Action::PutBeeper),
        _ => None,
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(path) = &args.log_file {
        init_logging(path)?;
    }

    let world = World::new(WorldConfig::default()).context("Building the default world")?;
    let mut app = App::new(world);

    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, &mut app, Duration::from_millis(args.tick_rate));
    restore_terminal(&mut terminal)?;
    result
}

/// Sends log records to `path`, since the terminal belongs to the UI.
fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Creating log file {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

/// Configures the terminal for TUI interaction.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    let mut stdout = io::stdout();
    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(Into::into)
}

/// Restores the terminal to its original state.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Runs the main loop: draw, poll input, apply at most one action per key press.
fn run_app(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    tick_rate: Duration,
) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|f| ui(f, app))?;

        if crossterm::event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                // Ignore release/repeat events so one press is one action.
                if key.kind == KeyEventKind::Press {
                    app.on_key(key.code);
                }
            }
        }
    }
    log::info!("Quit at {}", app.world.status_line());
    Ok(())
}

/// Renders the user interface.
fn ui(frame: &mut Frame, app: &App) {
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Area for the board
            Constraint::Length(3), // Area for the robot status
            Constraint::Length(2), // Area for help
        ])
        .split(frame.area());

    render_board(frame, main_layout[0], &app.world);

    let status = Paragraph::new(app.world.status_line())
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Karel"));
    frame.render_widget(status, main_layout[1]);

    let help_text = Paragraph::new(
        "w: move  a: turn left  d: turn right  p: pick beeper  t: put beeper  q/Esc: quit",
    )
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::TOP));
    frame.render_widget(help_text, main_layout[2]);
}

/// Glyph pointing the way the robot faces.
fn robot_glyph(direction: karel_core::Direction) -> &'static str {
    match direction {
        karel_core::Direction::North => "^",
        karel_core::Direction::East => ">",
        karel_core::Direction::South => "v",
        karel_core::Direction::West => "<",
    }
}

/// Renders the board, walls, beepers and robot.
///
/// Each cell is one character wide with a separator column between cells, and rows
/// are interleaved with separator rows, so walls can be drawn on the gaps.
fn render_board(frame: &mut Frame, area: Rect, world: &World) {
    let board = world.board();
    let robot = world.robot();
    let wall_style = Style::default().fg(Color::White).bold();
    let grid_style = Style::default().fg(Color::DarkGray);

    let mut lines: Vec<Line> = Vec::with_capacity(board.height() * 2);

    for y in 0..board.height() {
        let mut spans: Vec<Span> = Vec::with_capacity(board.width() * 2);
        for x in 0..board.width() {
            let here = Position { x, y };
            let cell = if robot.position == here {
                Span::styled(
                    robot_glyph(robot.direction),
                    Style::default().fg(Color::Red).bold(),
                )
            } else if world.beeper_index_at(here).is_some() {
                Span::styled("o", Style::default().fg(Color::Green))
            } else {
                Span::styled(".", grid_style)
            };
            spans.push(cell);

            if x + 1 < board.width() {
                if world.wall_blocks(here, karel_core::Direction::East) {
                    spans.push(Span::styled("|", wall_style));
                } else {
                    spans.push(Span::raw(" "));
                }
            }
        }
        lines.push(Line::from(spans));

        if y + 1 < board.height() {
            let gap: Vec<Span> = (0..board.width())
                .flat_map(|x| {
                    let here = Position { x, y };
                    let below = if world.wall_blocks(here, karel_core::Direction::South) {
                        Span::styled("─", wall_style)
                    } else {
                        Span::raw(" ")
                    };
                    let between = if x + 1 < board.width() {
                        Some(Span::raw(" "))
                    } else {
                        None
                    };
                    std::iter::once(below).chain(between)
                })
                .collect();
            lines.push(Line::from(gap));
        }
    }

    let board_paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .title(format!(
                    "Board {}x{} ({} beepers placed)",
                    board.width(),
                    board.height(),
                    world.beepers().len()
                ))
                .borders(Borders::ALL),
        )
        .alignment(Alignment::Center);

    frame.render_widget(board_paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_map_to_actions() {
        assert_eq!(key_action(KeyCode::Char('w')), Some(Action::Move));
        assert_eq!(key_action(KeyCode::Char('a')), Some(Action::TurnLeft));
        assert_eq!(key_action(KeyCode::Char('d')), Some(Action::TurnRight));
        assert_eq!(key_action(KeyCode::Char('p')), Some(Action::PickBeeper));
        assert_eq!(key_action(KeyCode::Char('t')), Some(Action::PutBeeper));
        assert_eq!(key_action(KeyCode::Char('x')), None);
        assert_eq!(key_action(KeyCode::Enter), None);
    }

    #[test]
    fn key_presses_drive_the_world() {
        let mut app = App::new(World::new(WorldConfig::default()).unwrap());
        app.on_key(KeyCode::Char('w'));
        app.on_key(KeyCode::Char('d'));
        assert_eq!(app.world.robot().position, Position { x: 1, y: 0 });
        assert_eq!(app.world.robot().direction, karel_core::Direction::South);
        assert!(!app.should_quit);

        app.on_key(KeyCode::Esc);
        assert!(app.should_quit);
    }

    #[test]
    fn glyph_points_along_facing() {
        let glyphs: Vec<&str> = karel_core::Direction::ALL
            .into_iter()
            .map(robot_glyph)
            .collect();
        assert_eq!(glyphs, ["^", ">", "v", "<"]);
    }
}
