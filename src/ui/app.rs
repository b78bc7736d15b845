use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent};
use ratatui::{backend::Backend, Terminal};
use tracing::{debug, info, warn};

use crate::ai::AiTier;
use crate::config::{AppConfig, Difficulty, GameSettings};
use crate::error::MoveError;
use crate::game::{GameOutcome, GravityMode, Opponent, Player};
use crate::session::Session;

pub struct App {
    session: Session,
    /// Settings the setup keys edit; the next game is built from them.
    config: AppConfig,
    ai_delay: Duration,
    /// When the pending computer move becomes due.
    ai_due: Option<Instant>,
    selected_column: usize,
    should_quit: bool,
    message: Option<String>,
}

impl App {
    pub fn new(session: Session, config: AppConfig) -> Self {
        let selected_column = session.state().board().cols() / 2;
        App {
            session,
            ai_delay: config.ai_delay(),
            config,
            ai_due: None,
            selected_column,
            should_quit: false,
            message: None,
        }
    }

    /// Main application loop
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()>
    where
        B::Error: Into<io::Error>,
    {
        loop {
            terminal
                .draw(|f| self.render(f))
                .map_err(Into::<io::Error>::into)?;

            if self.should_quit {
                break;
            }

            self.tick(Instant::now());
            self.handle_events()?;
        }
        Ok(())
    }

    /// Play the computer's move once its delay has elapsed.
    fn tick(&mut self, now: Instant) {
        if !self.session.is_ai_turn() {
            self.ai_due = None;
            return;
        }
        let due = *self.ai_due.get_or_insert(now + self.ai_delay);
        if now < due {
            return;
        }

        self.ai_due = None;
        if let Some(col) = self.session.request_ai_move() {
            debug!(col, "computer moved");
            self.selected_column = col;
            self.announce_outcome();
        }
    }

    /// Handle keyboard events
    fn handle_events(&mut self) -> io::Result<()> {
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                self.handle_key(key);
            }
        }
        Ok(())
    }

    /// Handle key press
    fn handle_key(&mut self, key: KeyEvent) {
        // Clear message on any key press
        self.message = None;

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Left => {
                self.selected_column = self.selected_column.saturating_sub(1);
            }
            KeyCode::Right => {
                let last = self.session.state().board().cols().saturating_sub(1);
                self.selected_column = (self.selected_column + 1).min(last);
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                self.drop_piece();
            }
            KeyCode::Char('r') => {
                self.session.rematch();
                self.ai_due = None;
                self.selected_column = self.session.state().board().cols() / 2;
                self.message = Some("New game started!".to_string());
            }
            KeyCode::Char('d') => self.change_setup(|game| {
                game.difficulty = match game.difficulty {
                    Difficulty::Easy => Difficulty::Normal,
                    Difficulty::Normal => Difficulty::Hard,
                    Difficulty::Hard => Difficulty::Easy,
                };
            }),
            KeyCode::Char('m') => self.change_setup(|game| {
                game.gravity_mode = match game.gravity_mode {
                    GravityMode::Fixed => GravityMode::Reversing,
                    GravityMode::Reversing => GravityMode::Fixed,
                };
            }),
            KeyCode::Char('o') => self.change_setup(|game| {
                game.vs_computer = !game.vs_computer;
            }),
            KeyCode::Char('t') => self.change_setup(|game| {
                game.vs_computer = true;
                game.ai_tier = match game.ai_tier {
                    AiTier::Easy => AiTier::Medium,
                    AiTier::Medium => AiTier::Hard,
                    AiTier::Hard => AiTier::Easy,
                };
            }),
            _ => {}
        }
    }

    /// Edit the game settings and start a new game with them. A rejected
    /// setup leaves both the settings and the current game as they were.
    fn change_setup(&mut self, edit: impl FnOnce(&mut GameSettings)) {
        let previous = self.config.game.clone();
        edit(&mut self.config.game);

        match self.session.reconfigure(self.config.game_config()) {
            Ok(()) => {
                info!(setup = %self.setup_label(), "reconfigured");
                self.ai_due = None;
                self.selected_column = self.session.state().board().cols() / 2;
                self.message = Some(format!("New game: {}", self.setup_label()));
            }
            Err(err) => {
                warn!(%err, "setup rejected");
                self.config.game = previous;
                self.message = Some(format!("Setup rejected: {err}"));
            }
        }
    }

    fn setup_label(&self) -> String {
        let game = &self.config.game;
        let opponent = if game.vs_computer {
            format!("computer ({})", game.ai_tier)
        } else {
            "hot seat".to_string()
        };
        format!("{} board, {} gravity, {opponent}", game.difficulty, game.gravity_mode)
    }

    /// Drop piece in selected column
    fn drop_piece(&mut self) {
        match self.session.play(self.selected_column) {
            Ok(_) => self.announce_outcome(),
            Err(MoveError::ColumnFull(_)) => {
                self.message = Some("Column is full!".to_string());
            }
            Err(MoveError::InvalidColumn { .. }) => {
                self.message = Some("Invalid column!".to_string());
            }
            Err(MoveError::GameOver) => {
                self.message = Some("Game over! Press 'r' for a rematch.".to_string());
            }
            Err(MoveError::OutOfTurn) => {
                self.message = Some("The computer is thinking...".to_string());
            }
        }
    }

    fn announce_outcome(&mut self) {
        let state = self.session.state();
        self.message = state.outcome().map(|outcome| match outcome {
            GameOutcome::Winner(Player::Yellow)
                if matches!(state.opponent(), Opponent::Computer(_)) =>
            {
                "The computer wins!".to_string()
            }
            GameOutcome::Winner(player) => format!("{} wins!", state.player_name(player)),
            GameOutcome::Draw => "It's a draw!".to_string(),
        });
    }

    /// Render the UI
    fn render(&self, frame: &mut ratatui::Frame) {
        super::game_view::render(
            frame,
            self.session.state(),
            self.selected_column,
            &self.message,
            &self.setup_label(),
        );
    }
}
