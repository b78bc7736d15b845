use crate::ai::AI_PLAYER;
use crate::game::{Cell, GameOutcome, GameState, Gravity, GravityMode, Opponent, Player};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn render(
    frame: &mut Frame,
    game_state: &GameState,
    selected_column: usize,
    message: &Option<String>,
    setup: &str,
) {
    let board_height = game_state.board().rows() as u16 + 4;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),         // Header
            Constraint::Min(board_height), // Board
            Constraint::Length(3),         // Message
            Constraint::Length(5),         // Controls
        ])
        .split(frame.area());

    render_header(frame, game_state, chunks[0]);
    render_board(frame, game_state, selected_column, chunks[1]);
    render_message(frame, message, chunks[2]);
    render_controls(frame, game_state, setup, chunks[3]);
}

fn player_color(player: Player) -> Color {
    match player {
        Player::Red => Color::Red,
        Player::Yellow => Color::Yellow,
    }
}

fn mode_label(game_state: &GameState) -> String {
    let mode = match game_state.gravity_mode() {
        GravityMode::Fixed => "Fixed gravity".to_string(),
        GravityMode::Reversing => "Reversing gravity".to_string(),
    };
    match game_state.opponent() {
        Opponent::Human => format!("{mode}  |  Hot seat"),
        Opponent::Computer(tier) => format!("{mode}  |  vs Computer ({tier})"),
    }
}

fn render_header(frame: &mut Frame, game_state: &GameState, area: Rect) {
    let current = game_state.current_player();
    let arrow = match game_state.gravity() {
        Gravity::Down => "▼",
        Gravity::Up => "▲",
    };

    let (status, color) = match game_state.outcome() {
        Some(GameOutcome::Winner(winner)) => (
            format!("{} wins", game_state.player_name(winner)),
            player_color(winner),
        ),
        Some(GameOutcome::Draw) => ("Draw".to_string(), Color::White),
        None if game_state.is_ai_turn() => (
            "Computer is thinking".to_string(),
            player_color(AI_PLAYER),
        ),
        None => (
            format!("To move: {}", game_state.player_name(current)),
            player_color(current),
        ),
    };

    let header = Paragraph::new(format!(
        "{status}  |  Gravity {arrow}  |  Turn {}  |  {}",
        game_state.turn_count(),
        mode_label(game_state)
    ))
    .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title("Gravity Connect Four"),
    );

    frame.render_widget(header, area);
}

/// Row of drop markers on the side pieces enter from.
fn indicator_line(cols: usize, selected_column: usize, symbol: &'static str) -> Line<'static> {
    let mut spans = vec![Span::raw("   ")];
    for col in 0..cols {
        if col == selected_column {
            spans.push(Span::styled(symbol, Style::default().fg(Color::Cyan)));
        } else {
            spans.push(Span::raw("   "));
        }
    }
    spans.push(Span::raw("  "));
    Line::from(spans)
}

fn render_board(frame: &mut Frame, game_state: &GameState, selected_column: usize, area: Rect) {
    let board = game_state.board();
    let (rows, cols) = (board.rows(), board.cols());
    let winning = game_state.winning_line();
    let last_move = game_state.last_move();
    let border = "═".repeat(cols * 3 + 1);

    let mut lines = Vec::with_capacity(rows + 4);

    // Column numbers with selection indicator
    let mut col_line = vec![Span::raw("   ")];
    for col in 0..cols {
        let label = format!("{:^3}", col + 1);
        if col == selected_column {
            col_line.push(Span::styled(
                label,
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            ));
        } else {
            col_line.push(Span::raw(label));
        }
    }
    col_line.push(Span::raw("  "));
    lines.push(Line::from(col_line));

    if game_state.gravity() == Gravity::Down {
        lines.push(indicator_line(cols, selected_column, " ▼ "));
    }
    lines.push(Line::from(format!("  ╔{border}╗")));

    for row in 0..rows {
        let mut row_spans = vec![Span::raw("  ║")];
        for col in 0..cols {
            let (symbol, color) = match board.get(row, col) {
                Cell::Empty => (" . ", Color::DarkGray),
                Cell::Red => (" ● ", Color::Red),
                Cell::Yellow => (" ● ", Color::Yellow),
            };
            let mut style = Style::default().fg(color);
            if winning.is_some_and(|line| line.contains(&(row, col))) {
                style = style.add_modifier(Modifier::BOLD | Modifier::REVERSED);
            } else if last_move == Some((row, col)) {
                style = style.add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
            }
            row_spans.push(Span::styled(symbol, style));
        }
        row_spans.push(Span::raw(" ║"));
        lines.push(Line::from(row_spans));
    }

    lines.push(Line::from(format!("  ╚{border}╝")));
    if game_state.gravity() == Gravity::Up {
        lines.push(indicator_line(cols, selected_column, " ▲ "));
    }

    let board_widget = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(board_widget, area);
}

fn render_message(frame: &mut Frame, message: &Option<String>, area: Rect) {
    let text = message.as_deref().unwrap_or("");
    let msg_widget = Paragraph::new(text)
        .style(Style::default().fg(Color::Yellow))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(msg_widget, area);
}

fn render_controls(frame: &mut Frame, game_state: &GameState, setup: &str, area: Rect) {
    let line1 = Line::from("←/→: Move  |  Enter/Space: Drop  |  R: Rematch  |  Q: Quit");
    let setup_line = Line::from(vec![
        Span::raw("D: Board  M: Gravity  O: Opponent  T: AI tier  |  "),
        Span::styled(setup.to_string(), Style::default().fg(Color::Cyan)),
    ]);
    let line2 = Line::from(vec![
        Span::styled(
            game_state.player_name(Player::Red).to_string(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  vs  "),
        Span::styled(
            game_state.player_name(Player::Yellow).to_string(),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
    ]);

    let controls = Paragraph::new(vec![line1, setup_line, line2])
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Controls"),
        );

    frame.render_widget(controls, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GameConfig;
    use ratatui::{backend::TestBackend, Terminal};

    fn draw(state: &GameState, selected: usize) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal
            .draw(|f| {
                render(
                    f,
                    state,
                    selected,
                    &Some("hello".to_string()),
                    "easy board, fixed gravity, hot seat",
                )
            })
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_render_shows_header_and_message() {
        let state = GameState::initial();
        let screen = draw(&state, 3);
        assert!(screen.contains("Gravity Connect Four"));
        assert!(screen.contains("To move: Player 1"));
        assert!(screen.contains("hello"));
        assert!(screen.contains("▼"));
        assert!(screen.contains("easy board, fixed gravity, hot seat"));
    }

    #[test]
    fn test_render_wide_board() {
        let config = GameConfig {
            rows: 8,
            cols: 10,
            ..GameConfig::default()
        };
        let state = GameState::new(&config).unwrap();
        let screen = draw(&state, 9);
        assert!(screen.contains("10"));
    }
}
