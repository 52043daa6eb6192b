use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};
use time_humanize::{Accuracy, HumanTime, Tense};
use unicode_width::UnicodeWidthStr;

use crate::game::Game;
use crate::grid::Grid;
use crate::matcher::{WordList, WordState};
use crate::session::Phase;

const HORIZONTAL_MARGIN: u16 = 2;
const VERTICAL_MARGIN: u16 = 1;

/// Screen regions for one frame. Computed from the viewport alone so that
/// rendering and mouse hit-testing always agree.
#[derive(Clone, Copy, Debug)]
pub struct ViewLayout {
    pub status: Rect,
    pub board: Rect,
    pub words: Rect,
    pub help: Rect,
}

pub fn view_layout(area: Rect, grid: &Grid, words: &WordList) -> ViewLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    let longest = words
        .entries()
        .iter()
        .map(|e| e.text.width())
        .max()
        .unwrap_or(0);
    let words_width = (longest as u16 + 4).max(12);

    let main = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(words_width)])
        .split(chunks[1]);

    // letters are spaced one column apart, so the board is 2w-1 wide
    let board_width = (grid.width() as u16 * 2).saturating_sub(1).min(main[0].width);
    let board_height = (grid.height() as u16).min(main[0].height);
    let board = Rect::new(
        main[0].x + (main[0].width.saturating_sub(board_width)) / 2,
        main[0].y + (main[0].height.saturating_sub(board_height)) / 2,
        board_width,
        board_height,
    );

    ViewLayout {
        status: chunks[0],
        board,
        words: main[1],
        help: chunks[2],
    }
}

/// Maps a terminal position to grid coordinates. The gap column between two
/// letters resolves to the letter on its left, which keeps diagonal drags
/// from dropping cells.
pub fn hit_test(area: Rect, game: &Game, column: u16, row: u16) -> Option<(usize, usize)> {
    let board = view_layout(area, game.grid(), game.words()).board;

    if column < board.x
        || row < board.y
        || column >= board.x + board.width
        || row >= board.y + board.height
    {
        return None;
    }

    let x = ((column - board.x) / 2) as usize;
    let y = (row - board.y) as usize;

    (x < game.grid().width() && y < game.grid().height()).then_some((x, y))
}

impl Widget for &Game {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let green_bold_style = Style::default().patch(bold_style).fg(Color::Green);
        let dim_style = Style::default().add_modifier(Modifier::DIM);

        let layout = view_layout(area, self.grid(), self.words());

        render_status(self, layout.status, buf);
        render_board(self, layout.board, buf, green_bold_style);
        render_words(self, layout.words, buf, green_bold_style, dim_style);
        render_help(layout.help, buf, dim_style);

        if self.session().phase().is_terminal() {
            render_terminal_overlay(self, area, buf, bold_style);
        }
    }
}

fn render_status(game: &Game, area: Rect, buf: &mut Buffer) {
    let session = game.session();

    let target = game
        .current_word()
        .filter(|e| e.state == WordState::Pending)
        .map(|e| e.text.clone())
        .unwrap_or_else(|| "-".to_string());

    let status = format!(
        "time {}s · word: {} ({:.1}s) · found {}/{} · skipped {} · not in grid {}",
        session.remaining_seconds(),
        target,
        session.word_elapsed_ms() as f64 / 1000.0,
        session.words_found(),
        session.words_in_puzzle(),
        session.words_skipped(),
        session.words_missing(),
    );

    Paragraph::new(Span::styled(
        status,
        Style::default().add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center)
    .render(area, buf);
}

fn render_board(game: &Game, area: Rect, buf: &mut Buffer, green_bold_style: Style) {
    let selected_style = Style::default().fg(Color::Black).bg(Color::Yellow);
    let solved_style = Style::default()
        .fg(Color::Magenta)
        .add_modifier(Modifier::BOLD);
    let complete = game.session().phase() == Phase::Completed;

    let mut lines = Vec::with_capacity(game.grid().height());
    for y in 0..game.grid().height() {
        let mut spans = Vec::with_capacity(game.grid().width() * 2);
        for x in 0..game.grid().width() {
            let letter = game
                .grid()
                .letter(x, y)
                .unwrap_or(' ')
                .to_ascii_uppercase()
                .to_string();

            let style = if complete {
                green_bold_style
            } else if game.is_selected_cell(x, y) {
                selected_style
            } else if game.is_found_cell(x, y) {
                green_bold_style
            } else if game.is_solved_cell(x, y) {
                solved_style
            } else {
                Style::default()
            };

            spans.push(Span::styled(letter, style));
            if x + 1 < game.grid().width() {
                spans.push(Span::raw(" "));
            }
        }
        lines.push(Line::from(spans));
    }

    Paragraph::new(lines).render(area, buf);
}

fn render_words(
    game: &Game,
    area: Rect,
    buf: &mut Buffer,
    green_bold_style: Style,
    dim_style: Style,
) {
    let crossed = Modifier::CROSSED_OUT;
    let current_index = game.session().current_word_index();

    let lines: Vec<Line> = game
        .words()
        .entries()
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let is_target = i == current_index
                && entry.state == WordState::Pending
                && !game.session().is_terminal();
            let marker = if is_target { "▸ " } else { "  " };

            let style = match entry.state {
                WordState::Found => green_bold_style.add_modifier(crossed),
                WordState::Skipped => dim_style.add_modifier(crossed),
                WordState::Missing => Style::default().fg(Color::Red).add_modifier(crossed),
                WordState::Pending if game.is_revealed_word(&entry.text) => Style::default()
                    .fg(Color::Magenta)
                    .add_modifier(crossed),
                WordState::Pending if is_target => Style::default()
                    .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
                WordState::Pending => Style::default(),
            };

            Line::from(vec![
                Span::raw(marker.to_string()),
                Span::styled(entry.text.clone(), style),
            ])
        })
        .collect();

    Paragraph::new(lines)
        .block(Block::default().borders(Borders::LEFT))
        .render(area, buf);
}

fn render_help(area: Rect, buf: &mut Buffer, dim_style: Style) {
    Paragraph::new(Span::styled(
        "trace with the mouse · (s)kip word · not in grid (x) · skip (p)uzzle · re(v)eal · (n)ew · (esc)ape",
        dim_style.add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center)
    .render(area, buf);
}

fn render_terminal_overlay(game: &Game, area: Rect, buf: &mut Buffer, bold_style: Style) {
    let session = game.session();

    let (title, color) = match session.phase() {
        Phase::Completed => ("Puzzle complete!", Color::Green),
        Phase::TimedOut => ("Time's up!", Color::Red),
        Phase::Skipped => ("Puzzle skipped", Color::Yellow),
        _ => return,
    };

    let took = HumanTime::from(session.session_elapsed())
        .to_text_en(Accuracy::Rough, Tense::Present);

    let lines = vec![
        Line::from(Span::styled(title, bold_style.fg(color))),
        Line::from(""),
        Line::from(format!(
            "found {} of {} · skipped {} · not in grid {}",
            session.words_found(),
            session.words_in_puzzle(),
            session.words_skipped(),
            session.words_missing(),
        )),
        Line::from(format!("session lasted {}", took)),
        Line::from(""),
        Line::from(Span::styled(
            "(n) new puzzle · (esc) quit",
            Style::default().add_modifier(Modifier::DIM),
        )),
    ];

    let width = (area.width.saturating_sub(4)).min(48);
    let height = 8.min(area.height);
    let popup = Rect::new(
        area.x + (area.width.saturating_sub(width)) / 2,
        area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    );

    Clear.render(popup, buf);
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL))
        .render(popup, buf);
}
