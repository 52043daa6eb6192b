use crate::grid::Grid;
use crate::matcher::{WordEntry, WordList, WordState};
use crate::puzzle::{Puzzle, WordPlacement};
use crate::selection::SelectionEngine;
use crate::session::{SessionConfig, SessionController};
use crate::telemetry::TelemetrySink;
use std::collections::HashSet;

/// One puzzle session: the board, its target words, the in-progress
/// gesture, and the lifecycle state machine. All input and timer events
/// funnel through here; the UI only ever reads.
pub struct Game {
    grid: Grid,
    words: WordList,
    selection: SelectionEngine,
    session: SessionController,
    placements: Vec<WordPlacement>,
    found_cells: HashSet<(usize, usize)>,
    solved_cells: HashSet<(usize, usize)>,
    revealed_words: HashSet<String>,
}

impl std::fmt::Debug for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("session", &self.session)
            .field("words", &self.words)
            .finish()
    }
}

impl Game {
    pub fn new(puzzle: Puzzle, config: SessionConfig) -> Self {
        let words = WordList::new(puzzle.words.iter());
        let session = SessionController::new(config, words.pending_count());

        Self {
            grid: puzzle.grid,
            words,
            selection: SelectionEngine::new(),
            session,
            placements: puzzle.placements,
            found_cells: HashSet::new(),
            solved_cells: HashSet::new(),
            revealed_words: HashSet::new(),
        }
    }

    pub fn add_sink(&mut self, sink: Box<dyn TelemetrySink>) {
        self.session.add_sink(sink);
    }

    pub fn start(&mut self) {
        self.session.start();
        if let Some(i) = self.words.next_pending_index(0) {
            self.session.advance_word(i);
        }
    }

    /// Pointer pressed on cell (x, y): a new gesture begins there.
    pub fn on_press(&mut self, x: usize, y: usize) {
        if self.session.is_terminal() {
            return;
        }
        if let Some(cell) = self.grid.cell(x, y) {
            self.selection.start_turn(cell);
        }
    }

    /// Pointer moved onto cell (x, y) mid-gesture.
    pub fn on_move(&mut self, x: usize, y: usize) {
        if self.session.is_terminal() {
            return;
        }
        if let Some(cell) = self.grid.cell(x, y) {
            self.selection.extend(cell, &self.words);
        }
    }

    /// Pointer released: evaluate the traced path against the pending set.
    pub fn on_release(&mut self) {
        let path = self.selection.end_turn();
        if path.is_empty() || self.session.is_terminal() {
            return;
        }

        let text: String = path.iter().map(|c| c.letter).collect();
        if let Some(word) = self.words.commit(&text) {
            for cell in &path {
                self.found_cells.insert((cell.x, cell.y));
            }
            self.session.word_found(&word);
            self.advance_to_next_pending();
        }
    }

    pub fn on_tick(&mut self) {
        self.session.on_tick();
    }

    /// Gives up on the current target word.
    pub fn skip_current_word(&mut self) {
        let Some(text) = self.current_word_text() else {
            return;
        };
        if self.words.skip(&text).is_some() {
            self.session.skip_word(&text);
            self.advance_to_next_pending();
        }
    }

    /// Reports the current target word as absent from the grid.
    pub fn flag_current_missing(&mut self) {
        let Some(text) = self.current_word_text() else {
            return;
        };
        if self.words.flag_missing(&text).is_some() {
            self.session.flag_missing(&text);
            self.advance_to_next_pending();
        }
    }

    pub fn skip_puzzle(&mut self) {
        self.session.skip_puzzle();
    }

    /// Highlights the placements of all still-pending words. Display only:
    /// counters, pending membership and telemetry are untouched.
    pub fn reveal_solution(&mut self) {
        for placement in &self.placements {
            if self.words.state_of(&placement.word) == Some(WordState::Pending)
                && !self.revealed_words.contains(&placement.word)
            {
                self.revealed_words.insert(placement.word.clone());
                self.solved_cells.extend(placement.positions());
            }
        }
    }

    fn current_word_text(&self) -> Option<String> {
        if self.session.is_terminal() {
            return None;
        }
        self.words
            .entries()
            .get(self.session.current_word_index())
            .filter(|e| e.state == WordState::Pending)
            .map(|e| e.text.clone())
    }

    fn advance_to_next_pending(&mut self) {
        if self.session.is_terminal() {
            return;
        }

        let idx = self.session.current_word_index();
        let still_pending = self
            .words
            .entries()
            .get(idx)
            .map_or(false, |e| e.state == WordState::Pending);

        if !still_pending {
            if let Some(i) = self.words.next_pending_index(idx) {
                self.session.advance_word(i);
            }
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn words(&self) -> &WordList {
        &self.words
    }

    pub fn session(&self) -> &SessionController {
        &self.session
    }

    pub fn selection(&self) -> &SelectionEngine {
        &self.selection
    }

    pub fn current_word(&self) -> Option<&WordEntry> {
        self.words.entries().get(self.session.current_word_index())
    }

    pub fn is_selected_cell(&self, x: usize, y: usize) -> bool {
        self.selection.contains(x, y)
    }

    pub fn is_found_cell(&self, x: usize, y: usize) -> bool {
        self.found_cells.contains(&(x, y))
    }

    pub fn is_solved_cell(&self, x: usize, y: usize) -> bool {
        self.solved_cells.contains(&(x, y))
    }

    pub fn is_revealed_word(&self, word: &str) -> bool {
        self.revealed_words.contains(word)
    }

    pub fn has_finished(&self) -> bool {
        self.session.is_terminal()
    }
}
