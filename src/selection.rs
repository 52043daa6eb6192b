use crate::grid::{Cell, Orientation};
use crate::matcher::WordList;

/// Turns a stream of cell-focus events into a validated selection path.
///
/// A path is anchored at the first pressed cell and may only grow along a
/// single locked orientation. Returning the pointer to an earlier cell
/// truncates the path back to it; returning it next to the anchor re-locks
/// the orientation, which is what makes diagonal words selectable without
/// pixel-perfect first moves. Invalid extensions are ignored, never errors.
#[derive(Debug, Default)]
pub struct SelectionEngine {
    path: Vec<Cell>,
    locked: Option<Orientation>,
}

impl SelectionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begins a new gesture anchored at `cell`. Always succeeds.
    pub fn start_turn(&mut self, cell: Cell) {
        self.path.clear();
        self.path.push(cell);
        self.locked = None;
    }

    /// Feeds a newly focused cell into the current gesture. Does nothing if
    /// no gesture is in progress.
    pub fn extend(&mut self, target: Cell, words: &WordList) {
        let Some(&anchor) = self.path.first() else {
            return;
        };
        let last = *self.path.last().unwrap_or(&anchor);

        if last.x == target.x && last.y == target.y {
            return;
        }

        // backtracking: truncate to the revisited cell, inclusive
        if let Some(i) = self
            .path
            .iter()
            .position(|c| c.x == target.x && c.y == target.y)
        {
            self.path.truncate(i + 1);
            return;
        }

        // a move next to the anchor in a new direction re-locks the path;
        // without this, diagonal starts that brushed a straight neighbor
        // first would be stuck on the wrong orientation
        if let Some(from_anchor) =
            Orientation::between(anchor.x, anchor.y, target.x, target.y)
        {
            if self.locked.is_some() && self.locked != Some(from_anchor) {
                self.path.truncate(1);
                self.locked = Some(from_anchor);
            }
        }

        let last = *self.path.last().unwrap_or(&anchor);
        let Some(step) = Orientation::between(last.x, last.y, target.x, target.y) else {
            return;
        };

        match self.locked {
            None => self.locked = Some(step),
            Some(locked) if locked == step => {}
            Some(_) => return,
        }

        if words.can_extend(&self.word(), target.letter) {
            self.path.push(target);
        }
    }

    /// Ends the gesture, returning the path for evaluation and clearing all
    /// selection state. An empty path is returned as-is.
    pub fn end_turn(&mut self) -> Vec<Cell> {
        self.locked = None;
        std::mem::take(&mut self.path)
    }

    pub fn is_active(&self) -> bool {
        !self.path.is_empty()
    }

    pub fn path(&self) -> &[Cell] {
        &self.path
    }

    pub fn locked_orientation(&self) -> Option<Orientation> {
        self.locked
    }

    /// Concatenated letters of the current path.
    pub fn word(&self) -> String {
        self.path.iter().map(|c| c.letter).collect()
    }

    pub fn contains(&self, x: usize, y: usize) -> bool {
        self.path.iter().any(|c| c.x == x && c.y == y)
    }
}
