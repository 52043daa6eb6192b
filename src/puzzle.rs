use crate::grid::{Grid, Orientation};
use itertools::Itertools;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::cmp::Reverse;
use std::fmt;

/// Where a placed word starts and which way it runs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WordPlacement {
    pub word: String,
    pub orientation: Orientation,
    pub x: usize,
    pub y: usize,
}

impl WordPlacement {
    /// Grid positions covered by this placement.
    pub fn positions(&self) -> Vec<(usize, usize)> {
        (0..self.word.chars().count())
            .filter_map(|i| self.orientation.walk(self.x, self.y, i))
            .collect()
    }
}

#[derive(Clone, Debug)]
pub struct PlacementOptions {
    pub width: usize,
    pub height: usize,
    pub orientations: Vec<Orientation>,
    /// Random placement attempts per word before falling back to an
    /// exhaustive scan.
    pub max_attempts: usize,
}

impl Default for PlacementOptions {
    fn default() -> Self {
        Self {
            width: 12,
            height: 12,
            orientations: Orientation::ALL.to_vec(),
            max_attempts: 100,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum GenerateError {
    /// No position in the grid can hold this word.
    NoFit { word: String },
    BadOptions(&'static str),
}

impl fmt::Display for GenerateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerateError::NoFit { word } => {
                write!(f, "no placement found for word '{}'", word)
            }
            GenerateError::BadOptions(msg) => write!(f, "bad placement options: {}", msg),
        }
    }
}

impl std::error::Error for GenerateError {}

/// A generated board: the letter grid plus where each word was placed.
#[derive(Clone, Debug)]
pub struct Puzzle {
    pub grid: Grid,
    pub words: Vec<String>,
    pub placements: Vec<WordPlacement>,
}

/// External boundary for puzzle construction. The session core only ever
/// consumes the produced `Puzzle`; it never calls a provider itself.
pub trait PuzzleProvider {
    fn generate(
        &mut self,
        words: &[String],
        options: &PlacementOptions,
    ) -> Result<Puzzle, GenerateError>;

    /// Recomputes placements for an existing grid, used for the solution
    /// overlay. Words that are not actually in the grid are omitted.
    fn solve(&self, grid: &Grid, words: &[String]) -> Vec<WordPlacement>;
}

/// Random-placement provider: longest words first, random position and
/// orientation with a retry budget, exhaustive scan as a last resort,
/// random letters in the leftover squares.
pub struct RandomPuzzleProvider {
    rng: StdRng,
}

impl RandomPuzzleProvider {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic boards for tests.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn fits(
        board: &[Vec<Option<char>>],
        word: &str,
        x: usize,
        y: usize,
        orientation: Orientation,
    ) -> Option<Vec<(usize, usize)>> {
        let height = board.len();
        let width = board[0].len();
        let mut positions = Vec::with_capacity(word.len());

        for (i, ch) in word.chars().enumerate() {
            let (cx, cy) = orientation.walk(x, y, i)?;
            if cx >= width || cy >= height {
                return None;
            }
            match board[cy][cx] {
                Some(existing) if existing != ch => return None,
                _ => positions.push((cx, cy)),
            }
        }

        Some(positions)
    }

    fn write(board: &mut [Vec<Option<char>>], word: &str, positions: &[(usize, usize)]) {
        for (ch, &(x, y)) in word.chars().zip(positions) {
            board[y][x] = Some(ch);
        }
    }
}

impl Default for RandomPuzzleProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl PuzzleProvider for RandomPuzzleProvider {
    fn generate(
        &mut self,
        words: &[String],
        options: &PlacementOptions,
    ) -> Result<Puzzle, GenerateError> {
        if options.width == 0 || options.height == 0 {
            return Err(GenerateError::BadOptions("grid dimensions must be non-zero"));
        }
        if options.orientations.is_empty() {
            return Err(GenerateError::BadOptions("no orientations allowed"));
        }

        let words: Vec<String> = words
            .iter()
            .map(|w| w.trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .unique()
            .sorted_by_key(|w| Reverse(w.len()))
            .collect();

        let mut board: Vec<Vec<Option<char>>> =
            vec![vec![None; options.width]; options.height];
        let mut placements = Vec::with_capacity(words.len());

        for word in &words {
            let mut placed = None;

            for _ in 0..options.max_attempts {
                let orientation =
                    options.orientations[self.rng.gen_range(0..options.orientations.len())];
                let x = self.rng.gen_range(0..options.width);
                let y = self.rng.gen_range(0..options.height);

                if let Some(positions) = Self::fits(&board, word, x, y, orientation) {
                    placed = Some((x, y, orientation, positions));
                    break;
                }
            }

            // random attempts can miss tight boards; scan everything before
            // giving up
            if placed.is_none() {
                'scan: for &orientation in &options.orientations {
                    for y in 0..options.height {
                        for x in 0..options.width {
                            if let Some(positions) = Self::fits(&board, word, x, y, orientation)
                            {
                                placed = Some((x, y, orientation, positions));
                                break 'scan;
                            }
                        }
                    }
                }
            }

            match placed {
                Some((x, y, orientation, positions)) => {
                    Self::write(&mut board, word, &positions);
                    placements.push(WordPlacement {
                        word: word.clone(),
                        orientation,
                        x,
                        y,
                    });
                }
                None => {
                    return Err(GenerateError::NoFit { word: word.clone() });
                }
            }
        }

        let rows: Vec<Vec<char>> = board
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|slot| {
                        slot.unwrap_or_else(|| (b'a' + self.rng.gen_range(0..26u8)) as char)
                    })
                    .collect()
            })
            .collect();

        let grid =
            Grid::from_rows(rows).ok_or(GenerateError::BadOptions("empty board"))?;

        Ok(Puzzle {
            grid,
            words,
            placements,
        })
    }

    fn solve(&self, grid: &Grid, words: &[String]) -> Vec<WordPlacement> {
        let mut found = Vec::new();

        for word in words {
            let word = word.trim().to_lowercase();
            if word.is_empty() {
                continue;
            }

            'word: for y in 0..grid.height() {
                for x in 0..grid.width() {
                    for orientation in Orientation::ALL {
                        if word.chars().enumerate().all(|(i, ch)| {
                            orientation
                                .walk(x, y, i)
                                .and_then(|(cx, cy)| grid.letter(cx, cy))
                                == Some(ch)
                        }) {
                            found.push(WordPlacement {
                                word: word.clone(),
                                orientation,
                                x,
                                y,
                            });
                            break 'word;
                        }
                    }
                }
            }
        }

        found
    }
}
