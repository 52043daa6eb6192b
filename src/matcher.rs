use itertools::Itertools;

/// Lifecycle of one target word within a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WordState {
    Pending,
    Found,
    Skipped,
    /// Reported by the user as absent from the grid.
    Missing,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WordEntry {
    pub text: String,
    pub state: WordState,
}

/// The session's target words. Entries change state but are never removed,
/// so the original intake order stays auditable.
#[derive(Clone, Debug, Default)]
pub struct WordList {
    entries: Vec<WordEntry>,
}

impl WordList {
    /// Lowercases, drops empties, sorts and dedups the intake.
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entries = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .sorted()
            .dedup()
            .map(|text| WordEntry {
                text,
                state: WordState::Pending,
            })
            .collect();

        Self { entries }
    }

    pub fn entries(&self) -> &[WordEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn pending(&self) -> impl Iterator<Item = &WordEntry> {
        self.entries
            .iter()
            .filter(|e| e.state == WordState::Pending)
    }

    pub fn pending_count(&self) -> usize {
        self.pending().count()
    }

    pub fn state_of(&self, text: &str) -> Option<WordState> {
        self.entries
            .iter()
            .find(|e| e.text == text)
            .map(|e| e.state)
    }

    /// True iff `current + letter` is a positional prefix of at least one
    /// pending word. The selection engine uses this to refuse extensions
    /// that can never complete a word.
    pub fn can_extend(&self, current: &str, letter: char) -> bool {
        let mut candidate = String::with_capacity(current.len() + 1);
        candidate.push_str(current);
        candidate.push(letter);

        self.pending().any(|e| e.text.starts_with(&candidate))
    }

    /// Exact-match commit. Transitions the matching pending entry to Found
    /// and returns its text; most committed paths match nothing, which is
    /// not an error.
    pub fn commit(&mut self, text: &str) -> Option<String> {
        self.transition(text, WordState::Found)
    }

    pub fn skip(&mut self, text: &str) -> Option<String> {
        self.transition(text, WordState::Skipped)
    }

    pub fn flag_missing(&mut self, text: &str) -> Option<String> {
        self.transition(text, WordState::Missing)
    }

    fn transition(&mut self, text: &str, to: WordState) -> Option<String> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.state == WordState::Pending && e.text == text)?;

        entry.state = to;
        Some(entry.text.clone())
    }

    /// Index of the next pending entry at or after `from`, wrapping around.
    pub fn next_pending_index(&self, from: usize) -> Option<usize> {
        let n = self.entries.len();
        if n == 0 {
            return None;
        }

        (0..n)
            .map(|i| (from + i) % n)
            .find(|&i| self.entries[i].state == WordState::Pending)
    }
}
