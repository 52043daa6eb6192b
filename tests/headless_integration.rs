use std::sync::mpsc;
use std::time::Duration;

use wordsweep::game::Game;
use wordsweep::grid::{Grid, Orientation};
use wordsweep::matcher::WordState;
use wordsweep::puzzle::{Puzzle, WordPlacement};
use wordsweep::runtime::{Event, FixedTicker, Runner, TestEventSource};
use wordsweep::session::{Phase, SessionConfig};
use wordsweep::telemetry::MemorySink;

// Headless integration using the internal runtime + Game without a TTY.
// Gesture events carry grid coordinates directly in this harness; the
// terminal-position mapping is covered by the ui hit_test tests.

// c a t
// d o g
fn puzzle() -> Puzzle {
    let grid = Grid::from_rows(vec![vec!['c', 'a', 't'], vec!['d', 'o', 'g']]).unwrap();

    Puzzle {
        grid,
        words: vec!["cat".to_string(), "dog".to_string()],
        placements: vec![
            WordPlacement {
                word: "cat".to_string(),
                orientation: Orientation::East,
                x: 0,
                y: 0,
            },
            WordPlacement {
                word: "dog".to_string(),
                orientation: Orientation::East,
                x: 0,
                y: 1,
            },
        ],
    }
}

fn session_config(seconds: u64) -> SessionConfig {
    SessionConfig {
        user: "headless".to_string(),
        puzzle: "p1".to_string(),
        seconds,
    }
}

fn drive(game: &mut Game, runner: &Runner<TestEventSource, FixedTicker>, max_steps: u32) {
    for _ in 0..max_steps {
        match runner.step() {
            Event::Tick => game.on_tick(),
            Event::Press(x, y) => game.on_press(x as usize, y as usize),
            Event::Move(x, y) => game.on_move(x as usize, y as usize),
            Event::Release => game.on_release(),
            Event::Key(_) | Event::Resize => {}
        }

        if game.has_finished() {
            break;
        }
    }
}

#[test]
fn headless_find_all_words_completes() {
    let sink = MemorySink::new();
    let terminals = sink.terminal_handle();
    let words = sink.word_handle();

    let mut game = Game::new(puzzle(), session_config(60));
    game.add_sink(Box::new(sink));
    game.start();

    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(5)),
    );

    // trace "cat" along the top row, then "dog" along the second
    for ev in [
        Event::Press(0, 0),
        Event::Move(1, 0),
        Event::Move(2, 0),
        Event::Release,
        Event::Press(0, 1),
        Event::Move(1, 1),
        Event::Move(2, 1),
        Event::Release,
    ] {
        tx.send(ev).unwrap();
    }

    drive(&mut game, &runner, 100);

    assert!(game.has_finished(), "all words traced, session should end");
    assert_eq!(game.session().phase(), Phase::Completed);
    assert_eq!(game.session().words_found(), 2);
    assert_eq!(game.words().state_of("cat"), Some(WordState::Found));
    assert_eq!(game.words().state_of("dog"), Some(WordState::Found));

    assert_eq!(terminals.borrow().len(), 1);
    assert_eq!(terminals.borrow()[0].words_found, 2);
    assert_eq!(terminals.borrow()[0].total_words_left, 0);
    assert_eq!(words.borrow().len(), 2);
}

#[test]
fn headless_session_times_out() {
    let sink = MemorySink::new();
    let terminals = sink.terminal_handle();

    let mut game = Game::new(puzzle(), session_config(1));
    game.add_sink(Box::new(sink));
    game.start();

    let (_tx, rx) = mpsc::channel();
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(1)),
    );

    // with no input every step is a tick; one second of sub-ticks runs the
    // countdown dry
    drive(&mut game, &runner, 1000);

    assert_eq!(game.session().phase(), Phase::TimedOut);
    let records = terminals.borrow();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].time, 0);
    assert_eq!(records[0].words_found, 0);
}

#[test]
fn headless_skip_word_then_puzzle() {
    let sink = MemorySink::new();
    let terminals = sink.terminal_handle();
    let words = sink.word_handle();

    let mut game = Game::new(puzzle(), session_config(60));
    game.add_sink(Box::new(sink));
    game.start();

    game.skip_current_word();
    game.skip_puzzle();

    // late events after the terminal transition change nothing
    game.on_press(0, 0);
    game.on_move(1, 0);
    game.on_release();
    for _ in 0..50 {
        game.on_tick();
    }

    assert_eq!(game.session().phase(), Phase::Skipped);
    assert_eq!(game.session().words_skipped(), 1);

    let word_records = words.borrow();
    assert_eq!(word_records.len(), 1);
    assert_eq!(word_records[0].skipped, 1);
    assert_eq!(word_records[0].word, "cat");

    let records = terminals.borrow();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].puzzle_skipped, 1);
    assert_eq!(records[0].words_skipped, 1);
}

#[test]
fn headless_backtracked_gesture_still_commits() {
    let mut game = Game::new(puzzle(), session_config(60));
    game.start();

    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(5)),
    );

    // wander to the end of "cat", back up to the anchor, retrace, release
    for ev in [
        Event::Press(0, 0),
        Event::Move(1, 0),
        Event::Move(2, 0),
        Event::Move(1, 0),
        Event::Move(0, 0),
        Event::Move(1, 0),
        Event::Move(2, 0),
        Event::Release,
    ] {
        tx.send(ev).unwrap();
    }

    drive(&mut game, &runner, 100);

    assert_eq!(game.session().words_found(), 1);
    assert_eq!(game.words().state_of("cat"), Some(WordState::Found));
}
