use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::Rect,
    Frame, Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    time::Duration,
};

use wordsweep::{
    config::{Config, ConfigStore, FileConfigStore},
    game::Game,
    puzzle::{PlacementOptions, PuzzleProvider, RandomPuzzleProvider},
    runtime::{CrosstermEventSource, Event, FixedTicker, Runner},
    session::SessionConfig,
    telemetry::{CsvSink, SqliteSink},
    ui,
    wordbank::WordBank,
    TICK_RATE_MS,
};

/// interactive word-search puzzle for the terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A word-search TUI: trace hidden words on a letter grid with the mouse before the clock runs out. Session results and per-word timings are recorded locally."
)]
pub struct Cli {
    /// number of seconds on the countdown clock
    #[clap(short = 's', long)]
    number_of_secs: Option<u64>,

    /// number of words hidden in the puzzle
    #[clap(short = 'w', long)]
    number_of_words: Option<usize>,

    /// grid width in cells
    #[clap(long)]
    grid_width: Option<usize>,

    /// grid height in cells
    #[clap(long)]
    grid_height: Option<usize>,

    /// word bank to draw puzzle words from
    #[clap(short = 'b', long)]
    wordbank: Option<String>,

    /// explicit puzzle word, repeatable; overrides the word bank
    #[clap(long = "word")]
    words: Vec<String>,

    /// user identifier attached to telemetry records
    #[clap(long, default_value = "anon")]
    uid: String,

    /// puzzle identifier attached to telemetry records
    #[clap(long, default_value = "local")]
    pid: String,

    /// random seed for reproducible boards
    #[clap(long)]
    seed: Option<u64>,

    /// do not persist telemetry records
    #[clap(long)]
    no_telemetry: bool,

    /// list embedded word banks and exit
    #[clap(long)]
    list_banks: bool,
}

fn merge_config(mut config: Config, cli: &Cli) -> Config {
    if let Some(secs) = cli.number_of_secs {
        config.number_of_secs = secs;
    }
    if let Some(words) = cli.number_of_words {
        config.number_of_words = words;
    }
    if let Some(width) = cli.grid_width {
        config.grid_width = width;
    }
    if let Some(height) = cli.grid_height {
        config.grid_height = height;
    }
    if let Some(ref bank) = cli.wordbank {
        config.wordbank = bank.clone();
    }
    config
}

fn build_game(cli: &Cli, config: &Config) -> Result<Game, Box<dyn Error>> {
    let mut provider = match cli.seed {
        Some(seed) => RandomPuzzleProvider::seeded(seed),
        None => RandomPuzzleProvider::new(),
    };

    let options = PlacementOptions {
        width: config.grid_width,
        height: config.grid_height,
        ..PlacementOptions::default()
    };

    let words = if cli.words.is_empty() {
        let bank = WordBank::named(&config.wordbank)?;
        let max_len = config.grid_width.max(config.grid_height);
        let mut rng = match cli.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        bank.sample(config.number_of_words, max_len, &mut rng)
    } else {
        cli.words.clone()
    };

    let puzzle = provider.generate(&words, &options)?;

    let mut game = Game::new(
        puzzle,
        SessionConfig {
            user: cli.uid.clone(),
            puzzle: cli.pid.clone(),
            seconds: config.number_of_secs,
        },
    );

    if !cli.no_telemetry {
        if let Ok(sink) = SqliteSink::new() {
            game.add_sink(Box::new(sink));
        }
        game.add_sink(Box::new(CsvSink::new()));
    }

    game.start();
    Ok(game)
}

#[derive(Debug)]
pub struct App {
    pub cli: Option<Cli>,
    pub config: Config,
    pub game: Game,
    pub viewport: Rect,
}

impl App {
    pub fn new(cli: Cli) -> Result<Self, Box<dyn Error>> {
        let config = merge_config(FileConfigStore::new().load(), &cli);
        let game = build_game(&cli, &config)?;

        Ok(Self {
            cli: Some(cli),
            config,
            game,
            viewport: Rect::default(),
        })
    }

    /// Fresh board, fresh word set, fresh session.
    pub fn reset(&mut self) -> Result<(), Box<dyn Error>> {
        let cli = self.cli.clone().unwrap();
        self.game = build_game(&cli, &self.config)?;
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if cli.list_banks {
        for name in WordBank::names() {
            println!("{name}");
        }
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let mut app = App::new(cli)?;

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res
}

#[derive(Debug)]
enum ExitType {
    New,
    Quit,
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );

    loop {
        let mut exit_type = ExitType::Quit;
        terminal.draw(|f| draw_frame(app, f))?;

        loop {
            match runner.step() {
                Event::Tick => {
                    if !app.game.has_finished() {
                        app.game.on_tick();
                        terminal.draw(|f| draw_frame(app, f))?;
                    }
                }
                Event::Resize => {
                    terminal.draw(|f| draw_frame(app, f))?;
                }
                Event::Press(column, row) => {
                    if let Some((x, y)) = ui::hit_test(app.viewport, &app.game, column, row) {
                        app.game.on_press(x, y);
                    }
                    terminal.draw(|f| draw_frame(app, f))?;
                }
                Event::Move(column, row) => {
                    if let Some((x, y)) = ui::hit_test(app.viewport, &app.game, column, row) {
                        app.game.on_move(x, y);
                    }
                    terminal.draw(|f| draw_frame(app, f))?;
                }
                Event::Release => {
                    app.game.on_release();
                    terminal.draw(|f| draw_frame(app, f))?;
                }
                Event::Key(key) => {
                    match key.code {
                        KeyCode::Esc => {
                            break;
                        }
                        KeyCode::Char(c) => {
                            if key.modifiers.contains(KeyModifiers::CONTROL) && c == 'c' {
                                break;
                            }

                            match c {
                                's' => app.game.skip_current_word(),
                                'x' => app.game.flag_current_missing(),
                                'p' => app.game.skip_puzzle(),
                                'v' => app.game.reveal_solution(),
                                'n' => {
                                    if app.game.has_finished() {
                                        exit_type = ExitType::New;
                                        break;
                                    }
                                }
                                _ => {}
                            }
                        }
                        _ => {}
                    }
                    terminal.draw(|f| draw_frame(app, f))?;
                }
            }
        }

        match exit_type {
            ExitType::New => {
                app.reset()?;
            }
            ExitType::Quit => {
                break;
            }
        }
    }

    Ok(())
}

fn draw_frame(app: &mut App, f: &mut Frame) {
    app.viewport = f.area();
    f.render_widget(&app.game, f.area());
}
