// src/main.rs
use clap::Parser;
use lazy_static::lazy_static;
use regex::Regex;
use std::error::Error;
use std::io::{self, Write};
use std::path::PathBuf;
use thiserror::Error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use chess_rules::{GameState, GameStatus, MoveError, MoveOutcome, Square, SquareParseError, StartingLayout};

lazy_static! {
    // e2e4, e2 e4, e2-e4
    static ref MOVE_INPUT: Regex = Regex::new(r"^([a-hA-H][1-8])\s*-?\s*([a-hA-H][1-8])$").unwrap();
    static ref MOVES_COMMAND: Regex = Regex::new(r"^moves\s+(\S+)$").unwrap();
}

/// Command-line options.
#[derive(Parser, Debug)]
#[command(name = "chess_rules")]
#[command(about = "Two-player chess in the terminal")]
struct Args {
    /// JSON starting layout to play from instead of the standard one.
    #[arg(long)]
    layout: Option<PathBuf>,
}

// --- Input Parsing ---

#[derive(Debug, PartialEq, Eq)]
enum UserInput {
    Move(Square, Square),
    Command(Command),
}

#[derive(Debug, PartialEq, Eq)]
enum Command {
    /// List where the piece on a square may go.
    Moves(Square),
    Help,
    Quit,
}

#[derive(Debug, Error)]
enum CommandError {
    #[error("unknown command '{0}', type 'help' for commands")]
    UnknownCommand(String),
    #[error(transparent)]
    InvalidSquare(#[from] SquareParseError),
    #[error("no piece on {0}")]
    NoPieceAt(Square),
    #[error(transparent)]
    Move(#[from] MoveError),
}

fn parse_user_input(input: &str) -> Result<UserInput, CommandError> {
    let trimmed = input.trim();
    match trimmed.to_lowercase().as_str() {
        "help" | "?" => return Ok(UserInput::Command(Command::Help)),
        "quit" | "exit" => return Ok(UserInput::Command(Command::Quit)),
        _ => {}
    }

    if let Some(caps) = MOVES_COMMAND.captures(trimmed) {
        return Ok(UserInput::Command(Command::Moves(caps[1].parse()?)));
    }
    if let Some(caps) = MOVE_INPUT.captures(trimmed) {
        return Ok(UserInput::Move(caps[1].parse()?, caps[2].parse()?));
    }
    Err(CommandError::UnknownCommand(trimmed.to_string()))
}

// --- Actions ---

fn play(game: &mut GameState, from: Square, to: Square) -> Result<MoveOutcome, CommandError> {
    let id = game.piece_at(from).map(|p| p.id).ok_or(CommandError::NoPieceAt(from))?;
    Ok(game.try_move(id, to)?)
}

fn highlight(game: &mut GameState, from: Square) -> Result<Vec<Square>, CommandError> {
    let id = game.piece_at(from).map(|p| p.id).ok_or(CommandError::NoPieceAt(from))?;
    Ok(game.legal_moves_from(id).into_iter().collect())
}

fn report(game: &GameState, outcome: &MoveOutcome) {
    if let Some(victim) = outcome.captured.and_then(|id| game.piece(id)) {
        println!("{} takes {} on {}.", outcome.from, victim, outcome.to);
    }
    if let Some(castle) = outcome.rook_relocation {
        println!("Castled: rook {} -> {}.", castle.from, castle.to);
    }
}

// --- Main Game Loop ---

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::from_default_env().add_directive("chess_rules=info".parse()?))
        .init();

    let args = Args::parse();
    let mut game = match &args.layout {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading starting layout");
            GameState::from_layout(&StartingLayout::from_path(path)?)?
        }
        None => GameState::new(),
    };

    println!("==============================");
    println!("|        Rust Chess          |");
    println!("==============================");
    print_help();

    'game_loop: loop {
        println!("------------------------------------------");
        println!("{}", game);

        match game.status() {
            GameStatus::Checkmate { loser, winner } => {
                println!("\n=== GAME OVER: {} is checkmated, {} wins. ===", loser, winner);
                break 'game_loop;
            }
            GameStatus::Check(side) => println!("--- {} is in check! ---", side),
            GameStatus::Ongoing => {}
        }

        print!("\n{}'s turn. Enter move (e.g. e2e4) or command: ", game.turn());
        io::stdout().flush()?;

        let mut input_line = String::new();
        match io::stdin().read_line(&mut input_line) {
            Ok(0) => {
                println!("\nEnd of input detected. Quitting game.");
                break 'game_loop;
            }
            Ok(_) => {}
            Err(e) => {
                eprintln!("Error reading input: {}. Try again or use 'quit'.", e);
                continue 'game_loop;
            }
        }

        let input = input_line.trim();
        if input.is_empty() { continue 'game_loop; }

        match parse_user_input(input) {
            Ok(UserInput::Move(from, to)) => match play(&mut game, from, to) {
                Ok(outcome) => report(&game, &outcome),
                Err(e) => println!("Error making move: {}", e),
            },
            Ok(UserInput::Command(Command::Moves(from))) => match highlight(&mut game, from) {
                Ok(squares) if squares.is_empty() => println!("The piece on {} cannot move.", from),
                Ok(squares) => {
                    let names: Vec<String> = squares.iter().map(Square::to_string).collect();
                    println!("{} can move to: {}", from, names.join(" "));
                }
                Err(e) => println!("Error: {}", e),
            },
            Ok(UserInput::Command(Command::Help)) => print_help(),
            Ok(UserInput::Command(Command::Quit)) => {
                println!("Exiting game.");
                break 'game_loop;
            }
            Err(e) => println!("Input Error: {}", e),
        }
    }

    println!("\nGame session finished.");
    Ok(())
}

fn print_help() {
    println!("\nAvailable Commands:");
    println!("  <from><to>     Move a piece, e.g. e2e4, e2 e4 or e2-e4.");
    println!("                 Castle by moving the king two squares, e.g. e1g1.");
    println!("  moves <square> List the squares the piece on <square> can reach.");
    println!("  help           Show this help message.");
    println!("  quit / exit    Leave the game.");
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square { s.parse().unwrap() }

    #[test]
    fn parses_moves_in_several_spellings() {
        for input in ["e2e4", "e2 e4", "e2-e4", "E2E4", "  e2 - e4 "] {
            assert_eq!(parse_user_input(input).unwrap(), UserInput::Move(sq("e2"), sq("e4")), "{input}");
        }
    }

    #[test]
    fn parses_commands() {
        assert_eq!(parse_user_input("moves g1").unwrap(), UserInput::Command(Command::Moves(sq("g1"))));
        assert_eq!(parse_user_input("HELP").unwrap(), UserInput::Command(Command::Help));
        assert_eq!(parse_user_input("exit").unwrap(), UserInput::Command(Command::Quit));
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(parse_user_input("e9e4"), Err(CommandError::UnknownCommand(_))));
        assert!(matches!(parse_user_input("moves z9"), Err(CommandError::InvalidSquare(_))));
        assert!(matches!(parse_user_input("resign"), Err(CommandError::UnknownCommand(_))));
    }

    #[test]
    fn play_and_highlight_go_through_the_rules() {
        let mut game = GameState::new();
        assert_eq!(highlight(&mut game, sq("b1")).unwrap(), vec![sq("a3"), sq("c3")]);
        assert!(matches!(play(&mut game, sq("e4"), sq("e5")), Err(CommandError::NoPieceAt(_))));
        assert!(matches!(
            play(&mut game, sq("e7"), sq("e5")),
            Err(CommandError::Move(MoveError::NotYourTurn { .. }))
        ));
        let outcome = play(&mut game, sq("e2"), sq("e4")).unwrap();
        assert_eq!(outcome.to, sq("e4"));
    }
}
