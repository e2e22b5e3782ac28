//! Play random games and check the rules engine's laws after every turn.
//!
//! Checks, per turn:
//! - occupancy invariants
//! - notation round-trip reproduces the exact layout
//! - every single-segment plan undoes exactly
//! - every so often, the split laws for the player to move
//!
//! Usage: verify [--games N] [--turns N] [--seed N] [--team]

use std::collections::HashSet;
use std::env;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tac_core::{Board, Player, Position, SplitRules, Zone, SPLIT_BUDGET};
use tac_tools::stats::WalkStats;
use tac_tools::walk::{Walker, CARD_COUNTS};
use tac_tools::{clock, flag_value};

/// Check split laws on every this many turns.
const SPLIT_CHECK_INTERVAL: u64 = 16;

fn check_board(board: &Board) -> Result<(), String> {
    board.check_invariants().map_err(|e| e.to_string())?;

    let text = board.to_string();
    let parsed: Board = text.parse().map_err(|e| format!("{text}: {e}"))?;
    if parsed.layout() != board.layout() {
        return Err(format!("round-trip changed the layout of {text}"));
    }
    Ok(())
}

fn check_undo(board: &mut Board) -> Result<(), String> {
    let before = board.layout();
    let in_play: Vec<Position> = board
        .pieces()
        .filter(|&(_, pos, _)| pos.zone() != Zone::Yard)
        .map(|(_, pos, _)| pos)
        .collect();

    for from in in_play {
        for count in CARD_COUNTS.into_iter().chain([SPLIT_BUDGET as i8]) {
            let Some(plan) = board.plan_move(from, count, false) else {
                continue;
            };
            let undo = board.apply_move(plan, true);
            board.undo(&undo);
            if board.layout() != before {
                return Err(format!("undo of {plan:?} did not restore {board}"));
            }
        }
    }
    Ok(())
}

fn check_splits(board: &mut Board, player: Player, rules: SplitRules) -> Result<usize, String> {
    let before = board.layout();
    let found = board.splits_for(player, rules);
    if board.layout() != before {
        return Err(format!("split generation disturbed {board}"));
    }

    let mut seen = HashSet::new();
    for dist in &found {
        if dist.total_steps() != SPLIT_BUDGET as i32 {
            return Err(format!("{dist} does not spend {SPLIT_BUDGET} steps"));
        }
        let mut replay = board.clone();
        if !replay.apply_distribution(dist) {
            return Err(format!("{dist} does not replay on {board}"));
        }
        if !seen.insert(replay.arrangement()) {
            return Err(format!("{dist} duplicates another distribution on {board}"));
        }
    }
    Ok(found.len())
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let games: u64 = flag_value(&args, "--games", 100);
    let max_turns: u64 = flag_value(&args, "--turns", 2000);
    let seed: u64 = flag_value(&args, "--seed", 1);
    let rules = SplitRules {
        team_moves: args.contains(&"--team".to_string()),
        ..SplitRules::default()
    };

    println!("Rules Engine Verifier");
    println!("=====================");
    println!(
        "Games: {}  Turn limit: {}  Seed: {}  Team splits: {}",
        games, max_turns, seed, rules.team_moves
    );
    println!();

    // Set up SIGINT handler for graceful shutdown
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        println!("\n\nInterrupt received, finishing current turn...");
        r.store(false, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl-C handler");

    let log_interval_secs = 5;
    let start = Instant::now();
    let mut walker = Walker::new(seed, rules);
    let mut stats = WalkStats::new();
    let mut max_splits = 0usize;

    'games: for game in 0..games {
        let mut board = Board::new();
        let mut player = Player::ALL[(game % 4) as usize];
        let mut winner = None;

        for _ in 0..max_turns {
            if !running.load(Ordering::SeqCst) {
                break 'games;
            }

            let turn = walker.play_turn(&mut board, player);
            stats.record_turn(&turn, &board);

            let mut result = check_board(&board).and_then(|_| check_undo(&mut board));
            if result.is_ok() && stats.turns % SPLIT_CHECK_INTERVAL == 0 {
                result = check_splits(&mut board, player.next(), walker.rules()).map(|n| {
                    max_splits = max_splits.max(n);
                });
            }
            if let Err(msg) = result {
                stats.violations += 1;
                println!("VIOLATION game={} turn={}: {}", game, stats.turns, msg);
                println!("  after {:?}", turn);
            }

            if stats.should_log(log_interval_secs) {
                stats.log_progress();
            }

            winner = board.winner();
            if winner.is_some() {
                break;
            }
            player = player.next();
        }
        stats.record_game(winner);
    }

    println!("\n=====================");
    println!("Verification finished in {}", clock(start.elapsed().as_secs()));
    println!("=====================");
    stats.print_summary();
    println!("Most distributions for one split: {}", max_splits);

    if stats.violations > 0 {
        std::process::exit(1);
    }
}
