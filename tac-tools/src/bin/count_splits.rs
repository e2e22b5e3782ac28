//! Measure how many distinct distributions the split card offers in
//! positions reached by random play.
//!
//! Usage: count_splits [--games N] [--turns N] [--seed N] [--team]

use std::collections::BTreeMap;
use std::env;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tac_core::{Board, Player, SplitRules};
use tac_tools::walk::Walker;
use tac_tools::{clock, flag_value};

/// Distribution counts seen, bucketed.
#[derive(Default)]
struct Histogram {
    buckets: BTreeMap<usize, u64>,
    samples: u64,
    total: u64,
    max: usize,
    max_board: Option<(Board, Player)>,
}

impl Histogram {
    fn record(&mut self, count: usize, board: &Board, player: Player) {
        *self.buckets.entry(bucket(count)).or_default() += 1;
        self.samples += 1;
        self.total += count as u64;
        if count > self.max || self.max_board.is_none() {
            self.max = count;
            self.max_board = Some((board.clone(), player));
        }
    }

    fn mean(&self) -> f64 {
        if self.samples == 0 {
            0.0
        } else {
            self.total as f64 / self.samples as f64
        }
    }

    fn print(&self) {
        println!("Samples: {}", self.samples);
        println!("Mean distributions: {:.2}", self.mean());
        println!("Max distributions: {}", self.max);
        if let Some((board, player)) = &self.max_board {
            println!("  at {} (player {})", board, player.index());
        }
        println!("Histogram:");
        for (&low, &n) in &self.buckets {
            let pct = 100.0 * n as f64 / self.samples as f64;
            println!("  {:>5}+ : {:>8} ({:.1}%)", low, n, pct);
        }
    }
}

/// Lower edge of a count's bucket: exact up to 8, then powers of two.
fn bucket(count: usize) -> usize {
    if count <= 8 {
        count
    } else {
        1 << (usize::BITS - 1 - count.leading_zeros())
    }
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let games: u64 = flag_value(&args, "--games", 50);
    let max_turns: u64 = flag_value(&args, "--turns", 1000);
    let seed: u64 = flag_value(&args, "--seed", 1);
    let rules = SplitRules {
        team_moves: args.contains(&"--team".to_string()),
        ..SplitRules::default()
    };

    println!("Split Distribution Counter");
    println!("==========================");
    println!(
        "Games: {}  Turn limit: {}  Seed: {}  Team splits: {}",
        games, max_turns, seed, rules.team_moves
    );
    println!();

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        println!("\n\nInterrupt received, printing results...");
        r.store(false, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl-C handler");

    let log_interval_secs = 5;
    let start = Instant::now();
    let mut last_log = Instant::now();
    let mut walker = Walker::new(seed, rules);
    let mut histogram = Histogram::default();
    let mut generated = 0u64;

    'games: for _ in 0..games {
        let mut board = Board::new();
        let mut player = Player::Zero;

        for _ in 0..max_turns {
            if !running.load(Ordering::SeqCst) {
                break 'games;
            }

            let found = board.splits_for(player, rules);
            generated += found.len() as u64;
            if !found.is_empty() {
                histogram.record(found.len(), &board, player);
            }

            walker.play_turn(&mut board, player);
            if board.winner().is_some() {
                break;
            }
            player = player.next();

            if last_log.elapsed().as_secs() >= log_interval_secs {
                let elapsed = start.elapsed();
                println!(
                    "[{}] samples={} generated={} rate={:.0}/s mean={:.2} max={}",
                    clock(elapsed.as_secs()),
                    histogram.samples,
                    generated,
                    generated as f64 / elapsed.as_secs_f64(),
                    histogram.mean(),
                    histogram.max,
                );
                last_log = Instant::now();
            }
        }
    }

    println!("\n==========================");
    println!("Finished in {}", clock(start.elapsed().as_secs()));
    println!("==========================");
    histogram.print();
}
