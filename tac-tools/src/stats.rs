//! Self-play statistics tracking.

use std::collections::HashSet;
use std::time::Instant;

use tac_core::{Board, Team};

use crate::walk::Turn;
use crate::{clock, fingerprint};

/// Statistics collected while walking random games.
#[derive(Debug, Default)]
pub struct WalkStats {
    /// Turns played across all games
    pub turns: u64,

    /// Turn outcomes
    pub entered: u64,
    pub moved: u64,
    pub swapped: u64,
    pub splits: u64,
    pub passed: u64,

    /// Segments across all split turns
    pub split_segments: u64,

    /// Finished games by winning team, plus games cut off at the turn limit
    pub games: u64,
    pub team_a_wins: u64,
    pub team_b_wins: u64,
    pub unfinished: u64,

    /// Rule checks that failed
    pub violations: u64,

    /// Fingerprints of every arrangement reached
    distinct: HashSet<u64>,

    /// For rate calculation
    start_time: Option<Instant>,
    last_log_time: Option<Instant>,
    last_log_turns: u64,
}

impl WalkStats {
    pub fn new() -> Self {
        Self {
            start_time: Some(Instant::now()),
            last_log_time: Some(Instant::now()),
            ..Default::default()
        }
    }

    /// Record a played turn and the board it produced
    pub fn record_turn(&mut self, turn: &Turn, board: &Board) {
        self.turns += 1;
        match turn {
            Turn::Entered => self.entered += 1,
            Turn::Moved { .. } => self.moved += 1,
            Turn::Swapped { .. } => self.swapped += 1,
            Turn::Split(dist) => {
                self.splits += 1;
                self.split_segments += dist.len() as u64;
            }
            Turn::Passed => self.passed += 1,
        }
        self.distinct.insert(fingerprint(board));
    }

    /// Record the end of a game
    pub fn record_game(&mut self, winner: Option<Team>) {
        self.games += 1;
        match winner {
            Some(Team::A) => self.team_a_wins += 1,
            Some(Team::B) => self.team_b_wins += 1,
            None => self.unfinished += 1,
        }
    }

    /// Distinct arrangements seen so far
    pub fn distinct_positions(&self) -> usize {
        self.distinct.len()
    }

    /// Get current turns per second
    pub fn turns_per_sec(&self) -> f64 {
        if let Some(start) = self.start_time {
            let elapsed = start.elapsed().as_secs_f64();
            if elapsed > 0.0 {
                return self.turns as f64 / elapsed;
            }
        }
        0.0
    }

    /// Check if we should log progress
    pub fn should_log(&self, interval_secs: u64) -> bool {
        if let Some(last) = self.last_log_time {
            last.elapsed().as_secs() >= interval_secs
        } else {
            true
        }
    }

    /// Log progress and reset log timer
    pub fn log_progress(&mut self) {
        let now = Instant::now();
        let elapsed_total = self.start_time.map(|s| s.elapsed().as_secs()).unwrap_or(0);

        // Calculate rate since last log
        let rate = if let Some(last) = self.last_log_time {
            let elapsed = last.elapsed().as_secs_f64();
            let turns = self.turns - self.last_log_turns;
            if elapsed > 0.0 {
                turns as f64 / elapsed
            } else {
                0.0
            }
        } else {
            self.turns_per_sec()
        };

        println!(
            "[{}] games={} turns={} unique={} rate={:.0}/s violations={}",
            clock(elapsed_total),
            self.games,
            self.turns,
            self.distinct.len(),
            rate,
            self.violations,
        );
        println!(
            "           turns: enter={} move={} swap={} split={} pass={}",
            self.entered, self.moved, self.swapped, self.splits, self.passed
        );

        self.last_log_time = Some(now);
        self.last_log_turns = self.turns;
    }

    /// Print final summary
    pub fn print_summary(&self) {
        println!("Games: {}", self.games);
        println!("  - Team A wins: {}", self.team_a_wins);
        println!("  - Team B wins: {}", self.team_b_wins);
        println!("  - Unfinished: {}", self.unfinished);
        println!("Turns: {}", self.turns);
        println!("  - Entered: {}", self.entered);
        println!("  - Moved: {}", self.moved);
        println!("  - Swapped: {}", self.swapped);
        println!("  - Splits: {}", self.splits);
        println!("  - Passed: {}", self.passed);
        if self.splits > 0 {
            println!(
                "Average segments per split: {:.2}",
                self.split_segments as f64 / self.splits as f64
            );
        }
        println!("Distinct positions: {}", self.distinct.len());
        println!("Violations: {}", self.violations);

        if let Some(start) = self.start_time {
            let elapsed = start.elapsed().as_secs_f64();
            println!("Average rate: {:.0} turns/sec", self.turns as f64 / elapsed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tac_core::{Distribution, Player};

    #[test]
    fn test_record_turn_counts_outcomes() {
        let mut stats = WalkStats::new();
        let mut board = Board::new();
        stats.record_turn(&Turn::Passed, &board);
        assert!(board.try_enter(Player::Zero, true));
        stats.record_turn(&Turn::Entered, &board);
        let split: Distribution = "T0+3 T20+4".parse().unwrap();
        stats.record_turn(&Turn::Split(split), &board);

        assert_eq!(stats.turns, 3);
        assert_eq!(stats.passed, 1);
        assert_eq!(stats.entered, 1);
        assert_eq!(stats.splits, 1);
        assert_eq!(stats.split_segments, 2);
        assert_eq!(stats.distinct_positions(), 2);
    }

    #[test]
    fn test_record_game() {
        let mut stats = WalkStats::new();
        stats.record_game(Some(Team::B));
        stats.record_game(None);
        assert_eq!(stats.games, 2);
        assert_eq!(stats.team_b_wins, 1);
        assert_eq!(stats.unfinished, 1);
    }
}
