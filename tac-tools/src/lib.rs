//! Shared pieces of the self-play tools: a random walker over legal turns,
//! run statistics, and command-line helpers.

pub mod stats;
pub mod walk;

use tac_core::Board;
use xxhash_rust::xxh64::xxh64;

/// 64-bit fingerprint of a board's arrangement. Equal boards share one.
pub fn fingerprint(board: &Board) -> u64 {
    xxh64(board.arrangement().as_bytes(), 0)
}

/// Value following `flag` on the command line, parsed.
///
/// Returns `default` when the flag is absent; an unparseable value is
/// reported and also falls back to `default`.
pub fn flag_value<T: std::str::FromStr>(args: &[String], flag: &str, default: T) -> T {
    let Some(pos) = args.iter().position(|a| a == flag) else {
        return default;
    };
    match args.get(pos + 1).map(|v| v.parse()) {
        Some(Ok(value)) => value,
        _ => {
            println!("Warning: {flag} needs a value, using default");
            default
        }
    }
}

/// Format elapsed seconds as `hh:mm:ss`.
pub fn clock(secs: u64) -> String {
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_flag_value() {
        let a = args(&["verify", "--games", "25", "--team"]);
        assert_eq!(flag_value(&a, "--games", 10u64), 25);
        assert_eq!(flag_value(&a, "--seed", 7u64), 7);
        assert_eq!(flag_value(&a, "--team", 3u64), 3);
    }

    #[test]
    fn test_clock() {
        assert_eq!(clock(0), "00:00:00");
        assert_eq!(clock(3723), "01:02:03");
    }

    #[test]
    fn test_fingerprint_ignores_piece_identity() {
        let a: Board = "T5,T9,Y2,Y3/Y0,Y1,Y2,Y3/Y0,Y1,Y2,Y3/Y0,Y1,Y2,Y3"
            .parse()
            .unwrap();
        let b: Board = "T9,T5,Y2,Y3/Y0,Y1,Y2,Y3/Y0,Y1,Y2,Y3/Y0,Y1,Y2,Y3"
            .parse()
            .unwrap();
        assert_eq!(fingerprint(&a), fingerprint(&b));
        assert_ne!(fingerprint(&a), fingerprint(&Board::new()));
    }
}
