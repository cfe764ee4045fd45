use crate::position::{Position, PositionError};

/// Builds the position described by the arguments of a UCI `position` command.
///
/// Supports `startpos`, `fen <6 fields>`, each optionally followed by
/// `moves <m1> <m2> ...`. Unlike a lenient front end, a bad FEN or an illegal
/// move is reported instead of silently resetting the board.
pub fn set_position_from_uci(args: &[&str]) -> Result<Position, PositionError> {
    if args.is_empty() {
        return Ok(Position::startpos());
    }

    let moves_at = args.iter().position(|&a| a == "moves").unwrap_or(args.len());
    let (setup, rest) = args.split_at(moves_at);

    let mut pos = match setup {
        ["startpos"] => Position::startpos(),
        ["fen", fields @ ..] if !fields.is_empty() => Position::from_fen(&fields.join(" "))?,
        _ => return Err(PositionError::MalformedCommand(args.join(" "))),
    };

    for text in rest.iter().skip(1) {
        let mv = pos.parse_uci_move(text)?;
        pos = pos.apply(mv);
    }
    Ok(pos)
}

/// Extracts `(name, value)` from the arguments of `setoption name <id> [value <x>]`.
/// Option names may contain spaces.
pub fn parse_setoption(args: &[&str]) -> Option<(String, String)> {
    let name_at = args.iter().position(|&a| a == "name")?;
    let value_at = args.iter().position(|&a| a == "value");

    let name_end = value_at.unwrap_or(args.len());
    if name_end <= name_at + 1 {
        return None;
    }
    let name = args[name_at + 1..name_end].join(" ");
    let value = value_at
        .map(|v| args[v + 1..].join(" "))
        .unwrap_or_default();
    Some((name, value))
}

/// Reads `movetime <ms>` from the arguments of a `go` command.
pub fn parse_go_movetime(args: &[&str]) -> Option<u64> {
    let at = args.iter().position(|&a| a == "movetime")?;
    args.get(at + 1)?.parse().ok()
}

#[cfg(test)]
#[path = "uci_tests.rs"]
mod uci_tests;
