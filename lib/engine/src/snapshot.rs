//! 棋盘快照
//!
//! ```text
//! % ABCDEF
//! 01 nNnnnn 01
//! ...
//! 06 bbbbBb 06
//! % ABCDEF
//! ```
//!
//! `N`/`n` 为先手君主/护卫，`B`/`b` 为后手君主/护卫，`-` 为空格。

use std::fmt;

use crate::board::{Board, Edge, Piece, Position, Rank, Side, BOARD_SIZE};
use crate::constant::SNAPSHOT_MARKER;
use crate::error::SnapshotError;

fn piece_char(piece: Option<Piece>) -> char {
    match piece {
        None => '-',
        Some(Piece { side: Side::First, rank: Rank::Sovereign }) => 'N',
        Some(Piece { side: Side::First, rank: Rank::Guard }) => 'n',
        Some(Piece { side: Side::Second, rank: Rank::Sovereign }) => 'B',
        Some(Piece { side: Side::Second, rank: Rank::Guard }) => 'b',
    }
}

fn char_piece(c: char) -> Result<Option<Piece>, SnapshotError> {
    match c {
        '-' => Ok(None),
        'N' => Ok(Some(Piece::sovereign(Side::First))),
        'n' => Ok(Some(Piece::guard(Side::First))),
        'B' => Ok(Some(Piece::sovereign(Side::Second))),
        'b' => Ok(Some(Piece::guard(Side::Second))),
        other => Err(SnapshotError::UnknownPiece(other)),
    }
}

impl Board {
    pub fn to_snapshot(&self) -> String {
        let mut out = format!("{}\n", SNAPSHOT_MARKER);
        for (row, cells) in self.cells.iter().enumerate() {
            let line: String = cells.iter().map(|piece| piece_char(*piece)).collect();
            out.push_str(&format!("{:02} {} {:02}\n", row + 1, line, row + 1));
        }
        out.push_str(SNAPSHOT_MARKER);
        out.push('\n');
        out
    }

    /// Reads piece placement back from a snapshot. Turn and constraint are
    /// not part of the format; each side's edge is inferred from its pieces.
    pub fn from_snapshot(text: &str) -> Result<Board, SnapshotError> {
        let lines: Vec<&str> = text.lines().map(str::trim).filter(|line| !line.is_empty()).collect();
        if lines.len() < 2 || lines[0] != SNAPSHOT_MARKER || lines[lines.len() - 1] != SNAPSHOT_MARKER {
            return Err(SnapshotError::MissingMarker);
        }
        let rows = &lines[1..lines.len() - 1];
        if rows.len() != BOARD_SIZE {
            return Err(SnapshotError::RowCount(rows.len()));
        }

        let mut board = Board::empty();
        for (row, line) in rows.iter().enumerate() {
            let label = format!("{:02}", row + 1);
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() != 3 || parts[0] != label || parts[2] != label {
                return Err(SnapshotError::BadRow {
                    row: row + 1,
                    reason: format!("expected `{label} <cells> {label}`"),
                });
            }
            let cells: Vec<char> = parts[1].chars().collect();
            if cells.len() != BOARD_SIZE {
                return Err(SnapshotError::BadRow {
                    row: row + 1,
                    reason: format!("expected {} cells, found {}", BOARD_SIZE, cells.len()),
                });
            }
            for (col, c) in cells.into_iter().enumerate() {
                let piece = char_piece(c)?;
                if let Some(p) = piece {
                    if p.is_sovereign() && board.sovereign_position(p.side).is_some() {
                        return Err(SnapshotError::DuplicateSovereign(p.side));
                    }
                }
                board.set_piece(Position::new(row as i32, col as i32), piece);
            }
        }

        for side in [Side::First, Side::Second] {
            let rows: Vec<i32> = board.pieces(side).map(|(pos, _)| pos.row).collect();
            if !rows.is_empty() {
                let mean = rows.iter().sum::<i32>() / rows.len() as i32;
                board.edges[side.value()] = Some(Edge::nearest(mean));
            }
        }
        Ok(board)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_snapshot())
    }
}

#[cfg(test)]
mod tests {
    use crate::board::tests::{mv, opening, playout};
    use crate::board::*;
    use crate::error::SnapshotError;

    const OPENING: &str = "% ABCDEF
01 nNnnnn 01
02 ------ 02
03 ------ 03
04 ------ 04
05 ------ 05
06 bbbbBb 06
% ABCDEF
";

    #[test]
    fn test_opening_snapshot() {
        assert_eq!(opening().to_snapshot(), OPENING);
        assert_eq!(opening().to_string(), OPENING);
    }

    #[test]
    fn test_snapshot_round_trip() {
        let board = Board::from_snapshot(OPENING).unwrap();
        assert_eq!(board.cells, opening().cells);
        assert_eq!(board.edges, [Some(Edge::Low), Some(Edge::High)]);
        assert_eq!(board.constraint, None);
        assert_eq!(board.turn, Side::First);

        for seed in 0..5 {
            for position in playout(seed, 30) {
                let back = Board::from_snapshot(&position.to_snapshot()).unwrap();
                assert_eq!(back.cells, position.cells);
            }
        }
    }

    #[test]
    fn test_snapshot_after_move() {
        let mut board = opening();
        board.apply_move(&mv("A6-A3"), Side::Second);
        let text = board.to_snapshot();
        assert!(text.contains("03 b----- 03"));
        assert!(text.contains("06 -bbbBb 06"));
    }

    #[test]
    fn test_snapshot_errors() {
        assert_eq!(
            Board::from_snapshot(&OPENING.replacen("% ABCDEF\n", "", 1)),
            Err(SnapshotError::MissingMarker)
        );
        assert_eq!(
            Board::from_snapshot(&OPENING.replace("03 ------ 03\n", "")),
            Err(SnapshotError::RowCount(5))
        );
        assert_eq!(
            Board::from_snapshot(&OPENING.replace("03 ------ 03", "03 --x--- 03")),
            Err(SnapshotError::UnknownPiece('x'))
        );
        assert_eq!(
            Board::from_snapshot(&OPENING.replace("03 ------ 03", "03 --N--- 03")),
            Err(SnapshotError::DuplicateSovereign(Side::First))
        );
        assert!(matches!(
            Board::from_snapshot(&OPENING.replace("03 ------ 03", "04 ------ 04")),
            Err(SnapshotError::BadRow { row: 3, .. })
        ));
        assert!(matches!(
            Board::from_snapshot(&OPENING.replace("03 ------ 03", "03 ----- 03")),
            Err(SnapshotError::BadRow { row: 3, .. })
        ));
    }
}
