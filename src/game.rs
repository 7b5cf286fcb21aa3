use std::fmt;

use engine::agent::{GameResult, Player};
use engine::board::{Board, Move, Side};
use tracing::{info, warn};

pub const MAX_PLIES: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Winner(Side),
    // 走法无法解析或不合法，判负
    Forfeit { loser: Side, mv: String },
    PlyLimit,
}

impl Outcome {
    fn result_for(&self, side: Side) -> GameResult {
        match self {
            Outcome::Winner(winner) if *winner == side => GameResult::Win,
            Outcome::Winner(_) => GameResult::Loss,
            Outcome::Forfeit { loser, .. } if *loser == side => GameResult::Loss,
            Outcome::Forfeit { .. } => GameResult::Win,
            Outcome::PlyLimit => GameResult::Draw,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Winner(side) => write!(f, "{} wins", side),
            Outcome::Forfeit { loser, mv } => write!(f, "{} forfeits with `{}`", loser, mv),
            Outcome::PlyLimit => write!(f, "draw by ply limit"),
        }
    }
}

/// Referee holding the authoritative board between two players.
pub struct Match {
    board: Board,
    players: [Box<dyn Player>; 2],
    max_plies: usize,
    history: Vec<Move>,
}

impl Match {
    pub fn new(first: Box<dyn Player>, second: Box<dyn Player>, max_plies: usize) -> Self {
        Match {
            board: Board::empty(),
            players: [first, second],
            max_plies,
            history: vec![],
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn history(&self) -> &[Move] {
        &self.history
    }

    pub fn run(&mut self) -> Outcome {
        let names = [self.players[0].name().to_owned(), self.players[1].name().to_owned()];
        for side in [Side::First, Side::Second] {
            let player = &mut self.players[side.value()];
            player.init(side);
            player.opponent_name(&names[side.next().value()]);
        }

        let outcome = loop {
            if let Some(winner) = self.board.winner() {
                break Outcome::Winner(winner);
            }
            if self.history.len() >= self.max_plies {
                break Outcome::PlyLimit;
            }

            let side = self.board.turn;
            let text = self.players[side.value()].choose_move();
            let m = match text.parse::<Move>() {
                Ok(m) if self.board.is_move_legal(&m, side) => m,
                Ok(_) => {
                    warn!(%side, mv = %text, "illegal move");
                    break Outcome::Forfeit { loser: side, mv: text };
                }
                Err(err) => {
                    warn!(%side, mv = %text, %err, "unreadable move");
                    break Outcome::Forfeit { loser: side, mv: text };
                }
            };

            self.board.apply_move(&m, side);
            self.history.push(m);
            info!(ply = self.history.len(), %side, mv = %m);
            self.players[side.next().value()].opponent_move(&m.to_string());
        };

        info!(%outcome, plies = self.history.len(), "match finished");
        for side in [Side::First, Side::Second] {
            self.players[side.value()].game_over(outcome.result_for(side));
        }
        outcome
    }
}
