//! 局面评估与开局布子

use crate::board::{in_board, Board, Edge, Move, Position, Side, BOARD_SIZE, DIRECTIONS, PIECES_PER_SIDE};
use crate::constant::{
    GUARD_WEIGHT, LOSS, MOBILITY_WEIGHT, PLACE_BORDER_WEIGHT, PLACE_CENTRE_WEIGHT, PLACE_POSITION_WEIGHT,
    PLACE_REACH_WEIGHT, POSITION_WEIGHT, THREAT_WEIGHT, WIN,
};

/// Linear weights of the static evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EvalWeights {
    pub guard: i32,
    pub mobility: i32,
    pub position: i32,
    pub threat: i32,
}

impl Default for EvalWeights {
    fn default() -> Self {
        EvalWeights {
            guard: GUARD_WEIGHT,
            mobility: MOBILITY_WEIGHT,
            position: POSITION_WEIGHT,
            threat: THREAT_WEIGHT,
        }
    }
}

impl Board {
    /// Scores the position for `side`: positive favours `side`, and the
    /// score for the opponent is the exact negation.
    pub fn evaluate(&self, side: Side, weights: &EvalWeights) -> i32 {
        let opponent = side.next();
        if self.sovereign_position(side).is_none() {
            return LOSS;
        }
        if self.sovereign_position(opponent).is_none() {
            return WIN;
        }

        let material = self.guard_count(side) - self.guard_count(opponent);
        let mobility = self.step_moves(side).len() as i32 - self.step_moves(opponent).len() as i32;
        let position = self.position_score(side) - self.position_score(opponent);
        let threat = self.sovereign_threats(side) - self.sovereign_threats(opponent);

        material * weights.guard + mobility * weights.mobility + position * weights.position + threat * weights.threat
    }

    pub fn guard_count(&self, side: Side) -> i32 {
        self.pieces(side).filter(|(_, piece)| piece.is_guard()).count() as i32
    }

    pub fn position_score(&self, side: Side) -> i32 {
        self.pieces(side).map(|(pos, _)| pos.position_value()).sum()
    }

    /// Guards of `attacker` lined up on the enemy sovereign at exactly their
    /// reach over a clear path. The border constraint is ignored here.
    pub fn sovereign_threats(&self, attacker: Side) -> i32 {
        let target = match self.sovereign_position(attacker.next()) {
            Some(pos) => pos,
            None => return 0,
        };
        self.pieces(attacker)
            .filter(|(from, piece)| {
                piece.is_guard()
                    && (from.row == target.row || from.col == target.col)
                    && from.distance(target) == from.border()
                    && !self.has_piece_between(*from, target)
            })
            .count() as i32
    }

    /// Heuristic opening layout for `side`: the six best free cells of an
    /// allowed edge, sovereign on the best one.
    pub fn best_placement(&self, side: Side) -> Move {
        let edges = match self.edge(side.next()) {
            Some(taken) => vec![taken.opposite()],
            None => vec![Edge::Low, Edge::High],
        };

        let mut best: Option<(i32, Vec<Position>)> = None;
        for edge in edges {
            let mut cells: Vec<(i32, Position)> = edge
                .rows()
                .iter()
                .flat_map(|&row| (0..BOARD_SIZE as i32).map(move |col| Position::new(row, col)))
                .filter(|pos| self.piece_at(*pos).is_none())
                .map(|pos| (placement_score(pos), pos))
                .collect();
            if cells.len() < PIECES_PER_SIDE {
                continue;
            }
            // 稳定排序，同分时保持行优先顺序
            cells.sort_by(|a, b| b.0.cmp(&a.0));
            let chosen = &cells[..PIECES_PER_SIDE];
            let total: i32 = chosen.iter().map(|(score, _)| score).sum();
            if best.as_ref().map_or(true, |(t, _)| total > *t) {
                best = Some((total, chosen.iter().map(|(_, pos)| *pos).collect()));
            }
        }

        match best {
            Some((_, cells)) => {
                let mut positions = [Position::new(0, 0); PIECES_PER_SIDE];
                positions.copy_from_slice(&cells);
                Move::Place(positions)
            }
            None => Move::Pass,
        }
    }
}

fn placement_score(pos: Position) -> i32 {
    let centre = BOARD_SIZE as f64 / 2.0 - 0.5;
    let distance = ((pos.col as f64 - centre).powi(2) + (pos.row as f64 - centre).powi(2)).sqrt();
    pos.border() * PLACE_BORDER_WEIGHT
        + pos.position_value() * PLACE_POSITION_WEIGHT
        + ((4.0 - distance) * PLACE_CENTRE_WEIGHT) as i32
        + reachable_cells(pos) * PLACE_REACH_WEIGHT
}

// 空棋盘上从该格出发可到达的格数
fn reachable_cells(pos: Position) -> i32 {
    let reach = pos.border();
    DIRECTIONS
        .iter()
        .map(|dir| (1..=reach).take_while(|d| in_board(pos.step(*dir, *d))).count() as i32)
        .sum()
}
