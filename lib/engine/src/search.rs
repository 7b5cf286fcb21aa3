/*
 * Search Module - 带时限的 alpha-beta 搜索
 *
 * - 迭代加深：逐层加深，每完成一层记录最佳走法
 * - 截止时间到达时放弃未完成的一层，沿用上一层的结果
 * - 每个节点的走法都稳定排序：吃子优先，其次起点边线等级，再次终点位置分
 * - 同分走法可按种子随机选择
 */

use std::cmp::Reverse;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::board::{Board, Move, Side};
use crate::constant::{MAX, MAX_DEPTH, MIN, MIN_DEPTH, THINK_TIME_MS, WIN};
use crate::evaluate::EvalWeights;

/// How the root resolves moves with equal scores.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TieBreak {
    /// Keep the earliest move in search order.
    FirstFound,
    /// Pick uniformly among equal moves with a seeded generator.
    Random { seed: u64 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchConfig {
    pub min_depth: i32,
    pub max_depth: i32,
    pub think_time: Duration,
    pub weights: EvalWeights,
    pub tie_break: TieBreak,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            min_depth: MIN_DEPTH,
            max_depth: MAX_DEPTH,
            think_time: Duration::from_millis(THINK_TIME_MS),
            weights: EvalWeights::default(),
            tie_break: TieBreak::FirstFound,
        }
    }
}

/// AI 搜索状态
pub struct SearchState {
    pub config: SearchConfig,
    /// 搜索节点计数器
    pub counter: u64,
    /// 最近一次搜索完整完成的深度，0 表示没有任何一层完成
    pub completed_depth: i32,
    deadline: Option<Instant>,
    rng: fastrand::Rng,
}

impl SearchState {
    pub fn new(config: SearchConfig) -> Self {
        let seed = match config.tie_break {
            TieBreak::Random { seed } => seed,
            TieBreak::FirstFound => 0,
        };
        SearchState {
            config,
            counter: 0,
            completed_depth: 0,
            deadline: None,
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    pub fn reset(&mut self) {
        self.counter = 0;
        self.completed_depth = 0;
        self.deadline = None;
    }

    fn expired(&self) -> bool {
        self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }

    pub fn sort_moves(board: &Board, moves: &mut [Move]) {
        moves.sort_by_key(|m| match m {
            Move::Step { from, to } => Reverse((board.is_capture(m), from.border(), to.position_value())),
            _ => Reverse((false, 0, 0)),
        });
    }

    /// Picks a move for `side`. Never fails: when no pass finishes before
    /// `deadline` the first move in search order is returned.
    pub fn choose_move(&mut self, board: &Board, side: Side, deadline: Instant) -> Move {
        self.reset();
        self.deadline = Some(deadline);

        if !board.placement_done(side) {
            return board.best_placement(side);
        }

        let mut moves = board.legal_moves(side);
        if moves.len() == 1 {
            return moves[0];
        }
        Self::sort_moves(board, &mut moves);

        match self.iterative_deepening(board, side, &moves) {
            Some((value, best)) => {
                debug!(depth = self.completed_depth, value, nodes = self.counter, best = %best, "move chosen");
                best
            }
            None => {
                warn!(fallback = %moves[0], "no search pass completed before the deadline");
                moves[0]
            }
        }
    }

    pub fn iterative_deepening(&mut self, board: &Board, side: Side, moves: &[Move]) -> Option<(i32, Move)> {
        let mut board = board.clone();
        let mut best = None;
        let min_depth = self.config.min_depth.max(1);
        let max_depth = self.config.max_depth.max(min_depth);

        for depth in min_depth..=max_depth {
            if self.expired() {
                break;
            }
            match self.search_root(&mut board, side, moves, depth) {
                Some((value, m)) => {
                    best = Some((value, m));
                    self.completed_depth = depth;
                    debug!(depth, value, nodes = self.counter, best = %m, "search pass complete");
                    // 已找到必胜走法，无需继续加深
                    if value >= WIN {
                        break;
                    }
                }
                None => {
                    debug!(depth, nodes = self.counter, "search pass aborted");
                    break;
                }
            }
        }
        best
    }

    fn search_root(&mut self, board: &mut Board, side: Side, moves: &[Move], depth: i32) -> Option<(i32, Move)> {
        let mut alpha = MIN;
        let mut best: Option<(i32, Move)> = None;
        let mut ties = 0u32;

        for m in moves {
            // 随机模式下用 alpha - 1 作下界，使与当前最佳等值的走法得到精确值
            let window = match self.config.tie_break {
                TieBreak::Random { .. } if alpha > MIN => alpha - 1,
                _ => alpha,
            };
            let undo = board.apply_move(m, side);
            let value = self.alpha_beta(board, depth - 1, window, MAX, false, side);
            board.undo_move(undo);
            let value = value?;

            match best {
                Some((best_value, _)) if value < best_value => {}
                Some((best_value, _)) if value == best_value => {
                    if let TieBreak::Random { .. } = self.config.tie_break {
                        ties += 1;
                        if self.rng.u32(..ties) == 0 {
                            best = Some((value, *m));
                        }
                    }
                }
                _ => {
                    best = Some((value, *m));
                    ties = 1;
                }
            }
            alpha = alpha.max(value);
        }
        best
    }

    /// Minimax with alpha-beta pruning, scored for `side`. Returns `None`
    /// once the deadline has passed.
    pub fn alpha_beta(
        &mut self,
        board: &mut Board,
        depth: i32,
        mut alpha: i32,
        mut beta: i32,
        maximizing: bool,
        side: Side,
    ) -> Option<i32> {
        if self.expired() {
            return None;
        }
        self.counter += 1;

        if depth <= 0 || board.is_terminal() {
            return Some(board.evaluate(side, &self.config.weights));
        }

        let mover = if maximizing { side } else { side.next() };
        let mut moves = board.legal_moves(mover);
        Self::sort_moves(board, &mut moves);

        if maximizing {
            let mut value = MIN;
            for m in moves {
                let undo = board.apply_move(&m, mover);
                let child = self.alpha_beta(board, depth - 1, alpha, beta, false, side);
                board.undo_move(undo);
                value = value.max(child?);
                if value >= beta {
                    break;
                }
                alpha = alpha.max(value);
            }
            Some(value)
        } else {
            let mut value = MAX;
            for m in moves {
                let undo = board.apply_move(&m, mover);
                let child = self.alpha_beta(board, depth - 1, alpha, beta, true, side);
                board.undo_move(undo);
                value = value.min(child?);
                if value <= alpha {
                    break;
                }
                beta = beta.min(value);
            }
            Some(value)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use crate::board::tests::{board_with, mv, opening, playout};
    use crate::board::*;
    use crate::constant::{LOSS, MAX, MIN};
    use crate::search::{SearchConfig, SearchState, TieBreak};

    fn config(max_depth: i32) -> SearchConfig {
        SearchConfig {
            min_depth: 1,
            max_depth,
            ..SearchConfig::default()
        }
    }

    fn far_deadline() -> Instant {
        Instant::now() + Duration::from_secs(600)
    }

    fn minimax(board: &mut Board, depth: i32, maximizing: bool, side: Side, state: &SearchState) -> i32 {
        if depth <= 0 || board.is_terminal() {
            return board.evaluate(side, &state.config.weights);
        }
        let mover = if maximizing { side } else { side.next() };
        let mut values = vec![];
        for m in board.legal_moves(mover) {
            let undo = board.apply_move(&m, mover);
            values.push(minimax(board, depth - 1, !maximizing, side, state));
            board.undo_move(undo);
        }
        if maximizing {
            values.into_iter().max().unwrap_or(MIN)
        } else {
            values.into_iter().min().unwrap_or(MAX)
        }
    }

    #[test]
    fn test_takes_immediate_capture() {
        let board = board_with(&[
            ("A1", Piece::guard(Side::First)),
            ("C3", Piece::sovereign(Side::First)),
            ("B1", Piece::sovereign(Side::Second)),
            ("F6", Piece::guard(Side::Second)),
        ]);
        for depth in [1, 3] {
            let mut state = SearchState::new(config(depth));
            assert_eq!(state.choose_move(&board, Side::First, far_deadline()), mv("A1-B1"));
            assert_eq!(state.completed_depth, 1, "a winning pass stops deepening");
        }
    }

    #[test]
    fn test_avoids_losing_reply() {
        // 第二方护卫 A3 以满步长瞄准 A1；F1 的任何走法都让对手吃掉君主
        let board = board_with(&[
            ("A1", Piece::sovereign(Side::First)),
            ("F1", Piece::guard(Side::First)),
            ("A3", Piece::guard(Side::Second)),
            ("F6", Piece::sovereign(Side::Second)),
        ]);
        let mut state = SearchState::new(config(2));
        let chosen = state.choose_move(&board, Side::First, far_deadline());
        assert!([mv("A1-A2"), mv("A1-B1")].contains(&chosen), "chose {chosen}");
        assert_eq!(state.completed_depth, 2);
    }

    #[test]
    fn test_expired_deadline_still_answers() {
        let board = opening();
        let mut state = SearchState::new(SearchConfig::default());
        let deadline = Instant::now();
        let chosen = state.choose_move(&board, Side::Second, deadline);
        assert!(board.is_move_legal(&chosen, Side::Second));
        assert_eq!(state.completed_depth, 0);

        let mut moves = board.legal_moves(Side::Second);
        SearchState::sort_moves(&board, &mut moves);
        assert_eq!(chosen, moves[0]);
    }

    #[test]
    fn test_timed_out_pass_keeps_last_completed_move() {
        let board = opening();
        let deep = config(12);
        let mut state = SearchState::new(deep);
        let chosen = state.choose_move(&board, Side::Second, Instant::now() + Duration::from_millis(300));
        let completed = state.completed_depth;
        assert!(completed >= 1 && completed < deep.max_depth, "completed depth {completed}");

        let mut fresh = SearchState::new(config(completed));
        assert_eq!(fresh.choose_move(&board, Side::Second, far_deadline()), chosen);
        assert_eq!(fresh.completed_depth, completed);
    }

    #[test]
    fn test_single_move_and_placement_shortcuts() {
        let board = board_with(&[
            ("A1", Piece::sovereign(Side::First)),
            ("A2", Piece::guard(Side::Second)),
            ("B1", Piece::guard(Side::Second)),
            ("F6", Piece::sovereign(Side::Second)),
        ]);
        let mut state = SearchState::new(config(4));
        assert_eq!(state.choose_move(&board, Side::First, far_deadline()), Move::Pass);
        assert_eq!(state.counter, 0);

        let empty = Board::empty();
        assert_eq!(
            state.choose_move(&empty, Side::First, far_deadline()),
            empty.best_placement(Side::First)
        );
    }

    #[test]
    fn test_forced_pass_is_searched_through() {
        // 边线 1 的约束把第一方锁死在 A1，只能 PASS；PASS 后 F1 吃掉 D1 的君主
        let mut board = board_with(&[
            ("A1", Piece::guard(Side::First)),
            ("D1", Piece::sovereign(Side::First)),
            ("A2", Piece::guard(Side::Second)),
            ("B1", Piece::guard(Side::Second)),
            ("F1", Piece::guard(Side::Second)),
            ("F6", Piece::sovereign(Side::Second)),
        ]);
        board.constraint = Some(Constraint {
            border: 1,
            owner: Side::Second,
        });
        assert_eq!(board.legal_moves(Side::First), vec![Move::Pass]);

        let mut state = SearchState::new(config(2));
        let static_value = board.evaluate(Side::First, &state.config.weights);
        assert_ne!(static_value, LOSS);
        assert_eq!(state.alpha_beta(&mut board, 2, MIN, MAX, true, Side::First), Some(LOSS));
        assert_eq!(board.constraint.map(|c| c.border), Some(1), "search restores the constraint");
    }

    #[test]
    fn test_sort_moves_puts_capture_first() {
        let board = board_with(&[
            ("A1", Piece::guard(Side::First)),
            ("D1", Piece::guard(Side::First)),
            ("C3", Piece::sovereign(Side::First)),
            ("B1", Piece::sovereign(Side::Second)),
            ("F6", Piece::guard(Side::Second)),
        ]);
        let mut moves = board.legal_moves(Side::First);
        SearchState::sort_moves(&board, &mut moves);
        assert_eq!(moves[0], mv("A1-B1"));
        // 其余走法按起点边线等级降序
        let borders: Vec<i32> = moves[1..]
            .iter()
            .map(|m| match m {
                Move::Step { from, .. } => from.border(),
                _ => 0,
            })
            .collect();
        assert!(borders.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_random_tie_break_is_reproducible() {
        let board = opening();
        let random = SearchConfig {
            tie_break: TieBreak::Random { seed: 7 },
            ..config(2)
        };
        let a = SearchState::new(random).choose_move(&board, Side::Second, far_deadline());
        let b = SearchState::new(random).choose_move(&board, Side::Second, far_deadline());
        assert_eq!(a, b);
        assert!(board.is_move_legal(&a, Side::Second));
    }

    #[test]
    fn test_pruning_matches_minimax() {
        for seed in 0..6 {
            let boards = playout(seed, 12);
            let mut board = boards[boards.len() / 2].clone();
            if board.is_terminal() {
                continue;
            }
            let side = board.turn;
            let mut state = SearchState::new(config(3));
            let pruned = state.alpha_beta(&mut board, 3, MIN, MAX, true, side);
            let full = minimax(&mut board, 3, true, side, &state);
            assert_eq!(pruned, Some(full), "seed {seed}");
        }
    }

    #[test]
    fn test_pruned_choice_matches_minimax_choice() {
        for seed in 40..46 {
            let boards = playout(seed, 10);
            let board = boards[boards.len() - 1].clone();
            if board.is_terminal() {
                continue;
            }
            let side = board.turn;
            let mut state = SearchState::new(SearchConfig {
                min_depth: 2,
                max_depth: 2,
                ..SearchConfig::default()
            });
            let chosen = state.choose_move(&board, side, far_deadline());

            let mut moves = board.legal_moves(side);
            SearchState::sort_moves(&board, &mut moves);
            let mut scratch = board.clone();
            let mut expected: Option<(i32, Move)> = None;
            for m in moves {
                let undo = scratch.apply_move(&m, side);
                let value = minimax(&mut scratch, 1, false, side, &state);
                scratch.undo_move(undo);
                if expected.map_or(true, |(best, _)| value > best) {
                    expected = Some((value, m));
                }
            }
            assert_eq!(Some(chosen), expected.map(|(_, m)| m), "seed {seed}");
        }
    }
}
