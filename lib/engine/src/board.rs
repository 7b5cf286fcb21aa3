/*
 * Escampe 棋盘模块（Board 与棋子表示）
 *
 * 设计要点
 * - 棋盘 6 x 6，行 0 为第 1 行，列 0 为 A 列，坐标记法为 `<A-F><1-6>`
 * - 每格有固定的边线等级 (1/2/3)，决定从该格出发的棋子的步长
 * - 每方一个君主 (Sovereign) 和五个护卫 (Guard)；只有护卫可以吃子，只有君主可以被吃
 * - 约束 (Constraint)：上一步落点的边线等级限制对手下一步可动的棋子，
 *   对手在该等级格上没有棋子时约束失效
 *
 * 主要功能
 * - 布子、走子的合法性判定，合法走法生成
 * - 带撤销记录的走子 (apply_move / undo_move)，供搜索回溯使用
 * - 终局判定
 */

use std::fmt;
use std::str::FromStr;

use crate::constant::{BORDER_TABLE, PASS_ALIASES, PASS_TOKEN, POSITION_VALUE_TABLE};
use crate::error::NotationError;

pub const BOARD_SIZE: usize = 6;
pub const PIECES_PER_SIDE: usize = 6;

// 四个正交方向：下、上、左、右
pub const DIRECTIONS: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Side {
    First,
    Second,
}

impl Side {
    pub fn value(&self) -> usize {
        match self {
            Side::First => 0,
            Side::Second => 1,
        }
    }
    pub fn next(&self) -> Side {
        match self {
            Side::First => Side::Second,
            Side::Second => Side::First,
        }
    }
}

impl FromStr for Side {
    type Err = NotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first" | "noir" | "black" => Ok(Side::First),
            "second" | "blanc" | "white" => Ok(Side::Second),
            other => Err(NotationError::UnknownSide(other.to_owned())),
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::First => write!(f, "first"),
            Side::Second => write!(f, "second"),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Rank {
    Sovereign, // 君主
    Guard,     // 护卫
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Piece {
    pub side: Side,
    pub rank: Rank,
}

impl Piece {
    pub const fn new(side: Side, rank: Rank) -> Self {
        Piece { side, rank }
    }
    pub const fn sovereign(side: Side) -> Self {
        Piece::new(side, Rank::Sovereign)
    }
    pub const fn guard(side: Side) -> Self {
        Piece::new(side, Rank::Guard)
    }
    pub fn belong_to(&self, side: Side) -> bool {
        self.side == side
    }
    pub fn is_sovereign(&self) -> bool {
        self.rank == Rank::Sovereign
    }
    pub fn is_guard(&self) -> bool {
        self.rank == Rank::Guard
    }
}

/// The two ranks nearest one board edge, where a side lays out its pieces.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Edge {
    Low,  // 第 1、2 行
    High, // 第 5、6 行
}

impl Edge {
    pub fn opposite(&self) -> Edge {
        match self {
            Edge::Low => Edge::High,
            Edge::High => Edge::Low,
        }
    }
    pub fn rows(&self) -> [i32; 2] {
        match self {
            Edge::Low => [0, 1],
            Edge::High => [BOARD_SIZE as i32 - 2, BOARD_SIZE as i32 - 1],
        }
    }
    /// Closest edge to a row, used when the row itself is not a placement rank.
    pub fn nearest(row: i32) -> Edge {
        if row < BOARD_SIZE as i32 / 2 {
            Edge::Low
        } else {
            Edge::High
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    pub const fn new(row: i32, col: i32) -> Self {
        Position { row, col }
    }
    pub fn step(&self, (dr, dc): (i32, i32), distance: i32) -> Self {
        Position::new(self.row + dr * distance, self.col + dc * distance)
    }
    /// Border class of the cell, 0 off the board.
    pub fn border(&self) -> i32 {
        table_value(&BORDER_TABLE, *self)
    }
    pub fn position_value(&self) -> i32 {
        table_value(&POSITION_VALUE_TABLE, *self)
    }
    pub fn edge(&self) -> Option<Edge> {
        if !in_board(*self) {
            return None;
        }
        [Edge::Low, Edge::High]
            .into_iter()
            .find(|edge| edge.rows().contains(&self.row))
    }
    pub fn distance(&self, other: Position) -> i32 {
        (self.row - other.row).abs() + (self.col - other.col).abs()
    }
    pub fn all() -> impl Iterator<Item = Position> {
        (0..BOARD_SIZE as i32).flat_map(|row| (0..BOARD_SIZE as i32).map(move |col| Position::new(row, col)))
    }
}

fn table_value(table: &[[i32; BOARD_SIZE]; BOARD_SIZE], pos: Position) -> i32 {
    if in_board(pos) {
        table[pos.row as usize][pos.col as usize]
    } else {
        0
    }
}

// 坐标是否在棋盘内
pub fn in_board(pos: Position) -> bool {
    pos.row >= 0 && pos.row < BOARD_SIZE as i32 && pos.col >= 0 && pos.col < BOARD_SIZE as i32
}

impl FromStr for Position {
    type Err = NotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let bytes = text.as_bytes();
        if bytes.len() != 2 {
            return Err(NotationError::InvalidCoordinate(text.to_owned()));
        }
        let col = bytes[0].to_ascii_uppercase();
        let row = bytes[1];
        if !(b'A'..=b'F').contains(&col) || !(b'1'..=b'6').contains(&row) {
            return Err(NotationError::InvalidCoordinate(text.to_owned()));
        }
        Ok(Position::new((row - b'1') as i32, (col - b'A') as i32))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if in_board(*self) {
            write!(f, "{}{}", (b'A' + self.col as u8) as char, self.row + 1)
        } else {
            write!(f, "({},{})", self.row, self.col)
        }
    }
}

/// A player action: pass, initial placement (sovereign first) or a step/capture.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Move {
    Pass,
    Place([Position; PIECES_PER_SIDE]),
    Step { from: Position, to: Position },
}

impl Move {
    pub fn step(from: Position, to: Position) -> Move {
        Move::Step { from, to }
    }
    pub fn is_pass(&self) -> bool {
        matches!(self, Move::Pass)
    }
}

impl FromStr for Move {
    type Err = NotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim().to_ascii_uppercase();
        if text.is_empty() {
            return Err(NotationError::Empty);
        }
        if PASS_ALIASES.contains(&text.as_str()) {
            return Ok(Move::Pass);
        }
        if text.contains('/') {
            let tokens: Vec<&str> = text.split('/').collect();
            if tokens.len() != PIECES_PER_SIDE {
                return Err(NotationError::TokenCount {
                    expected: PIECES_PER_SIDE,
                    found: tokens.len(),
                });
            }
            let mut positions = [Position::new(0, 0); PIECES_PER_SIDE];
            for (i, token) in tokens.iter().enumerate() {
                let pos: Position = token.parse()?;
                if positions[..i].contains(&pos) {
                    return Err(NotationError::DuplicateCoordinate(token.trim().to_owned()));
                }
                positions[i] = pos;
            }
            return Ok(Move::Place(positions));
        }
        if text.contains('-') {
            let tokens: Vec<&str> = text.split('-').collect();
            if tokens.len() != 2 {
                return Err(NotationError::TokenCount {
                    expected: 2,
                    found: tokens.len(),
                });
            }
            return Ok(Move::Step {
                from: tokens[0].parse()?,
                to: tokens[1].parse()?,
            });
        }
        Err(NotationError::Unrecognised(s.trim().to_owned()))
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Move::Pass => write!(f, "{}", PASS_TOKEN),
            Move::Place(positions) => {
                let cells: Vec<String> = positions.iter().map(|p| p.to_string()).collect();
                write!(f, "{}", cells.join("/"))
            }
            Move::Step { from, to } => write!(f, "{}-{}", from, to),
        }
    }
}

/// Border class of the last destination and the side that moved there.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Constraint {
    pub border: i32,
    pub owner: Side,
}

/// Everything `apply_move` changed, restored by `undo_move`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Undo {
    pub side: Side,
    pub mv: Move,
    cells: Vec<(Position, Option<Piece>)>,
    constraint: Option<Constraint>,
    turn: Side,
    edges: [Option<Edge>; 2],
    last_mover: Option<Side>,
}

impl Undo {
    /// The piece removed by a step, if any.
    pub fn captured(&self) -> Option<Piece> {
        match self.mv {
            Move::Step { .. } => self.cells.get(1).and_then(|(_, piece)| *piece),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    pub cells: [[Option<Piece>; BOARD_SIZE]; BOARD_SIZE],
    pub turn: Side,
    pub constraint: Option<Constraint>,
    // 每方布子所选的边，布子完成前为 None
    pub edges: [Option<Edge>; 2],
    pub last_mover: Option<Side>,
}

impl Default for Board {
    fn default() -> Self {
        Board::empty()
    }
}

impl Board {
    pub fn empty() -> Self {
        Board {
            cells: [[None; BOARD_SIZE]; BOARD_SIZE],
            turn: Side::First,
            constraint: None,
            edges: [None, None],
            last_mover: None,
        }
    }

    pub fn piece_at(&self, pos: Position) -> Option<Piece> {
        if in_board(pos) {
            self.cells[pos.row as usize][pos.col as usize]
        } else {
            None
        }
    }
    pub fn set_piece(&mut self, pos: Position, piece: Option<Piece>) {
        if in_board(pos) {
            self.cells[pos.row as usize][pos.col as usize] = piece;
        }
    }

    pub fn edge(&self, side: Side) -> Option<Edge> {
        self.edges[side.value()]
    }
    pub fn placement_done(&self, side: Side) -> bool {
        self.edge(side).is_some()
    }

    /// Pieces of `side` in row-major order.
    pub fn pieces(&self, side: Side) -> impl Iterator<Item = (Position, Piece)> + '_ {
        Position::all().filter_map(move |pos| match self.piece_at(pos) {
            Some(piece) if piece.belong_to(side) => Some((pos, piece)),
            _ => None,
        })
    }

    pub fn sovereign_position(&self, side: Side) -> Option<Position> {
        self.pieces(side)
            .find(|(_, piece)| piece.is_sovereign())
            .map(|(pos, _)| pos)
    }

    // 两点之间（不含端点）是否有棋子，只对同行或同列有意义
    pub fn has_piece_between(&self, posa: Position, posb: Position) -> bool {
        if posa.row == posb.row {
            (posa.col.min(posb.col) + 1..posa.col.max(posb.col))
                .any(|col| self.piece_at(Position::new(posa.row, col)).is_some())
        } else if posa.col == posb.col {
            (posa.row.min(posb.row) + 1..posa.row.max(posb.row))
                .any(|row| self.piece_at(Position::new(row, posa.col)).is_some())
        } else {
            false
        }
    }

    /// The border class `side` is held to this turn, if the opponent's last
    /// move binds it and `side` owns a piece on a cell of that class.
    pub fn active_border(&self, side: Side) -> Option<i32> {
        let constraint = self.constraint.filter(|c| c.owner != side)?;
        self.pieces(side)
            .any(|(pos, _)| pos.border() == constraint.border)
            .then_some(constraint.border)
    }

    pub fn validate_placement(&self, positions: &[Position], side: Side) -> bool {
        if positions.len() != PIECES_PER_SIDE || self.placement_done(side) {
            return false;
        }
        for (i, pos) in positions.iter().enumerate() {
            if !in_board(*pos) || positions[..i].contains(pos) {
                return false;
            }
        }
        let edge = match positions[0].edge() {
            Some(edge) => edge,
            None => return false,
        };
        if positions.iter().any(|pos| pos.edge() != Some(edge)) {
            return false;
        }
        // 后布子的一方必须选择对面的边
        if self.edge(side.next()) == Some(edge) {
            return false;
        }
        positions.iter().all(|pos| self.piece_at(*pos).is_none())
    }

    pub fn validate_move(&self, from: Position, to: Position, side: Side) -> bool {
        if !in_board(from) || !in_board(to) || from == to {
            return false;
        }

        // 1. 起点必须是本方棋子
        let piece = match self.piece_at(from) {
            Some(piece) if piece.belong_to(side) => piece,
            _ => return false,
        };

        // 2. 只能直线走，不能斜走
        if from.row != to.row && from.col != to.col {
            return false;
        }

        // 3. 步长不超过起点的边线等级
        let reach = from.border();
        let distance = from.distance(to);
        if distance > reach {
            return false;
        }

        // 4. 路径上不能有棋子
        if self.has_piece_between(from, to) {
            return false;
        }

        // 5. 终点为空，或是对方君主且由护卫以满步长吃掉
        if let Some(target) = self.piece_at(to) {
            let capture = !target.belong_to(side) && target.is_sovereign() && piece.is_guard() && distance == reach;
            if !capture {
                return false;
            }
        }

        // 6. 边线约束
        match self.active_border(side) {
            Some(border) => from.border() == border,
            None => true,
        }
    }

    pub fn is_move_legal(&self, m: &Move, side: Side) -> bool {
        match m {
            Move::Pass => self.placement_done(side) && self.step_moves(side).is_empty(),
            Move::Place(positions) => self.validate_placement(positions, side),
            Move::Step { from, to } => self.validate_move(*from, *to, side),
        }
    }

    /// Every step and capture available to `side`, without the Pass fallback.
    pub fn step_moves(&self, side: Side) -> Vec<Move> {
        let border = self.active_border(side);
        let mut moves = vec![];
        for (from, piece) in self.pieces(side) {
            if border.is_some_and(|b| from.border() != b) {
                continue;
            }
            let reach = from.border();
            for dir in DIRECTIONS {
                for distance in 1..=reach {
                    let to = from.step(dir, distance);
                    if !in_board(to) {
                        break;
                    }
                    match self.piece_at(to) {
                        None => moves.push(Move::step(from, to)),
                        Some(target) => {
                            if !target.belong_to(side) && target.is_sovereign() && piece.is_guard() && distance == reach {
                                moves.push(Move::step(from, to));
                            }
                            break;
                        }
                    }
                }
            }
        }
        moves
    }

    // 生成合法走法，没有可走的棋时唯一合法的动作是 Pass
    pub fn legal_moves(&self, side: Side) -> Vec<Move> {
        let moves = self.step_moves(side);
        if moves.is_empty() {
            vec![Move::Pass]
        } else {
            moves
        }
    }

    pub fn is_capture(&self, m: &Move) -> bool {
        match m {
            Move::Step { from, to } => match (self.piece_at(*from), self.piece_at(*to)) {
                (Some(mover), Some(target)) => mover.side != target.side && target.is_sovereign(),
                _ => false,
            },
            _ => false,
        }
    }

    /// Applies `m` for `side` without validating it and returns the undo record.
    pub fn apply_move(&mut self, m: &Move, side: Side) -> Undo {
        let mut undo = Undo {
            side,
            mv: *m,
            cells: vec![],
            constraint: self.constraint,
            turn: self.turn,
            edges: self.edges,
            last_mover: self.last_mover,
        };
        match m {
            Move::Pass => {
                self.constraint = None;
                self.turn = side.next();
            }
            Move::Place(positions) => {
                for (i, pos) in positions.iter().enumerate() {
                    undo.cells.push((*pos, self.piece_at(*pos)));
                    let rank = if i == 0 { Rank::Sovereign } else { Rank::Guard };
                    self.set_piece(*pos, Some(Piece::new(side, rank)));
                }
                self.edges[side.value()] = Some(positions[0].edge().unwrap_or(Edge::nearest(positions[0].row)));
                // 双方布子完成后，后布子的一方先走
                self.turn = if self.edges.iter().all(Option::is_some) {
                    side
                } else {
                    side.next()
                };
            }
            Move::Step { from, to } => {
                undo.cells.push((*from, self.piece_at(*from)));
                undo.cells.push((*to, self.piece_at(*to)));
                if let Some(piece) = self.piece_at(*from) {
                    self.set_piece(*from, None);
                    self.set_piece(*to, Some(piece));
                }
                self.constraint = Some(Constraint {
                    border: to.border(),
                    owner: side,
                });
                self.turn = side.next();
            }
        }
        self.last_mover = Some(side);
        undo
    }

    pub fn undo_move(&mut self, undo: Undo) {
        for (pos, piece) in undo.cells.into_iter().rev() {
            self.set_piece(pos, piece);
        }
        self.constraint = undo.constraint;
        self.turn = undo.turn;
        self.edges = undo.edges;
        self.last_mover = undo.last_mover;
    }

    // 双方布子完成后，恰有一方君主不在棋盘上时对局结束
    pub fn is_terminal(&self) -> bool {
        self.edges.iter().all(Option::is_some)
            && self.sovereign_position(Side::First).is_some() != self.sovereign_position(Side::Second).is_some()
    }

    pub fn winner(&self) -> Option<Side> {
        if !self.is_terminal() {
            return None;
        }
        [Side::First, Side::Second]
            .into_iter()
            .find(|side| self.sovereign_position(*side).is_some())
    }
}
