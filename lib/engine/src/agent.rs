/* 对局代理：对接裁判/协议与棋盘、搜索 */

use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use tracing::{info, warn};

use crate::board::{Board, Move, Side};
use crate::error::NotationError;
use crate::search::{SearchConfig, SearchState};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameResult {
    Win,
    Loss,
    Draw,
}

impl FromStr for GameResult {
    type Err = NotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "win" | "gagne" => Ok(GameResult::Win),
            "loss" | "perd" => Ok(GameResult::Loss),
            "draw" | "nul" => Ok(GameResult::Draw),
            other => Err(NotationError::UnknownResult(other.to_owned())),
        }
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameResult::Win => write!(f, "win"),
            GameResult::Loss => write!(f, "loss"),
            GameResult::Draw => write!(f, "draw"),
        }
    }
}

/// What a referee or protocol front end needs from a player. Moves travel as
/// text so that a player can be fed whatever the other side sent.
pub trait Player {
    fn name(&self) -> &str;
    /// Starts a new game playing `side`.
    fn init(&mut self, side: Side);
    fn opponent_name(&mut self, name: &str);
    /// Chooses and plays a move for our side, returned in move notation.
    fn choose_move(&mut self) -> String;
    fn opponent_move(&mut self, mv: &str);
    fn game_over(&mut self, result: GameResult);
}

/// Search-backed player keeping its own copy of the game.
pub struct EngineAgent {
    name: String,
    side: Side,
    opponent: Option<String>,
    board: Board,
    search: SearchState,
    result: Option<GameResult>,
}

impl EngineAgent {
    pub fn new(name: impl Into<String>, config: SearchConfig) -> Self {
        EngineAgent {
            name: name.into(),
            side: Side::First,
            opponent: None,
            board: Board::empty(),
            search: SearchState::new(config),
            result: None,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }
    pub fn side(&self) -> Side {
        self.side
    }
    pub fn opponent(&self) -> Option<&str> {
        self.opponent.as_deref()
    }
    pub fn result(&self) -> Option<GameResult> {
        self.result
    }
    pub fn search(&self) -> &SearchState {
        &self.search
    }

    /// Searches, applies and returns a move for our side. The move is always
    /// legal on the mirrored board.
    pub fn play(&mut self) -> Move {
        let side = self.side;
        let deadline = Instant::now() + self.search.config.think_time;
        let mut m = self.search.choose_move(&self.board, side, deadline);
        if !self.board.is_move_legal(&m, side) {
            let fallback = if self.board.placement_done(side) {
                self.board.legal_moves(side)[0]
            } else {
                self.board.best_placement(side)
            };
            warn!(rejected = %m, fallback = %fallback, "search returned an illegal move");
            m = fallback;
        }
        self.board.apply_move(&m, side);
        m
    }
}

impl Player for EngineAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn init(&mut self, side: Side) {
        self.side = side;
        self.board = Board::empty();
        self.result = None;
        self.search.reset();
    }

    fn opponent_name(&mut self, name: &str) {
        self.opponent = Some(name.to_owned());
    }

    fn choose_move(&mut self) -> String {
        self.play().to_string()
    }

    // 对手走法按原样应用到本地棋盘，不做拒绝
    fn opponent_move(&mut self, mv: &str) {
        let opponent = self.side.next();
        let m = match mv.parse::<Move>() {
            Ok(m) => m,
            Err(err) => {
                warn!(%err, text = mv, "unreadable opponent move, treated as a pass");
                Move::Pass
            }
        };
        if !self.board.is_move_legal(&m, opponent) {
            warn!(mv = %m, "opponent move is not legal here, applied anyway");
        }
        self.board.apply_move(&m, opponent);
    }

    fn game_over(&mut self, result: GameResult) {
        info!(name = %self.name, %result, "game over");
        self.result = Some(result);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::agent::{EngineAgent, GameResult, Player};
    use crate::board::tests::pos;
    use crate::board::*;
    use crate::search::SearchConfig;

    fn quick_agent(name: &str) -> EngineAgent {
        let config = SearchConfig {
            max_depth: 2,
            think_time: Duration::from_secs(30),
            ..SearchConfig::default()
        };
        EngineAgent::new(name, config)
    }

    #[test]
    fn test_game_result_notation() {
        assert_eq!("win".parse::<GameResult>(), Ok(GameResult::Win));
        assert_eq!("PERD".parse::<GameResult>(), Ok(GameResult::Loss));
        assert_eq!("nul".parse::<GameResult>(), Ok(GameResult::Draw));
        assert!("maybe".parse::<GameResult>().is_err());
        assert_eq!(GameResult::Draw.to_string(), "draw");
    }

    #[test]
    fn test_agent_places_then_opens_play() {
        let mut agent = quick_agent("engine");
        agent.init(Side::Second);
        agent.opponent_name("human");
        assert_eq!(agent.opponent(), Some("human"));

        agent.opponent_move("B1/A1/C1/D1/E1/F1");
        let placement: Move = agent.choose_move().parse().unwrap();
        match placement {
            Move::Place(cells) => assert!(cells.iter().all(|p| p.edge() == Some(Edge::High))),
            other => panic!("expected a placement, got {other}"),
        }
        assert_eq!(agent.board().turn, Side::Second);

        let before = agent.board().clone();
        let reply: Move = agent.choose_move().parse().unwrap();
        assert!(matches!(reply, Move::Step { .. }));
        assert!(before.is_move_legal(&reply, Side::Second));
        assert_eq!(agent.board().turn, Side::First);
    }

    #[test]
    fn test_opponent_moves_applied_literally() {
        let mut agent = quick_agent("engine");
        agent.init(Side::First);
        agent.choose_move();
        agent.opponent_move("this is not a move");
        assert_eq!(agent.board().last_mover, Some(Side::Second));
        assert!(!agent.board().placement_done(Side::Second));

        // 非法但可解析的走法也照样执行
        let mut agent = quick_agent("engine");
        agent.init(Side::Second);
        agent.opponent_move("B1/A1/C1/D1/E1/F1");
        agent.opponent_move("A1-A6");
        assert_eq!(agent.board().piece_at(pos("A6")), Some(Piece::guard(Side::First)));
        assert_eq!(agent.board().piece_at(pos("A1")), None);
    }

    #[test]
    fn test_init_resets_game() {
        let mut agent = quick_agent("engine");
        agent.init(Side::First);
        agent.choose_move();
        agent.game_over(GameResult::Win);
        assert_eq!(agent.result(), Some(GameResult::Win));

        agent.init(Side::Second);
        assert_eq!(agent.board(), &Board::empty());
        assert_eq!(agent.result(), None);
        assert_eq!(agent.side(), Side::Second);
    }
}
