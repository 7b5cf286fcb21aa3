/* 引擎前端：按行读取命令，驱动对局代理，输出回复 */
use std::io::{self, BufRead, Write};

use regex::Regex;

use crate::agent::{EngineAgent, GameResult, Player};
use crate::board::{Move, Side};
use crate::search::SearchConfig;

const COMMAND_PATTERN: &str = r"^(?P<cmd>[a-z]+)(?:\s+(?P<arg>.*))?$";

#[derive(Debug, PartialEq, Eq)]
pub enum Reply {
    Lines(Vec<String>),
    Quit,
}

impl Reply {
    fn line(text: impl Into<String>) -> Reply {
        Reply::Lines(vec![text.into()])
    }
}

// 文本协议引擎
pub struct EscampeEngine {
    agent: EngineAgent,
    command: Regex,
}

impl EscampeEngine {
    pub fn new(config: SearchConfig) -> anyhow::Result<Self> {
        Ok(EscampeEngine {
            agent: EngineAgent::new("escampe-engine", config),
            command: Regex::new(COMMAND_PATTERN)?,
        })
    }

    pub fn agent(&self) -> &EngineAgent {
        &self.agent
    }

    pub fn start(&mut self) -> anyhow::Result<()> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        for line in stdin.lock().lines() {
            let line = line?;
            match self.handle(&line) {
                Reply::Quit => {
                    writeln!(stdout, "bye")?;
                    break;
                }
                Reply::Lines(lines) => {
                    for l in lines {
                        writeln!(stdout, "{}", l)?;
                    }
                }
            }
            stdout.flush()?;
        }
        Ok(())
    }

    /// Handles one protocol line and returns what to print.
    pub fn handle(&mut self, line: &str) -> Reply {
        let line = line.trim();
        let captures = match self.command.captures(line) {
            Some(captures) => captures,
            None => return Reply::line("not support"),
        };
        let arg = captures.name("arg").map_or("", |m| m.as_str().trim());
        match &captures["cmd"] {
            "escampe" => Reply::Lines(self.info()),
            "isready" => Reply::line("readyok"),
            "init" => match arg.parse::<Side>() {
                Ok(side) => {
                    self.agent.init(side);
                    Reply::line(format!("initok {}", side))
                }
                Err(err) => Reply::line(format!("error {}", err)),
            },
            "opponent" => {
                self.agent.opponent_name(arg);
                Reply::Lines(vec![])
            }
            "go" => Reply::line(format!("bestmove {}", self.agent.choose_move())),
            "move" => {
                self.agent.opponent_move(arg);
                Reply::Lines(vec![])
            }
            "result" => match arg.parse::<GameResult>() {
                Ok(result) => {
                    self.agent.game_over(result);
                    Reply::line(format!("resultok {}", result))
                }
                Err(err) => Reply::line(format!("error {}", err)),
            },
            "show" => Reply::Lines(self.agent.board().to_snapshot().lines().map(String::from).collect()),
            "legal" => Reply::line(self.legal()),
            "quit" => Reply::Quit,
            _ => Reply::line("not support"),
        }
    }

    pub fn info(&self) -> Vec<String> {
        vec![
            format!("id name escampe-engine {}", env!("CARGO_PKG_VERSION")),
            "id author escampe".to_owned(),
            "escampeok".to_owned(),
        ]
    }

    // 列出本方当前的合法走法；尚未布子时只回复 placement
    fn legal(&self) -> String {
        let board = self.agent.board();
        let side = self.agent.side();
        if !board.placement_done(side) {
            return "legal placement".to_owned();
        }
        let moves: Vec<String> = board.legal_moves(side).iter().map(Move::to_string).collect();
        format!("legal {}", moves.join(" "))
    }
}
