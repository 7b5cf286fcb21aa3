use crate::board::BOARD_SIZE;

pub const MIN: i32 = -99999;
pub const MAX: i32 = 99999;
pub const WIN: i32 = 10000;
pub const LOSS: i32 = -WIN;

pub const MIN_DEPTH: i32 = 1;
pub const MAX_DEPTH: i32 = 6;
pub const THINK_TIME_MS: u64 = 4500;

pub const GUARD_WEIGHT: i32 = 100;
pub const MOBILITY_WEIGHT: i32 = 3;
pub const POSITION_WEIGHT: i32 = 3;
pub const THREAT_WEIGHT: i32 = 500;

pub const PASS_TOKEN: &str = "PASS";
pub const PASS_ALIASES: [&str; 3] = ["PASS", "PASSE", "E"];

pub const SNAPSHOT_MARKER: &str = "% ABCDEF";

// 行 0 为第 1 行 (A1..F1)
pub const BORDER_TABLE: [[i32; BOARD_SIZE]; BOARD_SIZE] = [
    [1, 2, 2, 3, 1, 2],
    [3, 1, 3, 1, 3, 2],
    [2, 3, 1, 2, 1, 3],
    [2, 1, 3, 2, 3, 1],
    [1, 3, 1, 3, 1, 2],
    [3, 2, 2, 1, 3, 2],
];

pub const POSITION_VALUE_TABLE: [[i32; BOARD_SIZE]; BOARD_SIZE] = [
    [3, 4, 4, 5, 3, 4],
    [5, 3, 5, 3, 5, 4],
    [4, 5, 3, 4, 3, 5],
    [4, 3, 5, 4, 5, 3],
    [3, 5, 3, 5, 3, 4],
    [5, 4, 4, 3, 5, 4],
];

// 开局布子权重
pub const PLACE_BORDER_WEIGHT: i32 = 10;
pub const PLACE_POSITION_WEIGHT: i32 = 5;
pub const PLACE_CENTRE_WEIGHT: f64 = 2.0;
pub const PLACE_REACH_WEIGHT: i32 = 3;
