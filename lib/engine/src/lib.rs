/**
 * Escampe 引擎核心库入口
 *
 * 说明
 * - board: 棋盘、棋子、走法记法与规则判定
 * - evaluate: 局面评估与开局布子
 * - search: 带时限的迭代加深 alpha-beta 搜索
 * - snapshot: 棋盘快照文本格式
 * - agent: 对局代理（玩家接口）
 * - engine: 文本协议前端
 */
pub mod agent;
pub mod board;
pub mod constant;
pub mod engine;
pub mod error;
pub mod evaluate;
pub mod search;
pub mod snapshot;
