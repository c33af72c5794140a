pub mod config;
pub mod grid;
pub mod highscore;
pub mod session;
pub mod snake;
pub mod stats;
pub mod strategy;
pub mod target;
pub mod view;
