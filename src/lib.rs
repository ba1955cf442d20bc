#![warn(clippy::perf)]
#![warn(clippy::unwrap_used)]

//! Hangman games for chat channels: one game per channel, rate-limited by
//! per-user cooldowns, with every change written through to disk.

pub mod cli;
pub mod console;
pub mod cooldowns;
pub mod errors;
pub mod framework;
pub mod hangman;
pub mod persist;
pub mod store;
pub mod utils;

pub use errors::Error;
pub use hangman::{GameState, Hangman, HangmanError, Player};
