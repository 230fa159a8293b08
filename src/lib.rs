//! Turns English words into Anki cards: definitions come from the Free
//! Dictionary API, cards go out through AnkiConnect.

pub mod anki;
pub mod core;
pub mod dictionary;
pub mod persistence;

pub use crate::core::{
    Config,
    LazyError,
    Pipeline,
    RunError,
    RunReport,
};
