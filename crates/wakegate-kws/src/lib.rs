//! Keyword-window session detection.
//!
//! This crate owns the core decision logic of wakegate: scoring a sliding
//! window of recognized tokens against the start/end vocabularies, driving
//! the idle/active session lifecycle with a global cooldown, and slicing
//! session audio into fixed-size outgoing chunks.

pub mod config;
pub mod engine;
pub mod session;
pub mod vocab;

pub use config::KwsConfig;
pub use engine::{ControlCommand, KwsEngine, SessionEvent};
pub use session::{Session, SessionSignal};
pub use vocab::{TokenWindow, VocabError, Vocabulary, WindowHits};
