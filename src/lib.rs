//! femto — a minimal full-screen terminal text editor.
//!
//! Invariant: single output gate — the run loop is the only place that
//! flushes a frame to the terminal, and each frame is exactly one write.
//!
//! # Public API Overview
//! - Open/edit/save a [`Document`] made of [`Row`]s.
//! - Decode raw terminal bytes into [`Key`] events with [`KeyDecoder`].
//! - Drive a full editing session via [`editor::run`].

pub mod config;
pub mod logging;

pub mod core;
pub mod editor;
pub mod error;
pub mod platform;
pub mod render;

/// Environment configuration.
pub use crate::config::EnvConfig;

/// Text model types.
pub use crate::core::document::Document;
pub use crate::core::row::Row;

/// Keyboard input decoding.
pub use crate::core::key::{read_key, ByteSource, Key, KeyDecoder};

/// Editor state and the modal prompt observer seam.
pub use crate::editor::{Editor, Outcome, PromptObserver};

/// Error type shared across the crate.
pub use crate::error::Error;

/// Raw terminal control.
pub use crate::platform::terminal::{RawModeGuard, RawTerminal};
