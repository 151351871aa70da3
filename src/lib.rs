//! # quizgen
//!
//! AI-assisted multiple-choice quiz service with a terminal client.
//!
//! The core is the [`mcq`] normalizer, which turns free-form model output
//! into validated questions. Around it sit the WebSocket [`server`] (accounts,
//! quizzes, test history and generation requests) and the ratatui [`client`].
//!
//! ## Usage
//!
//! ```rust
//! let questions = quizgen::mcq::normalize_resolved(
//!     r#"Sure! [["2+2?", ["1", "2", "3", "4"], 3]]"#,
//! )?;
//! assert_eq!(questions[0].correct_answer, "4");
//! # Ok::<(), quizgen::mcq::MalformedResponse>(())
//! ```

pub mod analytics;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod generation;
pub mod mcq;
pub mod models;
pub mod protocol;
pub mod server;
pub mod store;
pub mod terminal;
