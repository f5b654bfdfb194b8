//! YtQuiz
//!
//! Timed comprehension questions embedded in video playback. A video plays;
//! at configured timestamps playback pauses and a multiple-choice or
//! fill-in-the-blank question is shown. The viewer answers, gets feedback,
//! and continues.
//!
//! # Features
//!
//! - **Capability-based**: the video player ([`player::PlayerFactory`]) and the
//!   page ([`render::RenderTarget`]) are injected, so widgets run headless
//! - **Shared loading**: one [`PlayerLoaderService`] per page loads the player
//!   library once for every widget
//! - **Headless page** (default feature `headless`): an in-memory DOM built on
//!   `scraper` for tests, previews and the CLI
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use ytquiz::player::MemoryPlayerFactory;
//! use ytquiz::render::HeadlessPage;
//! use ytquiz::{QuizConfig, QuizContext, QuizController};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let ctx = QuizContext::new(
//!     QuizConfig::default(),
//!     Arc::new(HeadlessPage::new()),
//!     Arc::new(MemoryPlayerFactory::new()),
//! )?;
//!
//! let quiz = QuizController::from_json(
//!     "M7lc1UVf-VE",
//!     r#"[{"time": "0:05", "question": "Capital of France?", "answers": ["Paris", "Rome"], "correct": 0}]"#,
//!     &ctx,
//! )?;
//!
//! // The embedding page calls this when the player library has loaded.
//! ctx.loader.on_library_ready();
//! assert!(quiz.has_player());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub use error::{Error, Result};

pub mod config;
pub mod controller;
pub mod loader;
pub mod player;
pub mod presenter;
pub mod question;
pub mod render;
pub mod time;
pub mod timer;

pub use config::{PlayerConfig, QuizConfig, QuizDocument};
pub use controller::{QuizContext, QuizController};
pub use loader::{LoaderState, PlayerLoaderService};
pub use player::{PlayerState, VideoPlayer};
pub use presenter::{Judgement, Submission};
pub use question::{Question, QuestionKind};
pub use time::QuestionTime;
