//! Widget configuration and the JSON page document.

use crate::question::{self, Question, QuestionInput};
use crate::render;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default location of the external player library.
pub const DEFAULT_LIBRARY_URL: &str = "https://www.youtube.com/iframe_api";

/// Configuration shared by every quiz widget on a page
///
/// The defaults match the standard IFrame embed:
/// - questions are checked once per second while the video plays
/// - the player is 640x390 and plays inline on mobile
///
/// # Examples
///
/// ```
/// let cfg = ytquiz::QuizConfig::default();
/// assert_eq!(cfg.poll_interval_ms, 1000);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuizConfig {
    /// Delay between playback-position checks in milliseconds
    pub poll_interval_ms: u64,
    /// Player embed parameters
    pub player: PlayerConfig,
    /// Script URL injected once per page to load the player library
    pub library_url: String,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1000,
            player: PlayerConfig::default(),
            library_url: DEFAULT_LIBRARY_URL.to_string(),
        }
    }
}

impl QuizConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            return Err(Error::ConfigError("poll_interval_ms must be positive".into()));
        }
        let parsed = url::Url::parse(&self.library_url).map_err(|e| {
            Error::ConfigError(format!("library_url {:?}: {}", self.library_url, e))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::ConfigError(format!(
                "library_url must be http(s), got {:?}",
                parsed.scheme()
            )));
        }
        if self.player.width == 0 || self.player.height == 0 {
            return Err(Error::ConfigError("player dimensions must be positive".into()));
        }
        Ok(())
    }
}

/// Player embed parameters passed to `PlayerFactory::create`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub width: u32,
    pub height: u32,
    pub plays_inline: bool,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 390,
            plays_inline: true,
        }
    }
}

/// One widget on a page: a video and its questions in page input format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoEntry {
    pub id: String,
    pub questions: Vec<QuestionInput>,
}

impl VideoEntry {
    pub fn questions(&self) -> Result<Vec<Question>> {
        question::from_inputs(self.questions.clone())
    }
}

/// A page of quiz widgets sharing one configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizDocument {
    #[serde(default)]
    pub config: QuizConfig,
    pub videos: Vec<VideoEntry>,
}

impl QuizDocument {
    /// Parse and validate a document: config, video ids, and every question list.
    pub fn from_json(json: &str) -> Result<Self> {
        let doc: QuizDocument = serde_json::from_str(json)?;
        doc.config.validate()?;
        for (i, video) in doc.videos.iter().enumerate() {
            render::validate_video_id(&video.id)?;
            if doc.videos[..i].iter().any(|v| v.id == video.id) {
                return Err(Error::ConfigError(format!("duplicate video id {:?}", video.id)));
            }
            video.questions()?;
        }
        Ok(doc)
    }

    pub fn video(&self, id: &str) -> Option<&VideoEntry> {
        self.videos.iter().find(|v| v.id == id)
    }
}
