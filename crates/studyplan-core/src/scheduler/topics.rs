//! Topic text for study and revision sessions.
//!
//! Topic text is cosmetic: the scheduler owns every structural decision and
//! only asks a [`TopicSource`] what to call a block. A failing source never
//! aborts generation; the block gets [`FALLBACK_TOPIC`] instead.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::schedule::SessionKind;

pub const FALLBACK_TOPIC: &str = "General review";
pub const BREAK_TOPIC: &str = "Short break";
pub const BUFFER_TOPIC: &str = "Buffer time";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopicRequest<'a> {
    pub subject: &'a str,
    pub proficiency: u8,
    pub week_index: u32,
    /// 0 = Monday.
    pub day_index: u32,
    pub kind: SessionKind,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TopicError {
    #[error("topic source unavailable: {0}")]
    Unavailable(String),
}

/// Pluggable provider of session topic text.
pub trait TopicSource: Send + Sync {
    fn topic(&self, request: &TopicRequest<'_>) -> Result<String, TopicError>;
}

/// Always answers [`FALLBACK_TOPIC`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackTopics;

impl TopicSource for FallbackTopics {
    fn topic(&self, _request: &TopicRequest<'_>) -> Result<String, TopicError> {
        Ok(FALLBACK_TOPIC.to_string())
    }
}

const FOUNDATION: [&str; 3] = [
    "Core concepts and definitions",
    "Worked examples",
    "Foundational problem set",
];
const PRACTICE: [&str; 3] = [
    "Mixed practice problems",
    "Concept mapping",
    "Past-paper questions",
];
const MASTERY: [&str; 3] = [
    "Timed practice",
    "Challenge problems",
    "Full past paper under exam conditions",
];

/// Rule-based topics: weaker subjects get foundation work, stronger ones
/// get exam-style practice. Rotates by week and day.
#[derive(Debug, Clone, Copy, Default)]
pub struct CurriculumTopics;

impl TopicSource for CurriculumTopics {
    fn topic(&self, request: &TopicRequest<'_>) -> Result<String, TopicError> {
        let phrases = match request.proficiency {
            0..=2 => &FOUNDATION,
            3 => &PRACTICE,
            _ => &MASTERY,
        };
        let index = (request.week_index as usize + request.day_index as usize) % phrases.len();
        let phrase = phrases[index];
        Ok(match request.kind {
            SessionKind::Revision => format!("Active recall: {phrase}"),
            _ => phrase.to_string(),
        })
    }
}

/// Topic source selected in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TopicSourceKind {
    #[default]
    Curriculum,
    Fallback,
}

impl TopicSourceKind {
    pub fn build(self) -> Box<dyn TopicSource> {
        match self {
            TopicSourceKind::Curriculum => Box::new(CurriculumTopics),
            TopicSourceKind::Fallback => Box::new(FallbackTopics),
        }
    }
}
