use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use tracing::warn;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    /// Ordering weight: harder concepts are scheduled first.
    pub fn weight(&self) -> u8 {
        match self {
            Difficulty::Easy => 1,
            Difficulty::Medium => 2,
            Difficulty::Hard => 3,
        }
    }

    /// Lenient decoding used at the ranker boundary: anything unrecognised is `Medium`.
    pub fn from_label(label: Option<&str>) -> Self {
        match label {
            Some(raw) => Difficulty::try_from(raw).unwrap_or_else(|_| {
                warn!(target: "app::validation", difficulty = raw, "unknown difficulty, treating as medium");
                Difficulty::Medium
            }),
            None => Difficulty::Medium,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Difficulty {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unsupported difficulty: {other}")),
        }
    }
}

/// An immutable unit of study content handed to the allocator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Concept {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    pub estimated_minutes: u32,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub key_points: Vec<String>,
    #[serde(default)]
    pub subject: Option<String>,
}

impl Concept {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        difficulty: Difficulty,
        estimated_minutes: u32,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            difficulty,
            estimated_minutes,
            summary: None,
            key_points: Vec::new(),
            subject: None,
        }
    }

    pub fn with_key_points(mut self, key_points: Vec<String>) -> Self {
        self.key_points = key_points;
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }
}

/// Concept as received from a ranker or a request payload, before boundary checks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ConceptInput {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub difficulty: Option<String>,
    pub estimated_minutes: i64,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub key_points: Vec<String>,
    #[serde(default)]
    pub subject: Option<String>,
}

impl TryFrom<ConceptInput> for Concept {
    type Error = AppError;

    fn try_from(input: ConceptInput) -> AppResult<Self> {
        if input.id.trim().is_empty() {
            return Err(AppError::validation("concept id must not be blank"));
        }
        if input.title.trim().is_empty() {
            return Err(AppError::validation_with_details(
                "concept title must not be blank",
                json!({ "conceptId": input.id }),
            ));
        }
        let estimated_minutes = u32::try_from(input.estimated_minutes)
            .ok()
            .filter(|minutes| *minutes > 0)
            .ok_or_else(|| {
                AppError::validation_with_details(
                    "estimated minutes must be a positive integer",
                    json!({ "conceptId": input.id, "estimatedMinutes": input.estimated_minutes }),
                )
            })?;

        Ok(Concept {
            difficulty: Difficulty::from_label(input.difficulty.as_deref()),
            id: input.id,
            title: input.title.trim().to_string(),
            estimated_minutes,
            summary: input.summary,
            key_points: input.key_points,
            subject: input.subject,
        })
    }
}
