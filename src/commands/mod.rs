pub mod planning;
pub mod settings;

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::error;

use crate::error::{AppError, AppResult};
use crate::services::concept_ranker::{ConceptRanker, KeywordConceptRanker};
use crate::services::schedule_service::StudyScheduleService;
use crate::services::settings_service::SettingsService;

#[derive(Clone)]
pub struct AppState {
    settings_service: Arc<SettingsService>,
    ranker: Arc<dyn ConceptRanker>,
}

impl AppState {
    pub fn new(settings_path: impl Into<PathBuf>) -> Self {
        Self::with_ranker(settings_path, Arc::new(KeywordConceptRanker))
    }

    pub fn with_ranker(settings_path: impl Into<PathBuf>, ranker: Arc<dyn ConceptRanker>) -> Self {
        Self {
            settings_service: Arc::new(SettingsService::new(settings_path)),
            ranker,
        }
    }

    pub fn settings(&self) -> Arc<SettingsService> {
        Arc::clone(&self.settings_service)
    }

    /// A schedule service bound to the settings as they are right now.
    pub fn schedule(&self) -> AppResult<StudyScheduleService> {
        let settings = self.settings_service.get()?;
        Ok(StudyScheduleService::new(Arc::clone(&self.ranker), settings))
    }
}

pub type CommandResult<T> = Result<T, CommandError>;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<JsonValue>,
}

impl CommandError {
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        details: Option<JsonValue>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details,
        }
    }
}

impl From<AppError> for CommandError {
    fn from(error: AppError) -> Self {
        match error {
            AppError::Validation { message, details } => {
                CommandError::new("VALIDATION_ERROR", message, details)
            }
            AppError::Config { message } => CommandError::new("CONFIG_ERROR", message, None),
            AppError::Serialization(error) => {
                error!(target: "app::command", error = %error, "serialization error in command");
                CommandError::new("INVALID_PAYLOAD", error.to_string(), None)
            }
            AppError::Yaml(error) => {
                error!(target: "app::command", error = %error, "settings file unreadable in command");
                CommandError::new("CONFIG_ERROR", error.to_string(), None)
            }
            AppError::Io(error) => {
                error!(target: "app::command", error = %error, "io error in command");
                CommandError::new("IO_ERROR", error.to_string(), None)
            }
            AppError::Other(message) => {
                error!(target: "app::command", %message, "unexpected error in command");
                CommandError::new("UNKNOWN", message, None)
            }
        }
    }
}
