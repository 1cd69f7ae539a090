use thiserror::Error;

/// Why a Riot ID could not be turned into a PUUID.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveFailure {
    #[error("player does not exist")]
    NotFound,

    #[error("API key rejected")]
    Unauthorized,

    #[error("account response was malformed: {0}")]
    MalformedResponse(String),

    #[error("{0}")]
    Transient(String),
}

/// Coarse failure families a caller can branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The handle is malformed or does not resolve to an account.
    Resolution,
    UpstreamData,
    Configuration,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid Riot ID format: {0:?}. Use format: Name#TAG")]
    InvalidRiotId(String),

    #[error("Could not resolve {riot_id}: {reason}")]
    Resolution {
        riot_id: String,
        reason: ResolveFailure,
    },

    #[error("Champion mastery unavailable: {0}")]
    UpstreamData(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Failed to load {path}: {reason}")]
    DataFile { path: String, reason: String },

    #[error("Model error: {0}")]
    Model(String),

    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("JSON parsing error: {0}")]
    JsonError(String),
}

impl AppError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            AppError::InvalidRiotId(_) | AppError::Resolution { .. } => ErrorCategory::Resolution,
            AppError::UpstreamData(_) | AppError::HttpError(_) | AppError::JsonError(_) => {
                ErrorCategory::UpstreamData
            }
            AppError::ConfigError(_) | AppError::DataFile { .. } | AppError::Model(_) => {
                ErrorCategory::Configuration
            }
        }
    }

    pub(crate) fn data_file(path: &std::path::Path, reason: impl ToString) -> Self {
        AppError::DataFile {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_separate_resolution_from_data_failures() {
        let resolution = AppError::Resolution {
            riot_id: "Faker#KR1".to_string(),
            reason: ResolveFailure::NotFound,
        };
        assert_eq!(resolution.category(), ErrorCategory::Resolution);
        assert_eq!(
            AppError::UpstreamData("503".into()).category(),
            ErrorCategory::UpstreamData
        );
        assert_eq!(
            AppError::Model("bad shape".into()).category(),
            ErrorCategory::Configuration
        );
    }

    #[test]
    fn malformed_handle_is_a_resolution_failure() {
        let err = AppError::InvalidRiotId("Faker".to_string());
        assert_eq!(err.category(), ErrorCategory::Resolution);
    }

    #[test]
    fn resolution_message_names_the_player() {
        let err = AppError::Resolution {
            riot_id: "Faker#KR1".to_string(),
            reason: ResolveFailure::Unauthorized,
        };
        assert_eq!(err.to_string(), "Could not resolve Faker#KR1: API key rejected");
    }
}
