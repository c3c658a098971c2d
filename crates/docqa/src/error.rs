//! Error types for the question-answering pipeline

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Locale;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Tag identifying which class of failure ended a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    UnsupportedType,
    DocumentRead,
    Authentication,
    BadRequest,
    MissingInput,
    InvalidParameter,
    Service,
    Config,
    Io,
    Internal,
}

impl ErrorKind {
    /// Stable identifier used in API error bodies
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnsupportedType => "unsupported_type",
            Self::DocumentRead => "document_read_error",
            Self::Authentication => "authentication_error",
            Self::BadRequest => "bad_request_error",
            Self::MissingInput => "missing_input",
            Self::InvalidParameter => "invalid_parameter",
            Self::Service => "service_error",
            Self::Config => "config_error",
            Self::Io => "io_error",
            Self::Internal => "internal_error",
        }
    }

    /// HTTP status reported for this kind
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::UnsupportedType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::DocumentRead => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Authentication => StatusCode::UNAUTHORIZED,
            Self::BadRequest | Self::MissingInput | Self::InvalidParameter => {
                StatusCode::BAD_REQUEST
            }
            Self::Service => StatusCode::BAD_GATEWAY,
            Self::Config | Self::Io | Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Pipeline errors
#[derive(Debug, Error)]
pub enum Error {
    /// Declared media type is not one of the supported formats
    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),

    /// Source file could not be read as its declared format
    #[error("Failed to read '{filename}': {message}")]
    DocumentRead { filename: String, message: String },

    /// API key rejected by the hosted service
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Hosted service rejected the request itself (prompt too long, bad parameters)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// A required form input was absent
    #[error("Missing input: {0}")]
    MissingInput(&'static str),

    /// A form input was present but out of range
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Any other failure reported by a hosted service
    #[error("{service} error: {message}")]
    Service { service: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP transport error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a document read error
    pub fn document_read(filename: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DocumentRead {
            filename: filename.into(),
            message: message.into(),
        }
    }

    /// Create a hosted service error
    pub fn service(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Service {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Classification tag of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::UnsupportedType(_) => ErrorKind::UnsupportedType,
            Error::DocumentRead { .. } => ErrorKind::DocumentRead,
            Error::Authentication(_) => ErrorKind::Authentication,
            Error::BadRequest(_) => ErrorKind::BadRequest,
            Error::MissingInput(_) => ErrorKind::MissingInput,
            Error::InvalidParameter(_) => ErrorKind::InvalidParameter,
            Error::Service { .. } | Error::Http(_) => ErrorKind::Service,
            Error::Config(_) => ErrorKind::Config,
            Error::Io(_) => ErrorKind::Io,
            Error::Json(_) | Error::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Detail text without the category prefix
    pub fn detail(&self) -> String {
        match self {
            Error::UnsupportedType(t) => t.clone(),
            Error::DocumentRead { filename, message } => format!("{}: {}", filename, message),
            Error::Authentication(msg)
            | Error::BadRequest(msg)
            | Error::InvalidParameter(msg)
            | Error::Config(msg)
            | Error::Internal(msg) => msg.clone(),
            Error::MissingInput(field) => (*field).to_string(),
            Error::Service { message, .. } => message.clone(),
            Error::Io(err) => err.to_string(),
            Error::Json(err) => err.to_string(),
            Error::Http(err) => err.to_string(),
        }
    }

    /// Message shown to the person who submitted the form
    pub fn user_message(&self, locale: Locale) -> String {
        let detail = self.detail();
        match (locale, self.kind()) {
            (Locale::En, ErrorKind::UnsupportedType) => "Unsupported file type.".to_string(),
            (Locale::En, ErrorKind::DocumentRead) => {
                format!("Error reading the file: {}", detail)
            }
            (Locale::En, ErrorKind::Authentication) => {
                format!("Invalid API key: {}", detail)
            }
            (Locale::En, ErrorKind::BadRequest) => format!("Invalid request: {}", detail),
            (Locale::En, ErrorKind::MissingInput) => {
                format!("Please provide the {} before running.", detail)
            }
            (Locale::En, ErrorKind::InvalidParameter) => format!("Invalid setting: {}", detail),
            (Locale::En, ErrorKind::Service) => format!("The AI service failed: {}", detail),
            (Locale::En, ErrorKind::Io) => {
                format!("Could not store the uploaded file: {}", detail)
            }
            (Locale::En, _) => format!("Something went wrong: {}", detail),

            (Locale::PtBr, ErrorKind::UnsupportedType) => "Tipo de arquivo não suportado.".to_string(),
            (Locale::PtBr, ErrorKind::DocumentRead) => {
                format!("Erro ao ler o arquivo: {}", detail)
            }
            (Locale::PtBr, ErrorKind::Authentication) => {
                format!("Chave de API inválida: {}", detail)
            }
            (Locale::PtBr, ErrorKind::BadRequest) => {
                format!("Erro de requisição inválida: {}", detail)
            }
            (Locale::PtBr, ErrorKind::MissingInput) => {
                format!("Informe {} antes de executar.", detail)
            }
            (Locale::PtBr, ErrorKind::InvalidParameter) => format!("Parâmetro inválido: {}", detail),
            (Locale::PtBr, ErrorKind::Service) => format!("Falha no serviço de IA: {}", detail),
            (Locale::PtBr, ErrorKind::Io) => {
                format!("Não foi possível salvar o arquivo enviado: {}", detail)
            }
            (Locale::PtBr, _) => format!("Algo deu errado: {}", detail),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(
            Error::UnsupportedType("image/bmp".into()).kind(),
            ErrorKind::UnsupportedType
        );
        assert_eq!(
            Error::document_read("a.pdf", "bad xref").kind(),
            ErrorKind::DocumentRead
        );
        assert_eq!(Error::service("openai", "503").kind(), ErrorKind::Service);
        assert_eq!(Error::MissingInput("question").kind(), ErrorKind::MissingInput);
    }

    #[test]
    fn test_user_message_locales() {
        let err = Error::Authentication("Incorrect API key provided".into());
        assert_eq!(
            err.user_message(Locale::En),
            "Invalid API key: Incorrect API key provided"
        );
        assert_eq!(
            err.user_message(Locale::PtBr),
            "Chave de API inválida: Incorrect API key provided"
        );

        let err = Error::UnsupportedType("image/bmp".into());
        assert_eq!(err.user_message(Locale::PtBr), "Tipo de arquivo não suportado.");
    }

    #[test]
    fn test_parameter_and_service_messages() {
        let err = Error::InvalidParameter("k must be between 1 and 5, got 9".into());
        assert_eq!(
            err.user_message(Locale::En),
            "Invalid setting: k must be between 1 and 5, got 9"
        );
        assert_eq!(
            err.user_message(Locale::PtBr),
            "Parâmetro inválido: k must be between 1 and 5, got 9"
        );

        let err = Error::service("openai", "HTTP 503: upstream down");
        assert_eq!(
            err.user_message(Locale::En),
            "The AI service failed: HTTP 503: upstream down"
        );
        assert!(err.user_message(Locale::PtBr).starts_with("Falha no serviço de IA"));

        let err = Error::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk full"));
        assert!(err.user_message(Locale::En).starts_with("Could not store"));
        assert!(!err.user_message(Locale::PtBr).starts_with("Algo deu errado"));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            Error::Authentication("x".into()).kind().status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            Error::BadRequest("too long".into()).kind().status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::UnsupportedType("image/bmp".into()).kind().status_code(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
    }
}
