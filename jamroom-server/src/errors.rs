use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use jamroom_collab::{AuthError, LibraryError, RoomError};
use jamroom_core::PlaybackError;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

pub type ServerResult<T> = Result<T, ServerError>;

/// The category of a failure, shared by HTTP responses and gateway error events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    Validation,
    Unauthorized,
    NotFound,
    Conflict,
    TooLarge,
    Internal,
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Room(#[from] RoomError),
    #[error(transparent)]
    Library(#[from] LibraryError),
    #[error("{0}")]
    Validation(String),
    #[error("Request body is larger than {max} bytes")]
    PayloadTooLarge { max: u64 },
    #[error("Unknown internal error: {0}")]
    Unknown(String),
}

/// The JSON body of every failed request
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    error: ErrorKind,
    message: String,
}

impl ErrorKind {
    pub fn as_status_code(&self) -> StatusCode {
        match self {
            Self::Validation => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Conflict => StatusCode::CONFLICT,
            Self::TooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<&RoomError> for ErrorKind {
    fn from(value: &RoomError) -> Self {
        match value {
            RoomError::RoomNotFound(_)
            | RoomError::MemberNotFound
            | RoomError::NoHostRequest
            | RoomError::QueueItemNotFound => Self::NotFound,
            RoomError::InvalidRoomId(_) => Self::Validation,
            RoomError::NotInRoom | RoomError::NotHost | RoomError::InvalidPassword => {
                Self::Unauthorized
            }
            RoomError::AlreadyHost
            | RoomError::HostReserved
            | RoomError::HostRequestPending
            | RoomError::QueueEmpty => Self::Conflict,
            RoomError::Playback(PlaybackError::NothingLoaded) => Self::Conflict,
            RoomError::Playback(_) => Self::Validation,
            RoomError::Auth(AuthError::InvalidCredentials) => Self::Unauthorized,
            RoomError::Auth(_) => Self::Internal,
        }
    }
}

impl From<&LibraryError> for ErrorKind {
    fn from(value: &LibraryError) -> Self {
        match value {
            LibraryError::NotFound(_) => Self::NotFound,
            LibraryError::UnsupportedType(_) | LibraryError::InvalidName(_) => Self::Validation,
            LibraryError::TooLarge { .. } => Self::TooLarge,
            LibraryError::Io(_) => Self::Internal,
        }
    }
}

impl ServerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Room(e) => e.into(),
            Self::Library(e) => e.into(),
            Self::Validation(_) => ErrorKind::Validation,
            Self::PayloadTooLarge { .. } => ErrorKind::TooLarge,
            Self::Unknown(_) => ErrorKind::Internal,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let kind = self.kind();

        if kind == ErrorKind::Internal {
            log::error!("Request failed: {}", self);
        }

        let body = ErrorBody {
            error: kind,
            message: self.to_string(),
        };

        (kind.as_status_code(), Json(body)).into_response()
    }
}
