use actix_web::http::StatusCode;
use actix_web::ResponseError;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("dotenv error")]
    DotEnvError(#[from] dotenv::Error),

    #[error("upstream fetch error: {0}")]
    FetchError(#[from] reqwest::Error),

    // stored as text: the actix error type is not Send and would poison
    // every future carrying this enum
    #[error("multipart error: {0}")]
    MultipartError(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("voter has already voted on this application")]
    AlreadyVoted,

    #[error("application is no longer pending")]
    NotPending,

    #[error("validation failed: {0}")]
    ValidationFailed(String),

    #[error("bussiness error: {0}")]
    BusinessError(String),

    #[error("server error: {0}")]
    ServerError(String),
}

impl From<actix_multipart::MultipartError> for Error {
    fn from(e: actix_multipart::MultipartError) -> Self {
        Error::MultipartError(e.to_string())
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::AlreadyVoted | Error::NotPending => StatusCode::CONFLICT,
            Error::ValidationFailed(_) | Error::BusinessError(_) | Error::MultipartError(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
