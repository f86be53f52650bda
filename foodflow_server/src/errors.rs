use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use foodflow_engine::{AccountApiError, AuthApiError, CatalogApiError, OrderFlowError};
use razorpay_tools::RazorpayApiError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("Could not read request path: {0}")]
    InvalidRequestPath(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("Authentication Error. {0}")]
    AuthenticationError(#[from] AuthError),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("Insufficient Permissions. {0}")]
    InsufficientPermissions(String),
    #[error("Could not create a payment order with the provider. {0}")]
    PaymentInitiationError(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::InvalidRequestPath(_) => StatusCode::BAD_REQUEST,
            Self::AuthenticationError(e) => match e {
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::InsufficientPermissions(_) => StatusCode::FORBIDDEN,
                AuthError::TokenIssueError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::InsufficientPermissions(_) => StatusCode::FORBIDDEN,
            Self::PaymentInitiationError(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("Invalid email address or password.")]
    InvalidCredentials,
    #[error("Insufficient Permissions. {0}")]
    InsufficientPermissions(String),
    #[error("Could not issue access token. {0}")]
    TokenIssueError(String),
}

impl From<AuthApiError> for ServerError {
    fn from(e: AuthApiError) -> Self {
        match e {
            AuthApiError::InvalidCredentials => Self::AuthenticationError(AuthError::InvalidCredentials),
            AuthApiError::EmailAlreadyInUse => Self::InvalidRequestBody(e.to_string()),
            AuthApiError::UserNotFound => Self::NoRecordFound(e.to_string()),
            AuthApiError::RoleNotAllowed(_) => {
                Self::AuthenticationError(AuthError::InsufficientPermissions(e.to_string()))
            },
            AuthApiError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
        }
    }
}

impl From<OrderFlowError> for ServerError {
    fn from(e: OrderFlowError) -> Self {
        match &e {
            OrderFlowError::OrderNotFound(_) |
            OrderFlowError::RestaurantNotFound(_) |
            OrderFlowError::MenuItemNotFound(_) |
            OrderFlowError::PaymentRefNotFound(_) => Self::NoRecordFound(e.to_string()),
            OrderFlowError::EmptyOrder |
            OrderFlowError::InvalidQuantity |
            OrderFlowError::MenuItemUnavailable(_) |
            OrderFlowError::ItemFromOtherRestaurant { .. } |
            OrderFlowError::StatusChangeNoOp |
            OrderFlowError::StatusChangeForbidden => Self::InvalidRequestBody(e.to_string()),
            OrderFlowError::DatabaseError(_) | OrderFlowError::AccountError(_) | OrderFlowError::CatalogError(_) => {
                Self::BackendError(e.to_string())
            },
        }
    }
}

impl From<AccountApiError> for ServerError {
    fn from(e: AccountApiError) -> Self {
        Self::BackendError(e.to_string())
    }
}

impl From<CatalogApiError> for ServerError {
    fn from(e: CatalogApiError) -> Self {
        Self::BackendError(e.to_string())
    }
}

impl From<RazorpayApiError> for ServerError {
    fn from(e: RazorpayApiError) -> Self {
        Self::PaymentInitiationError(e.to_string())
    }
}
