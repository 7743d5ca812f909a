use thiserror::Error;

use crate::domain::RecordId;

/// How a failure is presented to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Backend unreachable; shown as a banner about the mock server.
    Network,
    NotFound,
    /// Blocks the submission with an inline message.
    Validation,
    Unexpected,
}

/// Every failure is caught where the action started and turned into a
/// message; nothing is retried.
pub trait UserFacing {
    fn kind(&self) -> FailureKind;
    fn user_message(&self) -> String;
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    #[error("Mock data store unreachable: {0}")]
    Unreachable(String),
    #[error("{collection}/{id} not found")]
    NotFound { collection: &'static str, id: RecordId },
    #[error("{collection}/{id} already exists")]
    Duplicate { collection: &'static str, id: RecordId },
    #[error("Mock data store answered {status} for {collection}")]
    Status { collection: &'static str, status: u16 },
    #[error("Malformed {collection} payload: {reason}")]
    Decode { collection: &'static str, reason: String },
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl UserFacing for StoreError {
    fn kind(&self) -> FailureKind {
        match self {
            StoreError::Unreachable(_) => FailureKind::Network,
            StoreError::NotFound { .. } | StoreError::Status { status: 404, .. } => {
                FailureKind::NotFound
            }
            _ => FailureKind::Unexpected,
        }
    }

    fn user_message(&self) -> String {
        match self {
            StoreError::Unreachable(_) => {
                "Cannot connect to server. Make sure the mock data server is running on port 3001."
                    .to_string()
            }
            StoreError::NotFound { collection, id } => {
                format!("No {} record found with id {}.", singular(collection), id)
            }
            StoreError::Status { status: 404, .. } => {
                "Server endpoint not found. Check that the mock data server is running.".to_string()
            }
            StoreError::Status { status: 500, .. } => {
                "Server error. Check that the mock data server's database file exists.".to_string()
            }
            _ => "Something went wrong. Please try again.".to_string(),
        }
    }
}

fn singular(collection: &str) -> &str {
    match collection {
        "menu" => "menu",
        other => other.strip_suffix('s').unwrap_or(other),
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum AuthError {
    #[error("Required signup fields are missing")]
    MissingFields,
    #[error("Passwords do not match")]
    PasswordMismatch,
    #[error("Password shorter than {0} characters")]
    PasswordTooShort(usize),
    #[error("Password is empty")]
    MissingPassword,
    #[error("No account for {0}")]
    NoAccount(String),
    #[error("Email already registered: {0}")]
    EmailTaken(String),
    #[error("No user is signed in")]
    NotSignedIn,
    #[error("Profile not found: {0}")]
    ProfileNotFound(RecordId),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl UserFacing for AuthError {
    fn kind(&self) -> FailureKind {
        match self {
            AuthError::MissingFields
            | AuthError::PasswordMismatch
            | AuthError::PasswordTooShort(_)
            | AuthError::MissingPassword
            | AuthError::EmailTaken(_) => FailureKind::Validation,
            AuthError::NoAccount(_) | AuthError::ProfileNotFound(_) => FailureKind::NotFound,
            AuthError::NotSignedIn | AuthError::Session(_) => FailureKind::Unexpected,
            AuthError::Store(e) => e.kind(),
        }
    }

    fn user_message(&self) -> String {
        match self {
            AuthError::MissingFields => "Please fill in all required fields".to_string(),
            AuthError::PasswordMismatch => "Passwords do not match".to_string(),
            AuthError::PasswordTooShort(min) => {
                format!("Password must be at least {min} characters long")
            }
            AuthError::MissingPassword => "Please enter your password".to_string(),
            AuthError::NoAccount(_) => {
                "No account found with this email. Please sign up.".to_string()
            }
            AuthError::EmailTaken(_) => "An account with this email already exists".to_string(),
            AuthError::NotSignedIn => "Please log in to continue".to_string(),
            AuthError::ProfileNotFound(_) => "Failed to load profile data".to_string(),
            AuthError::Session(e) => e.user_message(),
            AuthError::Store(e) => e.user_message(),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CartError {
    #[error("Cart not found: {0}")]
    NotFound(RecordId),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl UserFacing for CartError {
    fn kind(&self) -> FailureKind {
        match self {
            CartError::NotFound(_) => FailureKind::NotFound,
            CartError::Session(e) => e.kind(),
            CartError::Store(e) => e.kind(),
        }
    }

    fn user_message(&self) -> String {
        match self {
            CartError::NotFound(_) => "Your cart could not be found".to_string(),
            CartError::Session(e) => e.user_message(),
            CartError::Store(e) => e.user_message(),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CheckoutError {
    #[error("No payment method selected")]
    PaymentMethodMissing,
    #[error("Cart is empty")]
    EmptyCart,
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl UserFacing for CheckoutError {
    fn kind(&self) -> FailureKind {
        match self {
            CheckoutError::PaymentMethodMissing | CheckoutError::EmptyCart => {
                FailureKind::Validation
            }
            CheckoutError::Session(e) => e.kind(),
            CheckoutError::Store(e) => e.kind(),
        }
    }

    fn user_message(&self) -> String {
        match self {
            CheckoutError::PaymentMethodMissing => "Please select a payment method".to_string(),
            CheckoutError::EmptyCart => "Your cart is empty".to_string(),
            CheckoutError::Session(e) => e.user_message(),
            CheckoutError::Store(StoreError::Unreachable(_)) => {
                StoreError::Unreachable(String::new()).user_message()
            }
            CheckoutError::Store(_) => "Failed to place order. Please try again.".to_string(),
        }
    }
}

impl From<CartError> for CheckoutError {
    fn from(err: CartError) -> Self {
        match err {
            CartError::NotFound(id) => CheckoutError::Store(StoreError::NotFound {
                collection: "carts",
                id,
            }),
            CartError::Session(e) => CheckoutError::Session(e),
            CartError::Store(e) => CheckoutError::Store(e),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    NotFound(RecordId),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl UserFacing for OrderError {
    fn kind(&self) -> FailureKind {
        match self {
            OrderError::NotFound(_) => FailureKind::NotFound,
            OrderError::Store(e) => e.kind(),
        }
    }

    fn user_message(&self) -> String {
        match self {
            OrderError::NotFound(_) => "Order not found".to_string(),
            OrderError::Store(e) => e.user_message(),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SessionError {
    #[error("Session storage I/O failed: {0}")]
    Io(String),
    #[error("Session value for {key} could not be encoded: {reason}")]
    Encode { key: String, reason: String },
}

impl UserFacing for SessionError {
    fn kind(&self) -> FailureKind {
        FailureKind::Unexpected
    }

    fn user_message(&self) -> String {
        "Could not save your session. Please try again.".to_string()
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid {key} value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}
