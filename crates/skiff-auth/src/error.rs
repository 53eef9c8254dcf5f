use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no user logged in. Run `skiff auth login` to log in and get a token")]
    Unauthenticated,

    #[error("could not allocate port for the callback server: {0}")]
    PortAllocation(String),

    #[error("could not prepare the login confirmation page: {0}")]
    Template(String),

    #[error("credential store error: {0}")]
    Persistence(String),

    #[error("invalid login URL: {0}")]
    InvalidLoginUrl(String),

    #[error("browser callback timed out after {0}s")]
    CallbackTimeout(u64),

    #[error("login cancelled before the browser callback arrived")]
    Cancelled,

    #[error("callback server stopped before delivering a credential")]
    CallbackClosed,

    #[error("HTTP client error: {0}")]
    Http(String),
}
