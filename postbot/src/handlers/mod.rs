//! Chain handlers that run before the conversation engine: logging and sender registration.

mod logging;
mod user_registration;

pub use logging::LoggingHandler;
pub use user_registration::UserRegistrationHandler;
