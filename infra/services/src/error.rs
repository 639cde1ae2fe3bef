use std::borrow::Cow;

/// Errors raised by the service registry and the factory configuration store.
#[conduit_derive::conduit_error]
pub enum ServiceError {
    /// No matching service registered before the deadline.
    #[error("Timed out waiting for service{}: {message}", format_context(.context))]
    Timeout { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A filter references a property the descriptor does not define.
    #[error("Invalid service filter{}: {message}", format_context(.context))]
    InvalidFilter { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A factory configuration was submitted without a usable pid.
    #[error("Invalid factory pid{}: {message}", format_context(.context))]
    InvalidPid { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The registration event stream closed while a tracker was waiting.
    #[error("Service event stream closed{}: {message}", format_context(.context))]
    Closed { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal service registry error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
