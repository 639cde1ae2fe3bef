use conduit_derive::conduit_error;
use std::borrow::Cow;

#[conduit_error]
pub enum SinkError {
    #[error("Sink I/O error{}: {source}", format_context(.context))]
    Io {
        #[source]
        source: std::io::Error,
        context: Option<Cow<'static, str>>,
    },

    #[error("Missing pid{}: {message}", format_context(.context))]
    MissingPid { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn open() -> Result<(), SinkError> {
    std::fs::read("/nonexistent").context("Reading factory store")?;
    Ok(())
}

fn main() {
    let err = open().unwrap_err();
    assert_eq!(err.kind(), "Io");

    let err: SinkError = "boom".into();
    assert_eq!(err.kind(), "Internal");

    let err: Result<(), SinkError> =
        Err(SinkError::MissingPid { message: "connector".into(), context: None });
    let err = err.context("binding project a").unwrap_err();
    assert_eq!(err.to_string(), "Missing pid (binding project a): connector");
}
