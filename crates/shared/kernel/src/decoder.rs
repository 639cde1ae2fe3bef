//! Turns a prefixed slice of the flat key space into a [`Configurable`].
//!
//! The reserved key `pid` becomes the descriptor identity; all other keys keep the
//! suffix left after stripping `prefix.`.

use conduit_domain::constants::PID_KEY;
use conduit_domain::project::Configurable;
use conduit_domain::property::{Pid, Properties, PropertyValue};
use std::borrow::Cow;
use tracing::debug;

#[conduit_derive::conduit_error]
pub enum DecodeError {
    /// `pid` holds something other than a string.
    #[error("Reserved key '{key}' must be a string, found {found}{}", format_context(.context))]
    PidNotString { key: String, found: &'static str, context: Option<Cow<'static, str>> },
}

/// Separates the reserved identity from the remaining suffix-keyed properties.
///
/// Keys must already be stripped of their prefix. A repeated `pid` keeps the last value.
///
/// # Errors
/// Returns [`DecodeError::PidNotString`] if `pid` is not a string.
pub fn split_identity<I>(entries: I) -> Result<(Option<Pid>, Properties), DecodeError>
where
    I: IntoIterator<Item = (String, PropertyValue)>,
{
    let mut pid = None;
    let mut properties = Properties::new();

    for (suffix, value) in entries {
        if suffix != PID_KEY {
            properties.insert(suffix, value);
            continue;
        }
        match value {
            PropertyValue::String(id) => pid = Some(Pid::new(id)),
            other => {
                return Err(DecodeError::PidNotString {
                    key: suffix,
                    found: other.type_name(),
                    context: None,
                });
            },
        }
    }

    Ok((pid, properties))
}

/// Decodes entries with fully qualified keys under `prefix`.
///
/// Entries outside `prefix.` are ignored.
///
/// # Errors
/// Returns [`DecodeError::PidNotString`] with `prefix` as context if `pid` is not a string.
pub fn decode<I>(entries: I, prefix: &str) -> Result<Configurable, DecodeError>
where
    I: IntoIterator<Item = (String, PropertyValue)>,
{
    let stripped = entries.into_iter().filter_map(|(key, value)| {
        let suffix = key.strip_prefix(prefix).and_then(|rest| rest.strip_prefix('.'));
        match suffix {
            Some(suffix) if !suffix.is_empty() => Some((suffix.to_owned(), value)),
            _ => {
                debug!(%key, prefix, "Ignoring entry outside prefix");
                None
            },
        }
    });

    let (pid, properties) = split_identity(stripped).map_err(|e| match e {
        DecodeError::PidNotString { key, found, .. } => DecodeError::PidNotString {
            key: format!("{prefix}.{key}"),
            found,
            context: Some(prefix.to_owned().into()),
        },
    })?;

    Ok(Configurable::new(pid, properties))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(key: &str, value: impl Into<PropertyValue>) -> (String, PropertyValue) {
        (key.to_owned(), value.into())
    }

    #[test]
    fn pid_is_lifted_out_of_properties() {
        let decoded = decode(
            vec![
                entry("project.a.connector.pid", "C1"),
                entry("project.a.connector.type", "X"),
                entry("project.a.connector.url", "http://jira"),
            ],
            "project.a.connector",
        )
        .unwrap();

        assert_eq!(decoded.pid().map(Pid::as_str), Some("C1"));
        assert_eq!(decoded.properties().len(), 2);
        assert!(decoded.property("pid").is_none());
        assert_eq!(decoded.property("type"), Some(&PropertyValue::from("X")));
    }

    #[test]
    fn missing_pid_is_legal() {
        let decoded = decode(vec![entry("p.type", "X")], "p").unwrap();
        assert!(decoded.pid().is_none());
        assert_eq!(decoded.properties().len(), 1);
    }

    #[test]
    fn non_string_pid_is_rejected() {
        let err = decode(vec![entry("p.pid", 7_i64)], "p").unwrap_err();
        let DecodeError::PidNotString { key, found, .. } = &err;
        assert_eq!(key, "p.pid");
        assert_eq!(*found, "integer");
        assert!(err.to_string().contains("(p)"));
    }

    #[test]
    fn nested_suffixes_are_kept_whole() {
        let decoded = decode(vec![entry("p.auth.token", "t"), entry("px.other", "x")], "p").unwrap();
        assert_eq!(decoded.property("auth.token"), Some(&PropertyValue::from("t")));
        assert!(decoded.property("other").is_none());
    }
}
