use crate::error::ServiceError;
use crate::registry::ServiceReference;
use conduit_domain::property::{Properties, PropertyValue};
use std::any::{TypeId, type_name};
use std::fmt;
use std::marker::PhantomData;

/// Capability filter: "service implements `T` AND every listed property matches".
///
/// `T` is usually a trait object such as `dyn RequirementsSource`.
pub struct ServiceFilter<T: ?Sized> {
    properties: Vec<(String, PropertyValue)>,
    _capability: PhantomData<fn() -> Box<T>>,
}

impl<T: ?Sized + 'static> ServiceFilter<T> {
    /// Matches every service registered under capability `T`.
    #[must_use]
    pub const fn capability() -> Self {
        Self { properties: Vec::new(), _capability: PhantomData }
    }

    /// Adds a property equality constraint.
    ///
    /// Values compare by their string form, so `8080` matches `"8080"`.
    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.push((key.into(), value.into()));
        self
    }

    /// Builds a filter matching `key` against the value `source` holds for it.
    ///
    /// # Errors
    /// Returns [`ServiceError::InvalidFilter`] when `source` has no value for `key`.
    pub fn matching(key: &str, source: &Properties) -> Result<Self, ServiceError> {
        let value = source.get(key).ok_or_else(|| ServiceError::InvalidFilter {
            message: format!("property '{key}' is not configured").into(),
            context: Some(type_name::<T>().into()),
        })?;
        Ok(Self::capability().with_property(key, value.clone()))
    }

    #[must_use]
    pub fn matches(&self, reference: &ServiceReference) -> bool {
        reference.capability() == TypeId::of::<T>()
            && self
                .properties
                .iter()
                .all(|(key, expected)| {
                    reference.properties().get(key).is_some_and(|actual| same_value(actual, expected))
                })
    }
}

fn same_value(actual: &PropertyValue, expected: &PropertyValue) -> bool {
    actual == expected || actual.to_string() == expected.to_string()
}

impl<T: ?Sized> Clone for ServiceFilter<T> {
    fn clone(&self) -> Self {
        Self { properties: self.properties.clone(), _capability: PhantomData }
    }
}

impl<T: ?Sized> fmt::Debug for ServiceFilter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceFilter")
            .field("capability", &type_name::<T>())
            .field("properties", &self.properties)
            .finish()
    }
}

/// LDAP-style rendering, e.g. `(&(objectClass=dyn Source)(type=jira))`.
impl<T: ?Sized> fmt::Display for ServiceFilter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.properties.is_empty() {
            return write!(f, "(objectClass={})", type_name::<T>());
        }
        write!(f, "(&(objectClass={})", type_name::<T>())?;
        for (key, value) in &self.properties {
            write!(f, "({key}={value})")?;
        }
        f.write_str(")")
    }
}
