//! Attribute maps handed over by the profile loader.
//!
//! The document parser lives outside this crate. It hands every node over as
//! an ordered list of `name = value` pairs, and the typed configs of the core
//! are built from those.

use core::num::IntErrorKind;

use crate::error::{Error, Result};

/// Document version this core understands.
pub const DOCUMENT_VERSION: &str = "1.0";

/// Ordered attribute map of a single configuration node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    entries: Vec<(String, String)>,
}

impl Attributes {
    /// Create an empty attribute map.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Insert or replace an attribute.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(entry) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            entry.1 = value;
        } else {
            self.entries.push((name, value));
        }
    }

    /// Builder form of [`Attributes::insert`].
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Get an optional attribute.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get a required attribute.
    pub fn require(&self, name: &str) -> Result<&str> {
        self.get(name)
            .ok_or_else(|| Error::config(format!("missing attribute `{name}`")))
    }

    /// Parse an optional decimal attribute.
    pub fn get_i64(&self, name: &str) -> Result<Option<i64>> {
        self.get(name)
            .map(|raw| {
                raw.trim()
                    .parse::<i64>()
                    .map_err(|_| Error::config(format!("`{name}` is not a number: {raw}")))
            })
            .transpose()
    }

    /// Parse an optional decimal attribute, saturating at the `i64` bounds.
    ///
    /// Only text that is not a number at all is rejected.
    pub fn get_saturating_i64(&self, name: &str) -> Result<Option<i64>> {
        self.get(name)
            .map(|raw| match raw.trim().parse::<i64>() {
                Ok(value) => Ok(value),
                Err(e) if *e.kind() == IntErrorKind::PosOverflow => Ok(i64::MAX),
                Err(e) if *e.kind() == IntErrorKind::NegOverflow => Ok(i64::MIN),
                Err(_) => Err(Error::config(format!("`{name}` is not a number: {raw}"))),
            })
            .transpose()
    }

    /// Parse an optional 16-bit hex attribute (`0x` prefix optional).
    pub fn get_hex_u16(&self, name: &str) -> Result<Option<u16>> {
        self.get(name).map(|raw| parse_hex_u16(name, raw)).transpose()
    }

    /// Parse an optional boolean attribute (`true`/`false`).
    pub fn get_bool(&self, name: &str) -> Result<Option<bool>> {
        self.get(name)
            .map(|raw| match raw.trim() {
                "true" => Ok(true),
                "false" => Ok(false),
                other => Err(Error::config(format!("`{name}` is not a boolean: {other}"))),
            })
            .transpose()
    }

    /// Attributes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut attributes = Self::new();
        for (name, value) in iter {
            attributes.insert(name, value);
        }
        attributes
    }
}

pub(crate) fn parse_hex_u16(name: &str, raw: &str) -> Result<u16> {
    let trimmed = raw.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    u16::from_str_radix(digits, 16)
        .map_err(|_| Error::config(format!("`{name}` is not a 16-bit hex value: {raw}")))
}

/// Check the root `version` attribute of a profile document.
pub fn check_version(found: &str) -> Result<()> {
    if found.trim() == DOCUMENT_VERSION {
        Ok(())
    } else {
        Err(Error::config(format!(
            "unsupported document version {found}, expected {DOCUMENT_VERSION}"
        )))
    }
}
