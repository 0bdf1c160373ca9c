//! IPC records exchanged with the client tool.
//!
//! On the wire a record is every field, then the flags, then the type code,
//! each followed by [`RECORD_SEPARATOR`]. Numbers are written in decimal.

use core::{fmt, ops::BitOr};

use crate::error::{Error, Result};

/// Terminates every value of a wire record.
pub const RECORD_SEPARATOR: char = '\x1e';
/// Separates fields in the readable rendering.
pub const FIELD_SEPARATOR: char = '|';
/// Separates entries inside a field.
pub const SUB_FIELD_SEPARATOR: char = ',';
/// Separates key and value inside an entry.
pub const SUB_SUB_FIELD_SEPARATOR: char = ':';

/// Kind of an IPC message, with its wire code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    LoadProfile,
    FinishLastProfile,
    FinishAllProfiles,
    SetElement,
    SetGroup,
    ClearElement,
    ClearGroup,
    ClearAllElements,
    ClearAllGroups,
    CraftProfile,
    LoadProfileByEmulator,
}

impl MessageType {
    /// Every message type, in code order.
    pub const ALL: [Self; 11] = [
        Self::LoadProfile,
        Self::FinishLastProfile,
        Self::FinishAllProfiles,
        Self::SetElement,
        Self::SetGroup,
        Self::ClearElement,
        Self::ClearGroup,
        Self::ClearAllElements,
        Self::ClearAllGroups,
        Self::CraftProfile,
        Self::LoadProfileByEmulator,
    ];

    /// Wire code.
    pub const fn code(self) -> u8 {
        match self {
            Self::LoadProfile => 0,
            Self::FinishLastProfile => 1,
            Self::FinishAllProfiles => 2,
            Self::SetElement => 3,
            Self::SetGroup => 4,
            Self::ClearElement => 5,
            Self::ClearGroup => 6,
            Self::ClearAllElements => 7,
            Self::ClearAllGroups => 8,
            Self::CraftProfile => 9,
            Self::LoadProfileByEmulator => 10,
        }
    }

    /// Message type of a wire code.
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::LoadProfile),
            1 => Some(Self::FinishLastProfile),
            2 => Some(Self::FinishAllProfiles),
            3 => Some(Self::SetElement),
            4 => Some(Self::SetGroup),
            5 => Some(Self::ClearElement),
            6 => Some(Self::ClearGroup),
            7 => Some(Self::ClearAllElements),
            8 => Some(Self::ClearAllGroups),
            9 => Some(Self::CraftProfile),
            10 => Some(Self::LoadProfileByEmulator),
            _ => None,
        }
    }

    /// Readable name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LoadProfile => "LoadProfile",
            Self::FinishLastProfile => "FinishLastProfile",
            Self::FinishAllProfiles => "FinishAllProfiles",
            Self::SetElement => "SetElement",
            Self::SetGroup => "SetGroup",
            Self::ClearElement => "ClearElement",
            Self::ClearGroup => "ClearGroup",
            Self::ClearAllElements => "ClearAllElements",
            Self::ClearAllGroups => "ClearAllGroups",
            Self::CraftProfile => "CraftProfile",
            Self::LoadProfileByEmulator => "LoadProfileByEmulator",
        }
    }

    /// Whether the message targets profiles rather than single elements.
    pub const fn is_profile_level(self) -> bool {
        matches!(
            self,
            Self::LoadProfile
                | Self::FinishLastProfile
                | Self::FinishAllProfiles
                | Self::CraftProfile
                | Self::LoadProfileByEmulator
        )
    }
}

impl TryFrom<u8> for MessageType {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self> {
        Self::from_code(code).ok_or_else(|| Error::Protocol(format!("unknown message type {code}")))
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Option bits of a message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Flags(u8);

impl Flags {
    /// No flag set.
    pub const NONE: Self = Self(0);
    /// Skip profile animations.
    pub const NO_ANIMATIONS: Self = Self(1);
    /// Skip input handling.
    pub const NO_INPUTS: Self = Self(2);
    /// Reload even if the profile is active.
    pub const FORCE_RELOAD: Self = Self(4);

    const KNOWN: u8 = Self::NO_ANIMATIONS.0 | Self::NO_INPUTS.0 | Self::FORCE_RELOAD.0;

    /// Keep the known bits, drop the rest.
    pub const fn from_bits_truncate(bits: u8) -> Self {
        Self(bits & Self::KNOWN)
    }

    /// Raw flag bits.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Whether every flag of `other` is set.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Set every flag of `other`.
    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }
}

impl BitOr for Flags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// A decoded IPC message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    kind: MessageType,
    flags: Flags,
    fields: Vec<String>,
}

impl Message {
    /// Create a message from its parts.
    pub fn new<I, S>(kind: MessageType, flags: Flags, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind,
            flags,
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Color one element.
    pub fn set_element(element: &str, color: &str) -> Self {
        Self::new(MessageType::SetElement, Flags::NONE, [element, color])
    }

    /// Color every element of a group.
    pub fn set_group(group: &str, color: &str) -> Self {
        Self::new(MessageType::SetGroup, Flags::NONE, [group, color])
    }

    /// Drop the override of one element.
    pub fn clear_element(element: &str) -> Self {
        Self::new(MessageType::ClearElement, Flags::NONE, [element])
    }

    /// Drop the override of a group.
    pub fn clear_group(group: &str) -> Self {
        Self::new(MessageType::ClearGroup, Flags::NONE, [group])
    }

    /// Profile built from `element:color` pairs.
    pub fn craft_profile<'a>(
        game: &str,
        assignments: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Self {
        let separator = SUB_FIELD_SEPARATOR.to_string();
        let field = assignments
            .into_iter()
            .map(|(element, color)| format!("{element}{SUB_SUB_FIELD_SEPARATOR}{color}"))
            .collect::<Vec<_>>()
            .join(separator.as_str());
        Self::new(MessageType::CraftProfile, Flags::NONE, [game.to_string(), field])
    }

    /// Replace the flags.
    #[must_use]
    pub const fn with_flags(mut self, flags: Flags) -> Self {
        self.flags = flags;
        self
    }

    pub const fn kind(&self) -> MessageType {
        self.kind
    }

    pub const fn flags(&self) -> Flags {
        self.flags
    }

    /// Fields in wire order.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Field at `index`, if present.
    pub fn field(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(String::as_str)
    }

    /// Field that has to be present and not blank.
    pub fn require_field(&self, index: usize, what: &str) -> Result<&str> {
        self.field(index)
            .map(str::trim)
            .filter(|field| !field.is_empty())
            .ok_or_else(|| Error::Protocol(format!("{} without {what}", self.kind)))
    }

    /// Wire form of the message.
    pub fn encode(&self) -> Result<String> {
        let mut out = String::new();
        for field in &self.fields {
            if field.contains(RECORD_SEPARATOR) {
                return Err(Error::Protocol(format!(
                    "{} field contains the record separator",
                    self.kind
                )));
            }
            out.push_str(field);
            out.push(RECORD_SEPARATOR);
        }
        out.push_str(&self.flags.bits().to_string());
        out.push(RECORD_SEPARATOR);
        out.push_str(&self.kind.code().to_string());
        out.push(RECORD_SEPARATOR);
        Ok(out)
    }

    /// Parse a wire record.
    ///
    /// Unknown flag bits are dropped, an unknown type is an error.
    pub fn decode(raw: &str) -> Result<Self> {
        let body = raw
            .strip_suffix(RECORD_SEPARATOR)
            .ok_or_else(|| Error::Protocol("unterminated record".to_string()))?;
        let mut values = body.split(RECORD_SEPARATOR).collect::<Vec<_>>();

        let code = values
            .pop()
            .ok_or_else(|| Error::Protocol("record without type".to_string()))?;
        let code = code
            .parse::<u8>()
            .map_err(|_| Error::Protocol(format!("invalid message type `{code}`")))?;
        let kind = MessageType::try_from(code)?;

        let flags = values
            .pop()
            .ok_or_else(|| Error::Protocol(format!("{kind} record without flags")))?;
        let flags = flags
            .parse::<u8>()
            .map_err(|_| Error::Protocol(format!("invalid flags `{flags}`")))?;

        Ok(Self::new(kind, Flags::from_bits_truncate(flags), values))
    }
}

/// Entries of a field, split on [`SUB_FIELD_SEPARATOR`].
pub fn sub_fields(field: &str) -> impl Iterator<Item = &str> {
    field
        .split(SUB_FIELD_SEPARATOR)
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
}

/// Key and value of an entry, split on [`SUB_SUB_FIELD_SEPARATOR`].
pub fn sub_sub_fields(entry: &str) -> Option<(&str, &str)> {
    entry
        .split_once(SUB_SUB_FIELD_SEPARATOR)
        .map(|(key, value)| (key.trim(), value.trim()))
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if !self.flags.is_empty() {
            write!(f, "({})", self.flags.bits())?;
        }
        for field in &self.fields {
            write!(f, "{FIELD_SEPARATOR}{field}")?;
        }
        Ok(())
    }
}
