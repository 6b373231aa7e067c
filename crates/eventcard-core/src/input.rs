//! Registrant data fed to the card renderer.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::text::display_first_name;

/// Validation failures for registrant input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("Name is required")]
    EmptyName,

    #[error("Invalid role. Must be \"attendee\" or \"speaker\"")]
    InvalidRole(String),

    #[error("Speakers must provide a talk title and bio")]
    MissingSpeakerDetails,
}

/// Registrant role without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Attendee,
    Speaker,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Attendee => "attendee",
            Role::Speaker => "speaker",
        }
    }

    /// Label printed in the card badge.
    pub fn badge_label(self) -> &'static str {
        match self {
            Role::Attendee => "ATTENDEE",
            Role::Speaker => "SPEAKER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "attendee" => Ok(Role::Attendee),
            "speaker" => Ok(Role::Speaker),
            other => Err(InputError::InvalidRole(other.to_string())),
        }
    }
}

/// Role plus the fields that only exist for that role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum RoleDetails {
    Attendee,
    #[serde(rename_all = "camelCase")]
    Speaker { talk_title: String, bio: String },
}

impl RoleDetails {
    /// Build role details from loosely typed form fields.
    pub fn from_parts(
        role: &str,
        talk_title: Option<&str>,
        bio: Option<&str>,
    ) -> Result<Self, InputError> {
        match role.parse()? {
            Role::Attendee => Ok(RoleDetails::Attendee),
            Role::Speaker => {
                let talk_title = talk_title.map(str::trim).unwrap_or_default();
                let bio = bio.map(str::trim).unwrap_or_default();
                if talk_title.is_empty() || bio.is_empty() {
                    return Err(InputError::MissingSpeakerDetails);
                }
                Ok(RoleDetails::Speaker {
                    talk_title: talk_title.to_string(),
                    bio: bio.to_string(),
                })
            }
        }
    }

    pub fn role(&self) -> Role {
        match self {
            RoleDetails::Attendee => Role::Attendee,
            RoleDetails::Speaker { .. } => Role::Speaker,
        }
    }

    pub fn talk_title(&self) -> Option<&str> {
        match self {
            RoleDetails::Attendee => None,
            RoleDetails::Speaker { talk_title, .. } => Some(talk_title),
        }
    }

    pub fn bio(&self) -> Option<&str> {
        match self {
            RoleDetails::Attendee => None,
            RoleDetails::Speaker { bio, .. } => Some(bio),
        }
    }
}

/// Everything the card renderer knows about a registrant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrantInput {
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub organization: Option<String>,
    /// URL of a stored profile image.
    #[serde(default)]
    pub photo: Option<String>,
    #[serde(flatten)]
    pub role: RoleDetails,
}

impl RegistrantInput {
    pub fn attendee(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: String::new(),
            phone_number: String::new(),
            organization: None,
            photo: None,
            role: RoleDetails::Attendee,
        }
    }

    pub fn speaker(
        name: impl Into<String>,
        talk_title: impl Into<String>,
        bio: impl Into<String>,
    ) -> Self {
        Self {
            role: RoleDetails::Speaker {
                talk_title: talk_title.into(),
                bio: bio.into(),
            },
            ..Self::attendee(name)
        }
    }

    pub fn with_photo(mut self, url: impl Into<String>) -> Self {
        self.photo = Some(url.into());
        self
    }

    pub fn role(&self) -> Role {
        self.role.role()
    }

    /// Uppercased first token of the name, as printed on cards.
    pub fn first_name(&self) -> String {
        display_first_name(&self.name)
    }

    pub fn validate(&self) -> Result<(), InputError> {
        if self.name.trim().is_empty() {
            return Err(InputError::EmptyName);
        }
        if let RoleDetails::Speaker { talk_title, bio } = &self.role {
            if talk_title.trim().is_empty() || bio.trim().is_empty() {
                return Err(InputError::MissingSpeakerDetails);
            }
        }
        Ok(())
    }
}
