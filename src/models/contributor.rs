//! Contributor directory model.

use serde::Serialize;

/// A link to one of a contributor's public profiles.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SocialLink {
    pub network: String,
    pub url: String,
}

/// A writer, editor or illustrator listed in the directory.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Contributor {
    pub id: String,
    pub name: String,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    pub socials: Vec<SocialLink>,
}
