//! Wire and domain types for the viewer's profile and creators.

use serde::{Deserialize, Serialize};

/// Body of `GET /me/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub has_avatar: bool,
}

/// Body of `GET /creators/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCreators {
    pub creators: Vec<CreatorRecord>,
}

/// A creator owned by the viewer. `url` is the stable public key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatorRecord {
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_avatar: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_banner: Option<bool>,
}

impl CreatorRecord {
    /// API path of the creator's avatar, if it has one.
    pub fn avatar_path(&self) -> Option<String> {
        self.has_avatar
            .unwrap_or(false)
            .then(|| format!("/creators/{}/avatar", self.id))
    }

    /// API path of the creator's banner, if it has one.
    pub fn banner_path(&self) -> Option<String> {
        self.has_banner
            .unwrap_or(false)
            .then(|| format!("/creators/{}/banner", self.id))
    }
}

/// Who is currently viewing. Only exists while the session is authorized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerIdentity {
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub has_avatar: bool,
}

impl From<UserProfile> for ViewerIdentity {
    fn from(profile: UserProfile) -> Self {
        Self {
            id: profile.id,
            username: profile.username,
            display_name: profile.display_name,
            has_avatar: profile.has_avatar,
        }
    }
}
