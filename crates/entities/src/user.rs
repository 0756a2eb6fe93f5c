//! User-related entity definitions.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Status of a directed friendship (`user -> friend`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FriendStatus {
    /// Request sent, not yet answered.
    Unconfirmed,
    /// Friendship accepted.
    Confirmed,
    /// Request declined.
    Rejected,
}

impl FriendStatus {
    /// Returns the stored representation of this status.
    pub fn as_str(self) -> &'static str {
        match self {
            FriendStatus::Unconfirmed => "UNCONFIRMED",
            FriendStatus::Confirmed => "CONFIRMED",
            FriendStatus::Rejected => "REJECTED",
        }
    }
}

impl fmt::Display for FriendStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FriendStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "UNCONFIRMED" => Ok(FriendStatus::Unconfirmed),
            "CONFIRMED" => Ok(FriendStatus::Confirmed),
            "REJECTED" => Ok(FriendStatus::Rejected),
            other => Err(format!("unknown friend status: {other}")),
        }
    }
}

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Identifier assigned by the store on creation.
    pub id: i64,
    /// Email address.
    pub email: String,
    /// Login, never contains whitespace.
    pub login: String,
    /// Display name, falls back to the login.
    pub name: String,
    /// Date of birth.
    pub birthday: Option<NaiveDate>,
    /// Friendship status per friend id, for friendships this user initiated.
    #[serde(rename = "friendsStatuses", default)]
    pub friend_statuses: BTreeMap<i64, FriendStatus>,
}

impl User {
    /// Creates a user whose display name is the login.
    pub fn new(email: impl Into<String>, login: impl Into<String>) -> Self {
        let login = login.into();
        Self {
            id: 0,
            email: email.into(),
            name: login.clone(),
            login,
            birthday: None,
            friend_statuses: BTreeMap::new(),
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the birthday.
    pub fn with_birthday(mut self, birthday: NaiveDate) -> Self {
        self.birthday = Some(birthday);
        self
    }

    /// Ids of friends with a confirmed friendship.
    pub fn confirmed_friend_ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.friend_statuses
            .iter()
            .filter(|(_, status)| **status == FriendStatus::Confirmed)
            .map(|(id, _)| *id)
    }
}

/// Request payload for creating or updating a user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserInput {
    /// Required on update, ignored on create.
    pub id: Option<i64>,
    pub email: String,
    pub login: String,
    pub name: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub friends_statuses: Option<BTreeMap<i64, FriendStatus>>,
}

impl UserInput {
    /// Converts the payload into a user, defaulting a blank name to the login.
    pub fn into_user(self) -> User {
        let name = match self.name {
            Some(name) if !name.trim().is_empty() => name,
            _ => self.login.clone(),
        };

        User {
            id: self.id.unwrap_or_default(),
            email: self.email,
            login: self.login,
            name,
            birthday: self.birthday,
            friend_statuses: self.friends_statuses.unwrap_or_default(),
        }
    }
}

impl From<User> for UserInput {
    fn from(user: User) -> Self {
        Self {
            id: Some(user.id),
            email: user.email,
            login: user.login,
            name: Some(user.name),
            birthday: user.birthday,
            friends_statuses: Some(user.friend_statuses),
        }
    }
}
