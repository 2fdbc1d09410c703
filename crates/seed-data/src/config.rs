//! Seed input: the users and posts to insert.

use std::{collections::HashSet, fs, path::Path};

use rand::{Rng, distributions::Alphanumeric};
use serde::Deserialize;
use thiserror::Error;

/// Length of passwords generated for users that come without one.
const GENERATED_PASSWORD_LEN: usize = 24;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read seed file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse seed file: {0}")]
    Json(#[from] serde_json::Error),
}

/// A user to seed. Without a password, a random one is generated at seed time.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedUser {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedPost {
    pub title: String,
    pub content: String,
}

/// A user together with the post they author.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedEntry {
    pub user: SeedUser,
    pub post: SeedPost,
}

/// Configuration for a seeding run.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedConfig {
    /// Rows to insert, in order.
    pub entries: Vec<SeedEntry>,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            entries: vec![
                SeedEntry {
                    user: SeedUser {
                        username: "ethanol1310".to_string(),
                        email: "ethanol@example.com".to_string(),
                        password: None,
                    },
                    post: SeedPost {
                        title: "Title 1".to_string(),
                        content: "asdlfjlka aslkdjfl as salkdjflk kjdsaf lkasjdfl  asdlfn"
                            .to_string(),
                    },
                },
                SeedEntry {
                    user: SeedUser {
                        username: "eth".to_string(),
                        email: "eth@example.com".to_string(),
                        password: None,
                    },
                    post: SeedPost {
                        title: "Title 2".to_string(),
                        content: "Hahahaha".to_string(),
                    },
                },
            ],
        }
    }
}

impl SeedConfig {
    /// Loads a seed config from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Sets `password` on every user that has none.
    pub fn with_password(mut self, password: &str) -> Self {
        for entry in &mut self.entries {
            entry
                .user
                .password
                .get_or_insert_with(|| password.to_string());
        }
        self
    }

    /// Checks the entries can be inserted as a whole. Returns a description
    /// of the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        if self.entries.is_empty() {
            return Err("no seed entries".to_string());
        }

        let mut usernames = HashSet::new();
        let mut emails = HashSet::new();
        let mut titles = HashSet::new();

        for (i, SeedEntry { user, post }) in self.entries.iter().enumerate() {
            if user.username.trim().is_empty() {
                return Err(format!("entry {i}: empty username"));
            }
            if !user.email.contains('@') {
                return Err(format!("entry {i}: invalid email {:?}", user.email));
            }
            if post.title.trim().is_empty() {
                return Err(format!("entry {i}: empty post title"));
            }
            if !usernames.insert(user.username.as_str()) {
                return Err(format!("entry {i}: duplicate username {:?}", user.username));
            }
            if !emails.insert(user.email.as_str()) {
                return Err(format!("entry {i}: duplicate email {:?}", user.email));
            }
            if !titles.insert(post.title.as_str()) {
                return Err(format!("entry {i}: duplicate post title {:?}", post.title));
            }
        }

        Ok(())
    }
}

/// Password to hash for `user`, generating one if none was given.
pub(crate) fn password_for(user: &SeedUser, rng: &mut impl Rng) -> String {
    match &user.password {
        Some(password) => password.clone(),
        None => rng
            .sample_iter(&Alphanumeric)
            .take(GENERATED_PASSWORD_LEN)
            .map(char::from)
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_has_sample_data() {
        let config = SeedConfig::default();
        assert_eq!(config.entries.len(), 2);
        assert_eq!(config.entries[0].user.username, "ethanol1310");
        assert_eq!(config.entries[1].post.title, "Title 2");
        assert!(config.entries.iter().all(|e| e.user.password.is_none()));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_with_password_keeps_explicit_ones() {
        let mut config = SeedConfig::default();
        config.entries[0].user.password = Some("mine".to_string());
        let config = config.with_password("shared");
        assert_eq!(config.entries[0].user.password.as_deref(), Some("mine"));
        assert_eq!(config.entries[1].user.password.as_deref(), Some("shared"));
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        let mut config = SeedConfig::default();
        config.entries[1].user.email = config.entries[0].user.email.clone();
        let err = config.validate().unwrap_err();
        assert!(err.contains("duplicate email"), "{err}");

        let mut config = SeedConfig::default();
        config.entries[1].post.title = "Title 1".to_string();
        assert!(config.validate().unwrap_err().contains("duplicate post title"));
    }

    #[test]
    fn test_validate_rejects_empty_and_malformed() {
        let config = SeedConfig { entries: vec![] };
        assert!(config.validate().is_err());

        let mut config = SeedConfig::default();
        config.entries[0].user.email = "not-an-email".to_string();
        assert!(config.validate().unwrap_err().contains("invalid email"));
    }

    #[test]
    fn test_parse_json_ignores_unknown_keys() {
        let raw = r#"{
            "entries": [
                {
                    "user": { "username": "alice", "email": "alice@example.com", "password": "pw" },
                    "post": { "title": "Hello", "content": "First!" }
                }
            ],
            "drop_tables": ["likes", "comments"]
        }"#;
        let config: SeedConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(config.entries.len(), 1);
        assert_eq!(config.entries[0].user.password.as_deref(), Some("pw"));
    }

    #[test]
    fn test_generated_password() {
        let user = SeedUser {
            username: "bob".to_string(),
            email: "bob@example.com".to_string(),
            password: None,
        };
        let mut rng = rand::thread_rng();
        let first = password_for(&user, &mut rng);
        let second = password_for(&user, &mut rng);
        assert_eq!(first.len(), GENERATED_PASSWORD_LEN);
        assert_ne!(first, second);
    }
}
