//! Tracker authentication: the credential gate.
//!
//! The credential store is a read-only `username → password` mapping loaded
//! once, before the tracker starts serving. There is no way to add or change
//! entries at runtime; the tracker only consults the store when a peer sends
//! an `auth` command.
//!
//! The on-disk format is one `username password` pair per line:
//!
//! ```text
//! alice Wonderland!23
//! bob Builder#99
//! ```
use std::collections::HashMap;
use std::panic::Location;

use bittrickle_primitives::username::Username;
use thiserror::Error;
use tracing::info;

use crate::core::error;

/// Error loading the credentials file.
#[derive(Error, Debug)]
pub enum Error {
    #[error("could not read the credentials file {path}: {source}")]
    UnreadableFile { path: String, source: std::io::Error },

    #[error("malformed credentials file {path}, line {line}: expected one `username password` pair")]
    MalformedLine { path: String, line: usize },
}

/// Read-only credential store consulted by the authentication handler.
#[derive(Debug, Default)]
pub struct Credentials {
    entries: HashMap<Username, String>,
}

impl Credentials {
    /// Loads the store from a credentials file, one `username password` pair
    /// per line. Blank lines are skipped.
    ///
    /// # Errors
    ///
    /// Will return an error if the file cannot be read or one of its lines
    /// does not contain exactly one username token and one password token.
    pub fn load_from_file(path: &str) -> Result<Credentials, Error> {
        let contents = std::fs::read_to_string(path).map_err(|source| Error::UnreadableFile {
            path: path.to_owned(),
            source,
        })?;

        let mut entries = HashMap::new();

        for (index, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let mut tokens = line.split_whitespace();
            let (Some(username), Some(password), None) = (tokens.next(), tokens.next(), tokens.next()) else {
                return Err(Error::MalformedLine {
                    path: path.to_owned(),
                    line: index + 1,
                });
            };

            let username = username.parse::<Username>().map_err(|_| Error::MalformedLine {
                path: path.to_owned(),
                line: index + 1,
            })?;

            entries.insert(username, password.to_owned());
        }

        info!("Loaded {} credential entries from {path}", entries.len());

        Ok(Credentials { entries })
    }

    /// Builds a store from in-memory pairs.
    ///
    /// # Panics
    ///
    /// Will panic if one of the usernames is not a valid token. It is meant
    /// for fixtures, where the pairs are literals.
    #[must_use]
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Credentials {
        let entries = pairs
            .iter()
            .map(|(username, password)| {
                (
                    username.parse().expect("the username fixture should be a valid token"),
                    (*password).to_owned(),
                )
            })
            .collect();

        Credentials { entries }
    }

    /// It verifies a `username`/`password` pair against the store.
    ///
    /// # Errors
    ///
    /// Will return `Error::UnknownUser` if the username has no entry and
    /// `Error::WrongPassword` if the stored password differs.
    pub fn verify(&self, username: &Username, password: &str) -> Result<(), error::Error> {
        match self.entries.get(username) {
            None => Err(error::Error::UnknownUser {
                username: username.clone(),
                location: Location::caller(),
            }),
            Some(expected) if expected == password => Ok(()),
            Some(_) => Err(error::Error::WrongPassword {
                username: username.clone(),
                location: Location::caller(),
            }),
        }
    }
}
