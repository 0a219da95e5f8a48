//! Control protocol responses and their wire format.
//!
//! The `Display` implementation renders the exact texts clients match on, so
//! every change here is a wire format change. Counted listings pluralize the
//! noun only above one item (`1 active peer:`, `2 active peers:`), and empty
//! listings use a distinct message shape instead of a zero count.
use std::fmt;

use bittrickle_primitives::endpoint::TransferEndpoint;
use bittrickle_primitives::username::Username;

/// A reply to one control command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    AuthenticationSuccess,
    UnknownUsername,
    PasswordMismatch,
    AlreadyActive,
    Holder(TransferEndpoint),
    FileNotFound,
    ActivePeers(Vec<Username>),
    PublishedFiles(Vec<String>),
    MatchingFiles(Vec<String>),
    FilePublished,
    FileUnpublished,
    UnpublishFailed,
    Goodbye,
    NotAuthenticated,
    InvalidCommand,
}

impl Response {
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Response::AuthenticationSuccess => f.write_str("Authentication Success"),
            Response::UnknownUsername => f.write_str("Unknown username"),
            Response::PasswordMismatch => f.write_str("Password does not match"),
            Response::AlreadyActive => f.write_str("User already active"),
            Response::Holder(endpoint) => write!(f, "{endpoint}"),
            Response::FileNotFound => f.write_str("File not found"),
            Response::ActivePeers(peers) if peers.is_empty() => f.write_str("No active peers"),
            Response::ActivePeers(peers) => {
                let names: Vec<&str> = peers.iter().map(Username::as_str).collect();
                write!(f, "{} active peer{}:\n{}", names.len(), plural(names.len()), names.join("\n"))
            }
            Response::PublishedFiles(files) if files.is_empty() => f.write_str("No published files"),
            Response::PublishedFiles(files) => {
                write!(f, "{} file{} published:\n{}", files.len(), plural(files.len()), files.join("\n"))
            }
            Response::MatchingFiles(files) if files.is_empty() => f.write_str("No files found"),
            Response::MatchingFiles(files) => {
                write!(f, "{} file{} found:\n{}", files.len(), plural(files.len()), files.join("\n"))
            }
            Response::FilePublished => f.write_str("File published successfully"),
            Response::FileUnpublished => f.write_str("File unpublished successfully"),
            Response::UnpublishFailed => f.write_str("File unpublication failed"),
            Response::Goodbye => f.write_str("Goodbye!"),
            Response::NotAuthenticated => f.write_str("You are not authenticated."),
            Response::InvalidCommand => f.write_str("Invalid command."),
        }
    }
}

fn plural(count: usize) -> &'static str {
    if count > 1 {
        "s"
    } else {
        ""
    }
}
