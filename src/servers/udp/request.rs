//! Parsing of inbound control messages.
//!
//! A control message is a single line of space-separated tokens: the command
//! name first, then its arguments. Extra tokens after the expected arguments
//! are ignored, like the original wire format does.
use std::str::{self, FromStr};

use bittrickle_primitives::username::Username;
use thiserror::Error;

/// A parsed control command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Authenticate {
        username: Username,
        password: String,
        transfer_port: u16,
    },
    Heartbeat {
        username: Username,
    },
    Get {
        filename: String,
    },
    ListActivePeers,
    ListPublishedFiles,
    Publish {
        filename: String,
    },
    Search {
        substring: String,
    },
    Unpublish {
        filename: String,
    },
    Exit,
}

/// Error returned when a datagram does not contain a valid control message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty control message")]
    Empty,

    #[error("control message is not valid UTF-8")]
    InvalidEncoding,

    #[error("unknown command: {command}")]
    UnknownCommand { command: String },

    #[error("missing argument `{argument}` for command `{command}`")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },

    #[error("invalid username: {value}")]
    InvalidUsername { value: String },

    #[error("invalid transfer port: {value}")]
    InvalidPort { value: String },
}

impl Request {
    /// It parses one datagram payload.
    ///
    /// # Errors
    ///
    /// Will return a `ParseError` if the payload is not valid UTF-8 or does
    /// not contain a valid command line.
    pub fn from_bytes(payload: &[u8]) -> Result<Request, ParseError> {
        str::from_utf8(payload).map_err(|_| ParseError::InvalidEncoding)?.parse()
    }
}

impl FromStr for Request {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut tokens = s.split_whitespace();

        let Some(command) = tokens.next() else {
            return Err(ParseError::Empty);
        };

        match command {
            "auth" => {
                let username = parse_username("auth", tokens.next())?;
                let password = required("auth", "password", tokens.next())?.to_owned();
                let transfer_port = parse_port(tokens.next())?;

                Ok(Request::Authenticate {
                    username,
                    password,
                    transfer_port,
                })
            }
            "heartbeat" => Ok(Request::Heartbeat {
                username: parse_username("heartbeat", tokens.next())?,
            }),
            "get" => Ok(Request::Get {
                filename: required("get", "filename", tokens.next())?.to_owned(),
            }),
            "lap" => Ok(Request::ListActivePeers),
            "lpf" => Ok(Request::ListPublishedFiles),
            "pub" => Ok(Request::Publish {
                filename: required("pub", "filename", tokens.next())?.to_owned(),
            }),
            "sch" => Ok(Request::Search {
                substring: required("sch", "substring", tokens.next())?.to_owned(),
            }),
            "unp" => Ok(Request::Unpublish {
                filename: required("unp", "filename", tokens.next())?.to_owned(),
            }),
            "xit" => Ok(Request::Exit),
            command => Err(ParseError::UnknownCommand {
                command: command.to_owned(),
            }),
        }
    }
}

fn required<'a>(command: &'static str, argument: &'static str, token: Option<&'a str>) -> Result<&'a str, ParseError> {
    token.ok_or(ParseError::MissingArgument { command, argument })
}

fn parse_username(command: &'static str, token: Option<&str>) -> Result<Username, ParseError> {
    let token = required(command, "username", token)?;

    token.parse().map_err(|_| ParseError::InvalidUsername {
        value: token.to_owned(),
    })
}

fn parse_port(token: Option<&str>) -> Result<u16, ParseError> {
    let token = required("auth", "transfer_port", token)?;

    token.parse().map_err(|_| ParseError::InvalidPort {
        value: token.to_owned(),
    })
}
