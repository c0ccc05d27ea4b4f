//! Token lifecycle wire protocol.
//!
//! Peers manage gateway tokens through short text messages, a two-letter
//! code optionally followed by one space and a payload. Requests flow in,
//! responses flow out; the codec is symmetric so either side can be tested
//! against the other.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ============================================================
// Wire codes
// ============================================================

/// Request: list all known tokens.
pub const REQ_TOKENS: &str = "GT";
/// Response: token listing, values space-separated in the payload.
pub const RESP_TOKENS: &str = "TG";
/// Request: create a token, value in the payload.
pub const REQ_CREATE_TOKEN: &str = "NT";
/// Response: token created.
pub const RESP_CREATE_TOKEN: &str = "TN";
/// Request: delete the addressed token.
pub const REQ_DELETE_TOKEN: &str = "DT";
/// Response: token deleted.
pub const RESP_DELETE_TOKEN: &str = "TD";
/// Response: request could not be served.
pub const RESP_FATAL: &str = "EE";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Unknown message code: {0}")]
    UnknownCode(String),
    #[error("Message {0} requires a payload")]
    MissingPayload(&'static str),
    #[error("Empty message")]
    Empty,
}

// ============================================================
// Requests
// ============================================================

/// Inbound token management request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenRequest {
    GetTokens,
    CreateToken { value: String },
    DeleteToken,
}

impl FromStr for TokenRequest {
    type Err = ProtocolError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let (code, payload) = split_message(raw)?;
        match code {
            REQ_TOKENS => Ok(TokenRequest::GetTokens),
            REQ_CREATE_TOKEN => match payload {
                Some(value) if !value.is_empty() => Ok(TokenRequest::CreateToken {
                    value: value.to_string(),
                }),
                _ => Err(ProtocolError::MissingPayload(REQ_CREATE_TOKEN)),
            },
            REQ_DELETE_TOKEN => Ok(TokenRequest::DeleteToken),
            other => Err(ProtocolError::UnknownCode(other.to_string())),
        }
    }
}

impl fmt::Display for TokenRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenRequest::GetTokens => f.write_str(REQ_TOKENS),
            TokenRequest::CreateToken { value } => write!(f, "{REQ_CREATE_TOKEN} {value}"),
            TokenRequest::DeleteToken => f.write_str(REQ_DELETE_TOKEN),
        }
    }
}

// ============================================================
// Responses
// ============================================================

/// Outbound token management response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenResponse {
    /// Listing of token values.
    Tokens(Vec<String>),
    TokenCreated,
    TokenDeleted,
    /// The request failed; the protocol carries no reason.
    Fatal,
}

impl FromStr for TokenResponse {
    type Err = ProtocolError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let (code, payload) = split_message(raw)?;
        match code {
            RESP_TOKENS => {
                let values = payload
                    .unwrap_or_default()
                    .split_ascii_whitespace()
                    .map(str::to_string)
                    .collect();
                Ok(TokenResponse::Tokens(values))
            }
            RESP_CREATE_TOKEN => Ok(TokenResponse::TokenCreated),
            RESP_DELETE_TOKEN => Ok(TokenResponse::TokenDeleted),
            RESP_FATAL => Ok(TokenResponse::Fatal),
            other => Err(ProtocolError::UnknownCode(other.to_string())),
        }
    }
}

impl fmt::Display for TokenResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenResponse::Tokens(values) if values.is_empty() => f.write_str(RESP_TOKENS),
            TokenResponse::Tokens(values) => {
                write!(f, "{RESP_TOKENS} {}", values.join(" "))
            }
            TokenResponse::TokenCreated => f.write_str(RESP_CREATE_TOKEN),
            TokenResponse::TokenDeleted => f.write_str(RESP_DELETE_TOKEN),
            TokenResponse::Fatal => f.write_str(RESP_FATAL),
        }
    }
}

fn split_message(raw: &str) -> Result<(&str, Option<&str>), ProtocolError> {
    if raw.is_empty() {
        return Err(ProtocolError::Empty);
    }
    Ok(match raw.split_once(' ') {
        Some((code, payload)) => (code, Some(payload)),
        None => (raw, None),
    })
}

// ============================================================
// Tests
// ============================================================
