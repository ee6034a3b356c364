//! The nine request commands and their framing constants.

use std::time::Duration;

use crate::error::ProtocolError;

/// Maximum number of bytes the server reads from a connection as a single
/// request.
pub const MAX_REQUEST_BYTES: usize = 128;

/// Timeout applied to most requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// Extended timeout for `user_by_name` and `keys`, whose miss path may
/// block on an on-demand refresh.
pub const EXTENDED_TIMEOUT: Duration = Duration::from_secs(5);

/// One parsed request line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// `user_by_name N`
    UserByName(String),
    /// `user_by_uid U`
    UserByUid(u32),
    /// `users`
    Users,
    /// `group_by_name N`
    GroupByName(String),
    /// `group_by_gid G`
    GroupByGid(u32),
    /// `groups`
    Groups,
    /// `names`
    Names,
    /// `is_name N`
    IsName(String),
    /// `keys N`
    Keys(String),
}

impl Request {
    /// Parses a request line of the form `command` or `command argument`.
    /// Trailing whitespace and an absent trailing newline are both fine.
    pub fn parse(line: &str) -> Result<Self, ProtocolError> {
        let line = line.trim_end_matches(['\n', '\r']);
        let mut parts = line.splitn(2, ' ');
        let command = parts
            .next()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ProtocolError::Malformed("empty request".to_string()))?;
        let argument = parts.next();

        match (command, argument) {
            ("user_by_name", Some(name)) if !name.is_empty() => Ok(Request::UserByName(name.to_string())),
            ("user_by_uid", Some(uid)) => Ok(Request::UserByUid(parse_uid(uid)?)),
            ("users", None) => Ok(Request::Users),
            ("group_by_name", Some(name)) if !name.is_empty() => Ok(Request::GroupByName(name.to_string())),
            ("group_by_gid", Some(gid)) => Ok(Request::GroupByGid(parse_uid(gid)?)),
            ("groups", None) => Ok(Request::Groups),
            ("names", None) => Ok(Request::Names),
            ("is_name", Some(name)) if !name.is_empty() => Ok(Request::IsName(name.to_string())),
            ("keys", Some(name)) if !name.is_empty() => Ok(Request::Keys(name.to_string())),
            _ => Err(ProtocolError::Malformed(format!("unrecognized request: {line:?}"))),
        }
    }

    /// Renders this request back into the wire form a client would send.
    #[must_use]
    pub fn encode(&self) -> String {
        match self {
            Request::UserByName(name) => format!("user_by_name {name}"),
            Request::UserByUid(uid) => format!("user_by_uid {uid}"),
            Request::Users => "users".to_string(),
            Request::GroupByName(name) => format!("group_by_name {name}"),
            Request::GroupByGid(gid) => format!("group_by_gid {gid}"),
            Request::Groups => "groups".to_string(),
            Request::Names => "names".to_string(),
            Request::IsName(name) => format!("is_name {name}"),
            Request::Keys(name) => format!("keys {name}"),
        }
    }

    /// The read timeout a client should apply for this request: the
    /// extended 5s window for `user_by_name`/`keys` (whose miss path may
    /// block on an on-demand refresh), 1s otherwise.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        match self {
            Request::UserByName(_) | Request::Keys(_) => EXTENDED_TIMEOUT,
            _ => DEFAULT_TIMEOUT,
        }
    }
}

fn parse_uid(text: &str) -> Result<u32, ProtocolError> {
    text.parse()
        .map_err(|_| ProtocolError::Malformed(format!("not a valid numeric id: {text:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_command_shape() {
        assert_eq!(Request::parse("user_by_name alice").unwrap(), Request::UserByName("alice".into()));
        assert_eq!(Request::parse("user_by_uid 1001").unwrap(), Request::UserByUid(1001));
        assert_eq!(Request::parse("users").unwrap(), Request::Users);
        assert_eq!(Request::parse("group_by_name wheel").unwrap(), Request::GroupByName("wheel".into()));
        assert_eq!(Request::parse("group_by_gid 4001").unwrap(), Request::GroupByGid(4001));
        assert_eq!(Request::parse("groups").unwrap(), Request::Groups);
        assert_eq!(Request::parse("names").unwrap(), Request::Names);
        assert_eq!(Request::parse("is_name alice").unwrap(), Request::IsName("alice".into()));
        assert_eq!(Request::parse("keys alice").unwrap(), Request::Keys("alice".into()));
    }

    #[test]
    fn trims_trailing_newline() {
        assert_eq!(Request::parse("users\n").unwrap(), Request::Users);
        assert_eq!(Request::parse("users\r\n").unwrap(), Request::Users);
    }

    #[test]
    fn rejects_unknown_command() {
        assert!(Request::parse("frobnicate alice").is_err());
    }

    #[test]
    fn rejects_missing_required_argument() {
        assert!(Request::parse("user_by_name").is_err());
        assert!(Request::parse("keys").is_err());
    }

    #[test]
    fn rejects_unexpected_argument() {
        assert!(Request::parse("users alice").is_err());
    }

    #[test]
    fn rejects_non_numeric_uid() {
        assert!(Request::parse("user_by_uid notanumber").is_err());
    }

    #[test]
    fn rejects_empty_line() {
        assert!(Request::parse("").is_err());
    }

    #[test]
    fn extended_timeout_applies_only_to_name_and_keys_lookups() {
        assert_eq!(Request::UserByName("a".into()).timeout(), EXTENDED_TIMEOUT);
        assert_eq!(Request::Keys("a".into()).timeout(), EXTENDED_TIMEOUT);
        assert_eq!(Request::UserByUid(1).timeout(), DEFAULT_TIMEOUT);
        assert_eq!(Request::Names.timeout(), DEFAULT_TIMEOUT);
    }
}
