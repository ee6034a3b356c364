//! Response status codes and the structured bodies each command produces.

use accounts_core::{Group, User};

use crate::error::ProtocolError;
use crate::request::Request;
use crate::wire::{decode_group, decode_user, encode_group, encode_user};

/// The four status codes the wire protocol can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// `200` — success, body follows per the request's record shape.
    Ok,
    /// `404` — no record matched.
    NotFound,
    /// `400` — the request line didn't parse.
    Malformed,
    /// `500` — any other server-side error.
    Error,
}

impl Status {
    /// The 3-digit code rendered as the response's first line.
    #[must_use]
    pub fn code(self) -> u16 {
        match self {
            Status::Ok => 200,
            Status::NotFound => 404,
            Status::Malformed => 400,
            Status::Error => 500,
        }
    }

    fn parse(code: &str) -> Result<Self, ProtocolError> {
        match code {
            "200" => Ok(Status::Ok),
            "404" => Ok(Status::NotFound),
            "400" => Ok(Status::Malformed),
            "500" => Ok(Status::Error),
            other => Err(ProtocolError::Malformed(format!("unrecognized status: {other:?}"))),
        }
    }
}

/// The body of a successful response, shaped by which request produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    /// One or more user record lines.
    Users(Vec<User>),
    /// One or more group record lines.
    Groups(Vec<Group>),
    /// One name per line.
    Names(Vec<String>),
    /// One authorized-keys line per line.
    Keys(Vec<String>),
    /// A bare `200` with no body, for `is_name`'s "yes" answer.
    Empty,
}

/// A full server response: a status plus, for `200`, a body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// The status this response reports.
    pub status: Status,
    /// The body, present only when `status` is [`Status::Ok`].
    pub body: Option<Body>,
}

impl Response {
    /// Builds a `200` response with the given body.
    #[must_use]
    pub fn ok(body: Body) -> Self {
        Self { status: Status::Ok, body: Some(body) }
    }

    /// Builds a `404` response.
    #[must_use]
    pub fn not_found() -> Self {
        Self { status: Status::NotFound, body: None }
    }

    /// Builds a `400` response.
    #[must_use]
    pub fn malformed() -> Self {
        Self { status: Status::Malformed, body: None }
    }

    /// Builds a `500` response.
    #[must_use]
    pub fn error() -> Self {
        Self { status: Status::Error, body: None }
    }

    /// Renders the full response text: a 3-digit status line, followed for
    /// `200` by `\n`-separated record lines (and nothing else otherwise).
    #[must_use]
    pub fn encode(&self) -> String {
        let mut out = format!("{}", self.status.code());
        if let Some(body) = &self.body {
            for line in encode_body(body) {
                out.push('\n');
                out.push_str(&line);
            }
        }
        out
    }

    /// Parses a raw response against the request that produced it, since
    /// the body's line shape depends on which command was sent.
    pub fn decode(request: &Request, raw: &str) -> Result<Self, ProtocolError> {
        let mut lines = raw.split('\n');
        let status_line = lines
            .next()
            .ok_or_else(|| ProtocolError::Malformed("empty response".to_string()))?;
        let status = Status::parse(status_line.trim())?;

        if status != Status::Ok {
            return Ok(Self { status, body: None });
        }

        let body_lines: Vec<&str> = lines.collect();
        let body = decode_body(request, &body_lines)?;
        Ok(Self { status, body: Some(body) })
    }
}

fn encode_body(body: &Body) -> Vec<String> {
    match body {
        Body::Users(users) => users.iter().map(encode_user).collect(),
        Body::Groups(groups) => groups.iter().map(encode_group).collect(),
        Body::Names(names) => names.clone(),
        Body::Keys(keys) => keys.clone(),
        Body::Empty => Vec::new(),
    }
}

fn decode_body(request: &Request, lines: &[&str]) -> Result<Body, ProtocolError> {
    match request {
        Request::UserByName(_) | Request::UserByUid(_) => {
            let line = single_line(lines)?;
            Ok(Body::Users(vec![decode_user(line)?]))
        }
        Request::Users => lines.iter().map(|line| decode_user(line)).collect::<Result<_, _>>().map(Body::Users),
        Request::GroupByName(_) | Request::GroupByGid(_) => {
            let line = single_line(lines)?;
            Ok(Body::Groups(vec![decode_group(line)?]))
        }
        Request::Groups => lines.iter().map(|line| decode_group(line)).collect::<Result<_, _>>().map(Body::Groups),
        Request::Names => Ok(Body::Names(lines.iter().map(|s| (*s).to_string()).collect())),
        Request::IsName(_) => Ok(Body::Empty),
        Request::Keys(_) => Ok(Body::Keys(lines.iter().map(|s| (*s).to_string()).collect())),
    }
}

fn single_line<'a>(lines: &[&'a str]) -> Result<&'a str, ProtocolError> {
    lines
        .first()
        .copied()
        .ok_or_else(|| ProtocolError::Malformed("expected exactly one record line".to_string()))
}
