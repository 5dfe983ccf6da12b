//! Shadow URL codec.
//!
//! A shadow URL is the whole description of an upload pipeline, written so
//! that reading it left to right yields the matching download pipeline:
//!
//! ```text
//! b64("down_<sink>:" b64(id)) "." b64("trans_<tN>:" params) "." ... b64("trans_<t0>:" params)
//! ```
//!
//! Each step becomes a token `<tag>_<name>:<p0>,<p1>,...` with every
//! parameter base64 encoded on its own, and the token as a whole is base64
//! encoded again so its `:` and `,` never meet the outer `.` separator.
//! Tokens are joined in reverse execution order. The sink is written with the
//! `down` tag and its allocated id as sole parameter, since decoding only
//! ever needs a source in its place.
//!
//! Both layers use the URL-safe alphabet with padding, so a shadow URL fits
//! in a single path segment as is.

use std::fmt;
use std::sync::OnceLock;

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use regex::Regex;

use crate::component::{Params, Role, Step};
use crate::registry::{Registry, ResolveError};

/// Separator between step tokens.
pub const TOKEN_SEPARATOR: char = '.';
/// Separator between parameters inside a token.
pub const PARAM_SEPARATOR: char = ',';

const TRANSFORMER_TAG: &str = "trans";
const SOURCE_TAG: &str = "down";

fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?s)^(trans|down)_([^:]+):(.*)$").expect("token pattern is valid")
    })
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("empty shadow url")]
    Empty,
    #[error("token {token:?} is not valid base64: {reason}")]
    Base64 { token: String, reason: String },
    #[error("token {token:?} is not valid UTF-8")]
    Utf8 { token: String },
    #[error("malformed step token: {0:?}")]
    MalformedToken(String),
    #[error("cannot encode a {role} step at position {position}")]
    UnexpectedRole { role: Role, position: usize },
    #[error("step list must end with a sink")]
    MissingSink,
    #[error("sink {0} returned an empty id")]
    EmptyId(String),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

/// The role a token is resolved in on decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenRole {
    Transformer,
    Source,
}

impl TokenRole {
    pub fn tag(&self) -> &'static str {
        match self {
            TokenRole::Transformer => TRANSFORMER_TAG,
            TokenRole::Source => SOURCE_TAG,
        }
    }

    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            TRANSFORMER_TAG => Some(TokenRole::Transformer),
            SOURCE_TAG => Some(TokenRole::Source),
            _ => None,
        }
    }
}

impl From<TokenRole> for Role {
    fn from(role: TokenRole) -> Self {
        match role {
            TokenRole::Transformer => Role::Transformer,
            TokenRole::Source => Role::Source,
        }
    }
}

impl fmt::Display for TokenRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// One decoded step of a shadow URL, not yet resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepToken {
    pub role: TokenRole,
    pub name: String,
    pub params: Params,
}

impl StepToken {
    pub fn new(role: TokenRole, name: impl Into<String>, params: Params) -> Self {
        Self {
            role,
            name: name.into(),
            params,
        }
    }

    /// Render the token and base64 it for the outer layer.
    pub fn encode(&self) -> String {
        let params = self
            .params
            .iter()
            .map(|p| URL_SAFE.encode(p))
            .collect::<Vec<_>>()
            .join(&PARAM_SEPARATOR.to_string());
        let token = format!("{}_{}:{}", self.role.tag(), self.name, params);
        URL_SAFE.encode(token)
    }

    /// Inverse of [`StepToken::encode`] for a single outer segment.
    pub fn decode(segment: &str) -> Result<Self, CodecError> {
        let raw = URL_SAFE.decode(segment).map_err(|e| CodecError::Base64 {
            token: segment.to_string(),
            reason: e.to_string(),
        })?;
        let token = String::from_utf8(raw).map_err(|_| CodecError::Utf8 {
            token: segment.to_string(),
        })?;

        let captures = token_pattern()
            .captures(&token)
            .ok_or_else(|| CodecError::MalformedToken(token.clone()))?;
        let role = TokenRole::from_tag(&captures[1])
            .ok_or_else(|| CodecError::MalformedToken(token.clone()))?;
        let name = captures[2].to_string();
        let params = decode_params(&captures[3])?;

        Ok(Self { role, name, params })
    }

    pub fn resolve(&self, registry: &Registry) -> Result<Step, CodecError> {
        Ok(registry.resolve(self.role.into(), &self.name, &self.params)?)
    }
}

fn decode_params(section: &str) -> Result<Params, CodecError> {
    if section.is_empty() {
        return Ok(Vec::new());
    }
    section
        .split(PARAM_SEPARATOR)
        .map(|param| {
            URL_SAFE.decode(param).map_err(|e| CodecError::Base64 {
                token: param.to_string(),
                reason: e.to_string(),
            })
        })
        .collect()
}

/// Encode a finalized upload step list whose sink returned `id`.
///
/// `steps` must be zero or more transformers followed by one sink.
pub fn encode(steps: &[Step], id: &str) -> Result<String, CodecError> {
    let (sink, transformers) = steps.split_last().ok_or(CodecError::MissingSink)?;
    if !sink.is_sink() {
        return Err(CodecError::MissingSink);
    }
    // an empty id decodes back to zero params, which no source accepts
    if id.is_empty() {
        return Err(CodecError::EmptyId(sink.name().to_string()));
    }

    let mut tokens = Vec::with_capacity(steps.len());
    tokens.push(StepToken::new(TokenRole::Source, sink.name(), vec![id.as_bytes().to_vec()]));
    for (position, step) in transformers.iter().enumerate().rev() {
        if step.role() != Role::Transformer {
            return Err(CodecError::UnexpectedRole {
                role: step.role(),
                position,
            });
        }
        tokens.push(StepToken::new(TokenRole::Transformer, step.name(), step.params()));
    }

    Ok(tokens
        .iter()
        .map(StepToken::encode)
        .collect::<Vec<_>>()
        .join(&TOKEN_SEPARATOR.to_string()))
}

/// Split a shadow URL into its tokens, in download order.
pub fn parse(url: &str) -> Result<Vec<StepToken>, CodecError> {
    if url.is_empty() {
        return Err(CodecError::Empty);
    }
    url.split(TOKEN_SEPARATOR).map(StepToken::decode).collect()
}

/// Parse a shadow URL and resolve every token against `registry`.
pub fn decode(url: &str, registry: &Registry) -> Result<Vec<Step>, CodecError> {
    parse(url)?
        .iter()
        .map(|token| token.resolve(registry))
        .collect()
}
