//! Drag Tokens
//!
//! Every draggable row carries a token naming its scope, so a drop handler
//! can tell siblings from strangers without a side lookup.
//!
//! Wire format (shared with the UI layer):
//! - `item:<itemId>`
//! - `sub:<parentId>:<subId>`
//!
//! Ids are percent-escaped (`:`, `%`, control and non-ASCII bytes), so
//! plain ASCII ids appear verbatim and every id round-trips, the empty id
//! included.

use std::fmt;
use std::str::FromStr;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const ITEM_PREFIX: &str = "item:";
const SUBITEM_PREFIX: &str = "sub:";

const ID_ESCAPES: &AsciiSet = &CONTROLS.add(b':').add(b'%');

/// Scope-carrying identity of a draggable row
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DragToken {
    Item { id: String },
    Subitem { parent_id: String, id: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DragTokenError {
    #[error("unknown drag token kind: {0:?}")]
    UnknownKind(String),
    #[error("drag token {0:?} is missing its id separator")]
    MissingId(String),
    #[error("drag token {0:?} does not decode to UTF-8")]
    InvalidEncoding(String),
}

impl DragToken {
    pub fn item(id: impl Into<String>) -> Self {
        DragToken::Item { id: id.into() }
    }

    pub fn subitem(parent_id: impl Into<String>, id: impl Into<String>) -> Self {
        DragToken::Subitem {
            parent_id: parent_id.into(),
            id: id.into(),
        }
    }

    /// Id of the dragged row itself
    pub fn node_id(&self) -> &str {
        match self {
            DragToken::Item { id } | DragToken::Subitem { id, .. } => id,
        }
    }

    /// Parent item id for subitem tokens
    pub fn parent_id(&self) -> Option<&str> {
        match self {
            DragToken::Item { .. } => None,
            DragToken::Subitem { parent_id, .. } => Some(parent_id),
        }
    }

    pub fn encode(&self) -> String {
        match self {
            DragToken::Item { id } => format!("{ITEM_PREFIX}{}", escape(id)),
            DragToken::Subitem { parent_id, id } => {
                format!("{SUBITEM_PREFIX}{}:{}", escape(parent_id), escape(id))
            }
        }
    }

    pub fn decode(token: &str) -> Result<Self, DragTokenError> {
        if let Some(rest) = token.strip_prefix(ITEM_PREFIX) {
            let id = unescape(token, rest)?;
            return Ok(DragToken::Item { id });
        }
        if let Some(rest) = token.strip_prefix(SUBITEM_PREFIX) {
            let (parent, sub) = rest
                .split_once(':')
                .ok_or_else(|| DragTokenError::MissingId(token.to_string()))?;
            return Ok(DragToken::Subitem {
                parent_id: unescape(token, parent)?,
                id: unescape(token, sub)?,
            });
        }
        Err(DragTokenError::UnknownKind(token.to_string()))
    }
}

fn escape(id: &str) -> String {
    utf8_percent_encode(id, ID_ESCAPES).to_string()
}

fn unescape(token: &str, part: &str) -> Result<String, DragTokenError> {
    percent_decode_str(part)
        .decode_utf8()
        .map(|id| id.into_owned())
        .map_err(|_| DragTokenError::InvalidEncoding(token.to_string()))
}

impl fmt::Display for DragToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for DragToken {
    type Err = DragTokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DragToken::decode(s)
    }
}

impl TryFrom<String> for DragToken {
    type Error = DragTokenError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        DragToken::decode(&value)
    }
}

impl From<DragToken> for String {
    fn from(token: DragToken) -> Self {
        token.encode()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_ids_encode_verbatim() {
        assert_eq!(DragToken::item("42").encode(), "item:42");
        assert_eq!(DragToken::subitem("42", "7").encode(), "sub:42:7");
    }

    #[test]
    fn test_decode_subitem() {
        let token: DragToken = "sub:p1:s9".parse().unwrap();
        assert_eq!(token, DragToken::subitem("p1", "s9"));
        assert_eq!(token.parent_id(), Some("p1"));
        assert_eq!(token.node_id(), "s9");
    }

    #[test]
    fn test_colons_in_ids_survive() {
        let token = DragToken::subitem("team:a", "x:y%z");
        let encoded = token.encode();
        assert_eq!(encoded, "sub:team%3Aa:x%3Ay%25z");
        assert_eq!(DragToken::decode(&encoded).unwrap(), token);
    }

    #[test]
    fn test_rejects_malformed_tokens() {
        assert!(matches!(
            DragToken::decode("row:1"),
            Err(DragTokenError::UnknownKind(_))
        ));
        assert!(matches!(
            DragToken::decode("sub:onlyparent"),
            Err(DragTokenError::MissingId(_))
        ));
        assert!(matches!(
            DragToken::decode("item:%FF"),
            Err(DragTokenError::InvalidEncoding(_))
        ));
    }

    #[test]
    fn test_empty_ids_round_trip() {
        for token in [
            DragToken::item(""),
            DragToken::subitem("", "s1"),
            DragToken::subitem("p1", ""),
            DragToken::subitem("", ""),
        ] {
            assert_eq!(DragToken::decode(&token.encode()).unwrap(), token);
        }
        assert_eq!(DragToken::item("").encode(), "item:");
        assert_eq!(DragToken::decode("sub::s1").unwrap(), DragToken::subitem("", "s1"));
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&DragToken::item("a")).unwrap();
        assert_eq!(json, "\"item:a\"");
        let back: DragToken = serde_json::from_str(&json).unwrap();
        assert_eq!(back, DragToken::item("a"));
    }
}
