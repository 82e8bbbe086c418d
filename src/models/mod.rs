//! Reddit "things": objects that arrive as `{"kind": ..., "data": {...}}`.
//!
//! Decoding reads the `kind` discriminator first and then parses `data` into
//! the matching concrete type. A listing's children go through the same
//! dispatch, so comment trees decode recursively.

use serde::de::{self, Deserializer};
use serde::ser::{SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod options;
pub mod things;

pub use options::ListingOptions;
pub use things::{
    Account, Award, Comment, Link, Message, ModAction, More, Multi, MultiSubreddit, Subreddit,
    WikiPage,
};

/// The fixed table of kinds the decoder understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Comment,
    Account,
    Link,
    Message,
    Subreddit,
    Award,
    Listing,
    More,
    ModAction,
    WikiPage,
    Multi,
}

impl Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Comment => "t1",
            Kind::Account => "t2",
            Kind::Link => "t3",
            Kind::Message => "t4",
            Kind::Subreddit => "t5",
            Kind::Award => "t6",
            Kind::Listing => "Listing",
            Kind::More => "more",
            Kind::ModAction => "modaction",
            Kind::WikiPage => "wikipage",
            Kind::Multi => "LabeledMulti",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownKind(pub String);

impl fmt::Display for UnknownKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognized thing kind {:?}", self.0)
    }
}

impl std::error::Error for UnknownKind {}

impl FromStr for Kind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "t1" => Ok(Kind::Comment),
            "t2" => Ok(Kind::Account),
            "t3" => Ok(Kind::Link),
            "t4" => Ok(Kind::Message),
            "t5" => Ok(Kind::Subreddit),
            "t6" => Ok(Kind::Award),
            "Listing" => Ok(Kind::Listing),
            "more" => Ok(Kind::More),
            "modaction" => Ok(Kind::ModAction),
            "wikipage" => Ok(Kind::WikiPage),
            "LabeledMulti" => Ok(Kind::Multi),
            other => Err(UnknownKind(other.to_string())),
        }
    }
}

/// A decoded thing. The variant is chosen by the `kind` field.
#[derive(Debug, Clone, PartialEq)]
pub enum Thing {
    Comment(Box<Comment>),
    Account(Box<Account>),
    Link(Box<Link>),
    Message(Box<Message>),
    Subreddit(Box<Subreddit>),
    Award(Box<Award>),
    Listing(Box<Listing>),
    More(Box<More>),
    ModAction(Box<ModAction>),
    WikiPage(Box<WikiPage>),
    Multi(Box<Multi>),
}

impl Thing {
    pub fn kind(&self) -> Kind {
        match self {
            Thing::Comment(_) => Kind::Comment,
            Thing::Account(_) => Kind::Account,
            Thing::Link(_) => Kind::Link,
            Thing::Message(_) => Kind::Message,
            Thing::Subreddit(_) => Kind::Subreddit,
            Thing::Award(_) => Kind::Award,
            Thing::Listing(_) => Kind::Listing,
            Thing::More(_) => Kind::More,
            Thing::ModAction(_) => Kind::ModAction,
            Thing::WikiPage(_) => Kind::WikiPage,
            Thing::Multi(_) => Kind::Multi,
        }
    }

    /// The short id, e.g. `abc123`.
    pub fn id(&self) -> Option<&str> {
        let id = match self {
            Thing::Comment(c) => &c.id,
            Thing::Account(a) => &a.id,
            Thing::Link(l) => &l.id,
            Thing::Message(m) => &m.id,
            Thing::Subreddit(s) => &s.id,
            Thing::Award(a) => &a.id,
            Thing::More(m) => &m.id,
            Thing::ModAction(m) => &m.id,
            Thing::Listing(_) | Thing::WikiPage(_) | Thing::Multi(_) => return None,
        };
        non_empty(id)
    }

    /// The fullname, e.g. `t3_abc123`.
    pub fn name(&self) -> Option<&str> {
        let name = match self {
            Thing::Comment(c) => &c.name,
            Thing::Account(a) => &a.name,
            Thing::Link(l) => &l.name,
            Thing::Message(m) => &m.name,
            Thing::Subreddit(s) => &s.name,
            Thing::Award(a) => &a.name,
            Thing::More(m) => &m.name,
            Thing::Multi(m) => &m.name,
            Thing::Listing(_) | Thing::ModAction(_) | Thing::WikiPage(_) => return None,
        };
        non_empty(name)
    }

    fn from_parts(kind: Kind, data: serde_json::Value) -> Result<Self, serde_json::Error> {
        Ok(match kind {
            Kind::Comment => Thing::Comment(serde_json::from_value(data)?),
            Kind::Account => Thing::Account(serde_json::from_value(data)?),
            Kind::Link => Thing::Link(serde_json::from_value(data)?),
            Kind::Message => Thing::Message(serde_json::from_value(data)?),
            Kind::Subreddit => Thing::Subreddit(serde_json::from_value(data)?),
            Kind::Award => Thing::Award(serde_json::from_value(data)?),
            Kind::Listing => Thing::Listing(serde_json::from_value(data)?),
            Kind::More => Thing::More(serde_json::from_value(data)?),
            Kind::ModAction => Thing::ModAction(serde_json::from_value(data)?),
            Kind::WikiPage => Thing::WikiPage(serde_json::from_value(data)?),
            Kind::Multi => Thing::Multi(serde_json::from_value(data)?),
        })
    }
}

fn non_empty(s: &str) -> Option<&str> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

/// Only the object form `{"kind": ..., "data": ...}` is a thing; arrays and
/// scalars are rejected up front.
impl<'de> Deserialize<'de> for Thing {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mut object = serde_json::Map::<String, serde_json::Value>::deserialize(deserializer)?;
        let kind = match object.remove("kind") {
            Some(serde_json::Value::String(kind)) => kind,
            Some(other) => {
                return Err(de::Error::custom(format!(
                    "thing kind must be a string, found {}",
                    other
                )))
            }
            None => return Err(de::Error::missing_field("kind")),
        };
        let kind: Kind = kind.parse().map_err(de::Error::custom)?;
        let data = object.remove("data").unwrap_or(serde_json::Value::Null);
        Thing::from_parts(kind, data)
            .map_err(|e| de::Error::custom(format!("decoding {} data: {}", kind, e)))
    }
}

impl Serialize for Thing {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("Thing", 2)?;
        state.serialize_field("kind", self.kind().as_str())?;
        match self {
            Thing::Comment(data) => state.serialize_field("data", data)?,
            Thing::Account(data) => state.serialize_field("data", data)?,
            Thing::Link(data) => state.serialize_field("data", data)?,
            Thing::Message(data) => state.serialize_field("data", data)?,
            Thing::Subreddit(data) => state.serialize_field("data", data)?,
            Thing::Award(data) => state.serialize_field("data", data)?,
            Thing::Listing(data) => state.serialize_field("data", data)?,
            Thing::More(data) => state.serialize_field("data", data)?,
            Thing::ModAction(data) => state.serialize_field("data", data)?,
            Thing::WikiPage(data) => state.serialize_field("data", data)?,
            Thing::Multi(data) => state.serialize_field("data", data)?,
        }
        state.end()
    }
}

macro_rules! thing_conversions {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl TryFrom<Thing> for $ty {
                type Error = Thing;

                fn try_from(thing: Thing) -> Result<Self, Self::Error> {
                    match thing {
                        Thing::$variant(inner) => Ok(*inner),
                        other => Err(other),
                    }
                }
            }

            impl From<$ty> for Thing {
                fn from(inner: $ty) -> Self {
                    Thing::$variant(Box::new(inner))
                }
            }
        )*
    };
}

thing_conversions! {
    Comment => Comment,
    Account => Account,
    Link => Link,
    Message => Message,
    Subreddit => Subreddit,
    Award => Award,
    Listing => Listing,
    More => More,
    ModAction => ModAction,
    WikiPage => WikiPage,
    Multi => Multi,
}

/// A page of things plus opaque pagination cursors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub after: Option<String>,
    pub before: Option<String>,
    #[serde(default)]
    pub modhash: Option<String>,
    #[serde(default)]
    pub dist: Option<i64>,
    #[serde(default)]
    pub children: Vec<Thing>,
}

impl Listing {
    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Posts in this page, skipping any other kind of child.
    pub fn links(&self) -> impl Iterator<Item = &Link> {
        self.children.iter().filter_map(|child| match child {
            Thing::Link(link) => Some(link.as_ref()),
            _ => None,
        })
    }

    pub fn comments(&self) -> impl Iterator<Item = &Comment> {
        self.children.iter().filter_map(|child| match child {
            Thing::Comment(comment) => Some(comment.as_ref()),
            _ => None,
        })
    }
}
