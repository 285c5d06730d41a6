//! Closed vocabularies used by content items.
//!
//! Every enumeration serializes to the exact lowercase tag authors write in
//! content modules, and exposes `ALL` so validators can list accepted values.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A string did not match any tag of a closed vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {vocabulary} '{value}', expected one of: {expected}")]
pub struct UnknownTag {
    /// Name of the vocabulary (e.g. "content type").
    pub vocabulary: &'static str,
    /// The rejected value.
    pub value: String,
    /// Comma-separated list of accepted tags.
    pub expected: String,
}

macro_rules! vocabulary {
    (
        $(#[$meta:meta])*
        $name:ident, $label:literal {
            $($(#[$vmeta:meta])* $variant:ident => $tag:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $tag)]
                $variant,
            )+
        }

        impl $name {
            /// Every accepted value, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Human-readable vocabulary name used in messages.
            pub const LABEL: &'static str = $label;

            /// The tag written in content modules.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $tag),+
                }
            }

            /// Comma-separated list of all accepted tags.
            #[must_use]
            pub fn expected() -> String {
                Self::ALL
                    .iter()
                    .map(|v| v.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            }
        }

        impl FromStr for $name {
            type Err = UnknownTag;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($tag => Ok(Self::$variant),)+
                    _ => Err(UnknownTag {
                        vocabulary: $label,
                        value: s.to_owned(),
                        expected: Self::expected(),
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

vocabulary! {
    /// Kind of knowledge an item describes. Drives which optional fields apply.
    ContentType, "content type" {
        Structure => "structure",
        System => "system",
        Pathway => "pathway",
        Process => "process",
        /// Only conditions carry `hpoId` and clinician notes at advanced tiers.
        Condition => "condition",
        Concept => "concept",
        Topic => "topic",
    }
}

vocabulary! {
    /// Editorial lifecycle: `draft -> review -> published`.
    ContentStatus, "status" {
        Draft => "draft",
        Review => "review",
        Published => "published",
    }
}

vocabulary! {
    CitationType, "citation type" {
        Article => "article",
        Journal => "journal",
        Textbook => "textbook",
        Guideline => "guideline",
        /// Websites are additionally expected to carry a `url`.
        Website => "website",
    }
}

vocabulary! {
    MediaType, "media type" {
        Image => "image",
        Diagram => "diagram",
        Video => "video",
        Animation => "animation",
        Model3d => "model-3d",
        Audio => "audio",
    }
}

vocabulary! {
    /// Label on a cross-reference. `Sibling` and `Related` are conventionally reciprocal.
    Relationship, "relationship" {
        Parent => "parent",
        Child => "child",
        Sibling => "sibling",
        Related => "related",
        SeeAlso => "see-also",
    }
}

vocabulary! {
    ClinicalRelevance, "clinical relevance" {
        Low => "low",
        Medium => "medium",
        High => "high",
        Critical => "critical",
    }
}

impl Relationship {
    /// Whether the convention expects the target to link back.
    #[must_use]
    pub const fn is_reciprocal(self) -> bool {
        matches!(self, Self::Sibling | Self::Related)
    }
}
