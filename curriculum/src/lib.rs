//! # curriculum
//!
//! Typed model for graduated-complexity medical education content.
//!
//! Each [`EducationalContent`] item is written at five complexity tiers
//! ([`ComplexityLevel`]), carries its own media and citations, and links to
//! other items by id through [`CrossReference`]s. The types here have no
//! behavior beyond small accessors; validation lives in `curriculum-lint`.

pub mod content;
pub mod level;
pub mod slug;
pub mod vocabulary;


// Re-export commonly used types
pub use content::{
    Citation, ContentTags, CrossReference, EXAM_KEYS, EducationalContent, ExamRelevance, KeyTerm,
    LevelContent, MediaAsset,
};
pub use level::{ComplexityLevel, LevelOutOfRange, MAX_LEVEL, MIN_LEVEL};
pub use vocabulary::{
    CitationType, ClinicalRelevance, ContentStatus, ContentType, MediaType, Relationship,
    UnknownTag,
};
