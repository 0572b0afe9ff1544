//! Anonymization data models

pub mod result;
pub mod span;

pub use result::{AnonymizationResult, Detection, MappingEntry};
pub use span::{EntityType, Span, SpanSource};
