// Core algorithm exports
pub mod extract;
pub mod matcher;
pub mod normalize;
pub mod similarity;

pub use extract::{extract_fields, ExtractedFields};
pub use matcher::{MatchResult, Matcher, MAX_RESULTS};
pub use normalize::normalize_street;
pub use similarity::similarity;
