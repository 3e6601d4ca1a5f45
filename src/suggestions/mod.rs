mod client;
pub mod dto;

pub use client::{Edamam, SuggestionError, SuggestionFetcher};
pub use dto::Suggestion;
