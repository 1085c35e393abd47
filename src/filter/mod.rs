//! Post-selection filters: profanity masking and sentiment filtering.

pub mod profanity;
pub mod sentiment;

pub use profanity::{ProfanityFilter, CENSOR_MARKER};
pub use sentiment::{filter_by_sentiment, LexiconSentiment, SentimentScorer};
