//! Profile-to-offer matching: diagnostic intake, rule-based and score-based filtering,
//! narrative synthesis, and the persisted wishlist.

pub mod catalog;
pub mod domain;
pub mod export;
pub mod matching;
pub mod profile;
pub mod router;
pub mod scoring;
pub mod service;
pub mod strategy;
pub mod synthesis;
pub mod wishlist;

#[cfg(test)]
mod tests;

pub use catalog::{CatalogError, CatalogLoader};
pub use domain::{
    Call, Catalog, Eligibility, Need, OfferKey, PreviousSupport, Profile, Source, Stage, Urgency,
};
pub use export::{ExportError, WishlistDocument, WishlistExporter};
pub use matching::{MatchResult, MatchingConfig, MatchingEngine};
pub use profile::{MatchCriteria, ProfileBuilder, ProfileError, ProfileForm};
pub use router::offer_router;
pub use scoring::{ScoreCategory, ScoreInputs, ScoreVector, ScoringConfig, ScoringEngine};
pub use service::{
    OfferService, OfferServiceConfig, OfferServiceError, ProfileOutcome, ScoreOutcome,
};
pub use strategy::{MatchingStrategy, RuleBased, ScoreBased};
pub use synthesis::{ProfileSummary, ScoreBucket, ScoreReport};
pub use wishlist::{SessionStore, StoreError, Wishlist, WishlistItem, WishlistToggle};
