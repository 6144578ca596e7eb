use std::sync::{Arc, Mutex};

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::{info, warn};

use super::domain::{Catalog, Need, OfferKey, Profile, Stage};
use super::export::{ExportError, WishlistDocument, WishlistExporter, DEFAULT_LINES_PER_PAGE};
use super::matching::{MatchResult, MatchingConfig, MatchingEngine};
use super::profile::{MatchCriteria, ProfileBuilder, ProfileError, ProfileForm};
use super::scoring::{ScoreInputs, ScoringConfig, ScoringEngine};
use super::strategy::{MatchingStrategy, RuleBased, ScoreBased};
use super::synthesis::{ProfileSummary, ScoreReport};
use super::wishlist::{SessionStore, StoreError, Wishlist, WishlistToggle};

/// Engine settings bundled for service construction.
#[derive(Debug, Clone, Copy)]
pub struct OfferServiceConfig {
    pub matching: MatchingConfig,
    pub scoring: ScoringConfig,
    pub export_lines_per_page: usize,
}

impl Default for OfferServiceConfig {
    fn default() -> Self {
        Self {
            matching: MatchingConfig::default(),
            scoring: ScoringConfig::default(),
            export_lines_per_page: DEFAULT_LINES_PER_PAGE,
        }
    }
}

/// Result of a diagnostic submission.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileOutcome {
    pub profile: Profile,
    pub summary: ProfileSummary,
    pub matches: MatchResult,
}

/// Result of a self-assessment.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreOutcome {
    pub report: ScoreReport,
    pub matches: MatchResult,
}

/// Session facade: the catalog is read-only, the store holds the only mutable state, and every
/// operation receives what it needs as arguments.
pub struct OfferService<S> {
    catalog: Arc<Catalog>,
    store: Arc<S>,
    builder: ProfileBuilder,
    matcher: MatchingEngine,
    scorer: ScoringEngine,
    exporter: WishlistExporter,
    /// Serializes wishlist read-modify-write cycles across concurrent requests.
    wishlist_lock: Mutex<()>,
}

impl<S> OfferService<S>
where
    S: SessionStore + 'static,
{
    pub fn new(catalog: Arc<Catalog>, store: Arc<S>, config: OfferServiceConfig) -> Self {
        Self {
            catalog,
            store,
            builder: ProfileBuilder,
            matcher: MatchingEngine::new(config.matching),
            scorer: ScoringEngine::new(config.scoring),
            exporter: WishlistExporter::new(config.export_lines_per_page),
            wishlist_lock: Mutex::new(()),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn matching_config(&self) -> &MatchingConfig {
        self.matcher.config()
    }

    /// Validate the answers, persist the profile and return the matching offers.
    pub fn submit_profile(
        &self,
        form: ProfileForm,
        now: NaiveDateTime,
    ) -> Result<ProfileOutcome, OfferServiceError> {
        let profile = self.builder.build(form)?;
        self.store.save_profile(Some(&profile))?;

        let matches = self.match_profile(&profile, now);
        info!(
            stage = %profile.maturite,
            need = %profile.besoin,
            matched = matches.call_count(),
            "diagnostic submitted"
        );

        Ok(ProfileOutcome {
            summary: ProfileSummary::from_profile(&profile),
            profile,
            matches,
        })
    }

    /// Forget the stored profile and fall back to the full catalog.
    pub fn reset_profile(&self) -> Result<MatchResult, OfferServiceError> {
        self.store.save_profile(None)?;
        info!("diagnostic reset");
        Ok(MatchResult::unfiltered(&self.catalog))
    }

    pub fn profile(&self) -> Result<Option<Profile>, OfferServiceError> {
        Ok(self.store.load_profile()?)
    }

    /// Offers for the stored profile, or the whole catalog when there is none.
    pub fn current_matches(&self, now: NaiveDateTime) -> Result<MatchResult, OfferServiceError> {
        let result = match self.store.load_profile()? {
            Some(profile) => self.match_profile(&profile, now),
            None => MatchResult::unfiltered(&self.catalog),
        };
        Ok(result)
    }

    /// Stage/need quick filter. Clearing both filters shows the whole catalog.
    pub fn quick_filter(
        &self,
        stage: Option<Stage>,
        need: Option<Need>,
        now: NaiveDateTime,
    ) -> MatchResult {
        if stage.is_none() && need.is_none() {
            return MatchResult::unfiltered(&self.catalog);
        }

        let strategy = RuleBased::new(
            &self.matcher,
            MatchCriteria::quick_filter(stage, need),
            now,
        );
        strategy.select(&self.catalog)
    }

    pub fn score(&self, inputs: &ScoreInputs) -> ScoreOutcome {
        let vector = self.scorer.score(inputs);
        let strategy = ScoreBased::new(&self.scorer, vector);
        let matches = strategy.select(&self.catalog);

        ScoreOutcome {
            report: ScoreReport::from_vector(strategy.vector().clone()),
            matches,
        }
    }

    /// Add or remove an offer, attaching the current profile snapshot on add. Removal goes by id
    /// alone, so items whose offer left the catalog can still be dropped.
    pub fn toggle_wishlist(
        &self,
        key: &OfferKey,
    ) -> Result<(WishlistToggle, Wishlist), OfferServiceError> {
        let _guard = self.wishlist_lock.lock().expect("wishlist mutex poisoned");
        let mut wishlist = self.store.load_wishlist()?;

        let toggle = if wishlist.remove(key) {
            WishlistToggle::Removed
        } else {
            let Some((source, call)) = self.catalog.find(&key.source, &key.title) else {
                warn!(offer = %key, "wishlist toggle for unknown offer");
                return Err(OfferServiceError::UnknownOffer(key.clone()));
            };
            let profile = self.store.load_profile()?;
            wishlist.toggle(&source.name, call, profile.as_ref())
        };
        self.store.save_wishlist(&wishlist)?;

        info!(offer = %key, ?toggle, size = wishlist.len(), "wishlist updated");
        Ok((toggle, wishlist))
    }

    pub fn wishlist(&self) -> Result<Wishlist, OfferServiceError> {
        Ok(self.store.load_wishlist()?)
    }

    pub fn export_wishlist(&self) -> Result<WishlistDocument, OfferServiceError> {
        let wishlist = self.store.load_wishlist()?;
        let profile = self.store.load_profile()?;
        Ok(self.exporter.export(&wishlist, profile.as_ref())?)
    }

    fn match_profile(&self, profile: &Profile, now: NaiveDateTime) -> MatchResult {
        self.matcher
            .match_catalog(&self.catalog, &MatchCriteria::from(profile), now)
    }
}

/// Error raised by the offer service.
#[derive(Debug, thiserror::Error)]
pub enum OfferServiceError {
    #[error(transparent)]
    Profile(#[from] ProfileError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("unknown offer `{0}`")]
    UnknownOffer(OfferKey),
}
