use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::workflows::offers::domain::{
    Call, Catalog, Eligibility, Need, PreviousSupport, Profile, Source, Stage, Urgency,
};
use crate::workflows::offers::profile::ProfileForm;
use crate::workflows::offers::service::{OfferService, OfferServiceConfig};
use crate::workflows::offers::wishlist::{SessionStore, StoreError, Wishlist};

pub(super) fn midnight(year: i32, month: u32, day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .expect("valid date")
}

pub(super) fn new_year() -> NaiveDateTime {
    midnight(2024, 1, 1)
}

pub(super) fn call(
    title: &str,
    stage: Option<Stage>,
    tags: &[&str],
    deadline: &str,
    previous_support: Option<bool>,
) -> Call {
    Call {
        title: title.to_string(),
        url: format!("https://offres.example/{}", title.to_lowercase().replace(' ', "-")),
        deadline: deadline.to_string(),
        stage,
        tags: tags.iter().map(|tag| tag.to_string()).collect(),
        note: format!("{title} - dossier en ligne"),
        eligibility: Eligibility { previous_support },
    }
}

pub(super) fn source(name: &str, tags: &[&str], calls: Vec<Call>) -> Source {
    Source {
        name: name.to_string(),
        tags: tags.iter().map(|tag| tag.to_string()).collect(),
        calls,
    }
}

/// Three providers covering every predicate.
pub(super) fn catalog() -> Catalog {
    Catalog::new(vec![
        source(
            "FondX",
            &["financement"],
            vec![
                call(
                    "Bourse A",
                    Some(Stage::Idee),
                    &["financement"],
                    "2024-02-01",
                    None,
                ),
                call(
                    "Prêt d'honneur",
                    Some(Stage::Amorcage),
                    &["financement"],
                    "2024-03-01",
                    Some(false),
                ),
            ],
        ),
        source(
            "Incubateur Sud",
            &["accompagnement"],
            vec![
                call(
                    "Programme Incubation",
                    Some(Stage::Prototype),
                    &[],
                    "2024-01-20",
                    Some(true),
                ),
                call(
                    "Bootcamp Outils",
                    Some(Stage::Developpement),
                    &["outil"],
                    "bientôt",
                    None,
                ),
            ],
        ),
        source(
            "Réseau Visibilité",
            &[],
            vec![call(
                "Trophées",
                None,
                &["Visibilite", "partenaires"],
                "2024-06-30",
                None,
            )],
        ),
    ])
}

pub(super) fn profile(stage: Stage, need: Need) -> Profile {
    Profile {
        maturite: stage,
        besoin: need,
        nature: None,
        statut: None,
        echeance: None,
        previous_support: PreviousSupport::Unknown,
    }
}

pub(super) fn urgent_profile(stage: Stage, need: Need, urgency: Urgency) -> Profile {
    Profile {
        echeance: Some(urgency),
        ..profile(stage, need)
    }
}

pub(super) fn form(maturite: &str, besoin: &str) -> ProfileForm {
    ProfileForm {
        maturite: Some(maturite.to_string()),
        besoin: Some(besoin.to_string()),
        ..ProfileForm::default()
    }
}

pub(super) fn build_service() -> (OfferService<MemoryStore>, Arc<MemoryStore>) {
    build_service_with(OfferServiceConfig::default())
}

pub(super) fn build_service_with(
    config: OfferServiceConfig,
) -> (OfferService<MemoryStore>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::default());
    let service = OfferService::new(Arc::new(catalog()), store.clone(), config);
    (service, store)
}

#[derive(Default, Clone)]
pub(super) struct MemoryStore {
    wishlist: Arc<Mutex<Wishlist>>,
    profile: Arc<Mutex<Option<Profile>>>,
    profile_writes: Arc<AtomicUsize>,
}

impl MemoryStore {
    pub(super) fn profile_writes(&self) -> usize {
        self.profile_writes.load(Ordering::SeqCst)
    }

    pub(super) fn stored_profile(&self) -> Option<Profile> {
        self.profile.lock().expect("profile mutex poisoned").clone()
    }
}

impl SessionStore for MemoryStore {
    fn load_wishlist(&self) -> Result<Wishlist, StoreError> {
        Ok(self.wishlist.lock().expect("wishlist mutex poisoned").clone())
    }

    fn save_wishlist(&self, wishlist: &Wishlist) -> Result<(), StoreError> {
        *self.wishlist.lock().expect("wishlist mutex poisoned") = wishlist.clone();
        Ok(())
    }

    fn load_profile(&self) -> Result<Option<Profile>, StoreError> {
        Ok(self.stored_profile())
    }

    fn save_profile(&self, profile: Option<&Profile>) -> Result<(), StoreError> {
        self.profile_writes.fetch_add(1, Ordering::SeqCst);
        *self.profile.lock().expect("profile mutex poisoned") = profile.cloned();
        Ok(())
    }
}

pub(super) struct UnavailableStore;

impl SessionStore for UnavailableStore {
    fn load_wishlist(&self) -> Result<Wishlist, StoreError> {
        Err(StoreError::Unavailable("disk offline".to_string()))
    }

    fn save_wishlist(&self, _wishlist: &Wishlist) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("disk offline".to_string()))
    }

    fn load_profile(&self) -> Result<Option<Profile>, StoreError> {
        Err(StoreError::Unavailable("disk offline".to_string()))
    }

    fn save_profile(&self, _profile: Option<&Profile>) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("disk offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) async fn read_text_body(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    String::from_utf8(body.to_vec()).expect("utf-8 payload")
}
