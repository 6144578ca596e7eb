use super::common::*;
use crate::workflows::offers::domain::{Need, Stage, Urgency};
use crate::workflows::offers::export::{ExportError, WishlistExporter};
use crate::workflows::offers::wishlist::Wishlist;

fn wishlist_of(count: usize) -> Wishlist {
    let mut wishlist = Wishlist::default();
    for index in 0..count {
        let offer = call(
            &format!("Appel {index}"),
            Some(Stage::Idee),
            &["financement", "accompagnement"],
            "2024-02-01",
            None,
        );
        wishlist.toggle("FondX", &offer, None);
    }
    wishlist
}

#[test]
fn empty_wishlist_cannot_be_exported() {
    let result = WishlistExporter::default().export(&Wishlist::default(), None);
    assert_eq!(result, Err(ExportError::EmptyWishlist));
}

#[test]
fn items_render_with_source_deadline_tags_and_stage() {
    let profile = urgent_profile(Stage::Idee, Need::Financier, Urgency::Now);
    let document = WishlistExporter::default()
        .export(&wishlist_of(1), Some(&profile))
        .expect("document builds");

    assert_eq!(document.page_count(), 1);
    let page = &document.pages[0];
    assert_eq!(page[0], "Sélection — ProjetMatch");
    assert_eq!(page[1], "Profil résumé : idee • financier • échéance : now");
    assert_eq!(page[2], "1. Appel 0");
    assert_eq!(page[3], "Structure : FondX");
    assert_eq!(page[4], "Date limite : 2024-02-01");
    assert_eq!(page[5], "Tags : financement, accompagnement | Stage : idee");
}

#[test]
fn add_time_profile_snapshot_is_printed() {
    let snapshot = profile(Stage::Prototype, Need::Outil);
    let mut wishlist = Wishlist::default();
    wishlist.toggle(
        "Incubateur Sud",
        &call("Bootcamp Outils", None, &["outil"], "bientôt", None),
        Some(&snapshot),
    );

    let text = WishlistExporter::default()
        .export(&wishlist, None)
        .expect("document builds")
        .render_text();

    assert!(text.contains("Profil utilisateur : prototype / outil / non précisé"));
    assert!(text.contains("Tags : outil | Stage : "));
}

#[test]
fn long_wishlists_spill_onto_new_pages() {
    // Title line plus five lines per item: a page closes after the second item.
    let document = WishlistExporter::new(10)
        .export(&wishlist_of(5), None)
        .expect("document builds");

    assert_eq!(document.page_count(), 3);
    assert_eq!(document.pages[0].len(), 11);
    assert_eq!(document.pages[1].len(), 10);
    assert_eq!(document.pages[2].len(), 5);
    assert_eq!(document.pages[2][0], "5. Appel 4");
    assert_eq!(document.render_text().matches('\u{c}').count(), 2);
}
