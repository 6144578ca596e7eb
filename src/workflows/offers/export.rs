use serde::Serialize;

use super::domain::Profile;
use super::wishlist::Wishlist;

pub const DEFAULT_LINES_PER_PAGE: usize = 48;
const DOCUMENT_TITLE: &str = "Sélection — ProjetMatch";
const UNSPECIFIED: &str = "non précisé";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ExportError {
    #[error("wishlist is empty")]
    EmptyWishlist,
}

/// Paginated plain-text rendition of the wishlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WishlistDocument {
    pub pages: Vec<Vec<String>>,
}

impl WishlistDocument {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Pages separated by a form feed.
    pub fn render_text(&self) -> String {
        self.pages
            .iter()
            .map(|page| page.join("\n"))
            .collect::<Vec<_>>()
            .join("\n\u{c}\n")
    }
}

#[derive(Debug, Clone, Copy)]
pub struct WishlistExporter {
    lines_per_page: usize,
}

impl Default for WishlistExporter {
    fn default() -> Self {
        Self::new(DEFAULT_LINES_PER_PAGE)
    }
}

impl WishlistExporter {
    pub fn new(lines_per_page: usize) -> Self {
        Self {
            lines_per_page: lines_per_page.max(1),
        }
    }

    /// One block per item; a page is closed once it reaches the line threshold after an item.
    pub fn export(
        &self,
        wishlist: &Wishlist,
        profile: Option<&Profile>,
    ) -> Result<WishlistDocument, ExportError> {
        if wishlist.is_empty() {
            return Err(ExportError::EmptyWishlist);
        }

        let mut pages = Vec::new();
        let mut page = vec![DOCUMENT_TITLE.to_string()];
        if let Some(profile) = profile {
            page.push(format!(
                "Profil résumé : {} • {} • échéance : {}",
                profile.maturite,
                profile.besoin,
                urgency_label(profile)
            ));
        }

        for (index, item) in wishlist.items().iter().enumerate() {
            page.push(format!("{}. {}", index + 1, item.call.title));
            page.push(format!("Structure : {}", item.source));
            page.push(format!("Date limite : {}", item.call.deadline));
            page.push(format!(
                "Tags : {} | Stage : {}",
                item.call.tags.join(", "),
                item.call.stage.map(|stage| stage.key()).unwrap_or_default()
            ));
            if let Some(snapshot) = &item.meta.user_profile {
                page.push(format!(
                    "Profil utilisateur : {} / {} / {}",
                    snapshot.maturite,
                    snapshot.besoin,
                    urgency_label(snapshot)
                ));
            }
            page.push(String::new());

            if page.len() >= self.lines_per_page {
                pages.push(std::mem::take(&mut page));
            }
        }

        if !page.is_empty() {
            pages.push(page);
        }

        Ok(WishlistDocument { pages })
    }
}

fn urgency_label(profile: &Profile) -> &str {
    profile
        .echeance
        .as_ref()
        .map(|urgency| urgency.key())
        .unwrap_or(UNSPECIFIED)
}
