//! Fixed narrative strings shown back to the user after a diagnostic or a self-assessment.

use serde::{Deserialize, Serialize};

use super::domain::{Need, PreviousSupport, Profile, Stage};
use super::scoring::{ScoreCategory, ScoreVector};

const UNSPECIFIED: &str = "non précisé";

pub const fn stage_narrative(stage: Stage) -> &'static str {
    match stage {
        Stage::Idee => "Stade de l'idée : explore vite la valeur et teste un concept simple.",
        Stage::Prototype => {
            "Prototype en cours : tu testes déjà, l'enjeu est d'itérer et de valider."
        }
        Stage::Amorcage => {
            "Amorçage : structure l'offre, sécurise les premiers financements et partenariats."
        }
        Stage::Developpement => {
            "Développement : financement, structuration et distribution deviennent prioritaires."
        }
    }
}

pub const fn need_narrative(need: Need) -> &'static str {
    match need {
        Need::Financier => {
            "Priorité financement : subventions, bourses ou aides qui sécurisent la trésorerie."
        }
        Need::Accompagnement => {
            "Priorité accompagnement : mentorat, ingénierie de projet, accélération."
        }
        Need::Outil => "Priorité outils : accès à des solutions techniques, ateliers, bootcamps.",
        Need::Visibilite => {
            "Priorité visibilité : partenariats, communication, mise en relation."
        }
    }
}

pub const fn previous_support_narrative(previous: PreviousSupport) -> &'static str {
    match previous {
        PreviousSupport::Yes => {
            "Déjà soutenu : certaines aides ne sont pas cumulables, les offres compatibles sont retenues."
        }
        PreviousSupport::No => {
            "Pas encore de soutien : la plupart des dispositifs d'entrée de gamme te sont ouverts."
        }
        PreviousSupport::Unknown => {
            "Soutien antérieur incertain : les options les plus ouvertes sont affichées."
        }
    }
}

/// Readable recap of a submitted diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub stage: String,
    pub need: String,
    pub previous_support: String,
    pub timing: String,
}

impl ProfileSummary {
    pub fn from_profile(profile: &Profile) -> Self {
        let urgency = profile
            .echeance
            .as_ref()
            .map(|urgency| urgency.key().to_string())
            .unwrap_or_else(|| UNSPECIFIED.to_string());
        let status = profile.statut.as_deref().unwrap_or(UNSPECIFIED);

        Self {
            stage: stage_narrative(profile.maturite).to_string(),
            need: need_narrative(profile.besoin).to_string(),
            previous_support: previous_support_narrative(profile.previous_support).to_string(),
            timing: format!("Besoin estimé : {urgency}. Statut : {status}."),
        }
    }

    pub fn lines(&self) -> [&str; 4] {
        [
            self.stage.as_str(),
            self.need.as_str(),
            self.previous_support.as_str(),
            self.timing.as_str(),
        ]
    }
}

/// Coarse reading of a category score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBucket {
    Strong,
    NeedsWork,
    Weak,
}

impl ScoreBucket {
    pub const fn from_score(score: i32) -> Self {
        if score > 7 {
            Self::Strong
        } else if score >= 4 {
            Self::NeedsWork
        } else {
            Self::Weak
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Strong => "point fort",
            Self::NeedsWork => "à consolider",
            Self::Weak => "point faible",
        }
    }
}

pub const fn category_label(category: ScoreCategory) -> &'static str {
    match category {
        ScoreCategory::Structuration => "Structuration",
        ScoreCategory::ModeleEco => "Modèle économique",
        ScoreCategory::Financement => "Financement",
        ScoreCategory::Accompagnement => "Accompagnement",
        ScoreCategory::Visibilite => "Visibilité",
        ScoreCategory::Partenaires => "Partenaires",
    }
}

/// One narrative line per scored category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryReading {
    pub category: ScoreCategory,
    pub score: i32,
    pub bucket: ScoreBucket,
    pub narrative: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreReport {
    pub vector: ScoreVector,
    pub readings: Vec<CategoryReading>,
}

impl ScoreReport {
    pub fn from_vector(vector: ScoreVector) -> Self {
        let readings = vector
            .iter()
            .map(|(category, score)| {
                let bucket = ScoreBucket::from_score(score);
                CategoryReading {
                    category,
                    score,
                    bucket,
                    narrative: format!(
                        "{} : {} ({score})",
                        category_label(category),
                        bucket.label()
                    ),
                }
            })
            .collect();

        Self { vector, readings }
    }

    pub fn reading(&self, category: ScoreCategory) -> Option<&CategoryReading> {
        self.readings
            .iter()
            .find(|reading| reading.category == category)
    }
}
