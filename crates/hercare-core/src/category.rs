//! Health category catalog types.
//!
//! Categories are presentational at the core layer: a picked category
//! id travels as a request parameter on chat calls. The built-in list
//! below is the degraded-mode fallback used when the catalog cannot be
//! fetched from the service; that failure is never surfaced as fatal.

use serde::{Deserialize, Serialize};

/// A question category shown on the home view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthCategory {
    /// Stable identifier sent as the chat `category` parameter.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Short description shown on the category card.
    pub description: String,
    /// Emoji icon.
    pub icon: String,
    /// Matching keywords, when provided by the service.
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl HealthCategory {
    fn builtin(id: &str, name: &str, description: &str, icon: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            icon: icon.to_string(),
            keywords: Vec::new(),
        }
    }
}

/// Returns the built-in category list.
///
/// Mirrors the catalog served by the assistant service; used verbatim
/// as the fallback when `GET /categories` fails.
pub fn default_categories() -> Vec<HealthCategory> {
    vec![
        HealthCategory::builtin(
            "menstruation",
            "Menstruation",
            "Periods, cycle tracking, symptoms",
            "🩸",
        ),
        HealthCategory::builtin(
            "pregnancy",
            "Pregnancy",
            "Conception, pregnancy care, symptoms",
            "🤱",
        ),
        HealthCategory::builtin("pcos", "PCOS", "Polycystic ovary syndrome", "🫶"),
        HealthCategory::builtin(
            "birth_control",
            "Birth Control",
            "Contraceptives, family planning",
            "💊",
        ),
        HealthCategory::builtin(
            "first_time_sex",
            "First-time Sex",
            "Sexual health, first experiences",
            "💕",
        ),
        HealthCategory::builtin(
            "vaginal_health",
            "Vaginal Health",
            "Infections, hygiene, wellness",
            "🌸",
        ),
    ]
}
