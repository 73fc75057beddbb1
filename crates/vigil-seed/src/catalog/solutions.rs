//! Sector solutions

use super::seo;
use crate::reconciler::SeedEntry;
use vigil_store::Fields;

/// Solution collection
pub const COLLECTION: &str = "solutions";

/// Canonical solution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Solution {
    /// Natural key
    pub slug: &'static str,
    /// Sector title
    pub title: &'static str,
    /// One-line pitch
    pub summary: &'static str,
}

impl Solution {
    /// Seed entry with computed SEO fields; `order` is the display rank
    #[must_use]
    pub fn to_entry(&self, order: usize) -> SeedEntry {
        let seo = seo::solution(self.title, self.summary);
        SeedEntry::new(self.slug, Fields::new())
            .with_field("title", self.title)
            .with_field("summary", self.summary)
            .with_field("order", order)
            .with_field("is_active", true)
            .with_field(seo::SEO_TITLE, seo.title)
            .with_field(seo::SEO_DESCRIPTION, seo.description)
    }
}

/// Solutions, in display order
pub const SOLUTIONS: &[Solution] = &[
    Solution {
        slug: "commerces",
        title: "des commerces",
        summary: "Prévention des vols et accueil sécurisé de votre clientèle.",
    },
    Solution {
        slug: "bureaux",
        title: "des bureaux et sièges sociaux",
        summary: "Accueil, contrôle d'accès et rondes pour vos espaces tertiaires.",
    },
    Solution {
        slug: "chantiers",
        title: "des chantiers",
        summary: "Protection du matériel et des accès de vos chantiers BTP.",
    },
    Solution {
        slug: "logistique",
        title: "des sites logistiques",
        summary: "Surveillance des entrepôts, quais et parcs de stationnement.",
    },
    Solution {
        slug: "residences",
        title: "des résidences",
        summary: "Tranquillité des résidents et protection des parties communes.",
    },
    Solution {
        slug: "evenements",
        title: "des événements",
        summary: "Sécurisation de vos salons, concerts et soirées privées.",
    },
];
