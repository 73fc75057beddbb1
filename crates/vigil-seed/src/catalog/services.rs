//! Security services

use super::seo;
use crate::reconciler::SeedEntry;
use vigil_store::Fields;

/// Service collection
pub const COLLECTION: &str = "services";

/// Canonical service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Service {
    /// Natural key
    pub slug: &'static str,
    /// Display name
    pub name: &'static str,
    /// Short description
    pub summary: &'static str,
}

impl Service {
    /// Seed entry with computed SEO fields; `order` is the display rank
    #[must_use]
    pub fn to_entry(&self, order: usize) -> SeedEntry {
        let seo = seo::service(self.name, self.summary);
        SeedEntry::new(self.slug, Fields::new())
            .with_field("name", self.name)
            .with_field("short_description", self.summary)
            .with_field("order", order)
            .with_field("is_active", true)
            .with_field(seo::SEO_TITLE, seo.title)
            .with_field(seo::SEO_DESCRIPTION, seo.description)
    }
}

/// Services, in display order
pub const SERVICES: &[Service] = &[
    Service {
        slug: "gardiennage",
        name: "Gardiennage et surveillance",
        summary: "Agents de sécurité postés pour protéger vos locaux de jour comme de nuit.",
    },
    Service {
        slug: "rondes-intervention",
        name: "Rondes et intervention sur alarme",
        summary: "Rondes de contrôle et levée de doute rapide sur déclenchement d'alarme.",
    },
    Service {
        slug: "securite-evenementielle",
        name: "Sécurité événementielle",
        summary: "Contrôle d'accès, filtrage et gestion des flux pour vos événements.",
    },
    Service {
        slug: "securite-incendie",
        name: "Sécurité incendie SSIAP",
        summary: "Agents SSIAP pour la prévention incendie et l'assistance aux personnes.",
    },
    Service {
        slug: "agents-cynophiles",
        name: "Agents cynophiles",
        summary: "Maîtres-chiens pour la surveillance de sites étendus et sensibles.",
    },
    Service {
        slug: "videoprotection",
        name: "Télésurveillance et vidéoprotection",
        summary: "Surveillance à distance de vos sites, reliée à nos équipes d'intervention.",
    },
];
