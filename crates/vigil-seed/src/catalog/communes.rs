//! Communes served

use super::seo;
use crate::reconciler::SeedEntry;
use crate::slug::slugify;
use vigil_store::Fields;

/// Commune collection
pub const COLLECTION: &str = "communes";

/// Canonical commune
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Commune {
    /// Display name
    pub name: &'static str,
    /// Postal code
    pub postal_code: &'static str,
    /// Department name and number
    pub department: &'static str,
}

impl Commune {
    /// Seed entry with computed SEO fields
    #[must_use]
    pub fn to_entry(&self) -> SeedEntry {
        let seo = seo::commune(self.name, self.postal_code, self.department);
        SeedEntry::new(slugify(self.name), Fields::new())
            .with_field("name", self.name)
            .with_field("postal_code", self.postal_code)
            .with_field("department", self.department)
            .with_field("is_active", true)
            .with_field(seo::SEO_TITLE, seo.title)
            .with_field(seo::SEO_DESCRIPTION, seo.description)
    }
}

const fn commune(
    name: &'static str,
    postal_code: &'static str,
    department: &'static str,
) -> Commune {
    Commune {
        name,
        postal_code,
        department,
    }
}

/// Communes, in display order
pub const COMMUNES: &[Commune] = &[
    commune("Paris", "75000", "Paris"),
    commune("Boulogne-Billancourt", "92100", "Hauts-de-Seine"),
    commune("Nanterre", "92000", "Hauts-de-Seine"),
    commune("Saint-Denis", "93200", "Seine-Saint-Denis"),
    commune("Montreuil", "93100", "Seine-Saint-Denis"),
    commune("Créteil", "94000", "Val-de-Marne"),
    commune("Vitry-sur-Seine", "94400", "Val-de-Marne"),
    commune("Saint-Maur-des-Fossés", "94100", "Val-de-Marne"),
    commune("Argenteuil", "95100", "Val-d'Oise"),
    commune("Versailles", "78000", "Yvelines"),
    commune("Évry-Courcouronnes", "91000", "Essonne"),
    commune("Meaux", "77100", "Seine-et-Marne"),
];
