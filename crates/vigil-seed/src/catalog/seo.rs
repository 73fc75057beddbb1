//! Computed SEO fields
//!
//! These strings are the refreshable part of every canonical entry: they
//! are recomputed on each seed run so copy changes reach existing records.

/// Brand suffix appended to titles
pub const BRAND: &str = "Vigil Sécurité";

/// Title length search engines display
pub const TITLE_MAX_CHARS: usize = 60;

/// Description length search engines display
pub const DESCRIPTION_MAX_CHARS: usize = 160;

/// Field holding the computed title
pub const SEO_TITLE: &str = "seo_title";

/// Field holding the computed description
pub const SEO_DESCRIPTION: &str = "seo_description";

/// Title and description pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeoFields {
    /// Page title, brand suffixed
    pub title: String,
    /// Meta description
    pub description: String,
}

impl SeoFields {
    fn new(title: String, description: String) -> Self {
        Self {
            title: truncate_chars(&title, TITLE_MAX_CHARS),
            description: truncate_chars(&description, DESCRIPTION_MAX_CHARS),
        }
    }
}

/// SEO fields of a commune page
#[must_use]
pub fn commune(name: &str, postal_code: &str, department: &str) -> SeoFields {
    SeoFields::new(
        format!("Agent de sécurité à {name} ({postal_code}) | {BRAND}"),
        format!(
            "Gardiennage, rondes et sécurité événementielle à {name} ({department}). \
             Agents qualifiés, intervention rapide, devis gratuit sous 24h."
        ),
    )
}

/// SEO fields of a service page
#[must_use]
pub fn service(name: &str, summary: &str) -> SeoFields {
    SeoFields::new(
        format!("{name} | {BRAND}"),
        format!("{summary} Devis gratuit et personnalisé en Île-de-France."),
    )
}

/// SEO fields of a sector solution page
#[must_use]
pub fn solution(title: &str, summary: &str) -> SeoFields {
    SeoFields::new(
        format!("Sécurité {title} | {BRAND}"),
        format!("{summary} Un dispositif adapté à votre activité."),
    )
}

/// Cut to `max` characters, ending with an ellipsis when cut
#[must_use]
pub fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{}…", kept.trim_end())
}
