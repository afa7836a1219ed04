//! Localized record descriptions

use crate::config::Locale;
use crate::models::EntityKind;

/// Action word for a lifecycle token, or `None` if the token is unknown
pub fn action_word(token: &str, locale: Locale) -> Option<&'static str> {
    let word = match (locale, token) {
        (Locale::En, "created") => "Creation",
        (Locale::En, "updated") => "Update",
        (Locale::En, "deleted") => "Deletion",
        (Locale::En, "restored") => "Restoration",
        (Locale::Fr, "created") => "Création",
        (Locale::Fr, "updated") => "Modification",
        (Locale::Fr, "deleted") => "Suppression",
        (Locale::Fr, "restored") => "Restauration",
        _ => return None,
    };
    Some(word)
}

/// `Web Order — Update`; unknown tokens are used verbatim
pub fn describe(kind: EntityKind, token: &str, locale: Locale) -> String {
    let action = action_word(token, locale).unwrap_or(token);
    format!("{} — {}", kind.humanized(), action)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_english_descriptions() {
        assert_eq!(
            describe(EntityKind::WebOrder, "updated", Locale::En),
            "Web Order — Update"
        );
        assert_eq!(
            describe(EntityKind::Client, "restored", Locale::En),
            "Client — Restoration"
        );
    }

    #[test]
    fn test_french_descriptions() {
        assert_eq!(
            describe(EntityKind::Ticket, "deleted", Locale::Fr),
            "Ticket — Suppression"
        );
        assert_eq!(action_word("created", Locale::Fr), Some("Création"));
    }

    #[test]
    fn test_unknown_token_falls_back() {
        assert_eq!(action_word("archived", Locale::En), None);
        assert_eq!(
            describe(EntityKind::Product, "archived", Locale::En),
            "Product — archived"
        );
    }
}
