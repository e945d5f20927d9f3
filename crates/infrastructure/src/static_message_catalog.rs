use sigma_application::MessageCatalog;
use sigma_domain::MessageKey;

/// Built-in English and German message tables.
///
/// Languages without a table fall back to English.
#[derive(Debug, Default, Clone, Copy)]
pub struct StaticMessageCatalog;

impl StaticMessageCatalog {
    /// Creates the catalog.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[derive(Debug, Clone, Copy)]
enum Language {
    English,
    German,
}

impl Language {
    fn resolve(tag: &str) -> Self {
        let primary = tag.split(['-', '_']).next().unwrap_or_default();
        if primary.eq_ignore_ascii_case("de") {
            Self::German
        } else {
            Self::English
        }
    }

    fn template(self, key: MessageKey) -> &'static str {
        match (self, key) {
            (Self::English, MessageKey::YouDontHavePermission) => {
                "You don't have permission for this action"
            }
            (Self::English, MessageKey::InvalidId) => "Invalid id",
            (Self::English, MessageKey::RecordNotFound) => "Record not found",
            (Self::English, MessageKey::VInfo) => "{} info",
            (Self::English, MessageKey::ListOfV) => "List of {}",
            (Self::English, MessageKey::VCreatedSuccessfully) => "{} created successfully",
            (Self::English, MessageKey::VUpdatedSuccessfully) => "{} updated successfully",
            (Self::English, MessageKey::VDeletedSuccessfully) => "{} deleted successfully",
            (Self::German, MessageKey::YouDontHavePermission) => {
                "Sie haben keine Berechtigung für diese Aktion"
            }
            (Self::German, MessageKey::InvalidId) => "Ungültige ID",
            (Self::German, MessageKey::RecordNotFound) => "Datensatz nicht gefunden",
            (Self::German, MessageKey::VInfo) => "Informationen zu {}",
            (Self::German, MessageKey::ListOfV) => "Liste der {}",
            (Self::German, MessageKey::VCreatedSuccessfully) => "{} erfolgreich erstellt",
            (Self::German, MessageKey::VUpdatedSuccessfully) => "{} erfolgreich aktualisiert",
            (Self::German, MessageKey::VDeletedSuccessfully) => "{} erfolgreich gelöscht",
        }
    }

    fn word(self, word: &str) -> Option<&'static str> {
        match (self, word) {
            (Self::English, "account") => Some("account"),
            (Self::English, "accounts") => Some("accounts"),
            (Self::German, "account") => Some("Konto"),
            (Self::German, "accounts") => Some("Konten"),
            _ => None,
        }
    }
}

impl MessageCatalog for StaticMessageCatalog {
    fn translate(&self, language: &str, key: MessageKey, args: &[&str]) -> String {
        let language = Language::resolve(language);
        let mut rendered = String::new();
        let mut args = args.iter();

        for (index, part) in language.template(key).split("{}").enumerate() {
            if index > 0 {
                let arg = args.next().copied().unwrap_or_default();
                rendered.push_str(language.word(arg).unwrap_or(arg));
            }
            rendered.push_str(part);
        }

        capitalize(rendered)
    }
}

fn capitalize(value: String) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) if first.is_lowercase() => first.to_uppercase().chain(chars).collect(),
        _ => value,
    }
}

#[cfg(test)]
mod tests {
    use sigma_application::MessageCatalog;
    use sigma_domain::MessageKey;

    use super::StaticMessageCatalog;

    #[test]
    fn english_templates_substitute_resource_words() {
        let catalog = StaticMessageCatalog::new();

        assert_eq!(
            catalog.translate("en", MessageKey::VInfo, &["account"]),
            "Account info"
        );
        assert_eq!(
            catalog.translate("en", MessageKey::ListOfV, &["accounts"]),
            "List of accounts"
        );
        assert_eq!(
            catalog.translate("en-US", MessageKey::VDeletedSuccessfully, &["account"]),
            "Account deleted successfully"
        );
    }

    #[test]
    fn german_table_translates_words() {
        let catalog = StaticMessageCatalog::new();

        assert_eq!(
            catalog.translate("de", MessageKey::VCreatedSuccessfully, &["account"]),
            "Konto erfolgreich erstellt"
        );
        assert_eq!(
            catalog.translate("de-AT", MessageKey::ListOfV, &["accounts"]),
            "Liste der Konten"
        );
    }

    #[test]
    fn unknown_language_falls_back_to_english() {
        let catalog = StaticMessageCatalog::new();

        assert_eq!(
            catalog.translate("fr", MessageKey::RecordNotFound, &[]),
            "Record not found"
        );
    }

    #[test]
    fn unknown_words_pass_through() {
        let catalog = StaticMessageCatalog::new();

        assert_eq!(
            catalog.translate("de", MessageKey::VUpdatedSuccessfully, &["widget"]),
            "Widget erfolgreich aktualisiert"
        );
    }
}
