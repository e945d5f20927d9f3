use sigma_domain::MessageKey;

/// Port resolving localized response messages.
///
/// Arguments are resource words; implementations translate them before
/// substituting and pass unknown words through unchanged.
pub trait MessageCatalog: Send + Sync {
    /// Renders the message for `key` in `language`.
    fn translate(&self, language: &str, key: MessageKey, args: &[&str]) -> String;
}
