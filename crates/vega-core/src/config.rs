use std::collections::BTreeSet;

use regex::Regex;

/// Engine configuration, fixed before parsing and threaded explicitly into
/// every inference entry point.
///
/// All patterns are optional; a `None` pattern disables the corresponding
/// behavior. The config is cloned freely and never mutated mid-parse.
#[derive(Debug, Clone)]
pub struct InferenceConfig {
    /// Constant short names excluded from prefix computation. Ignored
    /// constants still become members of whatever group claims them, keeping
    /// their full name verbatim as the member name.
    pub ignored_constants: BTreeSet<String>,
    /// Restrict constant collection to integer-typed values. String constants
    /// are recorded (but never clustered) when this is off.
    pub integer_constants_only: bool,
    /// Applied to parameter names before they are used as naming hints or
    /// fallback search keys.
    pub parameter_hint_cleanup: Option<Regex>,
    /// Recognizes getter/setter method names, e.g. `^(?:get|set|is)`.
    pub accessor_prefixes: Option<Regex>,
    /// Applied to an accessor-derived hint after the prefix is stripped.
    pub accessor_hint_cleanup: Option<Regex>,
    /// Parameter names matching this pattern opt out of enum inference
    /// entirely; their qualified type is returned unchanged.
    pub excluded_parameters: Option<Regex>,
    /// Corrections for known documentation prose errors, applied in order to
    /// each description block before tokenizing.
    pub prose_corrections: Vec<(Regex, String)>,
    /// Extend the name-similarity fallback search into sibling sub-packages
    /// (packages whose name is prefixed by the current package's name).
    pub search_sibling_packages: bool,
}

impl InferenceConfig {
    pub fn new() -> Self {
        Self {
            ignored_constants: BTreeSet::new(),
            integer_constants_only: true,
            parameter_hint_cleanup: None,
            accessor_prefixes: Some(
                Regex::new("^(?:get|set|is)").expect("static pattern compiles"),
            ),
            accessor_hint_cleanup: None,
            excluded_parameters: None,
            prose_corrections: Vec::new(),
            search_sibling_packages: false,
        }
    }

    pub fn ignore_constant(mut self, name: impl Into<String>) -> Self {
        self.ignored_constants.insert(name.into());
        self
    }

    /// Whether `method_name` looks like a getter/setter whose name should
    /// drive hint derivation.
    pub fn is_accessor(&self, method_name: &str) -> bool {
        self.accessor_prefixes
            .as_ref()
            .is_some_and(|p| p.is_match(method_name))
    }

    /// Strip the accessor prefix from `method_name` and apply the accessor
    /// hint cleanup. Returns `None` for non-accessor names.
    pub fn accessor_hint<'a>(&self, method_name: &'a str) -> Option<String> {
        let prefixes = self.accessor_prefixes.as_ref()?;
        let found = prefixes.find(method_name)?;
        if found.start() != 0 {
            return None;
        }
        let stripped = &method_name[found.end()..];
        if stripped.is_empty() {
            return None;
        }
        Some(match &self.accessor_hint_cleanup {
            Some(cleanup) => cleanup.replace_all(stripped, "").into_owned(),
            None => stripped.to_owned(),
        })
    }

    pub fn is_excluded_parameter(&self, name: &str) -> bool {
        self.excluded_parameters
            .as_ref()
            .is_some_and(|p| p.is_match(name))
    }

    /// Apply the configured prose corrections to one description block.
    pub fn correct_prose(&self, text: &str) -> String {
        let mut corrected = text.to_owned();
        for (pattern, replacement) in &self.prose_corrections {
            corrected = pattern
                .replace_all(&corrected, replacement.as_str())
                .into_owned();
        }
        corrected
    }
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn accessor_hint_strips_prefix_and_cleans() {
        let mut config = InferenceConfig::new();
        assert_eq!(config.accessor_hint("getPenType"), Some("PenType".to_owned()));
        assert_eq!(config.accessor_hint("penType"), None);

        config.accessor_hint_cleanup = Some(Regex::new("Hint$").unwrap());
        assert_eq!(config.accessor_hint("setModeHint"), Some("Mode".to_owned()));
    }

    #[test]
    fn prose_corrections_apply_in_order() {
        let mut config = InferenceConfig::new();
        config
            .prose_corrections
            .push((Regex::new("PEN_TPE").unwrap(), "PEN_TYPE".to_owned()));
        assert_eq!(
            config.correct_prose("one of PEN_TPE_FINGER"),
            "one of PEN_TYPE_FINGER"
        );
    }
}
