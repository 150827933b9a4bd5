//! Pure identifier utilities: word-prefix computation over constant names,
//! cross-reference-driven type qualification, and const-case conversion.

use std::collections::{BTreeSet, VecDeque};

use regex::Regex;

/// The shared leading word sequence of a set of constant names.
///
/// Words are the `_`-separated segments of a name. A prefix is always a
/// proper prefix: each member keeps at least its final word as a suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordPrefix {
    words: Vec<String>,
}

impl WordPrefix {
    pub fn new(words: Vec<String>) -> Self {
        Self { words }
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    /// The prefix rendered back as a name segment, e.g. `PEN_TYPE`.
    pub fn joined(&self) -> String {
        self.words.join("_")
    }

    /// Whether `self` is a leading word sequence of `other`.
    pub fn is_word_prefix_of(&self, other: &WordPrefix) -> bool {
        self.words.len() <= other.words.len() && other.words[..self.words.len()] == self.words[..]
    }
}

/// Compute the longest common leading word sequence over a set of constant
/// short names.
///
/// Each name's final word is dropped before comparison: the last word of a
/// name is never part of the shared prefix, since the prefix must leave every
/// member a non-empty suffix. A singleton input yields exactly that name's
/// first word (degenerate single-member groups still get a usable name).
/// Names in `ignored` are excluded from the comparison but remain members of
/// whatever group the caller builds. Returns `None` when no leading word is
/// shared, which callers treat as "not cluster-worthy".
pub fn common_prefix<'a, I>(names: I, ignored: &BTreeSet<String>) -> Option<WordPrefix>
where
    I: IntoIterator<Item = &'a str>,
{
    let names: Vec<&str> = names.into_iter().collect();
    if names.is_empty() {
        return None;
    }

    if names.len() == 1 {
        let first = names[0].split('_').next().unwrap_or_default();
        if first.is_empty() {
            return None;
        }
        return Some(WordPrefix::new(vec![first.to_owned()]));
    }

    let compared: Vec<Vec<&str>> = names
        .iter()
        .filter(|name| !ignored.contains(**name))
        .map(|name| {
            let mut words: Vec<&str> = name.split('_').collect();
            words.pop();
            words
        })
        .collect();

    if compared.is_empty() {
        return None;
    }

    let mut shared = compared.iter().map(Vec::len).min().unwrap_or(0);
    for words in &compared {
        let mut common = 0;
        while common < shared && words[common] == compared[0][common] {
            common += 1;
        }
        shared = common;
    }

    if shared == 0 {
        return None;
    }

    Some(WordPrefix::new(
        compared[0][..shared].iter().map(|w| (*w).to_owned()).collect(),
    ))
}

/// Qualify every bare capitalized type token in `raw` with a package name.
///
/// Tokens are processed left-to-right, including inside generic angle-bracket
/// segments, consuming `hints` (packages taken from documentation hyperlinks)
/// in the same order they appeared in the source text. A token with no
/// remaining hint defaults to `owning_package`. Tokens that already contain a
/// dot are left untouched and consume no hint.
pub fn qualify_type(raw: &str, owning_package: &str, hints: &mut VecDeque<String>) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut token = String::new();

    let flush = |token: &mut String, out: &mut String, hints: &mut VecDeque<String>| {
        if token.is_empty() {
            return;
        }
        let starts_upper = token.chars().next().is_some_and(|c| c.is_ascii_uppercase());
        if starts_upper && !token.contains('.') {
            let package = hints
                .pop_front()
                .unwrap_or_else(|| owning_package.to_owned());
            out.push_str(&package);
            out.push('.');
        }
        out.push_str(token);
        token.clear();
    };

    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() || ch == '_' || ch == '.' || ch == '$' {
            token.push(ch);
        } else {
            flush(&mut token, &mut out, hints);
            out.push(ch);
        }
    }
    flush(&mut token, &mut out, hints);

    out
}

/// Convert a camel-case identifier to `UPPER_SNAKE`, inserting a separator
/// before each interior capital-letter run. `cleanup` is stripped from the
/// identifier first when present.
pub fn to_const_case(identifier: &str, cleanup: Option<&Regex>) -> String {
    let cleaned: String = match cleanup {
        Some(pattern) => pattern.replace_all(identifier, "").into_owned(),
        None => identifier.to_owned(),
    };

    let mut out = String::with_capacity(cleaned.len() + 4);
    let mut prev_breaks = false;
    for ch in cleaned.chars() {
        if ch.is_ascii_uppercase() && prev_breaks {
            out.push('_');
        }
        prev_breaks = ch.is_ascii_lowercase() || ch.is_ascii_digit();
        out.push(ch.to_ascii_uppercase());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn prefix_of(names: &[&str]) -> Option<String> {
        common_prefix(names.iter().copied(), &BTreeSet::new()).map(|p| p.joined())
    }

    #[test]
    fn shared_prefix_excludes_final_words() {
        assert_eq!(
            prefix_of(&["PEN_TYPE_FINGER", "PEN_TYPE_STYLUS", "PEN_TYPE_ERASER"]),
            Some("PEN_TYPE".to_owned())
        );
        // The last word never joins the prefix, even when fully shared.
        assert_eq!(
            prefix_of(&["MODE_DEFAULT", "MODE_DEFAULT_ALT_DEFAULT"]),
            Some("MODE".to_owned())
        );
    }

    #[test]
    fn singleton_uses_first_word() {
        assert_eq!(prefix_of(&["MODE_DEFAULT"]), Some("MODE".to_owned()));
        assert_eq!(prefix_of(&["DEFAULT"]), Some("DEFAULT".to_owned()));
    }

    #[test]
    fn unrelated_names_have_no_prefix() {
        assert_eq!(prefix_of(&["FEATURE_CAMERA", "MODE_DEFAULT"]), None);
        assert_eq!(prefix_of(&[]), None);
    }

    #[test]
    fn single_word_members_cannot_share_a_prefix() {
        assert_eq!(prefix_of(&["FINGER", "FLAG"]), None);
    }

    #[test]
    fn ignored_names_do_not_constrain_the_prefix() {
        let ignored: BTreeSet<String> = ["UNKNOWN".to_owned()].into_iter().collect();
        let got = common_prefix(
            ["PEN_TYPE_FINGER", "PEN_TYPE_STYLUS", "UNKNOWN"].into_iter(),
            &ignored,
        );
        assert_eq!(got.map(|p| p.joined()), Some("PEN_TYPE".to_owned()));
    }

    #[test]
    fn all_ignored_yields_no_prefix() {
        let ignored: BTreeSet<String> =
            ["A_B_C".to_owned(), "A_B_D".to_owned()].into_iter().collect();
        assert_eq!(common_prefix(["A_B_C", "A_B_D"].into_iter(), &ignored), None);
    }

    #[test]
    fn word_prefix_relation() {
        let shorter = WordPrefix::new(vec!["PEN".into()]);
        let longer = WordPrefix::new(vec!["PEN".into(), "TYPE".into()]);
        assert!(shorter.is_word_prefix_of(&longer));
        assert!(!longer.is_word_prefix_of(&shorter));
        assert!(shorter.is_word_prefix_of(&shorter));
    }

    #[test]
    fn qualifies_bare_tokens_with_hints_in_order() {
        let mut hints: VecDeque<String> = [
            "java.util".to_owned(),
            "com.x.draw".to_owned(),
            "com.x.io".to_owned(),
        ]
        .into();
        let got = qualify_type("Map<Pen, Stream>", "com.x", &mut hints);
        assert_eq!(got, "java.util.Map<com.x.draw.Pen, com.x.io.Stream>");
        assert!(hints.is_empty());
    }

    #[test]
    fn qualification_defaults_to_owning_package() {
        let mut hints = VecDeque::new();
        assert_eq!(qualify_type("Pen", "com.x", &mut hints), "com.x.Pen");
        assert_eq!(qualify_type("int", "com.x", &mut hints), "int");
        assert_eq!(qualify_type("Pen[]", "com.x", &mut hints), "com.x.Pen[]");
    }

    #[test]
    fn dotted_tokens_pass_through_without_consuming_hints() {
        let mut hints: VecDeque<String> = ["com.x.draw".to_owned()].into();
        let got = qualify_type("java.lang.String, Pen", "com.x", &mut hints);
        assert_eq!(got, "java.lang.String, com.x.draw.Pen");
    }

    #[test]
    fn const_case_inserts_separators_before_capital_runs() {
        assert_eq!(to_const_case("featureId", None), "FEATURE_ID");
        assert_eq!(to_const_case("penType", None), "PEN_TYPE");
        assert_eq!(to_const_case("maxAdContentRating", None), "MAX_AD_CONTENT_RATING");
        assert_eq!(to_const_case("MODE", None), "MODE");
    }

    #[test]
    fn const_case_applies_cleanup_first() {
        let cleanup = Regex::new("Id$").unwrap();
        assert_eq!(to_const_case("featureId", Some(&cleanup)), "FEATURE");
    }
}
