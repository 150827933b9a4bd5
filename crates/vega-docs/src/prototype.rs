//! Splitting of raw method/constructor prototype text.
//!
//! Prototype text arrives as one line of the class page's detail section,
//! e.g. `public static int getPenType(Pen pen, int flags)`. Splitting is
//! angle-bracket aware so generic types containing commas and spaces survive.

/// A split prototype. Types are still raw (unqualified) text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Prototype {
    pub modifiers: Vec<String>,
    /// `None` for constructors.
    pub return_type: Option<String>,
    pub name: String,
    /// `(raw type, parameter name)` pairs in declaration order.
    pub params: Vec<(String, String)>,
}

const MODIFIERS: &[&str] = &[
    "public",
    "protected",
    "private",
    "static",
    "final",
    "abstract",
    "native",
    "synchronized",
    "default",
];

/// Split prototype text into modifiers, return type, name, and parameters.
///
/// Returns `None` when the text has no parameter list at all, which real
/// documentation never produces for a method or constructor row.
pub fn split_prototype(text: &str) -> Option<Prototype> {
    let text = text.trim().trim_end_matches(';').trim();
    let open = text.find('(')?;
    let close = text.rfind(')')?;
    if close < open {
        return None;
    }

    let head = &text[..open];
    let params_text = &text[open + 1..close];

    let head_tokens = split_top_level(head, char::is_whitespace);
    let mut tokens = head_tokens.as_slice();

    let name = tokens.last()?.to_owned();
    tokens = &tokens[..tokens.len() - 1];

    let mut modifiers = Vec::new();
    while let Some((first, rest)) = tokens.split_first() {
        if MODIFIERS.contains(&first.as_str()) {
            modifiers.push(first.clone());
            tokens = rest;
        } else {
            break;
        }
    }

    // Whatever remains between the modifiers and the name is the return
    // type; constructors have none.
    let return_type = if tokens.is_empty() {
        None
    } else {
        Some(tokens.join(" "))
    };

    let mut params = Vec::new();
    for raw_param in split_top_level(params_text, |c| c == ',') {
        let raw_param = raw_param.trim();
        if raw_param.is_empty() {
            continue;
        }
        let split_at = raw_param
            .rfind(|c: char| c.is_whitespace())
            .unwrap_or(raw_param.len());
        let (ty, name) = raw_param.split_at(split_at);
        params.push((ty.trim().to_owned(), name.trim().to_owned()));
    }

    Some(Prototype {
        modifiers,
        return_type,
        name,
        params,
    })
}

/// Split `text` at separator characters occurring outside `<...>` segments.
fn split_top_level(text: &str, is_sep: impl Fn(char) -> bool) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;

    for ch in text.chars() {
        match ch {
            '<' => {
                depth += 1;
                current.push(ch);
            }
            '>' => {
                depth = depth.saturating_sub(1);
                current.push(ch);
            }
            c if depth == 0 && is_sep(c) => {
                if !current.is_empty() {
                    parts.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        parts.push(current);
    }
    parts
}
