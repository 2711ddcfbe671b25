//! Name patterns: `{param}` substitution, upper-casing, anchoring, and the
//! future-grant container prefix of wildcard patterns.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use grantplan_core::errors::ExpansionError;
use regex::Regex;

/// Trailing marker that makes a pattern a wildcard.
pub const WILDCARD: &str = ".*";

static PLACEHOLDER: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").ok());

/// A compiled, anchored pattern over canonical object names.
#[derive(Debug, Clone)]
pub struct NamePattern {
    text: String,
    matcher: Regex,
    container: Option<Regex>,
}

impl NamePattern {
    /// Substitute, upper-case and anchor `raw`. Wildcard patterns also get
    /// an anchored matcher for their container prefix.
    pub fn compile(
        profile: &str,
        raw: &str,
        params: &BTreeMap<String, String>,
    ) -> Result<Self, ExpansionError> {
        let text = upper_outside_escapes(&substitute(profile, raw, params)?);
        let matcher = anchored(profile, raw, &text)?;
        let container = match text.strip_suffix(WILDCARD) {
            Some(prefix) => Some(anchored(profile, raw, trim_separators(prefix))?),
            None => None,
        };
        Ok(Self {
            text,
            matcher,
            container,
        })
    }

    /// The substituted, upper-cased pattern text.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_wildcard(&self) -> bool {
        self.container.is_some()
    }

    /// Whether the whole of `name` matches.
    pub fn matches(&self, name: &str) -> bool {
        self.matcher.is_match(name)
    }

    /// Whether `name` is a container this wildcard pattern covers.
    pub fn matches_container(&self, name: &str) -> bool {
        self.container.as_ref().is_some_and(|c| c.is_match(name))
    }
}

/// Replace every `{param}` with its binding.
pub fn substitute(
    profile: &str,
    raw: &str,
    params: &BTreeMap<String, String>,
) -> Result<String, ExpansionError> {
    let Some(placeholder) = PLACEHOLDER.as_ref() else {
        return Ok(raw.to_string());
    };
    let mut out = String::with_capacity(raw.len());
    let mut last = 0;
    for captures in placeholder.captures_iter(raw) {
        let (Some(whole), Some(name)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        let value = params
            .get(name.as_str())
            .ok_or_else(|| ExpansionError::UnboundParameter {
                profile: profile.to_string(),
                pattern: raw.to_string(),
                parameter: name.as_str().to_string(),
            })?;
        out.push_str(&raw[last..whole.start()]);
        out.push_str(value);
        last = whole.end();
    }
    out.push_str(&raw[last..]);
    Ok(out)
}

/// Upper-case everything except the character after a backslash, so escapes
/// like `\d` keep their meaning.
pub fn upper_outside_escapes(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut escaped = false;
    for c in pattern.chars() {
        if escaped {
            out.push(c);
            escaped = false;
        } else {
            escaped = c == '\\';
            out.extend(c.to_uppercase());
        }
    }
    out
}

/// Drop separators left at the end of a prefix: `.`, `\.`, `[.]`.
fn trim_separators(mut prefix: &str) -> &str {
    loop {
        if let Some(rest) = prefix.strip_suffix("\\.").or_else(|| prefix.strip_suffix("[.]")) {
            prefix = rest;
        } else if let Some(rest) = prefix.strip_suffix('.') {
            prefix = rest;
        } else {
            return prefix;
        }
    }
}

fn anchored(profile: &str, raw: &str, text: &str) -> Result<Regex, ExpansionError> {
    Regex::new(&format!("^(?:{text})$")).map_err(|e| ExpansionError::InvalidPattern {
        profile: profile.to_string(),
        pattern: raw.to_string(),
        message: e.to_string(),
    })
}
