//! CORS origin allow-list
//!
//! Compiles the configured comma-separated origin list once at startup.
//! Entries without a wildcard match by exact string equality; entries
//! containing `*` use glob semantics anchored at both ends (`*` matches any
//! substring, everything else is literal). Origins of the form
//! `http://localhost` or `http://localhost:<port>` are always allowed so
//! local development needs no configuration.
//!
//! Matching is exact-string or glob, never scheme-normalizing: an `https`
//! origin does not match an `http` entry, and a trailing slash makes an
//! origin a different string.

use regex::Regex;

/// One compiled allow-list entry.
#[derive(Debug, Clone)]
enum OriginRule {
    Exact(String),
    Pattern(Regex),
}

/// Immutable set of compiled origin rules.
#[derive(Debug, Clone, Default)]
pub struct OriginRules {
    rules: Vec<OriginRule>,
}

impl OriginRules {
    /// Compile a comma-separated allow-list, e.g.
    /// `"https://site.example,https://app-*.example.com"`.
    pub fn compile(list: &str) -> Self {
        let rules = list
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| {
                if entry.contains('*') {
                    OriginRule::Pattern(glob_to_regex(entry))
                } else {
                    OriginRule::Exact(entry.to_string())
                }
            })
            .collect();
        Self { rules }
    }

    /// Whether a request origin is allowed.
    ///
    /// `None` (same-origin requests, curl, server-to-server calls) is always
    /// allowed.
    pub fn is_allowed(&self, origin: Option<&str>) -> bool {
        let Some(origin) = origin else {
            return true;
        };

        if is_localhost(origin) {
            return true;
        }

        self.rules.iter().any(|rule| match rule {
            OriginRule::Exact(expected) => expected == origin,
            OriginRule::Pattern(pattern) => pattern.is_match(origin),
        })
    }
}

/// `*` matches any substring (including empty); everything else is literal.
fn glob_to_regex(glob: &str) -> Regex {
    let mut pattern = String::with_capacity(glob.len() + 8);
    pattern.push('^');
    for (i, part) in glob.split('*').enumerate() {
        if i > 0 {
            pattern.push_str(".*");
        }
        pattern.push_str(&regex::escape(part));
    }
    pattern.push('$');
    Regex::new(&pattern).expect("escaped glob compiles")
}

/// `http://localhost` with an optional numeric port, nothing else.
fn is_localhost(origin: &str) -> bool {
    match origin.strip_prefix("http://localhost") {
        Some("") => true,
        Some(rest) => rest
            .strip_prefix(':')
            .is_some_and(|port| !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit())),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_entries_match_only_themselves() {
        let rules = OriginRules::compile("https://site.example,https://other.example");

        assert!(rules.is_allowed(Some("https://site.example")));
        assert!(rules.is_allowed(Some("https://other.example")));
        assert!(!rules.is_allowed(Some("https://site.examplex")));
        assert!(!rules.is_allowed(Some("https://site.example/")));
        assert!(!rules.is_allowed(Some("http://site.example")));
    }

    #[test]
    fn glob_entries_match_substrings() {
        let rules = OriginRules::compile("https://app-*.example.com");

        assert!(rules.is_allowed(Some("https://app-123.example.com")));
        assert!(rules.is_allowed(Some("https://app-.example.com")));
        assert!(!rules.is_allowed(Some("https://evil.com")));
        assert!(!rules.is_allowed(Some("https://app-123.example.com.evil.com")));
    }

    #[test]
    fn glob_dots_are_literal() {
        let rules = OriginRules::compile("https://*.example.com");

        assert!(rules.is_allowed(Some("https://a.example.com")));
        assert!(!rules.is_allowed(Some("https://aXexampleXcom")));
    }

    #[test]
    fn absent_origin_is_always_allowed() {
        let rules = OriginRules::compile("");
        assert!(rules.is_allowed(None));
    }

    #[test]
    fn localhost_is_allowed_without_configuration() {
        let rules = OriginRules::compile("");

        assert!(rules.is_allowed(Some("http://localhost")));
        assert!(rules.is_allowed(Some("http://localhost:5173")));
        assert!(rules.is_allowed(Some("http://localhost:3000")));
    }

    #[test]
    fn localhost_escape_hatch_is_narrow() {
        let rules = OriginRules::compile("");

        assert!(!rules.is_allowed(Some("https://localhost:5173")));
        assert!(!rules.is_allowed(Some("http://localhost:")));
        assert!(!rules.is_allowed(Some("http://localhost:51x3")));
        assert!(!rules.is_allowed(Some("http://localhost.evil.com")));
        assert!(!rules.is_allowed(Some("http://localhost/")));
        assert!(!rules.is_allowed(Some("http://127.0.0.1:5173")));
    }

    #[test]
    fn entries_are_trimmed_and_empty_entries_skipped() {
        let rules = OriginRules::compile(" https://site.example , ,https://b.example ");

        assert!(rules.is_allowed(Some("https://site.example")));
        assert!(rules.is_allowed(Some("https://b.example")));
    }
}
