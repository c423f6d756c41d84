/// Derive a display name from an email address (best-effort).
///
/// Example: "sarah.chen@acme.com" → "Sarah Chen"
pub fn name_from_email(email: &str) -> String {
    let local = email.split('@').next().unwrap_or(email);
    local
        .split(|c: char| c == '.' || c == '_' || c == '-' || c == '+')
        .filter(|s| !s.is_empty())
        .map(title_case_word)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Upper-case the first character and lower-case the rest.
pub fn title_case_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Mail domain label derived from a company name.
///
/// Example: "Acme, Inc" → "acmeinc"
pub fn company_domain(company: &str) -> String {
    company
        .to_lowercase()
        .chars()
        .filter(|c| *c != ' ' && *c != ',')
        .collect()
}

/// Build the address a chat participant would have at the prospect.
///
/// Example: ("Jordan Lee", "Acme") → "jordan.lee@acme.com"
pub fn synthetic_email(display_name: &str, company: &str) -> String {
    let local = display_name
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(".");
    format!("{}@{}.com", local, company_domain(company))
}

/// First `max_chars` characters of `text`, never splitting a code point.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Make a user-supplied name safe to use as a single path component.
pub fn sanitize_file_component(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            c => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_from_email() {
        assert_eq!(name_from_email("sarah.chen@acme.com"), "Sarah Chen");
        assert_eq!(name_from_email("joe_smith@bigcorp.io"), "Joe Smith");
        assert_eq!(name_from_email("alice@example.com"), "Alice");
        assert_eq!(name_from_email("MARY-ANN@x.org"), "Mary Ann");
    }

    #[test]
    fn test_company_domain() {
        assert_eq!(company_domain("Acme"), "acme");
        assert_eq!(company_domain("Acme Corp, Inc"), "acmecorpinc");
        assert_eq!(company_domain(""), "");
    }

    #[test]
    fn test_synthetic_email() {
        assert_eq!(synthetic_email("Jordan Lee", "Acme"), "jordan.lee@acme.com");
        assert_eq!(synthetic_email("  Sam   Chen ", "Big Co"), "sam.chen@bigco.com");
    }

    #[test]
    fn test_truncate_chars_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("hi", 10), "hi");
    }

    #[test]
    fn test_sanitize_file_component() {
        assert_eq!(sanitize_file_component("A/B\\C"), "A_B_C");
        assert_eq!(sanitize_file_component("Tesla"), "Tesla");
    }
}
