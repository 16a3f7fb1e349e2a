use std::collections::HashMap;

/// Lowercases, collapses non-alphanumeric runs into single hyphens, and
/// trims leading/trailing hyphens.
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_hyphen = false;

    for character in value.trim().chars() {
        let lowered = character.to_ascii_lowercase();
        if lowered.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(lowered);
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

/// Assigns collision-free slugs within one resource kind's import run.
/// Repeated base slugs get a `-N` suffix (N >= 2). Construct a fresh factory
/// per resource kind per run; counters are never shared across kinds.
#[derive(Debug, Default)]
pub struct SlugFactory {
    counts: HashMap<String, u32>,
}

impl SlugFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assign(&mut self, slug_base: &str, fallback_label: &str) -> String {
        let mut normalized = slugify(slug_base);
        if normalized.is_empty() {
            normalized = slugify(fallback_label);
        }
        if normalized.is_empty() {
            normalized = "item".to_string();
        }

        let count = self.counts.entry(normalized.clone()).or_insert(0);
        *count += 1;

        if *count == 1 {
            normalized
        } else {
            format!("{normalized}-{count}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_titles_into_url_safe_slugs() {
        assert_eq!(slugify("  Dev Stack!  "), "dev-stack");
        assert_eq!(slugify("A --- B"), "a-b");
        assert_eq!(slugify("Rust & Tokio 2026"), "rust-tokio-2026");
        assert_eq!(slugify("***"), "");
    }

    #[test]
    fn suffixes_repeated_base_slugs() {
        let mut factory = SlugFactory::new();
        assert_eq!(factory.assign("Dev Stack", "uses-section"), "dev-stack");
        assert_eq!(factory.assign("Dev Stack", "uses-section"), "dev-stack-2");
        assert_eq!(factory.assign("dev stack", "uses-section"), "dev-stack-3");
    }

    #[test]
    fn falls_back_to_label_then_literal_item() {
        let mut factory = SlugFactory::new();
        assert_eq!(factory.assign("???", "now-entry"), "now-entry");
        assert_eq!(factory.assign("???", "---"), "item");
        assert_eq!(factory.assign("!!!", "***"), "item-2");
    }

    #[test]
    fn factories_keep_independent_counters() {
        let mut first = SlugFactory::new();
        let mut second = SlugFactory::new();
        assert_eq!(first.assign("Alpha", "x"), "alpha");
        assert_eq!(second.assign("Alpha", "x"), "alpha");
    }
}
