//! Content id conventions.
//!
//! Ids are kebab-case slugs (`ear-otitis-media`). They are usually derived from
//! the file name or the key the item is exported under, optionally with a
//! namespace prefix or qualifier suffix.

/// Maximum allowed length for a content id.
pub const MAX_ID_LENGTH: usize = 128;

/// Validates a kebab-case id without regex.
///
/// Valid ids: one or more `[a-z0-9]+` words joined by single hyphens.
#[must_use]
pub fn is_kebab_case(id: &str) -> bool {
    if id.is_empty() || id.len() > MAX_ID_LENGTH {
        return false;
    }
    id.split('-').all(|word| {
        !word.is_empty()
            && word
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
    })
}

/// Derive the logical slug of a file stem or export key.
///
/// Lowercases, splits camelCase words, maps `_`, `.` and whitespace to `-`,
/// and collapses repeats.
#[must_use]
pub fn slugify(raw: &str) -> String {
    let mut slug = String::with_capacity(raw.len());
    let mut prev: Option<char> = None;
    for c in raw.chars() {
        if c.is_ascii_uppercase()
            && prev.is_some_and(|p| p.is_ascii_lowercase() || p.is_ascii_digit())
        {
            slug.push('-');
        }
        prev = Some(c);
        let mapped = if c.is_ascii_alphanumeric() {
            Some(c.to_ascii_lowercase())
        } else if c == '-' || c == '_' || c == '.' || c.is_whitespace() {
            Some('-')
        } else {
            None
        };
        match mapped {
            Some('-') if slug.is_empty() || slug.ends_with('-') => {}
            Some(ch) => slug.push(ch),
            None => {}
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Whether `id` is consistent with `slug`.
///
/// Consistent means equal, or `slug` forms a whole-word prefix or suffix of
/// `id` (`otitis-media` matches `ear-otitis-media`).
#[must_use]
pub fn id_matches_slug(id: &str, slug: &str) -> bool {
    if slug.is_empty() {
        return true;
    }
    if id == slug {
        return true;
    }
    let prefixed = id
        .strip_prefix(slug)
        .is_some_and(|rest| rest.starts_with('-'));
    let suffixed = id
        .strip_suffix(slug)
        .is_some_and(|rest| rest.ends_with('-'));
    prefixed || suffixed
}
