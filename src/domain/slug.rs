use tracing::debug;

use super::DomainError;
use crate::db::{BlogStore, Result};

/// Derive the base slug of a title.
///
/// Lower-cases the trimmed title, keeps ASCII word characters (`a-z`, `0-9`,
/// `_`), turns every run of whitespace and hyphens into a single hyphen and
/// drops everything else. Leading and trailing hyphens never survive. The
/// result may be empty (e.g. for `"***"`).
pub fn normalize_title(title: &str) -> String {
    let lowered = title.trim().to_lowercase();

    let mut slug = String::with_capacity(lowered.len());
    let mut pending_hyphen = false;
    for ch in lowered.chars() {
        if ch.is_ascii_alphanumeric() || ch == '_' {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            slug.push(ch);
            pending_hyphen = false;
        } else if ch == '-' || ch.is_whitespace() {
            pending_hyphen = true;
        }
    }

    slug
}

/// Base slug of a title, rejecting titles with nothing usable in them
pub fn base_slug(title: &str) -> std::result::Result<String, DomainError> {
    let base = normalize_title(title);
    if base.is_empty() {
        return Err(DomainError::Validation(
            "Title must contain at least one letter or digit.".to_string(),
        ));
    }
    Ok(base)
}

/// Find the first free slug among `base`, `base-2`, `base-3`, ...
///
/// The returned slug was free when probed; nothing reserves it, so the insert
/// that follows can still hit the store's unique constraint.
#[tracing::instrument(skip(store))]
pub async fn allocate_slug(store: &dyn BlogStore, base: &str) -> Result<String> {
    if !store.slug_exists(base).await? {
        return Ok(base.to_string());
    }

    let mut counter: u64 = 2;
    loop {
        let candidate = format!("{}-{}", base, counter);
        if !store.slug_exists(&candidate).await? {
            debug!(slug = %candidate, "Allocated suffixed slug");
            return Ok(candidate);
        }
        counter += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::{NewBlog, NewUser};
    use proptest::prelude::*;

    #[test]
    fn test_normalize_punctuation_and_digits() {
        assert_eq!(normalize_title("Hello, World! 2025"), "hello-world-2025");
    }

    #[test]
    fn test_normalize_collapses_whitespace() {
        assert_eq!(normalize_title("   Multiple   Spaces  "), "multiple-spaces");
        assert_eq!(normalize_title("tabs\tand\nnewlines"), "tabs-and-newlines");
    }

    #[test]
    fn test_normalize_collapses_hyphens() {
        assert_eq!(normalize_title("a - b -- c"), "a-b-c");
        assert_eq!(normalize_title("--leading and trailing--"), "leading-and-trailing");
    }

    #[test]
    fn test_normalize_drops_symbols_without_separating() {
        assert_eq!(normalize_title("Rust's borrow-checker"), "rusts-borrow-checker");
        assert_eq!(normalize_title("C++ & Rust"), "c-rust");
    }

    #[test]
    fn test_normalize_keeps_underscore_drops_non_ascii() {
        assert_eq!(normalize_title("snake_case Title"), "snake_case-title");
        assert_eq!(normalize_title("Café Crème"), "caf-crme");
    }

    #[test]
    fn test_normalize_all_punctuation_is_empty() {
        assert_eq!(normalize_title("***"), "");
        assert_eq!(normalize_title("   "), "");
    }

    #[test]
    fn test_base_slug_rejects_empty() {
        assert!(matches!(base_slug("***"), Err(DomainError::Validation(_))));
        assert_eq!(base_slug("Hello").unwrap(), "hello");
    }

    async fn seed_blog(store: &MemoryStore, user_id: i64, slug: &str) {
        store
            .insert_blog(&NewBlog {
                user_id,
                title: slug.to_string(),
                slug: slug.to_string(),
                category: "general".to_string(),
                description: None,
                content: "content".to_string(),
                cover_img: String::new(),
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_allocate_suffixes_in_order() {
        let store = MemoryStore::new();
        let user = store
            .insert_user(&NewUser {
                clerk_user_id: "user_1".to_string(),
                username: "joel".to_string(),
                email: None,
                img: String::new(),
            })
            .await
            .unwrap();

        assert_eq!(allocate_slug(&store, "hello").await.unwrap(), "hello");
        seed_blog(&store, user.id, "hello").await;

        assert_eq!(allocate_slug(&store, "hello").await.unwrap(), "hello-2");
        seed_blog(&store, user.id, "hello-2").await;

        assert_eq!(allocate_slug(&store, "hello").await.unwrap(), "hello-3");
    }

    #[tokio::test]
    async fn test_allocate_fills_first_gap() {
        let store = MemoryStore::new();
        let user = store
            .insert_user(&NewUser {
                clerk_user_id: "user_1".to_string(),
                username: "joel".to_string(),
                email: None,
                img: String::new(),
            })
            .await
            .unwrap();

        seed_blog(&store, user.id, "hello").await;
        seed_blog(&store, user.id, "hello-3").await;

        assert_eq!(allocate_slug(&store, "hello").await.unwrap(), "hello-2");
    }

    proptest! {
        #[test]
        fn prop_slug_is_url_safe(title in "\\PC*") {
            let slug = normalize_title(&title);
            prop_assert!(slug
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-'));
            prop_assert!(!slug.starts_with('-'));
            prop_assert!(!slug.ends_with('-'));
            prop_assert!(!slug.contains("--"));
        }

        #[test]
        fn prop_normalize_is_idempotent(title in "\\PC*") {
            let once = normalize_title(&title);
            prop_assert_eq!(normalize_title(&once), once);
        }
    }
}
