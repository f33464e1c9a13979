//! Page identity extraction and name normalization.
//!
//! The server renders the logical controller and action into two attributes
//! on the root element, in Rails form (`admin/blog_posts`, `create_post`).
//! Handlers are registered under the camel form (`admin/blogPosts`,
//! `createPost`), so both values are normalized before comparison.
//!
//! The conversion is deliberately narrow: only a `-` or `_` directly followed
//! by an ASCII lowercase letter is rewritten. Registered names must match the
//! converted string exactly, so nothing else may be touched.

use crate::config::Config;
use crate::document::Document;

/// Converts snake/kebab separators into camel humps.
///
/// Each `-` or `_` immediately followed by one of `a`-`z` is replaced by that
/// letter uppercased. Matching is left to right and never overlaps; every
/// other character is copied as-is.
///
/// ```rust
/// use raicon::camelize;
///
/// assert_eq!(camelize("create_post"), "createPost");
/// assert_eq!(camelize("blog-posts"), "blogPosts");
/// assert_eq!(camelize("a__b"), "a_B");
/// assert_eq!(camelize("user_2fa"), "user_2fa");
/// ```
pub fn camelize(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '-' || c == '_' {
            if let Some(&next) = chars.peek() {
                if next.is_ascii_lowercase() {
                    out.push(next.to_ascii_uppercase());
                    chars.next();
                    continue;
                }
            }
        }
        out.push(c);
    }

    out
}

/// Normalizes a possibly namespaced controller name, segment by segment.
pub fn normalize_controller(name: &str) -> String {
    name.split('/').map(camelize).collect::<Vec<_>>().join("/")
}

/// Normalizes an action name.
pub fn normalize_action(name: &str) -> String {
    camelize(name)
}

/// The controller/action pair of the page currently on screen, normalized.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageIdentity {
    pub controller: String,
    pub action: String,
}

impl PageIdentity {
    /// Builds an identity from raw attribute values.
    pub fn new(controller: &str, action: &str) -> Self {
        Self {
            controller: normalize_controller(controller),
            action: normalize_action(action),
        }
    }

    /// Reads the identity off the document's root element.
    ///
    /// Missing attributes are treated as empty strings.
    pub fn read<D: Document + ?Sized>(document: &D, config: &Config) -> Self {
        let controller = document
            .attribute(&config.controller_attribute)
            .unwrap_or_default();
        let action = document
            .attribute(&config.action_attribute)
            .unwrap_or_default();
        Self::new(&controller, &action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::MemoryDocument;

    #[test]
    fn test_camelize_snake_and_kebab() {
        assert_eq!(camelize("create_post"), "createPost");
        assert_eq!(camelize("bulk-edit-items"), "bulkEditItems");
        assert_eq!(camelize("show"), "show");
        assert_eq!(camelize(""), "");
    }

    #[test]
    fn test_camelize_leaves_other_separators_alone() {
        // separator followed by a non-lowercase character
        assert_eq!(camelize("post_2"), "post_2");
        assert_eq!(camelize("post_Title"), "post_Title");
        assert_eq!(camelize("trailing_"), "trailing_");
        // leading separator still consumes the following letter
        assert_eq!(camelize("_private"), "Private");
        assert_eq!(camelize("-x"), "X");
    }

    #[test]
    fn test_camelize_consecutive_separators() {
        assert_eq!(camelize("a__b"), "a_B");
        assert_eq!(camelize("a-_b"), "a-B");
        assert_eq!(camelize("a_b_c"), "aBC");
    }

    #[test]
    fn test_camelize_ignores_non_ascii() {
        assert_eq!(camelize("caf_é"), "caf_é");
        assert_eq!(camelize("ünder_score"), "ünderScore");
    }

    #[test]
    fn test_normalize_controller_segments() {
        assert_eq!(normalize_controller("admin/blog_posts"), "admin/blogPosts");
        assert_eq!(
            normalize_controller("api/v1/user-sessions"),
            "api/v1/userSessions"
        );
        assert_eq!(normalize_controller("admin/users"), "admin/users");
        assert_eq!(normalize_controller(""), "");
    }

    #[test]
    fn test_controller_separator_does_not_join_segments() {
        // `/` splits before conversion, so a trailing `_` never reaches the next segment
        assert_eq!(normalize_controller("admin_/users"), "admin_/users");
    }

    #[test]
    fn test_read_identity_from_document() {
        let doc = MemoryDocument::new()
            .with_attribute("data-raicon-controller", "admin/blog_posts")
            .with_attribute("data-raicon-action", "bulk_update");

        let identity = PageIdentity::read(&doc, &Config::default());
        assert_eq!(identity.controller, "admin/blogPosts");
        assert_eq!(identity.action, "bulkUpdate");
    }

    #[test]
    fn test_read_identity_missing_attributes() {
        let doc = MemoryDocument::new();
        let identity = PageIdentity::read(&doc, &Config::default());
        assert_eq!(identity, PageIdentity::default());
    }
}
