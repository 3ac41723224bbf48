//! Defines [`FilterState`], the (query, active tag) pair that decides which
//! posts are visible.

use crate::post::Post;
use crate::tag::ALL;

/// The current filter input. Both fields are only ever replaced through
/// [`FilterState::set_query`] and [`FilterState::set_active_tag`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterState {
    input: String,
    query: String,
    active_tag: String,
}

impl FilterState {
    /// The lower-cased text posts are matched against.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// The query exactly as typed, for showing back in the search box.
    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn active_tag(&self) -> &str {
        &self.active_tag
    }

    /// Replaces the query. The text is lower-cased here so that matching is
    /// case-insensitive; titles are lower-cased at comparison time.
    pub fn set_query(&mut self, text: &str) {
        self.input = text.to_owned();
        self.query = text.to_lowercase();
    }

    pub fn set_active_tag(&mut self, tag: &str) {
        self.active_tag = tag.to_owned();
    }

    /// Returns true if `post` passes both the tag and the text filter.
    pub fn matches(&self, post: &Post) -> bool {
        self.tag_matches(post) && self.text_matches(post)
    }

    fn tag_matches(&self, post: &Post) -> bool {
        self.active_tag == ALL || post.has_tag(&self.active_tag)
    }

    fn text_matches(&self, post: &Post) -> bool {
        post.title.to_lowercase().contains(&self.query)
    }
}

impl Default for FilterState {
    fn default() -> Self {
        FilterState {
            input: String::new(),
            query: String::new(),
            active_tag: ALL.to_owned(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn post(title: &str, tags: &[&str]) -> Post {
        Post {
            title: title.to_owned(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            ..Post::default()
        }
    }

    #[test]
    fn test_default_matches_everything() {
        let filter = FilterState::default();
        assert_eq!(filter.active_tag(), "all");
        assert!(filter.matches(&post("Anything", &[])));
        assert!(filter.matches(&post("", &["go"])));
    }

    #[test]
    fn test_query_is_case_insensitive() {
        let mut filter = FilterState::default();
        filter.set_query("DEDUP");
        assert_eq!(filter.query(), "dedup");
        assert_eq!(filter.input(), "DEDUP");
        assert!(filter.matches(&post("dedup tool", &[])));
        assert!(filter.matches(&post("The DeDup Tool", &[])));
        assert!(!filter.matches(&post("dedu", &[])));
    }

    #[test]
    fn test_tag_and_text_must_both_match() {
        let mut filter = FilterState::default();
        filter.set_active_tag("rust");
        filter.set_query("dedu");
        assert!(filter.matches(&post("Dedup Tool", &["rust"])));
        assert!(!filter.matches(&post("Dedup Tool", &["go"])));
        assert!(!filter.matches(&post("Other", &["rust"])));
    }

    #[test]
    fn test_untagged_post_never_matches_a_tag() {
        let mut filter = FilterState::default();
        filter.set_active_tag("rust");
        assert!(!filter.matches(&post("Dedup Tool", &[])));
    }
}
