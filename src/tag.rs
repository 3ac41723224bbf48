//! Defines the [`TagIndex`] type, the ordered set of tags offered as filter
//! controls.

use crate::post::Post;

/// The sentinel tag meaning "no tag restriction". It is always the first
/// entry of a [`TagIndex`] and the default active tag.
pub const ALL: &str = "all";

/// The distinct tags across a set of posts, in first-seen order, preceded by
/// [`ALL`]. The order is the left-to-right order of the filter controls and is
/// never sorted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TagIndex {
    tags: Vec<String>,
}

impl TagIndex {
    /// Derives the index from `posts`. Posts are visited in the order given
    /// and each post's tags in their own order; repeated tags collapse onto
    /// their first occurrence.
    pub fn derive(posts: &[Post]) -> TagIndex {
        let mut tags = vec![ALL.to_owned()];
        for post in posts {
            for tag in &post.tags {
                if !tags.contains(tag) {
                    tags.push(tag.clone());
                }
            }
        }
        TagIndex { tags }
    }

    /// Returns true if `tag` has a control in the index.
    pub fn contains(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Never true in practice since [`ALL`] is always present; provided to
    /// pair with [`TagIndex::len`].
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

impl Default for TagIndex {
    fn default() -> Self {
        TagIndex::derive(&[])
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn tagged(tags: &[&str]) -> Post {
        Post {
            tags: tags.iter().map(|t| t.to_string()).collect(),
            ..Post::default()
        }
    }

    #[test]
    fn test_first_seen_order() {
        let posts = vec![tagged(&["go", "infra"]), tagged(&["go"]), tagged(&["rust"])];
        let index = TagIndex::derive(&posts);
        assert_eq!(
            index.iter().collect::<Vec<_>>(),
            vec!["all", "go", "infra", "rust"]
        );
    }

    #[test]
    fn test_all_appears_once_even_when_posts_use_it() {
        let posts = vec![tagged(&["zeta", "all"]), tagged(&["alpha"])];
        let index = TagIndex::derive(&posts);
        assert_eq!(
            index.iter().collect::<Vec<_>>(),
            vec!["all", "zeta", "alpha"]
        );
    }

    #[test]
    fn test_empty_store() {
        let index = TagIndex::default();
        assert_eq!(index.len(), 1);
        assert!(index.contains(ALL));
        assert!(!index.contains("rust"));
    }
}
