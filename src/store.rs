//! Defines the [`PostStore`], [`Source`], and [`Error`] types: where the post
//! document lives and how it is loaded into memory. The store is populated
//! once per run and never mutated afterwards.

use std::{
    collections::HashSet,
    fmt,
    fs::File,
    io::Read,
    path::{Path, PathBuf},
};

use tracing::{debug, info};
use url::Url;

use crate::post::Post;

/// The default location of the post document relative to the site root.
pub const DEFAULT_DATA_PATH: &str = "posts.json";

/// Where the post document is loaded from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Source {
    /// A document on the local file system.
    File(PathBuf),

    /// A document served over HTTP(S).
    Http(Url),
}

impl Source {
    /// Locates the document at `relative` under `site_root`. The site root is
    /// either an `http(s)://` or `file://` URL or a file system path; a
    /// relative path is resolved against `base_dir`.
    pub fn locate(site_root: &str, relative: &str, base_dir: &Path) -> Result<Source> {
        match Url::parse(site_root) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {
                // NOTE: without a trailing slash, [`Url::join`] treats the
                // last path segment as a file name and replaces it.
                let root = match url.path().ends_with('/') {
                    true => url,
                    false => Url::parse(&format!("{}/", url))?,
                };
                Ok(Source::Http(root.join(relative)?))
            }
            Ok(url) if url.scheme() == "file" => {
                let dir = url
                    .to_file_path()
                    .map_err(|_| Error::InvalidFileUrl(url.clone()))?;
                Ok(Source::File(dir.join(relative)))
            }
            _ => Ok(Source::File(base_dir.join(site_root).join(relative))),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Source::File(path) => write!(f, "{}", path.display()),
            Source::Http(url) => url.fmt(f),
        }
    }
}

/// The canonical, ordered list of posts. Order is the document's order and is
/// preserved by every filtered view.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PostStore {
    posts: Vec<Post>,
}

impl PostStore {
    /// Loads the post document from `source` and parses it into a store.
    pub fn load(source: &Source) -> Result<PostStore> {
        match PostStore::_load(source) {
            Ok(store) => {
                info!(%source, posts = store.len(), "loaded post document");
                Ok(store)
            }
            Err(e) => Err(Error::Annotated(
                format!("loading posts from `{}`", source),
                Box::new(e),
            )),
        }
    }

    fn _load(source: &Source) -> Result<PostStore> {
        let bytes = match source {
            Source::File(path) => {
                let mut bytes = Vec::new();
                File::open(path)?.read_to_end(&mut bytes)?;
                bytes
            }
            Source::Http(url) => {
                debug!(%url, "fetching post document");
                reqwest::blocking::get(url.clone())?
                    .error_for_status()?
                    .bytes()?
                    .to_vec()
            }
        };
        PostStore::from_slice(&bytes)
    }

    /// Parses a JSON array of post objects.
    pub fn from_slice(bytes: &[u8]) -> Result<PostStore> {
        let posts: Vec<Post> = serde_json::from_slice(bytes)?;
        PostStore::from_posts(posts)
    }

    /// Builds a store from already-parsed posts, rejecting duplicate slugs.
    pub fn from_posts(posts: Vec<Post>) -> Result<PostStore> {
        let mut seen: HashSet<&str> = HashSet::with_capacity(posts.len());
        for post in &posts {
            if !seen.insert(&post.slug) {
                return Err(Error::DuplicateSlug(post.slug.clone()));
            }
        }
        Ok(PostStore { posts })
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}

/// Represents the result of a [`PostStore`]-load operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading a [`PostStore`].
#[derive(Debug)]
pub enum Error {
    /// Returned when the document isn't a JSON array of post objects.
    DeserializeJson(serde_json::Error),

    /// Returned when two posts share a slug.
    DuplicateSlug(String),

    /// Returned when the site root or document path isn't a valid URL.
    UrlParse(url::ParseError),

    /// Returned when a `file://` site root can't be mapped to a local path.
    InvalidFileUrl(Url),

    /// Returned when the HTTP request fails or answers with an error status.
    Http(reqwest::Error),

    /// Returned for other I/O errors.
    Io(std::io::Error),

    /// An error with an annotation.
    Annotated(String, Box<Error>),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::DeserializeJson(err) => err.fmt(f),
            Error::DuplicateSlug(slug) => {
                write!(f, "duplicate post slug `{}`", slug)
            }
            Error::UrlParse(err) => err.fmt(f),
            Error::InvalidFileUrl(url) => {
                write!(f, "not a local file URL: {}", url)
            }
            Error::Http(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
            Error::Annotated(annotation, err) => {
                write!(f, "{}: {}", &annotation, err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::DeserializeJson(err) => Some(err),
            Error::DuplicateSlug(_) => None,
            Error::UrlParse(err) => Some(err),
            Error::InvalidFileUrl(_) => None,
            Error::Http(err) => Some(err),
            Error::Io(err) => Some(err),
            Error::Annotated(_, err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for Error {
    /// Converts a [`serde_json::Error`] into an [`Error`]. It allows us to use
    /// the `?` operator for [`serde_json`] deserialization functions.
    fn from(err: serde_json::Error) -> Error {
        Error::DeserializeJson(err)
    }
}

impl From<url::ParseError> for Error {
    /// Converts a [`url::ParseError`] into an [`Error`]. It allows us to use
    /// the `?` operator for URL parsing and joining functions.
    fn from(err: url::ParseError) -> Error {
        Error::UrlParse(err)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Error {
        Error::Http(err)
    }
}

impl From<std::io::Error> for Error {
    /// Converts a [`std::io::Error`] into an [`Error`]. It allows us to
    /// use the `?` operator for fallible I/O functions.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}
