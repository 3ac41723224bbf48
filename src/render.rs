//! Regenerates the listing markup from the post store and the current filter.
//! Nothing is patched or cached: every call recomputes the visible posts and
//! the full markup for the listing container, the tag bar, and the page.

use crate::filter::FilterState;
use crate::post::Post;
use crate::tag::TagIndex;
use crate::theme::{Document, THEME_ATTRIBUTE};
use crate::value::escaped;
use gtmpl::{Context, Template, Value};
use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use url::form_urlencoded;

/// Shown in place of the listing when no post passes the filter.
pub const NO_POSTS: &str = "No posts found.";

/// Shown in place of the listing when the post document couldn't be loaded.
pub const LOAD_FAILED: &str = "Failed to load posts.";

/// The default detail page each tile links to.
pub const DEFAULT_POST_PAGE: &str = "post.html";

const TILE_TEMPLATE: &str = r#"<a class="blog-tile" href="{{.href}}">
  <div class="blog-icon">{{.icon}}</div>
  <div class="blog-text">
    <div class="blog-title">{{.title}}</div>
    <div class="blog-meta">{{.date}} · {{.reading_time}}</div>
    <div class="blog-subtitle">{{.subtitle}}</div>
    <div class="blog-tags">{{range .tags}}<span class="tag">{{.}}</span>{{end}}</div>
  </div>
  <div class="blog-arrow">→</div>
</a>
"#;

const TAG_BAR_TEMPLATE: &str = r#"{{range .tags}}<button class="tag{{if .active}} active{{end}}" data-tag="{{.tag}}">{{.tag}}</button>{{end}}"#;

const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html{{if .theme}} {{.theme_attribute}}="{{.theme}}"{{end}}>
<head>
  <meta charset="utf-8">
  <title>Blog</title>
  <link rel="stylesheet" href="style.css">
</head>
<body>
  <header><button id="theme-toggle">{{.toggle_label}}</button></header>
  <input id="search" type="search" placeholder="Search posts" value="{{.query}}">
  <div id="tag-filter">{{.tag_bar}}</div>
  <div id="blog-list">{{.listing}}</div>
</body>
</html>
"#;

/// A post as it is laid out in the listing, paired with its detail-page link.
pub struct Tile<'a> {
    pub post: &'a Post,
    pub href: String,
}

/// One filter control in the tag bar.
pub struct TagButton<'a> {
    pub tag: &'a str,
    pub active: bool,
}

/// What the listing container shows.
#[derive(Debug, PartialEq, Eq)]
pub enum Listing<'a> {
    /// The matching posts, in store order. Never empty.
    Posts(Vec<&'a Post>),

    /// Nothing matched the filter.
    Empty,

    /// The post document hasn't arrived yet; the container stays blank.
    Pending,

    /// The post document failed to load.
    LoadFailed,
}

impl<'a> Listing<'a> {
    /// Applies `filter` to `posts`, keeping store order.
    pub fn select(posts: &'a [Post], filter: &FilterState) -> Listing<'a> {
        let visible: Vec<&Post> = posts.iter().filter(|p| filter.matches(p)).collect();
        match visible.is_empty() {
            true => Listing::Empty,
            false => Listing::Posts(visible),
        }
    }

    /// The visible posts; empty for every variant but [`Listing::Posts`].
    pub fn posts(&self) -> &[&'a Post] {
        match self {
            Listing::Posts(posts) => posts.as_slice(),
            _ => &[],
        }
    }
}

/// Turns listings, tag bars, and whole pages into markup.
pub struct Renderer {
    tile: Template,
    tag_bar: Template,
    page: Template,
    post_page: String,
}

impl Renderer {
    /// Constructs a renderer with the built-in templates. Tiles link to
    /// `{post_page}?post={slug}`.
    pub fn new(post_page: &str) -> Result<Renderer> {
        Ok(Renderer {
            tile: parse(TILE_TEMPLATE)?,
            tag_bar: parse(TAG_BAR_TEMPLATE)?,
            page: parse(PAGE_TEMPLATE)?,
            post_page: post_page.to_owned(),
        })
    }

    /// Replaces the page shell with the concatenated contents of
    /// `template_files`.
    pub fn with_page_template<P: AsRef<Path>>(
        mut self,
        template_files: impl Iterator<Item = P>,
    ) -> Result<Renderer> {
        self.page = parse_template(template_files)?;
        Ok(self)
    }

    /// The link from the listing to a post's detail page.
    pub fn href(&self, post: &Post) -> String {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("post", &post.slug)
            .finish();
        format!("{}?{}", self.post_page, query)
    }

    /// Renders the content of the listing container.
    pub fn listing(&self, listing: &Listing) -> Result<String> {
        match listing {
            Listing::Posts(posts) => {
                let mut out = String::new();
                for post in posts {
                    let tile = Tile {
                        post,
                        href: self.href(post),
                    };
                    out.push_str(&execute(&self.tile, Value::from(&tile))?);
                }
                Ok(out)
            }
            Listing::Empty => Ok(format!("<p>{}</p>", NO_POSTS)),
            Listing::Pending => Ok(String::new()),
            Listing::LoadFailed => Ok(format!("<p>{}</p>", LOAD_FAILED)),
        }
    }

    /// Renders one button per tag in index order. Exactly the button for
    /// `active_tag` carries the `active` class.
    pub fn tag_bar(&self, index: &TagIndex, active_tag: &str) -> Result<String> {
        let buttons: Vec<Value> = index
            .iter()
            .map(|tag| {
                Value::from(&TagButton {
                    tag,
                    active: tag == active_tag,
                })
            })
            .collect();
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("tags".to_owned(), Value::Array(buttons));
        execute(&self.tag_bar, Value::Object(m))
    }

    /// Renders the page shell around already-rendered tag bar and listing
    /// markup.
    pub fn page(
        &self,
        document: &Document,
        filter: &FilterState,
        tag_bar: &str,
        listing: &str,
    ) -> Result<String> {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert(
            "theme".to_owned(),
            match document.theme_attribute {
                Some(theme) => Value::String(theme.to_owned()),
                None => Value::Nil,
            },
        );
        m.insert(
            "theme_attribute".to_owned(),
            Value::String(THEME_ATTRIBUTE.to_owned()),
        );
        m.insert(
            "toggle_label".to_owned(),
            Value::String(document.toggle_label.to_owned()),
        );
        m.insert("query".to_owned(), Value::String(escaped(filter.input())));
        m.insert("tag_bar".to_owned(), Value::String(tag_bar.to_owned()));
        m.insert("listing".to_owned(), Value::String(listing.to_owned()));
        execute(&self.page, Value::Object(m))
    }
}

fn parse(contents: &str) -> Result<Template> {
    let mut template = Template::default();
    template.parse(contents).map_err(Error::ParseTemplate)?;
    Ok(template)
}

fn execute(template: &Template, value: Value) -> Result<String> {
    let context = Context::from(value)?;
    Ok(template.render(&context)?)
}

// Loads the template file contents, concatenates them, and parses the result
// into a template.
fn parse_template<P: AsRef<Path>>(template_files: impl Iterator<Item = P>) -> Result<Template> {
    let mut contents = String::new();
    for template_file in template_files {
        use std::io::Read;
        let template_file = template_file.as_ref();
        File::open(template_file)
            .map_err(|e| Error::OpenTemplateFile {
                path: template_file.to_owned(),
                err: e,
            })?
            .read_to_string(&mut contents)?;
        contents.push(' ');
    }
    parse(&contents)
}

/// The result of a fallible rendering operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error rendering markup.
#[derive(Debug)]
pub enum Error {
    /// Returned for I/O problems while opening template files.
    OpenTemplateFile { path: PathBuf, err: std::io::Error },

    /// Returned for errors parsing template files.
    ParseTemplate(String),

    /// Returned for errors executing a template.
    Template(String),

    /// Returned for other I/O errors.
    Io(std::io::Error),
}

impl From<std::io::Error> for Error {
    /// Converts an [`std::io::Error`] into an [`Error`]. This allows us to use
    /// the `?` operator for fallible I/O operations.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<String> for Error {
    /// Converts a template error message ([`String`]) into an [`Error`]. This
    /// allows us to use the `?` operator for fallible template operations.
    fn from(err: String) -> Error {
        Error::Template(err)
    }
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::OpenTemplateFile { path, err } => {
                write!(f, "Opening template file '{}': {}", path.display(), err)
            }
            Error::ParseTemplate(err) => err.fmt(f),
            Error::Template(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::OpenTemplateFile { path: _, err } => Some(err),
            Error::ParseTemplate(_) => None,
            Error::Template(_) => None,
            Error::Io(err) => Some(err),
        }
    }
}
