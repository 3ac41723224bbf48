//! Defines [`App`], the owned state behind the listing page, and the
//! [`Event`]s that drive it. All mutation goes through [`App::dispatch`]; each
//! event is applied and followed, before `dispatch` returns, by a full
//! re-render that is handed to every subscribed listener.

use std::fmt;

use tracing::{debug, error, warn};

use crate::filter::FilterState;
use crate::render::{self, Listing, Renderer};
use crate::store::{self, PostStore, Source};
use crate::tag::TagIndex;
use crate::theme::{self, Document, Storage, ThemePreference};

/// A user interaction with the page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// The search box now contains this text.
    Input(String),

    /// The filter control for this tag was clicked.
    TagClicked(String),

    /// The theme toggle was clicked.
    ThemeToggled,
}

/// Whether the post document has arrived.
#[derive(Debug)]
pub enum LoadState {
    /// Still loading. Nothing is rendered in this state.
    Pending,

    /// Loaded. The store never changes after this.
    Ready(PostStore),

    /// Loading failed with this message.
    Failed(String),
}

/// The output of one render pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rendered {
    /// Slugs of the visible posts, in store order.
    pub visible: Vec<String>,

    /// The content of the listing container.
    pub listing: String,

    /// The content of the tag filter container.
    pub tag_bar: String,

    /// The whole page.
    pub page: String,
}

type Listener = Box<dyn FnMut(&Rendered)>;

pub struct App<S> {
    state: LoadState,
    index: TagIndex,
    filter: FilterState,
    renderer: Renderer,
    theme: ThemePreference<S>,
    document: Document,
    listeners: Vec<Listener>,
}

impl<S: Storage> App<S> {
    /// Constructs an app waiting for its post document. The stored theme is
    /// reflected onto the document immediately.
    pub fn new(renderer: Renderer, theme: ThemePreference<S>) -> App<S> {
        let mut document = Document::default();
        theme.apply(&mut document);
        App {
            state: LoadState::Pending,
            index: TagIndex::default(),
            filter: FilterState::default(),
            renderer,
            theme,
            document,
            listeners: Vec::new(),
        }
    }

    /// Registers `listener` to receive every subsequent render. Listeners
    /// accumulate and are called in registration order.
    pub fn subscribe<F: FnMut(&Rendered) + 'static>(&mut self, listener: F) {
        self.listeners.push(Box::new(listener));
    }

    /// Loads the post document from `source` and performs the initial render.
    /// A load failure isn't an error here: the app moves to
    /// [`LoadState::Failed`] and renders the failure message.
    pub fn load(&mut self, source: &Source) -> Result<Rendered> {
        match PostStore::load(source) {
            Ok(store) => self.ready(store),
            Err(e) => self.failed(&e),
        }
    }

    /// Installs a loaded store, derives the tag index, and performs the
    /// initial render.
    pub fn ready(&mut self, store: PostStore) -> Result<Rendered> {
        self.index = TagIndex::derive(store.posts());
        self.state = LoadState::Ready(store);
        self.render_and_notify()
    }

    /// Records a load failure and renders the failure message.
    pub fn failed(&mut self, err: &store::Error) -> Result<Rendered> {
        error!(%err, "failed to load posts");
        self.index = TagIndex::default();
        self.state = LoadState::Failed(err.to_string());
        self.render_and_notify()
    }

    /// Applies `event` and re-renders. Returns `None` while the post document
    /// is still pending, since nothing is rendered before it arrives. Tags
    /// are only known once the document has loaded, so until then any tag
    /// click other than [`crate::tag::ALL`] is rejected as unknown.
    pub fn dispatch(&mut self, event: Event) -> Result<Option<Rendered>> {
        match event {
            Event::Input(text) => self.filter.set_query(&text),
            Event::TagClicked(tag) => {
                if !self.index.contains(&tag) {
                    warn!(tag = %tag, "ignoring click on unknown tag");
                    return Err(Error::UnknownTag(tag));
                }
                self.filter.set_active_tag(&tag);
            }
            Event::ThemeToggled => {
                self.theme.toggle(&mut self.document)?;
            }
        }
        match self.state {
            LoadState::Pending => Ok(None),
            _ => self.render_and_notify().map(Some),
        }
    }

    /// Recomputes the page from the current store, filter, and theme.
    pub fn render(&self) -> Result<Rendered> {
        let listing = match &self.state {
            LoadState::Ready(store) => Listing::select(store.posts(), &self.filter),
            LoadState::Failed(_) => Listing::LoadFailed,
            LoadState::Pending => Listing::Pending,
        };
        let visible: Vec<String> = listing.posts().iter().map(|p| p.slug.clone()).collect();
        let listing_markup = self.renderer.listing(&listing)?;
        let tag_bar = self
            .renderer
            .tag_bar(&self.index, self.filter.active_tag())?;
        let page = self
            .renderer
            .page(&self.document, &self.filter, &tag_bar, &listing_markup)?;
        debug!(
            visible = visible.len(),
            query = self.filter.query(),
            tag = self.filter.active_tag(),
            "rendered listing"
        );
        Ok(Rendered {
            visible,
            listing: listing_markup,
            tag_bar,
            page,
        })
    }

    fn render_and_notify(&mut self) -> Result<Rendered> {
        let rendered = self.render()?;
        for listener in self.listeners.iter_mut() {
            listener(&rendered);
        }
        Ok(rendered)
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn tags(&self) -> &TagIndex {
        &self.index
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn theme(&self) -> &ThemePreference<S> {
        &self.theme
    }
}

/// The result of an [`App`] operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error applying an [`Event`] or rendering the page.
#[derive(Debug)]
pub enum Error {
    /// Returned when a tag without a filter control is selected.
    UnknownTag(String),

    /// Returned when the page couldn't be rendered.
    Render(render::Error),

    /// Returned when the theme couldn't be persisted.
    Theme(theme::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::UnknownTag(tag) => write!(f, "unknown tag `{}`", tag),
            Error::Render(err) => err.fmt(f),
            Error::Theme(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::UnknownTag(_) => None,
            Error::Render(err) => Some(err),
            Error::Theme(err) => Some(err),
        }
    }
}

impl From<render::Error> for Error {
    fn from(err: render::Error) -> Error {
        Error::Render(err)
    }
}

impl From<theme::Error> for Error {
    fn from(err: theme::Error) -> Error {
        Error::Theme(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::post::Post;
    use crate::render::DEFAULT_POST_PAGE;
    use crate::theme::{MemoryStorage, THEME_KEY};
    use std::cell::RefCell;
    use std::path::PathBuf;
    use std::rc::Rc;

    fn post(slug: &str, title: &str, tags: &[&str]) -> Post {
        Post {
            slug: slug.to_owned(),
            title: title.to_owned(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            ..Post::default()
        }
    }

    fn app() -> Result<App<MemoryStorage>> {
        Ok(App::new(
            Renderer::new(DEFAULT_POST_PAGE)?,
            ThemePreference::new(MemoryStorage::default()),
        ))
    }

    fn dedup_store() -> PostStore {
        PostStore::from_posts(vec![
            post("dedup-rust", "Dedup Tool", &["rust"]),
            post("dedup-go", "Dedup Tool", &["go"]),
            post("other", "Other", &["rust"]),
        ])
        .unwrap()
    }

    #[test]
    fn test_initial_render_shows_everything() -> Result<()> {
        let mut app = app()?;
        let rendered = app.ready(dedup_store())?;
        assert_eq!(rendered.visible, vec!["dedup-rust", "dedup-go", "other"]);
        assert!(rendered
            .tag_bar
            .contains(r#"<button class="tag active" data-tag="all">"#));
        Ok(())
    }

    #[test]
    fn test_tag_then_query() -> Result<()> {
        let mut app = app()?;
        app.ready(dedup_store())?;
        app.dispatch(Event::TagClicked("rust".to_owned()))?;
        let rendered = app.dispatch(Event::Input("dedu".to_owned()))?;
        assert_eq!(rendered.map(|r| r.visible), Some(vec!["dedup-rust".to_owned()]));
        Ok(())
    }

    #[test]
    fn test_uppercase_query() -> Result<()> {
        let mut app = app()?;
        app.ready(PostStore::from_posts(vec![post("d", "dedup tool", &[])]).unwrap())?;
        let rendered = app.dispatch(Event::Input("DEDUP".to_owned()))?;
        assert_eq!(rendered.map(|r| r.visible), Some(vec!["d".to_owned()]));
        Ok(())
    }

    #[test]
    fn test_no_match_renders_fallback() -> Result<()> {
        let mut app = app()?;
        app.ready(dedup_store())?;
        let rendered = app
            .dispatch(Event::Input("zzz".to_owned()))?
            .expect("app is ready");
        assert!(rendered.visible.is_empty());
        assert_eq!(rendered.listing, "<p>No posts found.</p>");
        Ok(())
    }

    #[test]
    fn test_render_is_idempotent() -> Result<()> {
        let mut app = app()?;
        app.ready(dedup_store())?;
        app.dispatch(Event::Input("tool".to_owned()))?;
        assert_eq!(app.render()?, app.render()?);
        Ok(())
    }

    #[test]
    fn test_unknown_tag_is_rejected() -> Result<()> {
        let mut app = app()?;
        app.ready(dedup_store())?;
        assert!(matches!(
            app.dispatch(Event::TagClicked("python".to_owned())),
            Err(Error::UnknownTag(_))
        ));
        assert_eq!(app.filter().active_tag(), "all");
        Ok(())
    }

    #[test]
    fn test_nothing_renders_while_pending() -> Result<()> {
        let mut app = app()?;
        let calls = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&calls);
        app.subscribe(move |_| *counter.borrow_mut() += 1);

        assert_eq!(app.dispatch(Event::Input("dedup".to_owned()))?, None);
        assert_eq!(*calls.borrow(), 0);

        // the query typed while pending applies to the initial render
        let rendered = app.ready(dedup_store())?;
        assert_eq!(rendered.visible, vec!["dedup-rust", "dedup-go"]);
        assert_eq!(*calls.borrow(), 1);
        Ok(())
    }

    #[test]
    fn test_tag_click_while_pending_is_rejected() -> Result<()> {
        let mut app = app()?;
        assert!(matches!(
            app.dispatch(Event::TagClicked("rust".to_owned())),
            Err(Error::UnknownTag(_))
        ));
        assert_eq!(app.dispatch(Event::TagClicked("all".to_owned()))?, None);

        let rendered = app.ready(dedup_store())?;
        assert_eq!(app.filter().active_tag(), "all");
        assert_eq!(rendered.visible.len(), 3);
        Ok(())
    }

    #[test]
    fn test_listeners_accumulate() -> Result<()> {
        let mut app = app()?;
        let seen = Rc::new(RefCell::new(Vec::new()));
        for name in &["first", "second"] {
            let seen = Rc::clone(&seen);
            let name = name.to_string();
            app.subscribe(move |r: &Rendered| {
                seen.borrow_mut().push(format!("{}:{}", name, r.visible.len()))
            });
        }
        app.ready(dedup_store())?;
        app.dispatch(Event::Input("other".to_owned()))?;
        assert_eq!(
            *seen.borrow(),
            vec!["first:3", "second:3", "first:1", "second:1"]
        );
        Ok(())
    }

    #[test]
    fn test_load_testdata() -> Result<()> {
        let mut app = app()?;
        let rendered = app.load(&Source::File(PathBuf::from("./testdata/site/posts.json")))?;
        assert_eq!(rendered.visible.len(), 4);
        assert_eq!(
            app.tags().iter().collect::<Vec<_>>(),
            vec!["all", "rust", "cli", "go", "infra"]
        );

        app.dispatch(Event::TagClicked("cli".to_owned()))?;
        let rendered = app
            .dispatch(Event::Input("DEDUP".to_owned()))?
            .expect("app is ready");
        assert_eq!(rendered.visible, vec!["dedup-tool", "go-dedup"]);
        assert!(rendered.page.contains(r#"value="DEDUP""#));
        Ok(())
    }

    #[test]
    fn test_failed_load_renders_message() -> Result<()> {
        let mut app = app()?;
        let rendered = app.load(&Source::File(PathBuf::from(
            "./testdata/does-not-exist.json",
        )))?;
        assert!(matches!(app.state(), LoadState::Failed(_)));
        assert!(rendered.visible.is_empty());
        assert_eq!(rendered.listing, "<p>Failed to load posts.</p>");
        Ok(())
    }

    #[test]
    fn test_theme_toggle_event() -> Result<()> {
        let mut app = app()?;
        app.ready(dedup_store())?;

        let rendered = app
            .dispatch(Event::ThemeToggled)?
            .expect("app is ready");
        assert!(rendered.page.contains(r#"<html data-theme="dark">"#));
        assert_eq!(app.theme().storage().get(THEME_KEY), Some("dark"));

        let rendered = app
            .dispatch(Event::ThemeToggled)?
            .expect("app is ready");
        assert!(rendered.page.contains("<html>"));
        assert_eq!(app.theme().storage().get(THEME_KEY), None);
        assert_eq!(app.document().theme_attribute, None);
        Ok(())
    }
}
