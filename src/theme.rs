//! The persisted light/dark preference. Independent of the post listing: the
//! only state is one optional value under [`THEME_KEY`] in a [`Storage`],
//! mirrored onto the page's [`Document`] root attribute and toggle label.

use std::{
    collections::BTreeMap,
    fmt,
    fs::{self, File},
    path::{Path, PathBuf},
};

use tracing::{info, warn};

/// The storage key under which the preference is persisted.
pub const THEME_KEY: &str = "theme";

/// The root attribute the stylesheet keys off.
pub const THEME_ATTRIBUTE: &str = "data-theme";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    /// The value of [`THEME_ATTRIBUTE`]; light is the default and leaves the
    /// attribute absent.
    pub fn attribute(self) -> Option<&'static str> {
        match self {
            Theme::Light => None,
            Theme::Dark => Some("dark"),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Theme::Light => "🌞",
            Theme::Dark => "🌙",
        }
    }

    pub fn toggled(self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Theme::Light
    }
}

/// The parts of the page the preference is reflected onto.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Document {
    /// The value of the root element's [`THEME_ATTRIBUTE`], if present.
    pub theme_attribute: Option<&'static str>,

    /// The text of the theme toggle control.
    pub toggle_label: &'static str,
}

impl Default for Document {
    fn default() -> Self {
        Document {
            theme_attribute: Theme::Light.attribute(),
            toggle_label: Theme::Light.label(),
        }
    }
}

impl Document {
    fn reflect(&mut self, theme: Theme) {
        self.theme_attribute = theme.attribute();
        self.toggle_label = theme.label();
    }
}

/// A client-local key-value store that survives between runs.
pub trait Storage {
    fn get(&self, key: &str) -> Option<&str>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// A [`Storage`] that lives only as long as the value.
#[derive(Debug, Default)]
pub struct MemoryStorage(BTreeMap<String, String>);

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.0.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.0.remove(key);
        Ok(())
    }
}

/// A [`Storage`] backed by a JSON object file. Every write rewrites the
/// whole file.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStorage {
    /// Opens the store at `path`. A missing file is an empty store; it is
    /// created on the first write.
    pub fn open(path: &Path) -> Result<FileStorage> {
        let entries = match File::open(path) {
            Ok(file) => serde_json::from_reader(file)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(FileStorage {
            path: path.to_owned(),
            entries,
        })
    }

    /// Writes `entries` to disk and, only once that succeeds, makes them the
    /// store's contents. A failed write leaves the store as it was.
    fn commit(&mut self, entries: BTreeMap<String, String>) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        serde_json::to_writer_pretty(File::create(&self.path)?, &entries)?;
        self.entries = entries;
        Ok(())
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.clone();
        entries.insert(key.to_owned(), value.to_owned());
        self.commit(entries)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if !self.entries.contains_key(key) {
            return Ok(());
        }
        let mut entries = self.entries.clone();
        entries.remove(key);
        self.commit(entries)
    }
}

/// Reads and toggles the persisted theme. Storage holds either nothing
/// (light) or `"dark"`; a stored `"light"` is accepted as light.
pub struct ThemePreference<S> {
    storage: S,
}

impl<S: Storage> ThemePreference<S> {
    pub fn new(storage: S) -> Self {
        ThemePreference { storage }
    }

    pub fn current(&self) -> Theme {
        match self.storage.get(THEME_KEY) {
            None | Some("light") => Theme::Light,
            Some("dark") => Theme::Dark,
            Some(other) => {
                warn!(value = other, "ignoring unrecognized stored theme");
                Theme::Light
            }
        }
    }

    /// Reflects the stored preference onto `document`. Called once when the
    /// page is set up.
    pub fn apply(&self, document: &mut Document) {
        document.reflect(self.current());
    }

    /// Flips the theme, persists it, and reflects it onto `document`.
    /// Switching to light removes the stored value rather than writing
    /// `"light"`.
    pub fn toggle(&mut self, document: &mut Document) -> Result<Theme> {
        let next = self.current().toggled();
        match next.attribute() {
            Some(value) => self.storage.set(THEME_KEY, value)?,
            None => self.storage.remove(THEME_KEY)?,
        }
        document.reflect(next);
        info!(theme = ?next, "toggled theme");
        Ok(next)
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}

/// Represents the result of a theme storage operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error reading or writing persisted preferences.
#[derive(Debug)]
pub enum Error {
    /// Returned when the storage file isn't a JSON object of strings.
    Json(serde_json::Error),

    /// Returned for I/O errors reading or writing the storage file.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Json(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Json(err) => Some(err),
            Error::Io(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Error {
        Error::Json(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}
