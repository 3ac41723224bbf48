//! Loads the project configuration from `tagsieve.yaml`.

use crate::render::DEFAULT_POST_PAGE;
use crate::store::{Source, DEFAULT_DATA_PATH};
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::debug;

/// The name of the project file searched for by [`Config::from_directory`].
pub const PROJECT_FILE: &str = "tagsieve.yaml";

#[derive(Deserialize)]
struct SiteRoot(String);
impl Default for SiteRoot {
    fn default() -> Self {
        SiteRoot(String::from("."))
    }
}

#[derive(Deserialize)]
struct DataPath(String);
impl Default for DataPath {
    fn default() -> Self {
        DataPath(String::from(DEFAULT_DATA_PATH))
    }
}

#[derive(Deserialize)]
struct PostPage(String);
impl Default for PostPage {
    fn default() -> Self {
        PostPage(String::from(DEFAULT_POST_PAGE))
    }
}

#[derive(Deserialize, Default)]
struct Project {
    /// A directory (relative to the project file) or an `http(s)://` URL.
    #[serde(default)]
    site_root: SiteRoot,

    /// The post document's path relative to `site_root`.
    #[serde(default)]
    data_path: DataPath,

    #[serde(default)]
    post_page: PostPage,

    /// Template files for the page shell, concatenated in order.
    #[serde(default)]
    page_template: Vec<PathBuf>,

    /// Where the theme preference is persisted.
    #[serde(default)]
    storage: Option<PathBuf>,
}

pub struct Config {
    pub project_directory: PathBuf,
    pub source: Source,
    pub post_page: String,
    pub page_template: Vec<PathBuf>,
    pub storage_path: PathBuf,
}

impl Config {
    /// Searches `dir` and then each of its ancestors for [`PROJECT_FILE`].
    /// Without one, every setting takes its default and paths are resolved
    /// against `dir`.
    pub fn from_directory(dir: &Path) -> Result<Config> {
        let mut candidate = Some(dir);
        while let Some(current) = candidate {
            let path = current.join(PROJECT_FILE);
            if path.is_file() {
                return Config::from_project_file(&path)
                    .with_context(|| format!("Loading configuration `{}`", path.display()));
            }
            candidate = current.parent();
        }
        debug!(dir = %dir.display(), "no project file found; using defaults");
        Config::from_project(Project::default(), dir)
    }

    pub fn from_project_file(path: &Path) -> Result<Config> {
        let file = File::open(path)
            .map_err(|e| anyhow!("Opening project file `{}`: {}", path.display(), e))?;
        let project: Project = serde_yaml::from_reader(file)?;
        match path.parent() {
            None => Err(anyhow!(
                "Can't get parent directory for provided project file path '{:?}'",
                path
            )),
            Some(project_root) => Config::from_project(project, project_root),
        }
    }

    fn from_project(project: Project, project_root: &Path) -> Result<Config> {
        Ok(Config {
            project_directory: project_root.to_owned(),
            source: Source::locate(&project.site_root.0, &project.data_path.0, project_root)?,
            post_page: project.post_page.0,
            page_template: project
                .page_template
                .iter()
                .map(|relpath| project_root.join(relpath))
                .collect(),
            storage_path: match project.storage {
                Some(relpath) => project_root.join(relpath),
                None => default_storage_path(project_root),
            },
        })
    }
}

fn default_storage_path(project_root: &Path) -> PathBuf {
    match directories::ProjectDirs::from("", "", "tagsieve") {
        Some(dirs) => dirs.data_dir().join("storage.json"),
        None => project_root.join(".tagsieve").join("storage.json"),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_testdata_project() -> Result<()> {
        let config = Config::from_directory(Path::new("./testdata/site"))?;
        assert_eq!(
            config.source,
            Source::File(PathBuf::from("./testdata/site/./posts.json"))
        );
        assert_eq!(config.post_page, "post.html");
        assert_eq!(
            config.storage_path,
            PathBuf::from("./testdata/site/.tagsieve/storage.json")
        );
        Ok(())
    }

    #[test]
    fn test_search_walks_up_to_parent() -> Result<()> {
        let root = tempfile::tempdir()?;
        let nested = root.path().join("a").join("b");
        std::fs::create_dir_all(&nested)?;
        let mut file = File::create(root.path().join(PROJECT_FILE))?;
        writeln!(file, "site_root: https://example.org/blog")?;
        writeln!(file, "data_path: data/posts.json")?;
        writeln!(file, "post_page: read.html")?;

        let config = Config::from_directory(&nested)?;
        assert_eq!(config.project_directory, root.path());
        assert_eq!(
            config.source,
            Source::Http(url::Url::parse("https://example.org/blog/data/posts.json")?)
        );
        assert_eq!(config.post_page, "read.html");
        Ok(())
    }

    #[test]
    fn test_invalid_project_file() -> Result<()> {
        let root = tempfile::tempdir()?;
        std::fs::write(root.path().join(PROJECT_FILE), "page_template: 7\n")?;
        assert!(Config::from_directory(root.path()).is_err());
        Ok(())
    }
}
