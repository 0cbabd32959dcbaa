//! Classification of a single directory entry under the thinobject naming
//! convention.
use std::fs::Metadata;
use std::path::Path as StdPath;
use std::path::PathBuf;
use std::time::SystemTime;

#[cfg(feature = "json_schema")]
use schemars::JsonSchema;
use serde::Deserialize;
use serde::Serialize;
use tokio::fs;

use crate::errors::Error;
use crate::path::Path;
use crate::path::href_under;
use crate::utils::format_bytes;
use crate::utils::format_mode;
use crate::utils::format_system_time;

/// Name of the child entry that marks a directory as an object.
pub const OBJECT_MARKER: &str = "^";

const LIST_PREFIX: char = '@';
const MAP_PREFIX: char = '%';
const JSON_SUFFIX: &str = ".json";
const SYMVAR_PREFIX: char = '=';
const PARAMETERS_SUFFIX: char = ':';
const TYPE_PREFIX: char = '^';

/// Raw facts about one directory entry, gathered before classification.
#[derive(Debug, Clone)]
pub struct EntryStat {
    /// Name of the entry inside its directory.
    pub name: String,
    /// Full platform path of the entry.
    pub path: PathBuf,
    /// Status of the entry itself, without following symlinks.
    pub link: Metadata,
    /// Status of the entry after following symlinks. `None` if following
    /// failed, e.g. for a dangling symlink.
    pub resolved: Option<Metadata>,
}

impl EntryStat {
    /// Gathers link and resolved status of the entry at `path`.
    ///
    /// Only a failing link status is an error. A failing resolved status
    /// leaves `resolved` empty.
    pub async fn from_path<P: AsRef<StdPath>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .ok_or(Error::InvalidPath {
                what: path.display().to_string(),
            })?
            .to_string_lossy()
            .to_string();
        let link = fs::symlink_metadata(path)
            .await
            .map_err(|e| Error::from_io(path, &e))?;
        let resolved = fs::metadata(path).await.ok();
        Ok(Self {
            name,
            path: path.to_owned(),
            link,
            resolved,
        })
    }

    /// Gathers the status of an entry yielded by a directory listing.
    pub async fn from_dir_entry(entry: &async_fs::DirEntry) -> Result<Self, Error> {
        Self::from_path(entry.path()).await
    }

    /// Whether the entry itself is a symlink.
    pub fn is_symlink(&self) -> bool {
        self.link.file_type().is_symlink()
    }
}

/// Refinement of a regular file by its name.
#[cfg_attr(feature = "json_schema", derive(JsonSchema))]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Hash, Eq)]
pub enum FileKind {
    /// No naming convention applies.
    Plain,
    /// Name starts with `@`. The value is the file content.
    List,
    /// Name starts with `%`. The value is the file content.
    Map,
    /// Name ends with `.json`.
    Json,
}

impl FileKind {
    /// Picks the refinement for a file called `name`. `@` wins over `%`, and
    /// both win over the `.json` suffix.
    pub fn from_name(name: &str) -> Self {
        if name.starts_with(LIST_PREFIX) {
            FileKind::List
        } else if name.starts_with(MAP_PREFIX) {
            FileKind::Map
        } else if name.ends_with(JSON_SUFFIX) {
            FileKind::Json
        } else {
            FileKind::Plain
        }
    }

    /// List and map files show their content instead of their size.
    pub fn shows_content(&self) -> bool {
        matches!(self, FileKind::List | FileKind::Map)
    }
}

/// Refinement of a symlink that does not resolve.
#[cfg_attr(feature = "json_schema", derive(JsonSchema))]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Hash, Eq)]
pub enum LinkKind {
    /// Target starts with `=`. `parameters` is set when the name ends with
    /// `:`.
    Symvar {
        /// Whether the symvar declares parameters.
        parameters: bool,
    },
    /// Name starts with `^`.
    Type,
    /// Any other dangling symlink.
    Declaration,
}

impl LinkKind {
    /// Classifies a dangling symlink called `name` pointing at `target`.
    /// Returns the kind and the value to display.
    pub fn from_target(name: &str, target: &str) -> (Self, String) {
        if let Some(value) = target.strip_prefix(SYMVAR_PREFIX) {
            let parameters = name.ends_with(PARAMETERS_SUFFIX);
            (LinkKind::Symvar { parameters }, value.to_owned())
        } else if name.starts_with(TYPE_PREFIX) {
            (LinkKind::Type, target.to_owned())
        } else {
            (LinkKind::Declaration, target.to_owned())
        }
    }
}

/// What an entry is under the thinobject convention.
#[cfg_attr(feature = "json_schema", derive(JsonSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Hash, Eq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Kind {
    /// Resolves to a directory. A directory holding a `^` entry is an object
    /// whose type is the target of that entry.
    Directory {
        /// Target text of the `^` child, if present.
        object_type: Option<String>,
    },
    /// Resolves to a regular file.
    File {
        /// Refinement by name.
        kind: FileKind,
    },
    /// A symlink that does not resolve.
    Symlink {
        /// Refinement by target text and name.
        kind: LinkKind,
    },
}

/// A directory entry ready for display.
#[cfg_attr(feature = "json_schema", derive(JsonSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Hash, Eq)]
pub struct ClassifiedEntry {
    /// Name of the entry.
    pub name: String,
    /// Mode string of the entry itself, e.g. `Lrwxrwxrwx`.
    pub mode: String,
    /// Modification time of the entry itself in RFC 1123 format.
    pub mtime: String,
    /// Size of the entry itself, formatted with IEC units.
    pub size: String,
    /// Path of the containing directory, relative to the root.
    pub path: Path,
    /// URL path of the entry, built from the raw bytes of its name.
    pub href: String,
    /// Classification of the entry.
    pub kind: Kind,
    /// Resolved value: a size, link target, symvar value or file content
    /// depending on `kind`.
    pub value: String,
}

impl ClassifiedEntry {
    /// Whether the entry resolves to a directory.
    pub fn is_dir(&self) -> bool {
        matches!(self.kind, Kind::Directory { .. })
    }

    /// Whether the entry is a directory holding a `^` entry.
    pub fn is_object(&self) -> bool {
        matches!(
            self.kind,
            Kind::Directory {
                object_type: Some(_)
            }
        )
    }

    /// Type of the object, if the entry is one.
    pub fn object_type(&self) -> Option<&str> {
        match &self.kind {
            Kind::Directory { object_type } => object_type.as_deref(),
            _ => None,
        }
    }

    /// Whether the entry resolves to a regular file.
    pub fn is_file(&self) -> bool {
        matches!(self.kind, Kind::File { .. })
    }

    /// Whether the entry is a list file.
    pub fn is_list(&self) -> bool {
        self.file_kind() == Some(FileKind::List)
    }

    /// Whether the entry is a map file.
    pub fn is_map(&self) -> bool {
        self.file_kind() == Some(FileKind::Map)
    }

    /// Whether the entry is a json file.
    pub fn is_json(&self) -> bool {
        self.file_kind() == Some(FileKind::Json)
    }

    /// Whether the entry is a symlink that does not resolve.
    pub fn is_symlink(&self) -> bool {
        matches!(self.kind, Kind::Symlink { .. })
    }

    /// Whether the entry is a symvar.
    pub fn is_symvar(&self) -> bool {
        matches!(self.link_kind(), Some(LinkKind::Symvar { .. }))
    }

    /// Whether the entry is a symvar declaring parameters.
    pub fn is_parameters(&self) -> bool {
        matches!(self.link_kind(), Some(LinkKind::Symvar { parameters: true }))
    }

    /// Whether the entry is a type marker.
    pub fn is_type(&self) -> bool {
        self.link_kind() == Some(LinkKind::Type)
    }

    /// Whether the entry is a declaration.
    pub fn is_declaration(&self) -> bool {
        self.link_kind() == Some(LinkKind::Declaration)
    }

    fn file_kind(&self) -> Option<FileKind> {
        match self.kind {
            Kind::File { kind } => Some(kind),
            _ => None,
        }
    }

    fn link_kind(&self) -> Option<LinkKind> {
        match self.kind {
            Kind::Symlink { kind } => Some(kind),
            _ => None,
        }
    }
}

async fn read_link_text(path: &StdPath) -> Result<String, Error> {
    let target = fs::read_link(path)
        .await
        .map_err(|e| Error::LinkResolution {
            what: path.display().to_string(),
            how: e.to_string(),
        })?;
    Ok(target.to_string_lossy().to_string())
}

async fn read_content(path: &StdPath) -> Result<String, Error> {
    fs::read_to_string(path)
        .await
        .map_err(|e| Error::ContentRead {
            what: path.display().to_string(),
            how: e.to_string(),
        })
}

/// Returns the type of the object at `dir`, or `None` if `dir` has no `^`
/// entry. The check does not follow `^`, so a dangling `^` still counts.
async fn object_type(dir: &StdPath) -> Result<Option<String>, Error> {
    let marker = dir.join(OBJECT_MARKER);
    if !marker_present(&marker, fs::symlink_metadata(&marker).await)? {
        return Ok(None);
    }
    Ok(Some(read_link_text(&marker).await?))
}

/// Only an absent marker means "not an object". Any other failure to stat
/// it is an error.
fn marker_present(marker: &StdPath, status: std::io::Result<Metadata>) -> Result<bool, Error> {
    match status {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(Error::from_io(marker, &e)),
    }
}

/// Classifies `entry`, which lives under the served `root`.
///
/// Fails if the entry's directory is not under `root`, if a link target
/// that decides the classification cannot be read, or if a list or map file
/// cannot be read in full.
pub async fn classify(entry: &EntryStat, root: &StdPath) -> Result<ClassifiedEntry, Error> {
    let parent = entry.path.parent().ok_or(Error::InvalidPath {
        what: entry.path.display().to_string(),
    })?;
    let path = Path::relative_to(root, parent)?;
    let href = href_under(root, &entry.path)?;

    let (kind, value) = match &entry.resolved {
        None => {
            let target = read_link_text(&entry.path).await?;
            let (kind, value) = LinkKind::from_target(&entry.name, &target);
            (Kind::Symlink { kind }, value)
        }
        Some(resolved) if resolved.is_dir() => {
            let object_type = object_type(&entry.path).await?;
            (Kind::Directory { object_type }, String::new())
        }
        Some(resolved) => {
            let kind = if resolved.is_file() {
                FileKind::from_name(&entry.name)
            } else {
                FileKind::Plain
            };
            let value = if kind.shows_content() {
                read_content(&entry.path).await?
            } else if entry.is_symlink() {
                read_link_text(&entry.path).await?
            } else {
                format_bytes(resolved.len())
            };
            (Kind::File { kind }, value)
        }
    };

    Ok(ClassifiedEntry {
        name: entry.name.clone(),
        mode: format_mode(&entry.link),
        mtime: format_system_time(entry.link.modified().unwrap_or(SystemTime::UNIX_EPOCH)),
        size: format_bytes(entry.link.len()),
        path,
        href,
        kind,
        value,
    })
}

#[cfg(all(test, unix))]
mod tests {
    use std::os::unix::fs::symlink;

    use super::*;
    use crate::TestRoot;

    async fn classify_at(root: &TestRoot, relative: &str) -> ClassifiedEntry {
        let stat = EntryStat::from_path(root.path().join(relative)).await.unwrap();
        classify(&stat, root.path()).await.unwrap()
    }

    #[test]
    fn file_kind_precedence() {
        assert_eq!(FileKind::from_name("@tags"), FileKind::List);
        assert_eq!(FileKind::from_name("%props"), FileKind::Map);
        assert_eq!(FileKind::from_name("@list.json"), FileKind::List);
        assert_eq!(FileKind::from_name("%map.json"), FileKind::Map);
        assert_eq!(FileKind::from_name("@%both"), FileKind::List);
        assert_eq!(FileKind::from_name("notes.json"), FileKind::Json);
        assert_eq!(FileKind::from_name("notes.JSON"), FileKind::Plain);
        assert_eq!(FileKind::from_name("json"), FileKind::Plain);
        assert_eq!(FileKind::from_name("readme"), FileKind::Plain);
    }

    #[test]
    fn link_kind_precedence() {
        assert_eq!(
            LinkKind::from_target("count:", "=5"),
            (LinkKind::Symvar { parameters: true }, "5".to_owned())
        );
        assert_eq!(
            LinkKind::from_target("count", "=5"),
            (LinkKind::Symvar { parameters: false }, "5".to_owned())
        );
        assert_eq!(
            LinkKind::from_target("^Person", "=x"),
            (LinkKind::Symvar { parameters: false }, "x".to_owned())
        );
        assert_eq!(
            LinkKind::from_target("^Person", "Human"),
            (LinkKind::Type, "Human".to_owned())
        );
        assert_eq!(
            LinkKind::from_target("args:", "a b"),
            (LinkKind::Declaration, "a b".to_owned())
        );
        assert_eq!(
            LinkKind::from_target("x", "=="),
            (LinkKind::Symvar { parameters: false }, "=".to_owned())
        );
    }

    #[tokio::test]
    async fn list_value_is_file_content() {
        let root = TestRoot::new(None).await.unwrap();
        let entry = classify_at(&root, "@tags").await;
        assert!(entry.is_file());
        assert!(entry.is_list());
        assert_eq!(entry.value, "a\nb\n");
        assert_eq!(entry.size, "4 B");
        assert!(entry.path.is_root());
    }

    #[tokio::test]
    async fn map_value_is_file_content() {
        let root = TestRoot::new(None).await.unwrap();
        let entry = classify_at(&root, "%props").await;
        assert!(entry.is_map());
        assert_eq!(entry.value, "color red\nsize 3\n");
    }

    #[tokio::test]
    async fn json_value_is_size() {
        let root = TestRoot::new(None).await.unwrap();
        let entry = classify_at(&root, "notes.json").await;
        assert!(entry.is_json());
        assert_eq!(entry.value, "13 B");
    }

    #[tokio::test]
    async fn plain_file_value_is_size() {
        let root = TestRoot::new(None).await.unwrap();
        let entry = classify_at(&root, "readme.txt").await;
        assert_eq!(entry.kind, Kind::File { kind: FileKind::Plain });
        assert_eq!(entry.value, "5 B");
        assert!(entry.mode.starts_with('-'));
    }

    #[tokio::test]
    async fn symlink_to_file_value_is_target() {
        let root = TestRoot::new(None).await.unwrap();
        let entry = classify_at(&root, "alias").await;
        assert_eq!(entry.kind, Kind::File { kind: FileKind::Plain });
        assert_eq!(entry.value, "readme.txt");
        assert!(entry.mode.starts_with('L'));
    }

    #[tokio::test]
    async fn symlinked_list_value_is_content() {
        let mut root = TestRoot::new(None).await.unwrap();
        root.create_symlink("@linked", "@tags").unwrap();
        let entry = classify_at(&root, "@linked").await;
        assert!(entry.is_list());
        assert_eq!(entry.value, "a\nb\n");
    }

    #[tokio::test]
    async fn parameters_symvar() {
        let root = TestRoot::new(None).await.unwrap();
        let entry = classify_at(&root, "count:").await;
        assert!(entry.is_symlink());
        assert!(entry.is_symvar());
        assert!(entry.is_parameters());
        assert_eq!(entry.value, "5");
    }

    #[tokio::test]
    async fn plain_symvar() {
        let root = TestRoot::new(None).await.unwrap();
        let entry = classify_at(&root, "name").await;
        assert!(entry.is_symvar());
        assert!(!entry.is_parameters());
        assert_eq!(entry.value, "Rex");
    }

    #[tokio::test]
    async fn type_marker() {
        let root = TestRoot::new(None).await.unwrap();
        let entry = classify_at(&root, "^Person").await;
        assert!(entry.is_type());
        assert!(!entry.is_symvar());
        assert_eq!(entry.value, "Human");
    }

    #[tokio::test]
    async fn declaration() {
        let root = TestRoot::new(None).await.unwrap();
        let entry = classify_at(&root, "owner").await;
        assert!(entry.is_declaration());
        assert_eq!(entry.value, "nobody here");
    }

    #[tokio::test]
    async fn object_directory() {
        let root = TestRoot::new(None).await.unwrap();
        let entry = classify_at(&root, "rex").await;
        assert!(entry.is_dir());
        assert!(entry.is_object());
        assert_eq!(entry.object_type(), Some("Animal"));
        assert!(entry.mode.starts_with('d'));
        assert_eq!(entry.href, "/rex");
    }

    #[tokio::test]
    async fn plain_directory() {
        let root = TestRoot::new(None).await.unwrap();
        let entry = classify_at(&root, "docs").await;
        assert!(entry.is_dir());
        assert!(!entry.is_object());
        assert_eq!(entry.object_type(), None);
    }

    #[tokio::test]
    async fn nested_entry_has_relative_path() {
        let root = TestRoot::new(None).await.unwrap();
        let entry = classify_at(&root, "rex/name").await;
        assert_eq!(entry.path.to_string(), "rex");
        assert_eq!(entry.href, "/rex/name");
    }

    #[tokio::test]
    async fn object_marker_that_is_not_a_symlink_fails() {
        let mut root = TestRoot::new(None).await.unwrap();
        root.create_file("odd/^", "not a link").unwrap();
        let stat = EntryStat::from_path(root.path().join("odd")).await.unwrap();
        let err = classify(&stat, root.path()).await.unwrap_err();
        assert!(matches!(err, Error::LinkResolution { .. }));
    }

    #[tokio::test]
    async fn entry_outside_root_fails() {
        let root = TestRoot::new(None).await.unwrap();
        let stat = EntryStat::from_path(root.path().join("readme.txt"))
            .await
            .unwrap();
        let other = tempdir::TempDir::new("other").unwrap();
        let err = classify(&stat, other.path()).await.unwrap_err();
        assert!(matches!(err, Error::InvalidPath { .. }));
    }

    #[tokio::test]
    async fn missing_entry_is_not_found() {
        let root = TestRoot::new(None).await.unwrap();
        let err = EntryStat::from_path(root.path().join("missing"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[tokio::test]
    async fn classification_is_idempotent() {
        let root = TestRoot::new(None).await.unwrap();
        let names = [
            "@tags",
            "%props",
            "notes.json",
            "count:",
            "^Person",
            "owner",
            "rex",
            "docs",
            "alias",
        ];
        for name in names {
            let first = classify_at(&root, name).await;
            let second = classify_at(&root, name).await;
            assert_eq!(first, second, "{name}");
        }
    }

    #[tokio::test]
    async fn dangling_object_marker_counts() {
        let dir = tempdir::TempDir::new("marker").unwrap();
        std::fs::create_dir(dir.path().join("thing")).unwrap();
        symlink("Ghost", dir.path().join("thing").join(OBJECT_MARKER)).unwrap();
        let stat = EntryStat::from_path(dir.path().join("thing")).await.unwrap();
        let entry = classify(&stat, dir.path()).await.unwrap();
        assert_eq!(entry.object_type(), Some("Ghost"));
    }

    #[test]
    fn marker_stat_failure_is_not_absence() {
        let marker = StdPath::new("/srv/thing/^");
        let absent = std::io::Error::from(std::io::ErrorKind::NotFound);
        assert_eq!(marker_present(marker, Err(absent)), Ok(false));

        let denied = std::io::Error::from(std::io::ErrorKind::PermissionDenied);
        let err = marker_present(marker, Err(denied)).unwrap_err();
        assert!(matches!(err, Error::Unreadable { .. }));
    }

    #[tokio::test]
    async fn href_encodes_raw_name_bytes() {
        use std::os::unix::ffi::OsStrExt;

        let root = TestRoot::new(None).await.unwrap();
        let name = std::ffi::OsStr::from_bytes(b"caf\xe9");
        std::fs::write(root.path().join(name), "bonjour").unwrap();
        let stat = EntryStat::from_path(root.path().join(name)).await.unwrap();
        let entry = classify(&stat, root.path()).await.unwrap();
        assert_eq!(entry.href, "/caf%E9");
        assert_eq!(entry.value, "7 B");
    }
}
