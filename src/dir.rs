use std::path::Path as StdPath;

#[cfg(feature = "json_schema")]
use schemars::JsonSchema;
use serde::Deserialize;
use serde::Serialize;

use crate::ClassifiedEntry;
use crate::Error;
use crate::Path;
use crate::path::href_under;

/// Display metadata of a rendered directory.
#[cfg_attr(feature = "json_schema", derive(JsonSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Hash, Eq)]
pub struct DirInfo {
    /// Root base name followed by the relative path, e.g. `data/a/b`.
    pub name: String,
    /// Parent of the relative path, `.` for the root and its direct children.
    pub parent: String,
    /// URL path of the parent directory. `None` for the root.
    pub parent_href: Option<String>,
}

impl DirInfo {
    /// Builds the display metadata of `dir_path`, whose position under
    /// `root` is `current_path`.
    pub fn new(root: &StdPath, dir_path: &StdPath, current_path: &Path) -> Result<Self, Error> {
        let parent_href = match dir_path.parent() {
            Some(parent) if !current_path.is_root() => Some(href_under(root, parent)?),
            _ => None,
        };
        Ok(Self {
            name: current_path.display_name(root),
            parent: current_path.display_parent(),
            parent_href,
        })
    }
}

/// Represents the contents of a directory, including the current path and its
/// classified items.
#[cfg_attr(feature = "json_schema", derive(JsonSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Hash, Eq)]
pub struct DirectoryView {
    /// The current directory path.
    pub current_path: Path,
    /// Display metadata of the directory.
    pub info: DirInfo,
    /// The entries of the directory in enumeration order.
    pub items: Vec<ClassifiedEntry>,
}

impl DirectoryView {
    /// Looks up an item by name.
    pub fn get(&self, name: &str) -> Option<&ClassifiedEntry> {
        self.items.iter().find(|item| item.name == name)
    }
}
