use std::ffi::OsStr;
use std::ffi::OsString;
use std::fmt::Display;
use std::path::Path as StdPath;
use std::path::PathBuf;

#[cfg(feature = "json_schema")]
use schemars::JsonSchema;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::de;

use crate::errors::Error;

/// A custom deserializer function for a Vec<String> that checks for ".."
/// components.
fn deserialize_components<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let components = Vec::<String>::deserialize(deserializer)?;

    if components.iter().any(|c| c == ".." || c == ".") {
        Err(de::Error::custom("Path component cannot contain '..'"))
    } else {
        Ok(components)
    }
}

#[cfg(unix)]
fn os_bytes(s: &OsStr) -> std::borrow::Cow<'_, [u8]> {
    use std::os::unix::ffi::OsStrExt;

    std::borrow::Cow::Borrowed(s.as_bytes())
}

#[cfg(not(unix))]
fn os_bytes(s: &OsStr) -> std::borrow::Cow<'_, [u8]> {
    match s.to_string_lossy() {
        std::borrow::Cow::Borrowed(s) => std::borrow::Cow::Borrowed(s.as_bytes()),
        std::borrow::Cow::Owned(s) => std::borrow::Cow::Owned(s.into_bytes()),
    }
}

#[cfg(unix)]
fn os_string(bytes: &[u8]) -> OsString {
    use std::os::unix::ffi::OsStrExt;

    OsStr::from_bytes(bytes).to_owned()
}

#[cfg(not(unix))]
fn os_string(bytes: &[u8]) -> OsString {
    OsString::from(String::from_utf8_lossy(bytes).into_owned())
}

/// A clean path relative to the served root, stored as its components.
/// `Path` in itself is useless. It needs a base/root path to be useful.
///
/// Components are display strings. Names that are not valid UTF-8 are
/// converted lossily; use [`RequestPath`] and [`href_under`] to address them.
#[cfg_attr(feature = "json_schema", derive(JsonSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Hash, Eq, Default)]
pub struct Path {
    /// The components of the relative path.
    #[serde(deserialize_with = "deserialize_components")]
    components: Vec<String>,
}

impl Display for Path {
    /// Joins the components with `/`, the separator used in request paths.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.components.join("/"))
    }
}

impl Path {
    /// Creates empty path
    pub fn empty() -> Self {
        Self { components: vec![] }
    }

    /// Returns true if this is the root itself.
    pub fn is_root(&self) -> bool {
        self.components.is_empty()
    }

    /// Computes the position of `path` relative to `root`.
    ///
    /// Fails with `Error::InvalidPath` when `path` does not live under
    /// `root`.
    pub fn relative_to(root: &StdPath, path: &StdPath) -> Result<Self, Error> {
        Self::try_from(strip_root(root, path)?)
    }

    /// The name a rendered directory is shown under: the root's own base name,
    /// followed by this path when it is not the root.
    pub fn display_name(&self, root: &StdPath) -> String {
        let base = root
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| root.display().to_string());
        if self.is_root() {
            base
        } else {
            format!("{base}/{self}")
        }
    }

    /// The parent of this path for display. Top level entries and the root
    /// itself have `.` as their parent.
    pub fn display_parent(&self) -> String {
        match self.parent() {
            Some(parent) if !parent.is_root() => parent.to_string(),
            _ => ".".to_owned(),
        }
    }

    /// Returns the parent path of the current `Path`, or `None` if
    /// there is no parent.
    pub fn parent(&self) -> Option<Path> {
        if self.components.is_empty() {
            None
        } else {
            let mut parent_components = self.components.clone();
            parent_components.pop();
            Some(Path {
                components: parent_components,
            })
        }
    }
}

impl<T> TryFrom<&[T]> for Path
where
    T: AsRef<str>,
{
    type Error = Error;

    /// Attempt to build a `Path` from a slice of components.
    ///
    /// Each component is validated to not contain directory separators and to
    /// not equal `.` or `..`.
    fn try_from(components: &[T]) -> std::result::Result<Self, Self::Error> {
        let mut c = Vec::new();
        for comp in components {
            let s = comp.as_ref();
            if s.contains('/') || s.contains('\\') || s == "." || s == ".." || s.is_empty() {
                return Err(Error::InvalidPath {
                    what: format!("Invalid path component: {s}"),
                });
            }
            c.push(s.to_string());
        }
        Ok(Path { components: c })
    }
}

impl TryFrom<&StdPath> for Path {
    type Error = Error;

    /// Convert a relative platform path into a `Path`.
    ///
    /// Root components are stripped and `.` or `..` are rejected.
    fn try_from(path: &StdPath) -> Result<Self, Self::Error> {
        let mut components = Vec::new();
        for comp in path.components() {
            match comp {
                std::path::Component::Normal(s) => {
                    components.push(s.to_string_lossy().to_string());
                }
                std::path::Component::RootDir | std::path::Component::Prefix(_) => {}
                std::path::Component::CurDir | std::path::Component::ParentDir => {
                    return Err(Error::InvalidPath {
                        what: format!("Path cannot contain '.' or '..': {}", path.display()),
                    });
                }
            }
        }
        Ok(Path { components })
    }
}

fn strip_root<'a>(root: &StdPath, path: &'a StdPath) -> Result<&'a StdPath, Error> {
    path.strip_prefix(root).map_err(|e| Error::InvalidPath {
        what: format!("{} is not under {}: {e}", path.display(), root.display()),
    })
}

/// URL path of `path`, which lives under `root`. Each component's raw bytes
/// are percent-encoded, so names that are not UTF-8 stay addressable.
pub fn href_under(root: &StdPath, path: &StdPath) -> Result<String, Error> {
    let encoded: Vec<String> = strip_root(root, path)?
        .components()
        .filter_map(|comp| match comp {
            std::path::Component::Normal(s) => {
                Some(urlencoding::encode_binary(&os_bytes(s)).into_owned())
            }
            _ => None,
        })
        .collect();
    Ok(format!("/{}", encoded.join("/")))
}

/// The path part of a request URI, decoded to raw name bytes and cleaned.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RequestPath {
    components: Vec<OsString>,
}

impl Display for RequestPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<_> = self.components.iter().map(|c| c.to_string_lossy()).collect();
        write!(f, "/{}", parts.join("/"))
    }
}

impl RequestPath {
    /// Percent-decodes `raw` to bytes, then drops empty and `.` segments and
    /// lets `..` pop the previous segment. A `..` at the root is ignored, so
    /// the result never escapes the root.
    pub fn parse(raw: &str) -> Self {
        let decoded = urlencoding::decode_binary(raw.as_bytes());
        let mut components = Vec::new();
        for segment in decoded.split(|b| *b == b'/') {
            match segment {
                b"" | b"." => {}
                b".." => {
                    components.pop();
                }
                s => components.push(os_string(s)),
            }
        }
        RequestPath { components }
    }

    /// Joins the components under `base_dir` to make a platform `PathBuf`.
    pub fn append_to(&self, base_dir: &StdPath) -> PathBuf {
        let mut ret = base_dir.to_owned();
        for comp in &self.components {
            ret.push(comp);
        }
        ret
    }
}
