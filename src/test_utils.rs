use std::collections::BTreeMap;
use std::fs;
use std::fs::create_dir_all;
use std::path::Path as StdPath;
use std::path::PathBuf;

use tempdir::TempDir;

/// What a fixture path holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fixture {
    /// A regular file and its content.
    File(String),
    /// A directory.
    Dir,
    /// A symlink and its target text.
    Symlink(String),
}

// A small thinobject tree: lists, maps, symvars, a type marker, a
// declaration, an object directory and a directory served by index.html.
fn temp_files() -> Vec<(&'static str, Fixture)> {
    vec![
        ("readme.txt", Fixture::File("hello".into())),
        ("@tags", Fixture::File("a\nb\n".into())),
        ("%props", Fixture::File("color red\nsize 3\n".into())),
        ("notes.json", Fixture::File("{\"a\": [1, 2]}".into())),
        ("alias", Fixture::Symlink("readme.txt".into())),
        ("count:", Fixture::Symlink("=5".into())),
        ("name", Fixture::Symlink("=Rex".into())),
        ("^Person", Fixture::Symlink("Human".into())),
        ("owner", Fixture::Symlink("nobody here".into())),
        ("docs", Fixture::Dir),
        ("rex", Fixture::Dir),
        ("rex/^", Fixture::Symlink("Animal".into())),
        ("rex/name", Fixture::Symlink("=Rex".into())),
        ("rex/@toys", Fixture::File("ball\nbone\n".into())),
        ("site", Fixture::Dir),
        ("site/index.html", Fixture::File("<h1>home</h1>".into())),
        ("site/other.txt", Fixture::File("other".into())),
        ("tree", Fixture::Dir),
        ("tree/a", Fixture::Dir),
        ("tree/b", Fixture::Dir),
        ("tree/c", Fixture::Dir),
    ]
}

/// Temporary thinobject tree for tests.
#[derive(Debug)]
pub struct TestRoot {
    /// Root of the temporary test directory.
    pub root: TempDir,
    /// Every path created under the root and what it holds.
    pub files: BTreeMap<PathBuf, Fixture>,

    save_path: Option<PathBuf>,
}

impl TestRoot {
    /// Creates a temporary directory populated with the default tree.
    ///
    /// When `save_path` is given the tree is copied to `/tmp/<save_path>` on
    /// drop, for inspection.
    pub async fn new(save_path: Option<&str>) -> Result<Self, std::io::Error> {
        let mut ret = Self::empty(save_path)?;
        for (relative_path, fixture) in temp_files() {
            match fixture {
                Fixture::File(content) => ret.create_file(relative_path, &content)?,
                Fixture::Dir => ret.create_dir(relative_path)?,
                Fixture::Symlink(target) => ret.create_symlink(relative_path, &target)?,
            }
        }
        Ok(ret)
    }

    /// Creates an empty temporary directory.
    pub fn empty(save_path: Option<&str>) -> Result<Self, std::io::Error> {
        Ok(Self {
            root: TempDir::new("restatic")?,
            files: BTreeMap::new(),
            save_path: save_path.map(|p| StdPath::new("/tmp/").join(p)),
        })
    }

    /// Path of the root directory.
    pub fn path(&self) -> &StdPath {
        self.root.path()
    }

    fn create_parents(&mut self, relative_path: &str) -> Result<(), std::io::Error> {
        let mut parent = StdPath::new(relative_path).parent();
        while let Some(p) = parent {
            if p.as_os_str().is_empty() {
                break;
            }
            create_dir_all(self.root.path().join(p))?;
            self.files.entry(p.to_path_buf()).or_insert(Fixture::Dir);
            parent = p.parent();
        }
        Ok(())
    }

    /// Creates a file with `content` at `relative_path`, creating parent
    /// directories as needed.
    pub fn create_file(
        &mut self,
        relative_path: &str,
        content: &str,
    ) -> Result<(), std::io::Error> {
        self.create_parents(relative_path)?;
        fs::write(self.root.path().join(relative_path), content)?;
        self.files
            .insert(relative_path.into(), Fixture::File(content.to_owned()));
        Ok(())
    }

    /// Creates a directory at `relative_path`.
    pub fn create_dir(&mut self, relative_path: &str) -> Result<(), std::io::Error> {
        self.create_parents(relative_path)?;
        create_dir_all(self.root.path().join(relative_path))?;
        self.files.insert(relative_path.into(), Fixture::Dir);
        Ok(())
    }

    /// Creates a symlink at `relative_path` whose target text is `target`.
    /// The target is not required to exist.
    pub fn create_symlink(
        &mut self,
        relative_path: &str,
        target: &str,
    ) -> Result<(), std::io::Error> {
        self.create_parents(relative_path)?;
        std::os::unix::fs::symlink(target, self.root.path().join(relative_path))?;
        self.files
            .insert(relative_path.into(), Fixture::Symlink(target.to_owned()));
        Ok(())
    }

    /// Number of immediate children recorded under `relative_dir`. Use `""`
    /// for the root.
    pub fn children_of(&self, relative_dir: &str) -> usize {
        let dir = StdPath::new(relative_dir);
        self.files
            .keys()
            .filter(|p| p.parent() == Some(dir))
            .count()
    }

    fn copy_dir_all(
        src: impl AsRef<StdPath>,
        dst: impl AsRef<StdPath>,
    ) -> Result<(), std::io::Error> {
        create_dir_all(&dst)?;
        for entry in fs::read_dir(src)? {
            let entry = entry?;
            let ty = entry.file_type()?;
            let to = dst.as_ref().join(entry.file_name());
            if ty.is_symlink() {
                std::os::unix::fs::symlink(fs::read_link(entry.path())?, to)?;
            } else if ty.is_dir() {
                Self::copy_dir_all(entry.path(), to)?;
            } else {
                fs::copy(entry.path(), to)?;
            }
        }
        Ok(())
    }
}

impl Drop for TestRoot {
    fn drop(&mut self) {
        if let Some(save_path) = &self.save_path {
            let _ = Self::copy_dir_all(self.root.path(), save_path);
            println!("TestRoot preserved at {}", save_path.to_string_lossy());
        }
    }
}
