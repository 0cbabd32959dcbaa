use std::path::Path as StdPath;
use std::path::PathBuf;

use futures_lite::StreamExt;

use crate::DirInfo;
use crate::DirectoryView;
use crate::Error;
use crate::Path;
use crate::entry::EntryStat;
use crate::entry::classify;

/// Lists one directory under the served root and classifies its entries.
pub(crate) struct DirLister {
    root: PathBuf,
}

impl DirLister {
    pub fn create<P: AsRef<StdPath>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Builds the view of `dir_path`.
    ///
    /// Entries come out in the order the filesystem lists them. An entry
    /// that cannot be stat'ed or classified is logged and left out; failing
    /// to read the directory itself fails the listing.
    pub async fn list<P: AsRef<StdPath>>(&self, dir_path: P) -> Result<DirectoryView, Error> {
        let dir_path = dir_path.as_ref();
        let current_path = Path::relative_to(&self.root, dir_path)?;

        let mut entries = async_fs::read_dir(dir_path)
            .await
            .map_err(|e| Error::Unreadable {
                what: dir_path.to_string_lossy().to_string(),
                how: e.to_string(),
            })?;

        let mut items = Vec::new();
        while let Some(entry) = entries.next().await {
            let entry = entry.map_err(|e| Error::Unreadable {
                what: dir_path.to_string_lossy().to_string(),
                how: e.to_string(),
            })?;

            let classified = match EntryStat::from_dir_entry(&entry).await {
                Ok(stat) => classify(&stat, &self.root).await,
                Err(e) => Err(e),
            };
            match classified {
                Ok(item) => items.push(item),
                Err(e) => log::warn!("skipping {}: {e}", entry.path().display()),
            }
        }
        log::debug!("listed {} entries in {}", items.len(), dir_path.display());

        Ok(DirectoryView {
            info: DirInfo::new(&self.root, dir_path, &current_path)?,
            current_path,
            items,
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::TestRoot;

    #[tokio::test]
    async fn lists_every_child() {
        let root = TestRoot::new(None).await.unwrap();
        let lister = DirLister::create(root.path());
        let view = lister.list(root.path()).await.unwrap();
        assert_eq!(view.items.len(), root.children_of(""));
        assert!(view.current_path.is_root());
        assert_eq!(view.info.parent, ".");
        assert_eq!(view.info.parent_href, None);
        assert!(view.get("rex").unwrap().is_object());
        assert!(view.get("@tags").unwrap().is_list());
        assert!(view.get("count:").unwrap().is_parameters());
    }

    #[tokio::test]
    async fn lists_nested_directory() {
        let root = TestRoot::new(None).await.unwrap();
        let lister = DirLister::create(root.path());
        let view = lister.list(root.path().join("rex")).await.unwrap();
        assert_eq!(view.items.len(), root.children_of("rex"));
        assert_eq!(view.current_path.to_string(), "rex");
        assert!(view.info.name.ends_with("/rex"));
        assert_eq!(view.info.parent_href.as_deref(), Some("/"));
        assert_eq!(view.get("^").unwrap().value, "Animal");
        assert_eq!(view.get("@toys").unwrap().value, "ball\nbone\n");
        for item in &view.items {
            assert_eq!(item.path.to_string(), "rex");
        }
    }

    #[tokio::test]
    async fn preserves_enumeration_order() {
        let root = TestRoot::new(None).await.unwrap();
        let lister = DirLister::create(root.path());
        let view = lister.list(root.path()).await.unwrap();
        let native: Vec<String> = std::fs::read_dir(root.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        let listed: Vec<String> = view.items.iter().map(|i| i.name.clone()).collect();
        assert_eq!(listed, native);
    }

    #[tokio::test]
    async fn skips_unclassifiable_entry() {
        let mut root = TestRoot::new(None).await.unwrap();
        root.create_file("broken/^", "regular file, not a link").unwrap();
        root.create_file("broken/keep.txt", "x").unwrap();
        let lister = DirLister::create(root.path());
        let view = lister.list(root.path()).await.unwrap();
        assert!(view.get("broken").is_none());
        assert_eq!(view.items.len(), root.children_of("") - 1);

        let inner = lister.list(root.path().join("broken")).await.unwrap();
        assert_eq!(inner.items.len(), 2);
    }

    #[tokio::test]
    async fn skips_list_with_unreadable_content() {
        let root = TestRoot::new(None).await.unwrap();
        std::fs::write(root.path().join("@bin"), b"\xff\xfe").unwrap();
        let lister = DirLister::create(root.path());
        let view = lister.list(root.path()).await.unwrap();
        assert!(view.get("@bin").is_none());
        assert_eq!(view.items.len(), root.children_of(""));
        assert_eq!(view.get("@tags").unwrap().value, "a\nb\n");
    }

    #[tokio::test]
    async fn missing_directory_is_unreadable() {
        let root = TestRoot::new(None).await.unwrap();
        let lister = DirLister::create(root.path());
        let err = lister.list(root.path().join("nope")).await.unwrap_err();
        assert!(matches!(err, Error::Unreadable { .. }));
    }
}
