//! Serve a directory tree over HTTP, reading its entries through the
//! thinobject naming convention.
//!
//! The convention gives plain filesystem entries a meaning:
//!
//! | entry                                      | meaning     |
//! |--------------------------------------------|-------------|
//! | file named `@name`                         | list        |
//! | file named `%name`                         | map         |
//! | file named `name.json`                     | json        |
//! | dangling symlink with target `=value`      | symvar      |
//! | symvar named `name:`                       | parameters  |
//! | dangling symlink named `^Name`             | type        |
//! | any other dangling symlink                 | declaration |
//! | directory holding a `^` symlink            | object      |
//!
//! A typical use is resolving a request path into a classified listing:
//!
//! ```rust
//! # tokio_test::block_on(async {
//! # use restatic::{Resolved, Site};
//! let site = Site::new(std::fs::canonicalize("./src").unwrap());
//! let Resolved::Listing(dir) = site.resolve("/").await.unwrap() else {
//!     panic!("src has no index.html");
//! };
//! let lib = dir.get("lib.rs").unwrap();
//! assert!(lib.is_file());
//! assert!(lib.value.ends_with("iB") || lib.value.ends_with(" B"));
//! # })
//! ```

mod config;
mod dir;
mod entry;
mod errors;
mod native_fs;
mod path;
pub mod render;
pub mod server;
mod site;
pub mod utils;

pub use config::Args;
pub use config::Config;
pub use dir::DirInfo;
pub use dir::DirectoryView;
pub use entry::ClassifiedEntry;
pub use entry::EntryStat;
pub use entry::FileKind;
pub use entry::Kind;
pub use entry::LinkKind;
pub use entry::OBJECT_MARKER;
pub use entry::classify;
pub use errors::Error;
pub use path::Path;
pub use path::RequestPath;
pub use path::href_under;
pub use site::INDEX_FILE;
pub use site::Resolved;
pub use site::Site;

#[cfg(all(feature = "test_utils", unix))]
pub(crate) mod test_utils;
#[cfg(all(feature = "test_utils", unix))]
pub use test_utils::Fixture;
#[cfg(all(feature = "test_utils", unix))]
pub use test_utils::TestRoot;
