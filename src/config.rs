use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

use crate::Error;

/// Command line and environment options of the server.
#[derive(Parser, Debug, Clone)]
#[command(name = "restatic", version, about = "Serve a thinobject directory tree over HTTP")]
pub struct Args {
    /// Directory to serve.
    #[arg(short = 'd', long, env = "RESTATIC_DIR", default_value = ".")]
    pub dir: PathBuf,

    /// Address to listen on.
    #[arg(short = 'a', long, env = "RESTATIC_ADDR", default_value = "127.0.0.1:8080")]
    pub addr: SocketAddr,
}

/// Validated server configuration. Fixed for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Absolute path of the served directory.
    pub root: PathBuf,
    /// Address to listen on.
    pub addr: SocketAddr,
}

impl TryFrom<Args> for Config {
    type Error = Error;

    /// Canonicalizes the served directory and checks that it is one.
    fn try_from(args: Args) -> Result<Self, Self::Error> {
        let root = std::fs::canonicalize(&args.dir).map_err(|e| Error::from_io(&args.dir, &e))?;
        if !root.is_dir() {
            return Err(Error::InvalidPath {
                what: format!("{} is not a directory", root.display()),
            });
        }
        Ok(Config {
            root,
            addr: args.addr,
        })
    }
}
