//! Snapshot persistence for the user store: loaded once at startup, written
//! back on shutdown.

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("i/o: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: {source}")]
    Parse {
        line: usize,
        source: serde_json::Error,
    },
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no users stored and no admin credentials to seed one with")]
    NoAdmin,
    #[error("couldn't hash the admin password")]
    Hash,
}

/// Credentials for the administrator created when there's nothing to load.
#[derive(Debug, Default, Clone)]
pub struct Seed {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

mod backend_file;
pub use backend_file::*;
