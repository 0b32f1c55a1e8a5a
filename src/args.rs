use std::net::{AddrParseError, IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use clap::Parser;

use crate::backend::Seed;

#[derive(Parser, Debug)]
pub struct Args {
    /// The address userdir should listen on. By default
    /// userdir will listen just on the IPv4 loopback.
    #[arg(short, long)]
    address: Option<String>,

    /// The port userdir listens on.
    #[arg(short, long, default_value_t = 8000)]
    port: u16,

    /// Where users are loaded from at startup and saved to on shutdown,
    /// one JSON object per line.
    #[arg(long, env = "USERDIR_STORE", default_value = "users_store.txt")]
    store: PathBuf,

    /// Username of the admin created when there are no users to load.
    #[arg(long, env = "ADMIN_USERNAME")]
    admin_username: Option<String>,

    /// Email of the admin created when there are no users to load.
    #[arg(long, env = "ADMIN_EMAIL")]
    admin_email: Option<String>,

    /// Password of the admin created when there are no users to load.
    #[arg(long, env = "ADMIN_PASSWORD", hide_env_values = true)]
    admin_password: Option<String>,
}

impl Args {
    pub fn addr(&self) -> Result<SocketAddr, AddrParseError> {
        self.address
            .as_deref()
            .unwrap_or("127.0.0.1")
            .parse()
            .map(|addr: IpAddr| (addr, self.port).into())
    }

    pub fn store(&self) -> &Path {
        &self.store
    }

    pub fn seed(&self) -> Seed {
        Seed {
            username: self.admin_username.clone(),
            email: self.admin_email.clone(),
            password: self.admin_password.clone(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["userdir"]).unwrap();

        assert_eq!(args.addr().unwrap(), "127.0.0.1:8000".parse().unwrap());
    }

    #[test]
    fn address_and_seed() {
        let args = Args::try_parse_from([
            "userdir",
            "--address",
            "0.0.0.0",
            "-p",
            "9000",
            "--store",
            "/tmp/users.txt",
            "--admin-username",
            "root",
        ])
        .unwrap();

        assert_eq!(args.addr().unwrap(), "0.0.0.0:9000".parse().unwrap());
        assert_eq!(args.store(), Path::new("/tmp/users.txt"));
        assert_eq!(args.seed().username.as_deref(), Some("root"));
    }

    #[test]
    fn bad_address() {
        let args = Args::try_parse_from(["userdir", "-a", "localhost"]).unwrap();

        assert!(args.addr().is_err());
    }
}
