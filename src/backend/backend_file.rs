use std::fs::{File, OpenOptions};
use std::io::{BufWriter, ErrorKind};
use std::path::{Path, PathBuf};

use log::{error, info, warn};
use uuid::Uuid;

use super::{Error, Seed};
use crate::password::Hasher;
use crate::store::Store;
use crate::user::User;

mod lines;

pub struct Backend {
    path: PathBuf,
}

impl Backend {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Fill `store` from the snapshot file. With no file, or an empty one, an
    /// admin is created from `seed` instead.
    pub fn load(&self, store: &Store<User>, seed: &Seed, hasher: &Hasher) -> Result<(), Error> {
        let path = &self.path;

        match File::open(path) {
            Ok(file) => {
                for user in lines::read(file)? {
                    store.set(user.id.clone(), user);
                }
                info!("loaded {} users from {path:?}", store.len());
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("no user store at {path:?}, starting fresh");
            }
            Err(e) => {
                error!("open {path:?}: {e:?}");
                return Err(e.into());
            }
        }

        if store.is_empty() {
            seed_admin(store, seed, hasher)?;
        }

        Ok(())
    }

    /// Overwrite the snapshot file with every user in `store`, in order.
    pub fn save(&self, store: &Store<User>) -> Result<(), Error> {
        let path = &self.path;
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .map_err(|e| {
                error!("couldn't open {path:?} for writing: {e:?}");
                e
            })?;

        let users = store.list();
        lines::write(BufWriter::new(file), &users)?;

        info!("saved {} users to {path:?}", users.len());
        Ok(())
    }
}

fn seed_admin(store: &Store<User>, seed: &Seed, hasher: &Hasher) -> Result<(), Error> {
    let (Some(username), Some(email), Some(password)) = (
        seed.username.as_deref().filter(|s| !s.is_empty()),
        seed.email.as_deref().filter(|s| !s.is_empty()),
        seed.password.as_deref().filter(|s| !s.is_empty()),
    ) else {
        error!("no users to load and no default admin params");
        return Err(Error::NoAdmin);
    };

    let password = hasher.hash(password).map_err(|_| Error::Hash)?;
    let id = Uuid::new_v4().to_string();

    store.set(
        id.clone(),
        User {
            id,
            email: email.into(),
            username: username.into(),
            password,
            admin: true,
        },
    );

    info!("seeded admin {username}");
    Ok(())
}

#[cfg(test)]
mod test {
    use std::fs;

    use super::*;
    use crate::password;

    fn seed() -> Seed {
        Seed {
            username: Some("root".into()),
            email: Some("root@example.com".into()),
            password: Some("Password1!".into()),
        }
    }

    fn user(n: usize) -> User {
        User {
            id: format!("id{n}"),
            email: format!("u{n}@example.com"),
            username: format!("u{n}"),
            password: "hash".into(),
            admin: false,
        }
    }

    #[test]
    fn missing_file_seeds_admin() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Backend::new(&dir.path().join("users.txt"));
        let store = Store::new();
        let hasher = password::test::hasher();

        backend.load(&store, &seed(), &hasher).unwrap();

        let users = store.list();
        let [ref admin] = users[..] else {
            panic!("expected a single admin");
        };
        assert_eq!(admin.username, "root");
        assert!(admin.admin);
        assert!(hasher.verify("Password1!", &admin.password));
    }

    #[test]
    fn empty_file_seeds_admin() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.txt");
        fs::write(&path, "\n").unwrap();

        let store = Store::new();
        Backend::new(&path)
            .load(&store, &seed(), &password::test::hasher())
            .unwrap();

        assert_eq!(store.len(), 1);
    }

    #[test]
    fn no_seed_no_start() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Backend::new(&dir.path().join("users.txt"));
        let mut seed = seed();
        seed.password = Some(String::new());

        let r = backend.load(&Store::new(), &seed, &password::test::hasher());

        assert!(matches!(r, Err(Error::NoAdmin)));
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Backend::new(&dir.path().join("users.txt"));

        let store = Store::new();
        for i in 0..3 {
            let u = user(i);
            store.set(u.id.clone(), u);
        }
        store.delete("id1");
        backend.save(&store).unwrap();

        // seed is ignored when there are users to load
        let loaded = Store::new();
        backend
            .load(&loaded, &Seed::default(), &password::test::hasher())
            .unwrap();

        assert_eq!(loaded.list(), [user(0), user(2)]);
    }

    #[test]
    fn save_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Backend::new(&dir.path().join("users.txt"));

        let store = Store::new();
        for i in 0..5 {
            let u = user(i);
            store.set(u.id.clone(), u);
        }
        backend.save(&store).unwrap();

        for i in 1..5 {
            store.delete(&format!("id{i}"));
        }
        backend.save(&store).unwrap();

        let text = fs::read_to_string(backend.path()).unwrap();
        assert_eq!(text.lines().count(), 1);
    }

    #[test]
    fn corrupt_file_fails_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.txt");
        fs::write(&path, "{\"id\":\n").unwrap();

        let r = Backend::new(&path).load(&Store::new(), &seed(), &password::test::hasher());

        assert!(matches!(r, Err(Error::Parse { line: 1, .. })));
    }
}
