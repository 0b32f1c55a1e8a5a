use std::sync::Arc;

use log::{debug, error, trace};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::store::Store;
use crate::user::User;

/// User CRUD over the ordered store.
pub struct Repository {
    store: Arc<Store<User>>,
}

impl Repository {
    pub fn new(store: Arc<Store<User>>) -> Self {
        Self { store }
    }

    /// Stores `user` under a fresh random id, which is returned. Any id the
    /// caller put on `user` is discarded.
    pub fn create(&self, mut user: User) -> Result<String> {
        user.id = Uuid::new_v4().to_string();

        let id = user.id.clone();
        if !self.store.insert(id.clone(), user) {
            error!("couldn't store user: id {id} already in use");
            return Err(Error::StorageFailure);
        }
        debug!("stored user {id}");

        Ok(id)
    }

    /// `page` is 1-based. Both negative means everything.
    pub fn list(&self, page: i32, limit: i32) -> Result<Vec<User>> {
        let users = self.store.list();

        if page < 0 && limit < 0 {
            return Ok(users);
        }

        let (first, end) = page_bounds(page, limit, users.len())?;
        trace!("listing users {first}..{end} of {}", users.len());

        Ok(users
            .into_iter()
            .skip(first)
            .take(end - first)
            .collect())
    }

    pub fn get_by_id(&self, id: &str) -> Result<User> {
        self.store.get(id).ok_or(Error::NotFound)
    }

    /// Replaces every field of the user with `user.id`, returning the stored
    /// record.
    pub fn update(&self, user: User) -> Result<User> {
        self.store
            .replace(&user.id, user.clone())
            .ok_or(Error::NotFound)?;

        debug!("replaced user {}", user.id);
        Ok(user)
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        self.store.delete(id).ok_or(Error::NotFound)?;

        debug!("deleted user {id}");
        Ok(())
    }
}

/// The `[first, end)` slice for a page. A page that starts past the end is an
/// error, one that merely runs off the end is truncated.
fn page_bounds(page: i32, limit: i32, count: usize) -> Result<(usize, usize)> {
    if page < 1 || limit < 1 {
        return Err(Error::PaginationOutOfRange);
    }

    let limit = limit as usize;
    let first = (page as usize - 1)
        .checked_mul(limit)
        .ok_or(Error::PaginationOutOfRange)?;

    if first >= count {
        return Err(Error::PaginationOutOfRange);
    }

    Ok((first, count.min(first.saturating_add(limit))))
}

#[cfg(test)]
mod test {
    use super::*;

    fn user(n: usize) -> User {
        User {
            id: String::new(),
            email: format!("user{n}@example.com"),
            username: format!("user{n}"),
            password: "hash".into(),
            admin: false,
        }
    }

    fn repo_with(n: usize) -> (Repository, Vec<String>) {
        let repo = Repository::new(Arc::new(Store::new()));
        let ids = (0..n).map(|i| repo.create(user(i)).unwrap()).collect();
        (repo, ids)
    }

    fn names(users: &[User]) -> Vec<&str> {
        users.iter().map(|u| u.username.as_str()).collect()
    }

    #[test]
    fn create_assigns_distinct_ids() {
        let mut u = user(0);
        u.id = "client-chosen".into();

        let (repo, mut ids) = repo_with(3);
        let id = repo.create(u).unwrap();
        assert_ne!(id, "client-chosen");

        ids.push(id);
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 4);
    }

    #[test]
    fn pages() {
        let (repo, _) = repo_with(10);

        assert_eq!(
            names(&repo.list(1, 4).unwrap()),
            ["user0", "user1", "user2", "user3"]
        );
        assert_eq!(names(&repo.list(3, 4).unwrap()), ["user8", "user9"]);
        assert_eq!(repo.list(4, 4), Err(Error::PaginationOutOfRange));
        assert_eq!(repo.list(-1, -1).unwrap().len(), 10);
    }

    #[test]
    fn non_positive_page_or_limit() {
        let (repo, _) = repo_with(3);

        assert_eq!(repo.list(0, 2), Err(Error::PaginationOutOfRange));
        assert_eq!(repo.list(1, 0), Err(Error::PaginationOutOfRange));
        assert_eq!(repo.list(-1, 2), Err(Error::PaginationOutOfRange));
        assert_eq!(repo.list(1, -1), Err(Error::PaginationOutOfRange));
    }

    #[test]
    fn first_page_of_nothing() {
        let (repo, _) = repo_with(0);

        assert_eq!(repo.list(1, 4), Err(Error::PaginationOutOfRange));
        assert_eq!(repo.list(-1, -1), Ok(vec![]));
    }

    #[test]
    fn huge_page() {
        let (repo, _) = repo_with(3);

        assert_eq!(
            repo.list(i32::MAX, i32::MAX),
            Err(Error::PaginationOutOfRange)
        );
        assert_eq!(repo.list(1, i32::MAX).unwrap().len(), 3);
    }

    #[test]
    fn update_and_delete_missing() {
        let (repo, _) = repo_with(1);
        let mut ghost = user(9);
        ghost.id = "ghost".into();

        assert_eq!(repo.update(ghost), Err(Error::NotFound));
        assert_eq!(repo.delete("ghost"), Err(Error::NotFound));
        assert_eq!(repo.get_by_id("ghost"), Err(Error::NotFound));
        assert_eq!(repo.list(-1, -1).unwrap().len(), 1);
    }

    #[test]
    fn update_replaces_in_place() {
        let (repo, ids) = repo_with(3);

        let mut changed = user(7);
        changed.id = ids[1].clone();
        changed.admin = true;

        assert_eq!(repo.update(changed.clone()), Ok(changed.clone()));
        assert_eq!(repo.get_by_id(&ids[1]), Ok(changed));
        assert_eq!(
            names(&repo.list(-1, -1).unwrap()),
            ["user0", "user7", "user2"]
        );
    }

    #[test]
    fn delete_removes_one() {
        let (repo, ids) = repo_with(3);

        repo.delete(&ids[0]).unwrap();

        assert_eq!(names(&repo.list(-1, -1).unwrap()), ["user1", "user2"]);
    }
}
