use log::{error, info, warn};
use parking_lot::Mutex;

use crate::error::{Error, Field, Result};
use crate::password::Hasher;
use crate::repository::Repository;
use crate::user::{User, UserFields};
use crate::validation;

/// Business rules on top of the repository: field validation, uniqueness and
/// password hashing.
pub struct UserService {
    repository: Repository,
    hasher: Hasher,
    // held across the duplicate scan and the insert in `new_user`
    create_lock: Mutex<()>,
}

impl UserService {
    pub fn new(repository: Repository, hasher: Hasher) -> Self {
        Self {
            repository,
            hasher,
            create_lock: Mutex::new(()),
        }
    }

    pub fn new_user(&self, fields: UserFields) -> Result<String> {
        validate(&fields)?;

        let password = self.hasher.hash(&fields.password)?;
        let user = UserFields { password, ..fields }.into_user(String::new());

        let _guard = self.create_lock.lock();

        let taken = self
            .repository
            .list(-1, -1)?
            .iter()
            .any(|u| u.username == user.username || u.email == user.email);
        if taken {
            warn!("rejecting duplicate user {} <{}>", user.username, user.email);
            return Err(Error::NotUnique);
        }

        let username = user.username.clone();
        let id = self.repository.create(user).map_err(|e| {
            error!("couldn't create user {username}: {e}");
            e
        })?;

        info!("{username} created with id {id}");
        Ok(id)
    }

    pub fn get_users(&self, page: i32, limit: i32) -> Result<Vec<User>> {
        self.repository.list(page, limit).map_err(|e| {
            warn!("couldn't list users (page {page}, limit {limit}): {e}");
            e
        })
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<User> {
        self.repository.get_by_id(id)
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<User> {
        self.repository
            .list(-1, -1)?
            .into_iter()
            .find(|u| u.username == username)
            .ok_or(Error::NotFound)
    }

    /// Replaces every field of user `id`. Unlike `new_user`, this doesn't check
    /// the new username or email against other users.
    pub fn update_user(&self, id: &str, fields: UserFields) -> Result<User> {
        validate(&fields)?;

        let password = self.hasher.hash(&fields.password)?;
        let user = UserFields { password, ..fields }.into_user(id.into());

        let user = self.repository.update(user)?;
        info!("{} updated", user.username);

        Ok(user)
    }

    pub fn delete_user(&self, id: &str) -> Result<()> {
        self.repository.delete(id)?;
        info!("user {id} deleted");

        Ok(())
    }

    pub fn verify_password(&self, user: &User, plain: &str) -> bool {
        self.hasher.verify(plain, &user.password)
    }
}

fn validate(fields: &UserFields) -> Result<()> {
    let checks = [
        (validation::is_valid_email(&fields.email), Field::Email),
        (validation::is_valid_password(&fields.password), Field::Password),
        (validation::is_valid_username(&fields.username), Field::Username),
    ];

    match checks.into_iter().find(|(ok, _)| !ok) {
        Some((_, field)) => Err(Error::ValidationFailed(field)),
        None => Ok(()),
    }
}
