use std::sync::Arc;

use log::{error, info, trace};

use crate::auth::Credentials;
use crate::error::{Error, Result};
use crate::service::UserService;
use crate::user::{User, UserFields};

pub struct Directory(UserService);

/// A caller whose password has been checked. `ADMIN` is set once their admin
/// flag has been checked too, and only then are the write operations
/// available.
pub struct DirectoryAuthed<const ADMIN: bool = false> {
    dir: Arc<Directory>,
    caller: User,
}

impl Directory {
    pub fn new(service: UserService) -> Self {
        Self(service)
    }

    pub fn login(self: &Arc<Self>, creds: &Credentials) -> Result<DirectoryAuthed> {
        let username = creds.user();

        let caller = self.0.get_user_by_username(username).map_err(|e| {
            error!("rejecting login for {username}: {e}");
            Error::PermissionDenied
        })?;

        if !self.0.verify_password(&caller, creds.pass()) {
            error!("wrong password for user {username}");
            return Err(Error::PermissionDenied);
        }

        trace!("{username} logged in");
        Ok(DirectoryAuthed {
            dir: Arc::clone(self),
            caller,
        })
    }

    pub fn users(&self, page: i32, limit: i32) -> Result<Vec<User>> {
        self.0.get_users(page, limit)
    }

    pub fn user_by_id(&self, id: &str) -> Result<User> {
        self.0.get_user_by_id(id)
    }

    pub fn user_by_username(&self, username: &str) -> Result<User> {
        self.0.get_user_by_username(username)
    }
}

impl DirectoryAuthed {
    pub fn admin(self) -> Result<DirectoryAuthed<true>> {
        if !self.caller.admin {
            error!("{} isn't an admin", self.caller.username);
            return Err(Error::PermissionDenied);
        }

        Ok(DirectoryAuthed {
            dir: self.dir,
            caller: self.caller,
        })
    }
}

impl DirectoryAuthed<true> {
    pub fn new_user(&self, fields: UserFields) -> Result<String> {
        info!("{} creating user {}", self.caller.username, fields.username);
        self.dir.0.new_user(fields)
    }

    pub fn update_user(&self, id: &str, fields: UserFields) -> Result<User> {
        info!("{} updating user {id}", self.caller.username);
        self.dir.0.update_user(id, fields)
    }

    pub fn delete_user(&self, id: &str) -> Result<()> {
        if self.caller.id == id {
            error!("{} tried to delete themselves", self.caller.username);
            return Err(Error::SelfDeleteForbidden);
        }

        info!("{} deleting user {id}", self.caller.username);
        self.dir.0.delete_user(id)
    }
}
