use serde::{Deserialize, Serialize};

/// A stored user. `password` always holds a password hash, never the
/// plaintext a client sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub admin: bool,
}

/// The client-supplied fields of a user, as received on create and update.
/// `password` is plaintext here.
#[derive(Debug, Clone, Deserialize)]
pub struct UserFields {
    pub email: String,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub admin: bool,
}

/// A user as shown to clients.
#[derive(Debug, Serialize)]
pub struct UserView {
    pub id: String,
    pub email: String,
    pub username: String,
    pub admin: bool,
}

impl UserFields {
    pub fn into_user(self, id: String) -> User {
        let Self {
            email,
            username,
            password,
            admin,
        } = self;

        User {
            id,
            email,
            username,
            password,
            admin,
        }
    }
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
            admin: user.admin,
        }
    }
}
