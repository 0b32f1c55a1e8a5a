use std::str::FromStr;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::{error, trace};

use crate::error::Error;

/// Every operation the directory serves.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Operation {
    NewUser,
    GetUsers,
    GetUserById,
    GetUserByUsername,
    UpdateUser,
    DeleteUser,
}

/// Operations that need admin credentials.
const PRIVILEGED: [Operation; 3] = [
    Operation::NewUser,
    Operation::UpdateUser,
    Operation::DeleteUser,
];

impl Operation {
    pub fn is_privileged(self) -> bool {
        PRIVILEGED.contains(&self)
    }
}

/// Unverified credentials from a basic-auth header. They are only checked
/// against the stored hash by `Directory::login`.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    user: String,
    pass: String,
}

impl FromStr for Credentials {
    type Err = &'static str;

    fn from_str(header: &str) -> Result<Self, Self::Err> {
        let (basic, auth_b64) = header
            .trim()
            .split_once(' ')
            .ok_or("no space in auth header")?;

        if !basic.eq_ignore_ascii_case("basic") {
            return Err("only basic auth supported");
        }

        let auth_bytes = STANDARD.decode(auth_b64.trim()).map_err(|e| {
            error!("invalid base64 in auth header: {e}");
            "invalid base64 in auth header"
        })?;
        let auth = String::from_utf8(auth_bytes).map_err(|e| {
            error!("invalid utf-8 for password: {e:?}");
            "non-utf8 in auth header"
        })?;

        let (user, pass) = auth.split_once(':').ok_or("no colon in auth value")?;

        Ok(Self {
            user: user.into(),
            pass: pass.into(),
        })
    }
}

impl Credentials {
    #[cfg(test)]
    pub fn new(user: impl Into<String>, pass: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            pass: pass.into(),
        }
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn pass(&self) -> &str {
        &self.pass
    }
}

// keep passwords out of logs
impl std::fmt::Debug for Credentials {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fmt.debug_struct("Credentials")
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

/// The gate in front of every operation. Unprivileged operations pass with no
/// credentials; privileged ones need a well-formed basic-auth header.
pub fn authorize(op: Operation, header: Option<&str>) -> Result<Option<Credentials>, Error> {
    if !op.is_privileged() {
        return Ok(None);
    }

    let header = header.ok_or_else(|| {
        error!("{op:?}: no authorization header");
        Error::PermissionDenied
    })?;

    let creds = header.parse::<Credentials>().map_err(|e| {
        error!("{op:?}: bad authorization header: {e}");
        Error::PermissionDenied
    })?;

    trace!("{op:?} requested by {}", creds.user());
    Ok(Some(creds))
}
