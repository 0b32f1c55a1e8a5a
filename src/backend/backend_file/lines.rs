use std::io::{BufRead, BufReader, Read, Write};

use log::error;

use super::Error;
use crate::user::User;

/// One JSON user per line. Blank lines are skipped.
pub fn read(input: impl Read) -> Result<Vec<User>, Error> {
    let mut users = vec![];

    for (i, line) in BufReader::new(input).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let user = serde_json::from_str(&line).map_err(|e| {
            error!("couldn't parse user on line {}: {e}", i + 1);
            Error::Parse {
                line: i + 1,
                source: e,
            }
        })?;
        users.push(user);
    }

    Ok(users)
}

pub fn write<'u>(
    mut output: impl Write,
    users: impl IntoIterator<Item = &'u User>,
) -> Result<(), Error> {
    for user in users {
        serde_json::to_writer(&mut output, user)?;
        writeln!(output)?;
    }
    output.flush()?;
    Ok(())
}
