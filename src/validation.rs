//! Shape checks for user fields. These are pure predicates; the service turns
//! a `false` into `Error::ValidationFailed`.

use std::sync::LazyLock;

use regex::Regex;

const USERNAME_MAX: usize = 20;
const PASSWORD_LETTERS: std::ops::RangeInclusive<usize> = 8..=64;

// Unicode general categories P* and S*
static PUNCT_OR_SYMBOL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\p{P}\p{S}]$").unwrap());

/// Accepts a mailbox: either `local@domain` or `Display Name <local@domain>`.
pub fn is_valid_email(s: &str) -> bool {
    let s = s.trim();

    match s.strip_suffix('>').and_then(|s| s.split_once('<')) {
        Some((name, addr)) => is_display_name(name.trim()) && is_addr_spec(addr),
        None => is_addr_spec(s),
    }
}

/// Letters, spaces and uppercase together must number 8 to 64, and at least
/// one digit, one uppercase letter and one punctuation or symbol character
/// must be present.
pub fn is_valid_password(s: &str) -> bool {
    let mut letters = 0;
    let (mut number, mut upper, mut special) = (false, false, false);

    for c in s.chars() {
        if c.is_numeric() {
            number = true;
        } else if c.is_uppercase() {
            upper = true;
            letters += 1;
        } else if is_punct_or_symbol(c) {
            special = true;
        } else if c.is_alphabetic() || c == ' ' {
            letters += 1;
        }
    }

    PASSWORD_LETTERS.contains(&letters) && number && upper && special
}

/// One to twenty characters, no `:` (it separates basic-auth credentials).
pub fn is_valid_username(s: &str) -> bool {
    let len = s.chars().count();

    (1..=USERNAME_MAX).contains(&len) && !s.contains(':')
}

fn is_punct_or_symbol(c: char) -> bool {
    PUNCT_OR_SYMBOL.is_match(c.encode_utf8(&mut [0; 4]))
}

fn is_addr_spec(s: &str) -> bool {
    let Some((local, domain)) = s.rsplit_once('@') else {
        return false;
    };

    let local_ok = if local.len() >= 2 && local.starts_with('"') && local.ends_with('"') {
        is_quoted_content(&local[1..local.len() - 1])
    } else {
        is_dot_atom(local)
    };

    let domain_ok = match domain.strip_prefix('[').and_then(|d| d.strip_suffix(']')) {
        Some(literal) => literal
            .chars()
            .all(|c| c.is_ascii_graphic() && !matches!(c, '[' | ']' | '\\')),
        None => is_dot_atom(domain),
    };

    local_ok && domain_ok
}

fn is_dot_atom(s: &str) -> bool {
    !s.is_empty() && s.split('.').all(|atom| !atom.is_empty() && atom.chars().all(is_atext))
}

fn is_quoted_content(s: &str) -> bool {
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if chars.next().is_none() {
                    return false;
                }
            }
            '"' => return false,
            c if c.is_control() && c != '\t' => return false,
            _ => {}
        }
    }

    true
}

fn is_display_name(s: &str) -> bool {
    if s.is_empty() {
        return true;
    }

    if s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
        return is_quoted_content(&s[1..s.len() - 1]);
    }

    // a phrase: whitespace-separated words of atext
    s.split_whitespace().all(|word| word.chars().all(|c| is_atext(c) || c == '.'))
}

// RFC 5322 atext, plus any non-ASCII character
fn is_atext(c: char) -> bool {
    c.is_ascii_alphanumeric() || "!#$%&'*+-/=?^_`{|}~".contains(c) || !c.is_ascii()
}
