//! Account-code topology
//!
//! The chart of accounts encodes its hierarchy in the code itself: codes grow
//! in paired-digit groups (class, group, account, subaccount) up to 6 digits,
//! then in 2-digit increments beyond that. Odd-length codes are auxiliary and
//! fall back to dropping the last character.

/// Resolve the parent code of an account code, or `None` for a root.
///
/// Pure and total: it never consults other records and never panics,
/// whatever the input string is.
///
/// | length            | parent          |
/// |-------------------|-----------------|
/// | 0 or 1            | none (root)     |
/// | 2                 | first 1 digit   |
/// | 4                 | first 2 digits  |
/// | 6                 | first 4 digits  |
/// | even, 8 or more   | drop last 2     |
/// | odd               | drop last 1     |
pub fn parent_of(code: &str) -> Option<&str> {
    let len = code.len();
    if len <= 1 {
        return None;
    }
    let cut = match len {
        2 => 1,
        4 => 2,
        6 => 4,
        n if n % 2 == 0 => n - 2,
        n => n - 1,
    };
    // get() keeps this total even for non-ASCII input
    code.get(0..cut)
}

// ==================== Tests ====================
