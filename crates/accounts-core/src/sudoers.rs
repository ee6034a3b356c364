//! Derivation of the synthetic `gce-sudoers` group.
//!
//! This group never appears in the upstream roster; it is assembled on read
//! from each cached user's `sudoer` flag. If upstream ever returns a group
//! literally named `gce-sudoers`, that record is still stored in the index
//! (so `Groups()` enumeration includes it once, verbatim) but is shadowed by
//! this synthetic view whenever the reserved name or gid is queried — see
//! `Index::swap_in`'s warning log for that case.

use crate::model::{CachedUser, Group};

/// Reserved name for the synthetic group.
pub const NAME: &str = "gce-sudoers";

/// Reserved gid for the synthetic group.
pub const GID: u32 = 4001;

/// Builds the synthetic sudoers group from the current sudoer flags.
/// Membership order is unspecified but stable within a single call.
pub fn compute<'a>(cached_users: impl Iterator<Item = &'a CachedUser>) -> Group {
    let members: Vec<String> = cached_users
        .filter(|cached| cached.sudoer)
        .map(|cached| cached.user.name.clone())
        .collect();

    Group {
        name: NAME.to_string(),
        gid: GID,
        members,
    }
}
