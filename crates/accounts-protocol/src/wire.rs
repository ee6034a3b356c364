//! Record line encoding/decoding shared by the `users`/`groups`/`group_by_*`
//! responses.

use accounts_core::{Group, User};

use crate::error::ProtocolError;

/// Renders a user record line: `name:uid:gid:gecos:home:shell`.
#[must_use]
pub fn encode_user(user: &User) -> String {
    format!(
        "{}:{}:{}:{}:{}:{}",
        user.name, user.uid, user.gid, user.gecos, user.home, user.shell
    )
}

/// Parses a user record line produced by [`encode_user`].
pub fn decode_user(line: &str) -> Result<User, ProtocolError> {
    let mut fields = line.splitn(6, ':');
    let mut next = || fields.next().ok_or_else(|| ProtocolError::Malformed(format!("short user line: {line:?}")));

    let name = next()?.to_string();
    let uid = next()?
        .parse()
        .map_err(|_| ProtocolError::Malformed(format!("bad uid in user line: {line:?}")))?;
    let gid = next()?
        .parse()
        .map_err(|_| ProtocolError::Malformed(format!("bad gid in user line: {line:?}")))?;
    let gecos = next()?.to_string();
    let home = next()?.to_string();
    let shell = next()?.to_string();

    Ok(User { name, uid, gid, gecos, home, shell })
}

/// Renders a group record line: `name:gid:member1,member2,…`. An empty
/// member list renders as an empty final field.
#[must_use]
pub fn encode_group(group: &Group) -> String {
    format!("{}:{}:{}", group.name, group.gid, group.members.join(","))
}

/// Parses a group record line produced by [`encode_group`].
pub fn decode_group(line: &str) -> Result<Group, ProtocolError> {
    let mut fields = line.splitn(3, ':');
    let mut next = || fields.next().ok_or_else(|| ProtocolError::Malformed(format!("short group line: {line:?}")));

    let name = next()?.to_string();
    let gid = next()?
        .parse()
        .map_err(|_| ProtocolError::Malformed(format!("bad gid in group line: {line:?}")))?;
    let members_field = next()?;
    let members = if members_field.is_empty() {
        Vec::new()
    } else {
        members_field.split(',').map(str::to_string).collect()
    };

    Ok(Group { name, gid, members })
}
