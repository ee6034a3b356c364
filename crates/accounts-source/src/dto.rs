//! Wire DTOs for the upstream REST API, and their conversion into the
//! engine's [`accounts_core`] model types.

use accounts_core::{Group, User};
use serde::Deserialize;

/// `GET /v1/instances/{instance}/roster` response body.
#[derive(Debug, Deserialize)]
pub struct RosterDto {
    /// The instance's users.
    pub users: Vec<UserDto>,
    /// The instance's groups.
    #[serde(default)]
    pub groups: Vec<GroupDto>,
}

/// One user as returned by the roster endpoint.
#[derive(Debug, Deserialize)]
pub struct UserDto {
    /// Login name.
    pub name: String,
    /// Numeric user id.
    pub uid: u32,
    /// Primary numeric group id.
    pub gid: u32,
    /// GECOS comment field; absent upstream is treated as empty.
    #[serde(default)]
    pub gecos: String,
    /// Home directory path.
    pub home: String,
    /// Login shell path.
    pub shell: String,
}

impl From<UserDto> for User {
    fn from(dto: UserDto) -> Self {
        User {
            name: dto.name,
            uid: dto.uid,
            gid: dto.gid,
            gecos: dto.gecos,
            home: dto.home,
            shell: dto.shell,
        }
    }
}

/// One group as returned by the roster endpoint.
#[derive(Debug, Deserialize)]
pub struct GroupDto {
    /// Group name.
    pub name: String,
    /// Numeric group id.
    pub gid: u32,
    /// Member login names; absent upstream is treated as empty.
    #[serde(default)]
    pub members: Vec<String>,
}

impl From<GroupDto> for Group {
    fn from(dto: GroupDto) -> Self {
        Group { name: dto.name, gid: dto.gid, members: dto.members }
    }
}

/// `GET /v1/instances/{instance}/users/{name}/keys` response body.
#[derive(Debug, Deserialize)]
pub struct KeysDto {
    /// Authorized keys, one entry per key line.
    #[serde(default)]
    pub keys: Vec<String>,
    /// Whether this user should appear in the synthetic sudoers group.
    #[serde(default)]
    pub sudoer: bool,
}
