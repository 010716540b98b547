use core::fmt;

/// Discord-style guild (server) identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GuildId(pub u64);

/// Discord-style user identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UserId(pub u64);

/// Primary key of everything the core tracks: one row per guild member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UserKey {
    pub guild: GuildId,
    pub user: UserId,
}

impl UserKey {
    pub fn new(guild: GuildId, user: UserId) -> Self {
        Self { guild, user }
    }
}

impl fmt::Display for UserKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.guild.0, self.user.0)
    }
}

/// Ids are stored as `INTEGER`, so they cross the boundary as `i64`
/// with the bit pattern preserved.
macro_rules! i64_from_id {
    ($id:expr) => {{
        let id: u64 = $id.0;
        let id: i64 = ::core::convert::identity::<u64>(id) as i64;
        id
    }};
}

macro_rules! id_from_i64 {
    ($id:expr) => {{
        let id: i64 = $id;
        #[allow(clippy::cast_sign_loss)]
        let id: u64 = ::core::convert::identity::<i64>(id) as u64;
        id
    }};
}

// Exporting the macros
// https://stackoverflow.com/questions/26731243/how-do-i-use-a-macro-across-module-files/67140319#67140319
pub(crate) use i64_from_id;
pub(crate) use id_from_i64;
