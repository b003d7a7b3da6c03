use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Declares a numeric directory identifier.
///
/// Identifiers serialize as plain integers, which `serde_json` quotes
/// automatically when they are used as map keys.
macro_rules! directory_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse().map(Self)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

directory_id!(
    /// Identifier of a guild (the directory scope every other id lives in).
    GuildId
);
directory_id!(
    /// Identifier of a role, unique within its guild.
    RoleId
);
directory_id!(
    /// Identifier of a guild member.
    MemberId
);
directory_id!(
    /// Identifier of a text channel.
    ChannelId
);
