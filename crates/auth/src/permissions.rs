use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Capability a user can be granted.
///
/// The set is closed and fixed at build time. Grants are global across the
/// whole catalog; there is no per-resource scoping.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Permission {
    Read,
    Add,
    Edit,
    Delete,
}

impl Permission {
    pub const ALL: [Permission; 4] = [
        Permission::Read,
        Permission::Add,
        Permission::Edit,
        Permission::Delete,
    ];

    /// Stable tag used in the association table and in logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Permission::Read => "Read",
            Permission::Add => "Add",
            Permission::Edit => "Edit",
            Permission::Delete => "Delete",
        }
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown permission tag '{0}'")]
pub struct UnknownPermission(pub String);

impl FromStr for Permission {
    type Err = UnknownPermission;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Permission::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownPermission(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_parse_case_insensitively() {
        assert_eq!("read".parse::<Permission>().unwrap(), Permission::Read);
        assert_eq!("DELETE".parse::<Permission>().unwrap(), Permission::Delete);
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let err = "Publish".parse::<Permission>().unwrap_err();
        assert_eq!(err.to_string(), "unknown permission tag 'Publish'");
    }
}
