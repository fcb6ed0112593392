//! Config-change flags pushed to the host.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Which themed subsystems changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigChangeFlags(u32);

impl ConfigChangeFlags {
    pub const NONE: Self = Self(0);
    pub const LAUNCHER: Self = Self(1 << 0);
    pub const ICON: Self = Self(1 << 1);
    pub const FRAMEWORK: Self = Self(1 << 2);
    pub const STATUS_BAR: Self = Self(1 << 3);
    pub const MMS: Self = Self(1 << 4);
    /// Everything a full theme touches.
    pub const SYSTEM_INTEREST: Self =
        Self(Self::LAUNCHER.0 | Self::ICON.0 | Self::FRAMEWORK.0 | Self::STATUS_BAR.0 | Self::MMS.0);

    /// Changes that require the launcher to be restarted.
    pub const RESTARTS_LAUNCHER: Self =
        Self(Self::LAUNCHER.0 | Self::ICON.0 | Self::FRAMEWORK.0);

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn from_bits_truncate(bits: u32) -> Self {
        Self(bits & Self::SYSTEM_INTEREST.0)
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Whether a change with these flags needs a launcher restart.
    pub const fn restarts_launcher(self) -> bool {
        self.intersects(Self::RESTARTS_LAUNCHER)
    }
}

impl BitOr for ConfigChangeFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for ConfigChangeFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for ConfigChangeFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::SYSTEM_INTEREST {
            return f.write_str("all");
        }
        let names = [
            (Self::LAUNCHER, "launcher"),
            (Self::ICON, "icon"),
            (Self::FRAMEWORK, "framework"),
            (Self::STATUS_BAR, "status-bar"),
            (Self::MMS, "mms"),
        ];
        let set: Vec<&str> = names
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        if set.is_empty() {
            f.write_str("none")
        } else {
            f.write_str(&set.join("|"))
        }
    }
}
