//! Load-time options for [`StaticTable`](crate::table::StaticTable)

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Independent option bits applied while loading a table
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadFlags(u32);

impl LoadFlags {
    pub const NONE: Self = Self(0);
    /// Drop data rows whose every field is empty
    pub const PRUNE_EMPTY_ROWS: Self = Self(1 << 0);
    /// Drop data rows whose first field starts with `#`
    pub const PRUNE_COMMENT_ROWS: Self = Self(1 << 1);
    /// Drop columns whose header name is empty
    pub const PRUNE_EMPTY_COLUMNS: Self = Self(1 << 2);
    /// The file has no header; synthesize a single `name` column
    pub const HEADERLESS_SINGLE_FIELD: Self = Self(1 << 3);

    pub const DEFAULT: Self = Self(Self::PRUNE_EMPTY_ROWS.0 | Self::PRUNE_COMMENT_ROWS.0);

    const ALL: u32 = 0b1111;

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn from_bits_truncate(bits: u32) -> Self {
        Self(bits & Self::ALL)
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }
}

impl Default for LoadFlags {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl BitOr for LoadFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for LoadFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for LoadFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(LoadFlags, &str); 4] = [
            (LoadFlags::PRUNE_EMPTY_ROWS, "PRUNE_EMPTY_ROWS"),
            (LoadFlags::PRUNE_COMMENT_ROWS, "PRUNE_COMMENT_ROWS"),
            (LoadFlags::PRUNE_EMPTY_COLUMNS, "PRUNE_EMPTY_COLUMNS"),
            (LoadFlags::HEADERLESS_SINGLE_FIELD, "HEADERLESS_SINGLE_FIELD"),
        ];

        let set: Vec<&str> = NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        if set.is_empty() {
            write!(f, "LoadFlags(NONE)")
        } else {
            write!(f, "LoadFlags({})", set.join(" | "))
        }
    }
}
