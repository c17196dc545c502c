//! Mailgun event type flags.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};

/// A set of Mailgun event types.
///
/// Members are combined with `|` and always enumerate in declared order:
/// accepted, rejected, delivered, failed, opened, clicked, unsubscribed,
/// complained, stored. The [`Display`](fmt::Display) form is the filter
/// expression accepted by the events API, e.g. `"failed OR unsubscribed"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct EventType(u16);

impl EventType {
    /// Empty set.
    pub const NONE: Self = Self(0);
    /// `accepted` events.
    pub const ACCEPTED: Self = Self(1);
    /// `rejected` events.
    pub const REJECTED: Self = Self(1 << 1);
    /// `delivered` events.
    pub const DELIVERED: Self = Self(1 << 2);
    /// `failed` events.
    pub const FAILED: Self = Self(1 << 3);
    /// `opened` events.
    pub const OPENED: Self = Self(1 << 4);
    /// `clicked` events.
    pub const CLICKED: Self = Self(1 << 5);
    /// `unsubscribed` events.
    pub const UNSUBSCRIBED: Self = Self(1 << 6);
    /// `complained` events.
    pub const COMPLAINED: Self = Self(1 << 7);
    /// `stored` events.
    pub const STORED: Self = Self(1 << 8);

    const NAMED: [(Self, &'static str); 9] = [
        (Self::ACCEPTED, "accepted"),
        (Self::REJECTED, "rejected"),
        (Self::DELIVERED, "delivered"),
        (Self::FAILED, "failed"),
        (Self::OPENED, "opened"),
        (Self::CLICKED, "clicked"),
        (Self::UNSUBSCRIBED, "unsubscribed"),
        (Self::COMPLAINED, "complained"),
        (Self::STORED, "stored"),
    ];

    /// Raw bit representation.
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Returns `true` if no event type is set.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if every flag in `other` is also set in `self`.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Lower-case names of the set members, in declared order.
    pub fn names(self) -> impl Iterator<Item = &'static str> {
        Self::NAMED
            .into_iter()
            .filter(move |(flag, _)| self.contains(*flag))
            .map(|(_, name)| name)
    }
}

impl BitOr for EventType {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for EventType {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for EventType {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, name) in self.names().enumerate() {
            if i > 0 {
                f.write_str(" OR ")?;
            }
            f.write_str(name)?;
        }
        Ok(())
    }
}
