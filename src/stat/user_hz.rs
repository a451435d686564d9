use std::{fmt, str::FromStr};

/// a count of clock ticks since boot, in units of `USER_HZ`.
#[derive(Clone, Copy, Debug, Default, Eq, Ord, PartialEq, PartialOrd)]
pub struct UserHz(u64);

// === impl UserHz ===

impl UserHz {
    pub const ZERO: Self = Self(0);

    pub const fn new(ticks: u64) -> Self {
        Self(ticks)
    }

    pub const fn get(self) -> u64 {
        let Self(ticks) = self;
        ticks
    }

    /// subtracts `rhs`, returning `None` if the counter went backwards.
    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        let (Self(lhs), Self(rhs)) = (self, rhs);
        lhs.checked_sub(rhs).map(Self)
    }

    /// adds `rhs`, returning `None` if the sum does not fit in 64 bits.
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        let (Self(lhs), Self(rhs)) = (self, rhs);
        lhs.checked_add(rhs).map(Self)
    }

    pub fn saturating_add(self, rhs: Self) -> Self {
        let (Self(lhs), Self(rhs)) = (self, rhs);
        Self(lhs.saturating_add(rhs))
    }

    /// converts this count into a float, for ratio arithmetic.
    pub fn as_f64(self) -> f64 {
        let Self(ticks) = self;
        ticks as f64
    }
}

impl FromStr for UserHz {
    type Err = <u64 as FromStr>::Err;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

impl fmt::Display for UserHz {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self(ticks) = self;
        write!(f, "{ticks}")
    }
}
