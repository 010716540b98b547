use core::convert::identity as id;
use core::fmt;

/// Cumulative experience points. Never negative, monotone under accrual.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Exp(pub u64);

impl Exp {
    pub fn to_i64(self) -> i64 {
        let Exp(exp) = self;
        #[allow(clippy::cast_possible_wrap)]
        let exp = id::<u64>(exp) as i64;
        exp
    }

    pub fn from_i64(exp: i64) -> Self {
        debug_assert!(exp >= 0);
        #[allow(clippy::cast_sign_loss)]
        let exp: u64 = id::<i64>(exp) as u64;
        Exp(exp)
    }

    #[must_use]
    pub fn saturating_add(self, delta: u64) -> Self {
        Exp(self.0.saturating_add(delta))
    }
}

impl fmt::Display for Exp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
