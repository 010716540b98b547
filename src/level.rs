//! Pure level math on top of [`LevelFormula`].

use crate::config::LevelFormula;
use crate::exp::Exp;

impl LevelFormula {
    /// `floor(sqrt(xp / k))`. Monotone non-decreasing in `xp`, and 0 at 0.
    pub fn level_for(&self, exp: Exp) -> u32 {
        #[allow(clippy::cast_precision_loss)]
        let xp = exp.0 as f64;
        // k is validated finite and positive, so the quotient is >= 0.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let level = (xp / self.k).sqrt().floor() as u32;
        level
    }

    /// Smallest XP total that reaches `level`; inverse of [`Self::level_for`].
    ///
    /// External collaborators use this for progress-bar display:
    /// `xp_for_level(current + 1) - xp` is the XP still missing.
    pub fn xp_for_level(&self, level: u32) -> Exp {
        let need = self.k * f64::from(level) * f64::from(level);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let need = need.ceil() as u64;
        Exp(need)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FORMULA: LevelFormula = LevelFormula { k: 100.0 };

    #[test]
    fn level_zero_at_zero_xp() {
        assert_eq!(FORMULA.level_for(Exp(0)), 0);
    }

    #[test]
    fn known_breakpoints() {
        assert_eq!(FORMULA.level_for(Exp(99)), 0);
        assert_eq!(FORMULA.level_for(Exp(100)), 1);
        assert_eq!(FORMULA.level_for(Exp(399)), 1);
        assert_eq!(FORMULA.level_for(Exp(400)), 2);
        assert_eq!(FORMULA.level_for(Exp(10_000)), 10);
    }

    #[test]
    fn monotone_non_decreasing() {
        let mut last = 0;
        for xp in 0..5_000 {
            let level = FORMULA.level_for(Exp(xp));
            assert!(level >= last, "level dropped at xp={xp}");
            last = level;
        }
    }

    #[test]
    fn xp_for_level_is_the_inverse() {
        for level in 0..200 {
            let need = FORMULA.xp_for_level(level);
            assert_eq!(FORMULA.level_for(need), level);
            if level > 0 {
                assert_eq!(FORMULA.level_for(Exp(need.0 - 1)), level - 1);
            }
        }
    }

    #[test]
    fn fractional_k_still_inverts() {
        let formula = LevelFormula { k: 33.7 };
        for level in 0..100 {
            assert_eq!(formula.level_for(formula.xp_for_level(level)), level);
        }
    }
}
