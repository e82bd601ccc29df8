use serde::{Deserialize, Serialize};

/// XP needed to go from level 1 to level 2.
pub const BASE_THRESHOLD: u64 = 50;

//
// ─── LEVEL STATE ───────────────────────────────────────────────────────────────
//

/// Where a cumulative XP total lands on the level curve.
///
/// # Fields
///
/// * `level` - current level, starting at 1
/// * `xp_into_level` - XP earned since reaching `level`
/// * `xp_to_next_level` - size of the current level's threshold
///
/// # Examples
///
/// ```
/// # use quest_core::leveling::compute_level;
/// let state = compute_level(125);
/// assert_eq!(state.level, 3);
/// assert_eq!(state.xp_into_level, 0);
/// assert_eq!(state.xp_to_next_level, 112);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelState {
    pub level: u32,
    pub xp_into_level: u64,
    pub xp_to_next_level: u64,
}

impl LevelState {
    /// Whole-percent fill of the current level, floored.
    #[must_use]
    pub fn percent(&self) -> u8 {
        if self.xp_to_next_level == 0 {
            return 0;
        }
        let pct = u128::from(self.xp_into_level) * 100 / u128::from(self.xp_to_next_level);
        u8::try_from(pct.min(100)).unwrap_or(100)
    }
}

//
// ─── LEVEL CURVE ───────────────────────────────────────────────────────────────
//

/// Map cumulative XP to a level.
///
/// Each level-up consumes the current threshold, and the next threshold is
/// `floor(threshold * 1.5)`, starting from [`BASE_THRESHOLD`].
#[must_use]
pub fn compute_level(xp: u64) -> LevelState {
    let mut level: u32 = 1;
    let mut threshold = BASE_THRESHOLD;
    let mut remaining = xp;

    while remaining >= threshold {
        level = level.saturating_add(1);
        remaining -= threshold;
        // floor(t * 1.5) without going through floats
        threshold = threshold.saturating_add(threshold / 2);
    }

    LevelState {
        level,
        xp_into_level: remaining,
        xp_to_next_level: threshold,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triple(xp: u64) -> (u32, u64, u64) {
        let s = compute_level(xp);
        (s.level, s.xp_into_level, s.xp_to_next_level)
    }

    #[test]
    fn level_boundaries() {
        assert_eq!(triple(0), (1, 0, 50));
        assert_eq!(triple(49), (1, 49, 50));
        assert_eq!(triple(50), (2, 0, 75));
        assert_eq!(triple(124), (2, 74, 75));
        assert_eq!(triple(125), (3, 0, 112));
    }

    #[test]
    fn thresholds_follow_floored_growth() {
        // 50 + 75 + 112 + 168
        assert_eq!(triple(405), (5, 0, 252));
    }

    #[test]
    fn percent_is_floored() {
        assert_eq!(compute_level(0).percent(), 0);
        assert_eq!(compute_level(49).percent(), 98);
        // 30 of 75
        assert_eq!(compute_level(80).percent(), 40);
    }

    #[test]
    fn huge_xp_terminates() {
        let state = compute_level(u64::MAX);
        assert!(state.level > 1);
        assert!(state.xp_into_level < state.xp_to_next_level);
    }

    #[test]
    fn deterministic_for_same_input() {
        assert_eq!(compute_level(1234), compute_level(1234));
    }
}
