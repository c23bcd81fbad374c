//! Cadre strength and ammunition counts.

use std::sync::LazyLock;

use regex::Regex;

/// Cadre patterns in priority order. Each yields a `(min, max)` pair.
/// Counts are capped at three digits so a year ahead of "cadres" is not read
/// as a headcount.
static CADRE_PATTERNS: LazyLock<[Regex; 4]> = LazyLock::new(|| {
    [
        // explicit range: "gp of 8/10 cadres", "5-7 militants"
        r"(?i)\b(\d{1,3})\s*(?:/|-|to)\s*(\d{1,3})\s*(?:x\s*)?(?:cadres?|militants?)\b",
        // approximate: "approx 20 x"
        r"(?i)\bapprox(?:imately|\.)?\s*(\d{1,3})\s*x\b",
        // counted: "12 x cadres"
        r"(?i)\b(\d{1,3})\s*x\s*(?:cadres?|militants?)\b",
        // bare, with an optional group word: "2 NSCN(IM) cadres"
        r"(?i)\b(\d{1,3})\s+(?:[a-z][\w()/\-]*\s+)?(?:cadres?|militants?)\b",
    ]
    .map(|p| Regex::new(p).expect("valid regex"))
});

static AMMUNITION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,5})\s*x\s*(?:rpg\s*)?(?:rounds?|rds)\b").expect("valid regex")
});

/// Reported cadre strength as `(min, max)`.
///
/// Every pattern is scanned and the candidate with the largest upper bound
/// wins; on a tie the higher-priority pattern is kept. A range written high
/// to low is normalised so that `min <= max`.
pub fn cadre_strength(text: &str) -> Option<(u32, u32)> {
    let mut best: Option<(u32, u32)> = None;
    for re in CADRE_PATTERNS.iter() {
        for caps in re.captures_iter(text) {
            let Some(first) = caps.get(1).and_then(|m| m.as_str().parse::<u32>().ok()) else {
                continue;
            };
            let second = caps
                .get(2)
                .and_then(|m| m.as_str().parse::<u32>().ok())
                .unwrap_or(first);
            let candidate = (first.min(second), first.max(second));
            if best.map_or(true, |(_, max)| candidate.1 > max) {
                best = Some(candidate);
            }
        }
    }
    best
}

/// Largest `<N> x rounds` figure in the text.
pub fn ammunition(text: &str) -> Option<u32> {
    AMMUNITION
        .captures_iter(text)
        .filter_map(|c| c[1].parse::<u32>().ok())
        .max()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_count_with_group_word() {
        assert_eq!(cadre_strength("apprehended 2 NSCN(IM) cadres near Mon"), Some((2, 2)));
        assert_eq!(cadre_strength("3 militants fled"), Some((3, 3)));
    }

    #[test]
    fn explicit_range() {
        assert_eq!(cadre_strength("a gp of 8/10 cadres"), Some((8, 10)));
        assert_eq!(cadre_strength("10-6 cadres"), Some((6, 10)));
    }

    #[test]
    fn approximate_and_counted() {
        assert_eq!(cadre_strength("approx 20 x ULFA seen"), Some((20, 20)));
        assert_eq!(cadre_strength("12 x cadres moved"), Some((12, 12)));
    }

    #[test]
    fn largest_upper_bound_wins() {
        let text = "a gp of 4/6 cadres, later joined by 15 cadres";
        assert_eq!(cadre_strength(text), Some((15, 15)));
    }

    #[test]
    fn range_beats_bare_count_on_tie() {
        assert_eq!(cadre_strength("5/10 cadres"), Some((5, 10)));
    }

    #[test]
    fn year_before_cadres_is_not_a_count() {
        let text = "On 15 Jan 2024 cadres of NSCN(IM), a gp of 2 cadres, were seen near Mon";
        assert_eq!(cadre_strength(text), Some((2, 2)));
        assert_eq!(cadre_strength("in 2023 militants regrouped"), None);
    }

    #[test]
    fn no_count_is_none() {
        assert_eq!(cadre_strength("cadres seen near the camp"), None);
        assert_eq!(cadre_strength("On 15-Jan-24, troops moved"), None);
    }

    #[test]
    fn ammunition_takes_max() {
        assert_eq!(ammunition("fired 3 x rds and later 12 x rounds"), Some(12));
        assert_eq!(ammunition("2 x RPG rounds fired"), Some(2));
        assert_eq!(ammunition("2 x cadres"), None);
    }
}
