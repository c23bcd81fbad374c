//! Location fields: state and country, district, general area, coordinates.

use std::sync::LazyLock;

use regex::Regex;

use super::patterns::{compile_token, non_empty, truncate_chars, KeywordMatcher};
use super::tables::RuleTables;
use super::RuleError;

/// Cap for the free-text general area.
pub const MAX_GEN_AREA_CHARS: usize = 100;

/// State, district and abbreviation tables compiled into matchers.
#[derive(Debug, Clone)]
pub struct Gazetteer {
    states: Vec<(KeywordMatcher, String)>,
    abbreviations: Vec<(Regex, String)>,
    districts: Vec<KeywordMatcher>,
}

/// A resolved state and, when the table knows it, its country.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateMatch {
    pub state: String,
    pub country: Option<String>,
}

impl Gazetteer {
    pub fn compile(tables: &RuleTables) -> Result<Self, RuleError> {
        let states = tables
            .states
            .iter()
            .map(|e| -> Result<_, RuleError> {
                Ok((KeywordMatcher::compile(&e.state, &e.state, true)?, e.country.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let abbreviations = tables
            .state_abbreviations
            .iter()
            .map(|a| -> Result<_, RuleError> {
                if a.abbreviation.trim().is_empty() {
                    return Err(RuleError::EmptyKeyword(a.state.clone()));
                }
                Ok((compile_token(&a.abbreviation)?, a.state.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let districts = tables
            .districts
            .iter()
            .map(|d| KeywordMatcher::compile(d, d, true))
            .collect::<Result<Vec<_>, RuleError>>()?;

        Ok(Self {
            states,
            abbreviations,
            districts,
        })
    }

    /// First known state named in the text, in table order. Abbreviations
    /// are consulted only when no full name matches.
    pub fn state(&self, text: &str) -> Option<StateMatch> {
        if let Some((m, country)) = self.states.iter().find(|(m, _)| m.is_match(text)) {
            return Some(StateMatch {
                state: m.label.clone(),
                country: non_empty(country),
            });
        }
        let (_, state) = self.abbreviations.iter().find(|(re, _)| re.is_match(text))?;
        Some(StateMatch {
            state: state.clone(),
            country: self.country_of(state),
        })
    }

    fn country_of(&self, state: &str) -> Option<String> {
        self.states
            .iter()
            .find(|(m, _)| m.label.eq_ignore_ascii_case(state))
            .and_then(|(_, country)| non_empty(country))
    }

    /// Every known district named in the text, sorted and joined with
    /// `" / "`. Falls back to a `<Name> Dist` mention.
    pub fn district(&self, text: &str) -> Option<String> {
        let mut found: Vec<&str> = self
            .districts
            .iter()
            .filter(|m| m.is_match(text))
            .map(|m| m.label.as_str())
            .collect();
        if found.is_empty() {
            return DISTRICT_SUFFIX.captures(text).map(|c| c[1].to_string());
        }
        found.sort_unstable();
        found.dedup();
        Some(found.join(" / "))
    }
}

static DISTRICT_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([A-Z][a-zA-Z]+)\s+(?:Dist|District)\b").expect("valid regex")
});

// ──────────────────────────────────────────────
// General area
// ──────────────────────────────────────────────

/// `Gen A Longding`, `gen area: Mon town`.
static GEN_AREA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i:\bgen\s+a(?:rea)?\b)[\s:.\-]*([^,;()\n.]+)").expect("valid regex")
});

/// Words that open a trailing clause after the area name.
static GEN_AREA_STOP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|\s)(?:on|at|near|by|with|in|from|during|after|before|since|when|while)\b")
        .expect("valid regex")
});

pub fn gen_area(text: &str) -> Option<String> {
    let caps = GEN_AREA.captures(text)?;
    let area = caps[1].trim();
    let area = match GEN_AREA_STOP.find(area) {
        Some(stop) => area[..stop.start()].trim_end(),
        None => area,
    };
    non_empty(&truncate_chars(area, MAX_GEN_AREA_CHARS))
}

// ──────────────────────────────────────────────
// Coordinates
// ──────────────────────────────────────────────

/// `25°40'12"N 94°06'E`
static DMS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"\b\d{1,2}°\s*\d{1,2}['′](?:\s*\d{1,2}(?:\.\d+)?["″])?\s*[NS][,\s]+\d{1,3}°\s*\d{1,2}['′](?:\s*\d{1,2}(?:\.\d+)?["″])?\s*[EW]\b"#,
    )
    .expect("valid regex")
});

/// `26.1234 N, 94.5678 E`
static DECIMAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b\d{1,2}\.\d{2,}\s*°?\s*[NS][,\s]+\d{1,3}\.\d{2,}\s*°?\s*[EW]\b")
        .expect("valid regex")
});

/// `GR 123456`, `Grid Ref: 12345678`
static GRID_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:GR|Grid\s+Ref)\s*:?\s*(\d{6,10})\b").expect("valid regex")
});

/// First coordinate expression: degrees/minutes, decimal degrees, then grid
/// reference. Lat/long pairs are kept as written; grid references are
/// normalised to `GR <digits>`.
pub fn coordinates(text: &str) -> Option<String> {
    if let Some(m) = DMS.find(text).or_else(|| DECIMAL.find(text)) {
        return Some(m.as_str().trim().to_string());
    }
    GRID_REF.captures(text).map(|c| format!("GR {}", &c[1]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_gazetteer() -> Gazetteer {
        Gazetteer::compile(&RuleTables::default()).unwrap()
    }

    #[test]
    fn state_and_country_from_full_name() {
        let g = make_gazetteer();
        let m = g.state("cadres near Mon town, Nagaland").unwrap();
        assert_eq!(m.state, "Nagaland");
        assert_eq!(m.country.as_deref(), Some("India"));
    }

    #[test]
    fn state_match_is_case_insensitive() {
        let g = make_gazetteer();
        assert_eq!(g.state("ops in ASSAM").unwrap().state, "Assam");
    }

    #[test]
    fn first_state_in_table_order_wins() {
        let g = make_gazetteer();
        assert_eq!(g.state("mov from Manipur into Assam").unwrap().state, "Assam");
    }

    #[test]
    fn abbreviation_resolves_with_country() {
        let g = make_gazetteer();
        let m = g.state("IED recovered in J&K sector").unwrap();
        assert_eq!(m.state, "Jammu And Kashmir");
        assert_eq!(m.country.as_deref(), Some("India"));
        assert!(g.state("they set up camp").is_none());
    }

    #[test]
    fn foreign_state_maps_to_its_country() {
        let g = make_gazetteer();
        assert_eq!(g.state("camp in Sagaing region").unwrap().country.as_deref(), Some("Myanmar"));
    }

    #[test]
    fn districts_joined_and_sorted() {
        let g = make_gazetteer();
        assert_eq!(g.district("mov from Tinsukia to Changlang").as_deref(), Some("Changlang / Tinsukia"));
        assert_eq!(g.district("near Mon town").as_deref(), Some("Mon"));
    }

    #[test]
    fn district_requires_whole_word() {
        let g = make_gazetteer();
        assert_eq!(g.district("among the villagers on Monday"), None);
    }

    #[test]
    fn district_suffix_fallback() {
        let g = make_gazetteer();
        assert_eq!(g.district("in Ukhrul Dist of Manipur").as_deref(), Some("Ukhrul"));
        assert_eq!(g.district("no place named"), None);
    }

    #[test]
    fn gen_area_labeled_field() {
        assert_eq!(gen_area("at Gen A Longding, troops").as_deref(), Some("Longding"));
        assert_eq!(gen_area("gen area: Mon town (Source- X)").as_deref(), Some("Mon town"));
        assert_eq!(gen_area("the general public"), None);
    }

    #[test]
    fn gen_area_stops_before_trailing_clause() {
        assert_eq!(
            gen_area("cadres reported in Gen A Longding on 2-Feb-24 (Source- MI)").as_deref(),
            Some("Longding")
        );
        assert_eq!(gen_area("Gen A Tirap near the border post").as_deref(), Some("Tirap"));
        assert_eq!(gen_area("Gen A Kohima Town with 3 cadres").as_deref(), Some("Kohima Town"));
        assert_eq!(gen_area("Gen A on 2-Feb-24"), None);
    }

    #[test]
    fn coordinates_in_each_form() {
        assert_eq!(
            coordinates(r#"camp at 25°40'12"N 94°06'E was"#).as_deref(),
            Some(r#"25°40'12"N 94°06'E"#)
        );
        assert_eq!(coordinates("loc 26.1234 N, 94.5678 E").as_deref(), Some("26.1234 N, 94.5678 E"));
        assert_eq!(coordinates("vic GR: 456789 reported").as_deref(), Some("GR 456789"));
        assert_eq!(coordinates("15-Jan-24 no coords"), None);
    }
}
