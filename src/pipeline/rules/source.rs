use std::sync::LazyLock;

use regex::Regex;

use super::patterns::non_empty;

/// `(Source- SIB, AOR 21 Sector, 12 Unit)`.
static SOURCE_PAREN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\(\s*source\s*[-:–]\s*([^)]*)\)").expect("valid regex")
});

static AOR_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bAOR\b[\s:\-]*").expect("valid regex"));

static UNIT_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bUnit\b[\s:\-]*").expect("valid regex"));

/// Fields read from a source attribution parenthetical.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceAttribution {
    pub agency: Option<String>,
    pub aor_lower_fmn: Option<String>,
    pub unit: Option<String>,
}

/// Parse the `(Source- ...)` parenthetical.
///
/// A part containing `AOR` is the lower formation, a part containing `Unit`
/// is the unit (token stripped in both cases); the first remaining part is
/// the reporting agency.
pub fn source_attribution(text: &str) -> SourceAttribution {
    let mut out = SourceAttribution::default();
    let Some(caps) = SOURCE_PAREN.captures(text) else {
        return out;
    };

    for part in caps[1].split(',').map(str::trim).filter(|p| !p.is_empty()) {
        if AOR_TOKEN.is_match(part) {
            if out.aor_lower_fmn.is_none() {
                out.aor_lower_fmn = non_empty(&AOR_TOKEN.replace_all(part, " "));
            }
        } else if UNIT_TOKEN.is_match(part) {
            if out.unit.is_none() {
                out.unit = non_empty(&UNIT_TOKEN.replace_all(part, " "));
            }
        } else if out.agency.is_none() {
            out.agency = non_empty(part);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agency_and_aor() {
        let s = source_attribution("apprehended (Source- SIB, AOR 21 Sector).");
        assert_eq!(s.agency.as_deref(), Some("SIB"));
        assert_eq!(s.aor_lower_fmn.as_deref(), Some("21 Sector"));
        assert_eq!(s.unit, None);
    }

    #[test]
    fn unit_token_is_stripped() {
        let s = source_attribution("(Source- MI, 12 Assam Rifles Unit, AOR: 5 Sector)");
        assert_eq!(s.agency.as_deref(), Some("MI"));
        assert_eq!(s.unit.as_deref(), Some("12 Assam Rifles"));
        assert_eq!(s.aor_lower_fmn.as_deref(), Some("5 Sector"));
    }

    #[test]
    fn first_untagged_part_is_agency() {
        let s = source_attribution("(Source- AOR 3 Corps, IB, Police)");
        assert_eq!(s.aor_lower_fmn.as_deref(), Some("3 Corps"));
        assert_eq!(s.agency.as_deref(), Some("IB"));
    }

    #[test]
    fn missing_parenthetical_yields_nothing() {
        assert_eq!(source_attribution("No attribution here"), SourceAttribution::default());
    }

    #[test]
    fn tolerant_of_spacing_and_colon() {
        let s = source_attribution("(source : SIB)");
        assert_eq!(s.agency.as_deref(), Some("SIB"));
    }
}
