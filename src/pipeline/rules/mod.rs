pub mod activity;
pub mod actors;
pub mod counts;
pub mod geography;
pub mod patterns;
pub mod source;
pub mod summary;
pub mod tables;

pub use geography::{Gazetteer, StateMatch};
pub use patterns::KeywordMatcher;
pub use tables::{KeywordRule, RuleTables, StateAbbreviation, StateEntry};

use thiserror::Error;

use crate::models::ExtractedRecord;
use crate::pipeline::segment::{BlockContent, RecordBlock};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    #[error("Empty keyword in rule table (label '{0}')")]
    EmptyKeyword(String),

    #[error("Invalid pattern for keyword '{keyword}': {reason}")]
    InvalidPattern { keyword: String, reason: String },
}

/// What the engine knows about a block beyond its raw text.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractContext<'a> {
    /// Narrative portion used for heading and summary. Defaults to the
    /// full text.
    pub body: Option<&'a str>,
    /// Group carried forward from a context header.
    pub group_hint: Option<&'a str>,
}

/// Applies the field extractors to a block of text.
///
/// Holds only compiled, read-only tables, so one engine can be shared across
/// threads and calls with the same input always return the same record.
#[derive(Debug, Clone)]
pub struct RuleEngine {
    gazetteer: Gazetteer,
    formations: Vec<KeywordMatcher>,
    events: Vec<KeywordMatcher>,
    default_event: String,
    weapons: Vec<KeywordMatcher>,
}

fn compile_rules(rules: &[KeywordRule]) -> Result<Vec<KeywordMatcher>, RuleError> {
    rules
        .iter()
        .map(|r| KeywordMatcher::compile(&r.keyword, &r.label, r.whole_word))
        .collect()
}

/// Write `value` only if the slot is still empty.
fn fill<T>(slot: &mut Option<T>, value: Option<T>) {
    if slot.is_none() {
        *slot = value;
    }
}

impl RuleEngine {
    pub fn new(tables: &RuleTables) -> Result<Self, RuleError> {
        Ok(Self {
            gazetteer: Gazetteer::compile(tables)?,
            formations: compile_rules(&tables.formation_keywords)?,
            events: compile_rules(&tables.event_keywords)?,
            default_event: tables.default_event_label.clone(),
            weapons: compile_rules(&tables.weapon_keywords)?,
        })
    }

    /// Extract every field the rules can find. Unmatched fields stay `None`.
    pub fn extract(&self, text: &str, ctx: ExtractContext<'_>) -> ExtractedRecord {
        let mut rec = ExtractedRecord::new();

        let (heading, summary) = summary::heading_and_summary(ctx.body.unwrap_or(text));
        fill(&mut rec.heading, heading);
        fill(&mut rec.input_summary, summary);

        fill(&mut rec.date, patterns::find_date(text));

        let src = source::source_attribution(text);
        fill(&mut rec.agency, src.agency);
        fill(&mut rec.aor_lower_fmn, src.aor_lower_fmn);
        fill(&mut rec.unit, src.unit);

        fill(&mut rec.fmn, actors::formation(text, &self.formations));
        fill(&mut rec.gp, actors::group(text, ctx.group_hint));
        fill(&mut rec.leader, actors::leader(text));

        if let Some(found) = self.gazetteer.state(text) {
            fill(&mut rec.state, Some(found.state));
            fill(&mut rec.country, found.country);
        }
        fill(&mut rec.district, self.gazetteer.district(text));
        fill(&mut rec.gen_area, geography::gen_area(text));
        fill(&mut rec.coordinates, geography::coordinates(text));

        if let Some((min, max)) = counts::cadre_strength(text) {
            fill(&mut rec.cadres_min, Some(min));
            fill(&mut rec.cadres_max, Some(max));
        }
        fill(&mut rec.ammunition, counts::ammunition(text));

        fill(
            &mut rec.engagement_type_reasoned,
            Some(activity::event(text, &self.events, &self.default_event)),
        );
        fill(&mut rec.weapons, activity::weapons(text, &self.weapons));

        rec
    }

    /// Extract from a segmented block. Table rows are matched on their
    /// `Label: value` rendering, with the longest cell as the narrative.
    pub fn extract_block(&self, block: &RecordBlock) -> ExtractedRecord {
        let text = block.text();
        let body = match &block.content {
            BlockContent::Row(_) => Some(block.body()),
            BlockContent::Text(_) => None,
        };
        self.extract(
            &text,
            ExtractContext {
                body: body.as_deref(),
                group_hint: block.context.as_deref(),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::segment::{segment_narrative, TableCell};

    const SCENARIO: &str = "1. On 15-Jan-24, troops apprehended 2 NSCN(IM) cadres near Mon town, Nagaland (Source- SIB, AOR 21 Sector).";

    fn make_engine() -> RuleEngine {
        RuleEngine::new(&RuleTables::default()).unwrap()
    }

    #[test]
    fn scenario_block_fields() {
        let blocks = segment_narrative(&[SCENARIO.to_string()]);
        assert_eq!(blocks.len(), 1);

        let rec = make_engine().extract_block(&blocks[0]);
        assert_eq!(rec.date.as_deref(), Some("15-Jan-24"));
        assert_eq!(rec.state.as_deref(), Some("Nagaland"));
        assert_eq!(rec.country.as_deref(), Some("India"));
        assert_eq!(rec.district.as_deref(), Some("Mon"));
        assert!(rec.gp.as_deref().unwrap().contains("NSCN(IM)"));
        assert_eq!(rec.agency.as_deref(), Some("SIB"));
        assert!(rec.aor_lower_fmn.as_deref().unwrap().contains("21 Sector"));
        assert_eq!(rec.cadres_min, Some(2));
        assert_eq!(rec.cadres_max, Some(2));
        assert_eq!(rec.engagement_type_reasoned.as_deref(), Some("IFC"));
        assert!(rec.heading.as_deref().unwrap().starts_with("On 15-Jan-24"));
        assert_eq!(rec.leader, None);
        assert_eq!(rec.weapons, None);
    }

    #[test]
    fn extraction_is_idempotent() {
        let engine = make_engine();
        let first = engine.extract(SCENARIO, ExtractContext::default());
        let second = engine.extract(SCENARIO, ExtractContext::default());
        assert_eq!(first, second);
    }

    #[test]
    fn context_header_supplies_group() {
        let engine = make_engine();
        let text = "3. Presence of cadres reported in Gen A Longding on 2-Feb-24 (Source- MI).";
        let rec = engine.extract(
            text,
            ExtractContext {
                body: None,
                group_hint: Some("ULFA"),
            },
        );
        assert_eq!(rec.gp.as_deref(), Some("ULFA"));
        assert_eq!(rec.engagement_type_reasoned.as_deref(), Some("Presence of Cadres"));
        assert_eq!(rec.gen_area.as_deref(), Some("Longding"));
    }

    #[test]
    fn year_in_date_does_not_become_cadre_count() {
        let engine = make_engine();
        let text = "On 15 Jan 2024 cadres of NSCN(IM), a gp of 2 cadres, were seen near Mon.";
        let rec = engine.extract(text, ExtractContext::default());
        assert_eq!(rec.date.as_deref(), Some("15 Jan 2024"));
        assert_eq!(rec.cadres_min, Some(2));
        assert_eq!(rec.cadres_max, Some(2));
    }

    #[test]
    fn table_row_uses_longest_cell_for_heading() {
        let block = RecordBlock::row_block(
            Some(4),
            vec![
                TableCell { label: "S No".into(), value: "4.".into() },
                TableCell { label: "Date".into(), value: "20-Mar-24".into() },
                TableCell {
                    label: "Input".into(),
                    value: "Mtg of KYKL cadres led by SS Capt Tomba Singh at Thoubal. 3 x rds fired.".into(),
                },
            ],
        );
        let rec = make_engine().extract_block(&block);
        assert_eq!(rec.heading.as_deref(), Some("Mtg of KYKL cadres led by SS Capt Tomba Singh at Thoubal"));
        assert_eq!(rec.date.as_deref(), Some("20-Mar-24"));
        assert_eq!(rec.gp.as_deref(), Some("KYKL"));
        assert_eq!(rec.leader.as_deref(), Some("SS Capt Tomba Singh"));
        assert_eq!(rec.district.as_deref(), Some("Thoubal"));
        assert_eq!(rec.engagement_type_reasoned.as_deref(), Some("Meeting"));
        assert_eq!(rec.ammunition, Some(3));
    }

    #[test]
    fn custom_tables_change_results_without_code_changes() {
        let mut tables = RuleTables::default();
        tables.districts = vec!["Ukhrul".into()];
        tables.default_event_label = "Contact".into();
        let engine = RuleEngine::new(&tables).unwrap();
        let rec = engine.extract("5. Cadres sighted near Ukhrul and Mon.", ExtractContext::default());
        assert_eq!(rec.district.as_deref(), Some("Ukhrul"));
        assert_eq!(rec.engagement_type_reasoned.as_deref(), Some("Contact"));
    }

    #[test]
    fn empty_keyword_rejected_at_construction() {
        let mut tables = RuleTables::default();
        tables.weapon_keywords.push(KeywordRule {
            keyword: " ".into(),
            label: "NOTHING".into(),
            whole_word: false,
        });
        assert_eq!(
            RuleEngine::new(&tables).unwrap_err(),
            RuleError::EmptyKeyword("NOTHING".into())
        );
    }
}
