//! Reconciling rule-engine output with enrichment output.

use super::EnrichmentResult;
use crate::config::EnrichmentMode;
use crate::models::{Column, ExtractedRecord, COLUMNS};

/// Combine a rule-engine record with an enrichment result.
///
/// - `Off`: the rule record unchanged.
/// - `Fill`: enrichment values fill only fields the rules left empty.
/// - `Owned`: as `Fill`, then non-null enrichment values replace the rule
///   values for `owned` fields. A fallback result owns nothing.
///
/// No mode ever turns a populated field into `None`.
pub fn merge(
    rule: ExtractedRecord,
    enrichment: &EnrichmentResult,
    mode: EnrichmentMode,
    owned: &[Column],
) -> ExtractedRecord {
    match mode {
        EnrichmentMode::Off => rule,
        EnrichmentMode::Fill => fill_nulls(rule, &enrichment.record),
        EnrichmentMode::Owned => {
            let mut merged = fill_nulls(rule, &enrichment.record);
            if enrichment.is_degraded() {
                return merged;
            }
            for &column in owned {
                if let Some(value) = enrichment.record.get(column) {
                    merged.set(column, Some(value));
                }
            }
            merged
        }
    }
}

fn fill_nulls(mut rule: ExtractedRecord, extra: &ExtractedRecord) -> ExtractedRecord {
    for column in COLUMNS {
        if !rule.is_set(column) {
            if let Some(value) = extra.get(column) {
                rule.set(column, Some(value));
            }
        }
    }
    rule
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FieldValue;
    use crate::pipeline::enrichment::EnrichmentError;

    fn make_rule() -> ExtractedRecord {
        ExtractedRecord {
            date: Some("15-Jan-24".into()),
            state: Some("Nagaland".into()),
            heading: Some("On 15-Jan-24, troops apprehended 2 cadres".into()),
            cadres_min: Some(2),
            cadres_max: Some(2),
            ..Default::default()
        }
    }

    fn make_enrichment() -> EnrichmentResult {
        EnrichmentResult {
            record: ExtractedRecord {
                state: Some("Assam".into()),
                district: Some("Mon".into()),
                heading: Some("Apprehension of NSCN(IM) cadres".into()),
                input_summary: Some("Two cadres held near Mon.".into()),
                cadres_max: Some(5),
                ..Default::default()
            },
            degraded: None,
        }
    }

    const OWNED: [Column; 2] = [Column::Heading, Column::InputSummary];

    #[test]
    fn off_returns_rule_record() {
        let merged = merge(make_rule(), &make_enrichment(), EnrichmentMode::Off, &OWNED);
        assert_eq!(merged, make_rule());
    }

    #[test]
    fn fill_only_adds_missing_fields() {
        let merged = merge(make_rule(), &make_enrichment(), EnrichmentMode::Fill, &OWNED);
        assert_eq!(merged.state.as_deref(), Some("Nagaland"));
        assert_eq!(merged.cadres_max, Some(2));
        assert_eq!(merged.district.as_deref(), Some("Mon"));
        assert_eq!(merged.heading.as_deref(), Some("On 15-Jan-24, troops apprehended 2 cadres"));
        assert_eq!(merged.input_summary.as_deref(), Some("Two cadres held near Mon."));
    }

    #[test]
    fn owned_fields_come_from_enrichment() {
        let merged = merge(make_rule(), &make_enrichment(), EnrichmentMode::Owned, &OWNED);
        assert_eq!(merged.heading.as_deref(), Some("Apprehension of NSCN(IM) cadres"));
        assert_eq!(merged.state.as_deref(), Some("Nagaland"));
    }

    #[test]
    fn owned_keeps_rule_value_when_enrichment_is_null() {
        let mut enrichment = make_enrichment();
        enrichment.record.heading = None;
        let merged = merge(make_rule(), &enrichment, EnrichmentMode::Owned, &OWNED);
        assert_eq!(merged.heading.as_deref(), Some("On 15-Jan-24, troops apprehended 2 cadres"));
    }

    #[test]
    fn fallback_result_owns_nothing() {
        let fallback = EnrichmentResult::fallback(
            "some raw block text",
            300,
            &EnrichmentError::Status { status: 503, body: String::new() },
        );
        let merged = merge(make_rule(), &fallback, EnrichmentMode::Owned, &OWNED);
        assert_eq!(merged.heading, make_rule().heading);
        assert_eq!(merged.input_summary.as_deref(), Some("some raw block text"));
    }

    #[test]
    fn merge_never_nulls_and_fill_never_overwrites() {
        let values = [None, Some("a"), Some("b")];
        for column in COLUMNS {
            for rule_value in values {
                for extra_value in values {
                    let mut rule = ExtractedRecord::new();
                    let to_field = |v: Option<&str>| {
                        v.map(|s| {
                            if column.is_numeric() {
                                FieldValue::Count(if s == "a" { 1 } else { 2 })
                            } else {
                                FieldValue::Text(s.to_string())
                            }
                        })
                    };
                    rule.set(column, to_field(rule_value));
                    let mut extra = ExtractedRecord::new();
                    extra.set(column, to_field(extra_value));
                    let enrichment = EnrichmentResult { record: extra, degraded: None };

                    for mode in [EnrichmentMode::Fill, EnrichmentMode::Owned] {
                        let merged = merge(rule.clone(), &enrichment, mode, &OWNED);
                        if rule_value.is_some() || extra_value.is_some() {
                            assert!(merged.is_set(column), "{column:?} nulled in {mode}");
                        }
                        if mode == EnrichmentMode::Fill && rule_value.is_some() {
                            assert_eq!(merged.get(column), rule.get(column));
                        }
                    }
                }
            }
        }
    }
}
