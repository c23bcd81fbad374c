//! The 19-field incident record and its fixed column schema.
//!
//! Every field is optional: `None` means "not stated in the source", never a
//! zero or placeholder value. Records are built empty, filled by the rule
//! engine, optionally merged with enrichment output, then emitted as-is.

use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════
// Columns
// ═══════════════════════════════════════════════════════════

/// One column of the output schema, in presentation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Date,
    Fmn,
    AorLowerFmn,
    Unit,
    Agency,
    Country,
    State,
    District,
    GenArea,
    Gp,
    Heading,
    InputSummary,
    Coordinates,
    EngagementTypeReasoned,
    CadresMin,
    CadresMax,
    Leader,
    Weapons,
    Ammunition,
}

/// All columns in the order the renderer expects them.
pub const COLUMNS: [Column; 19] = [
    Column::Date,
    Column::Fmn,
    Column::AorLowerFmn,
    Column::Unit,
    Column::Agency,
    Column::Country,
    Column::State,
    Column::District,
    Column::GenArea,
    Column::Gp,
    Column::Heading,
    Column::InputSummary,
    Column::Coordinates,
    Column::EngagementTypeReasoned,
    Column::CadresMin,
    Column::CadresMax,
    Column::Leader,
    Column::Weapons,
    Column::Ammunition,
];

impl Column {
    /// Field key as it appears in JSON payloads.
    pub fn key(self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Fmn => "fmn",
            Self::AorLowerFmn => "aor_lower_fmn",
            Self::Unit => "unit",
            Self::Agency => "agency",
            Self::Country => "country",
            Self::State => "state",
            Self::District => "district",
            Self::GenArea => "gen_area",
            Self::Gp => "gp",
            Self::Heading => "heading",
            Self::InputSummary => "input_summary",
            Self::Coordinates => "coordinates",
            Self::EngagementTypeReasoned => "engagement_type_reasoned",
            Self::CadresMin => "cadres_min",
            Self::CadresMax => "cadres_max",
            Self::Leader => "leader",
            Self::Weapons => "weapons",
            Self::Ammunition => "ammunition",
        }
    }

    /// Header label used by the spreadsheet renderer.
    pub fn label(self) -> &'static str {
        match self {
            Self::Date => "Date",
            Self::Fmn => "FMN",
            Self::AorLowerFmn => "AOR (LOWER FMN)",
            Self::Unit => "Unit",
            Self::Agency => "AGENCY",
            Self::Country => "COUNTRY",
            Self::State => "STATE",
            Self::District => "DIST",
            Self::GenArea => "GEN A",
            Self::Gp => "GP",
            Self::Heading => "Heading",
            Self::InputSummary => "Input",
            Self::Coordinates => "Coordinates",
            Self::EngagementTypeReasoned => "Defection To/ Firefight/ IFC With",
            Self::CadresMin => "No of Cadres (Min)",
            Self::CadresMax => "No of Cadres (Max)",
            Self::Leader => "Ldr",
            Self::Weapons => "Wpns",
            Self::Ammunition => "Amn",
        }
    }

    /// Look up a column by its JSON key.
    pub fn from_key(key: &str) -> Option<Self> {
        COLUMNS.iter().copied().find(|c| c.key() == key)
    }

    /// Whether the column holds a count rather than free text.
    pub fn is_numeric(self) -> bool {
        matches!(self, Self::CadresMin | Self::CadresMax | Self::Ammunition)
    }
}

// ═══════════════════════════════════════════════════════════
// Field values
// ═══════════════════════════════════════════════════════════

/// A single field value, used when records are handled column-generically
/// (enrichment payload mapping, merge).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Count(u32),
}

// ═══════════════════════════════════════════════════════════
// ExtractedRecord
// ═══════════════════════════════════════════════════════════

/// One normalized incident record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedRecord {
    pub date: Option<String>,
    pub fmn: Option<String>,
    pub aor_lower_fmn: Option<String>,
    pub unit: Option<String>,
    pub agency: Option<String>,
    pub country: Option<String>,
    pub state: Option<String>,
    pub district: Option<String>,
    pub gen_area: Option<String>,
    pub gp: Option<String>,
    pub heading: Option<String>,
    pub input_summary: Option<String>,
    pub coordinates: Option<String>,
    pub engagement_type_reasoned: Option<String>,
    pub cadres_min: Option<u32>,
    pub cadres_max: Option<u32>,
    pub leader: Option<String>,
    pub weapons: Option<String>,
    pub ammunition: Option<u32>,
}

impl ExtractedRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a field by column.
    pub fn get(&self, column: Column) -> Option<FieldValue> {
        match column {
            Column::CadresMin => self.cadres_min.map(FieldValue::Count),
            Column::CadresMax => self.cadres_max.map(FieldValue::Count),
            Column::Ammunition => self.ammunition.map(FieldValue::Count),
            text => self.text_slot(text).and_then(|v| v.clone()).map(FieldValue::Text),
        }
    }

    /// Write a field by column. A `Count` written to a text column is stored
    /// as its decimal string; a `Text` written to a count column is parsed
    /// and dropped if it is not a plain integer.
    pub fn set(&mut self, column: Column, value: Option<FieldValue>) {
        match column {
            Column::CadresMin => self.cadres_min = value.and_then(FieldValue::into_count),
            Column::CadresMax => self.cadres_max = value.and_then(FieldValue::into_count),
            Column::Ammunition => self.ammunition = value.and_then(FieldValue::into_count),
            text => {
                if let Some(slot) = self.text_slot_mut(text) {
                    *slot = value.map(FieldValue::into_text);
                }
            }
        }
    }

    pub fn is_set(&self, column: Column) -> bool {
        self.get(column).is_some()
    }

    /// Number of populated fields.
    pub fn filled_count(&self) -> usize {
        COLUMNS.iter().filter(|c| self.is_set(**c)).count()
    }

    fn text_slot(&self, column: Column) -> Option<&Option<String>> {
        let slot = match column {
            Column::Date => &self.date,
            Column::Fmn => &self.fmn,
            Column::AorLowerFmn => &self.aor_lower_fmn,
            Column::Unit => &self.unit,
            Column::Agency => &self.agency,
            Column::Country => &self.country,
            Column::State => &self.state,
            Column::District => &self.district,
            Column::GenArea => &self.gen_area,
            Column::Gp => &self.gp,
            Column::Heading => &self.heading,
            Column::InputSummary => &self.input_summary,
            Column::Coordinates => &self.coordinates,
            Column::EngagementTypeReasoned => &self.engagement_type_reasoned,
            Column::Leader => &self.leader,
            Column::Weapons => &self.weapons,
            Column::CadresMin | Column::CadresMax | Column::Ammunition => return None,
        };
        Some(slot)
    }

    fn text_slot_mut(&mut self, column: Column) -> Option<&mut Option<String>> {
        let slot = match column {
            Column::Date => &mut self.date,
            Column::Fmn => &mut self.fmn,
            Column::AorLowerFmn => &mut self.aor_lower_fmn,
            Column::Unit => &mut self.unit,
            Column::Agency => &mut self.agency,
            Column::Country => &mut self.country,
            Column::State => &mut self.state,
            Column::District => &mut self.district,
            Column::GenArea => &mut self.gen_area,
            Column::Gp => &mut self.gp,
            Column::Heading => &mut self.heading,
            Column::InputSummary => &mut self.input_summary,
            Column::Coordinates => &mut self.coordinates,
            Column::EngagementTypeReasoned => &mut self.engagement_type_reasoned,
            Column::Leader => &mut self.leader,
            Column::Weapons => &mut self.weapons,
            Column::CadresMin | Column::CadresMax | Column::Ammunition => return None,
        };
        Some(slot)
    }
}

impl FieldValue {
    fn into_text(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Count(n) => n.to_string(),
        }
    }

    fn into_count(self) -> Option<u32> {
        match self {
            Self::Count(n) => Some(n),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_has_nineteen_unique_keys() {
        let mut keys: Vec<&str> = COLUMNS.iter().map(|c| c.key()).collect();
        assert_eq!(keys.len(), 19);
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), 19);
    }

    #[test]
    fn column_order_starts_with_date_and_ends_with_ammunition() {
        assert_eq!(COLUMNS[0], Column::Date);
        assert_eq!(COLUMNS[18], Column::Ammunition);
        assert_eq!(COLUMNS[11].label(), "Input");
    }

    #[test]
    fn from_key_round_trips_every_column() {
        for column in COLUMNS {
            assert_eq!(Column::from_key(column.key()), Some(column));
        }
        assert_eq!(Column::from_key("not_a_field"), None);
    }

    #[test]
    fn serialized_keys_match_column_keys() {
        let json = serde_json::to_value(ExtractedRecord::new()).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 19);
        for column in COLUMNS {
            assert!(obj.contains_key(column.key()), "missing {}", column.key());
            assert!(obj[column.key()].is_null());
        }
    }

    #[test]
    fn set_and_get_text_field() {
        let mut rec = ExtractedRecord::new();
        rec.set(Column::State, Some(FieldValue::Text("Assam".into())));
        assert_eq!(rec.state.as_deref(), Some("Assam"));
        assert_eq!(rec.get(Column::State), Some(FieldValue::Text("Assam".into())));
        assert!(rec.is_set(Column::State));
        assert!(!rec.is_set(Column::District));
    }

    #[test]
    fn count_columns_parse_text_values() {
        let mut rec = ExtractedRecord::new();
        rec.set(Column::CadresMax, Some(FieldValue::Text(" 12 ".into())));
        assert_eq!(rec.cadres_max, Some(12));

        rec.set(Column::Ammunition, Some(FieldValue::Text("many".into())));
        assert_eq!(rec.ammunition, None);
    }

    #[test]
    fn text_columns_accept_counts() {
        let mut rec = ExtractedRecord::new();
        rec.set(Column::Unit, Some(FieldValue::Count(21)));
        assert_eq!(rec.unit.as_deref(), Some("21"));
    }

    #[test]
    fn filled_count_tracks_populated_fields() {
        let mut rec = ExtractedRecord::new();
        assert_eq!(rec.filled_count(), 0);
        rec.date = Some("15-Jan-24".into());
        rec.cadres_min = Some(2);
        assert_eq!(rec.filled_count(), 2);
    }
}
