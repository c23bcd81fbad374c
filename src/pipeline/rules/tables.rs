//! Lookup and priority tables consumed by the rule engine.
//!
//! These are data, not code: the defaults below cover the north-east report
//! family, and any of them can be replaced from the pipeline config file.
//! Order matters wherever a table is a priority list.

use serde::{Deserialize, Serialize};

/// A keyword and the label it yields when found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRule {
    pub keyword: String,
    pub label: String,
    /// Require a word boundary after the keyword as well as before it.
    #[serde(default)]
    pub whole_word: bool,
}

/// A known state and the country it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateEntry {
    pub state: String,
    pub country: String,
}

/// Short code used in reports for a state, e.g. `J&K`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateAbbreviation {
    pub abbreviation: String,
    pub state: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleTables {
    /// Checked in order; the first state named in the text wins.
    pub states: Vec<StateEntry>,
    pub state_abbreviations: Vec<StateAbbreviation>,
    pub districts: Vec<String>,
    /// Coarse formation type, highest priority first.
    pub formation_keywords: Vec<KeywordRule>,
    /// Event classification, highest priority first.
    pub event_keywords: Vec<KeywordRule>,
    /// Label used when no event keyword matches.
    pub default_event_label: String,
    pub weapon_keywords: Vec<KeywordRule>,
}

fn rule(keyword: &str, label: &str) -> KeywordRule {
    KeywordRule {
        keyword: keyword.to_string(),
        label: label.to_string(),
        whole_word: false,
    }
}

fn word(keyword: &str, label: &str) -> KeywordRule {
    KeywordRule {
        whole_word: true,
        ..rule(keyword, label)
    }
}

fn state(state: &str, country: &str) -> StateEntry {
    StateEntry {
        state: state.to_string(),
        country: country.to_string(),
    }
}

fn abbr(abbreviation: &str, state: &str) -> StateAbbreviation {
    StateAbbreviation {
        abbreviation: abbreviation.to_string(),
        state: state.to_string(),
    }
}

impl Default for RuleTables {
    fn default() -> Self {
        Self {
            states: vec![
                state("Assam", "India"),
                state("Manipur", "India"),
                state("Nagaland", "India"),
                state("Arunachal Pradesh", "India"),
                state("West Bengal", "India"),
                state("Meghalaya", "India"),
                state("Mizoram", "India"),
                state("Tripura", "India"),
                state("Sikkim", "India"),
                state("Uttarakhand", "India"),
                state("Uttar Pradesh", "India"),
                state("Madhya Pradesh", "India"),
                state("Jammu And Kashmir", "India"),
                state("Chhattisgarh", "India"),
                state("Sagaing", "Myanmar"),
            ],
            state_abbreviations: vec![
                abbr("UK", "Uttarakhand"),
                abbr("UP", "Uttar Pradesh"),
                abbr("MP", "Madhya Pradesh"),
                abbr("JK", "Jammu And Kashmir"),
                abbr("J&K", "Jammu And Kashmir"),
                abbr("WB", "West Bengal"),
                abbr("CG", "Chhattisgarh"),
            ],
            districts: [
                "Tinsukia", "Namsai", "Dimapur", "Chumukedima", "Mon", "Longleng",
                "Tengnoupal", "Pherzawl", "Noney", "Changlang", "KPI", "CCpur",
                "Thoubal", "Imphal", "Langol",
            ]
            .iter()
            .map(|d| d.to_string())
            .collect(),
            formation_keywords: vec![
                word("COB", "COB"),
                word("camp", "Camp"),
                word("post", "Post"),
                word("unit", "Unit"),
            ],
            event_keywords: vec![
                rule("standoff firing", "Standoff Firing"),
                rule("ablaze", "Ablaze/ Conflict"),
                rule("burn", "Ablaze/ Conflict"),
                rule("presence of cadres", "Presence of Cadres"),
                rule("infilt", "Infiltration"),
                rule("mov of cadres", "Movement of Cadres"),
                rule("movement of cadres", "Movement of Cadres"),
                word("mtg", "Meeting"),
                rule("meeting", "Meeting"),
                word("plg", "Planning"),
                rule("planning", "Planning"),
                rule("attack", "Firefight"),
                rule("firing", "Firefight"),
                rule("ambush", "Firefight"),
                word("rpg", "Firefight"),
                word("ied", "Firefight"),
                rule("grenade", "Firefight"),
            ],
            default_event_label: "IFC".to_string(),
            weapon_keywords: vec![
                rule("rpg", "RPG"),
                rule("gren", "GRENADE"),
                rule("sa fire", "SA"),
                word("ied", "IED"),
                rule("ak-47", "AK-47"),
                rule("ak 47", "AK-47"),
                rule("insas", "INSAS"),
                rule("m16", "M16"),
                rule("carbine", "CARBINE"),
                rule("pistol", "PISTOL"),
            ],
        }
    }
}
