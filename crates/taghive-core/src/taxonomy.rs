use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use taghive_schema::CategoryEntry;

const DETAILED: &[(&str, &str)] = &[
    (
        "Service & Operations",
        "เกี่ยวกับคุณภาพของการให้บริการ การเดินรถ และเวลาให้บริการ",
    ),
    (
        "Incidents & Issues",
        "ปัญหาหรือเหตุการณ์พิเศษที่เกิดขึ้น เช่น รถไฟเสีย หรือความล่าช้า",
    ),
    (
        "Passenger Experience & Sentiment",
        "ความคิดเห็นและความรู้สึกของผู้โดยสารเกี่ยวกับ BTS",
    ),
    (
        "Comparisons & Alternatives",
        "เปรียบเทียบ BTS กับระบบขนส่งอื่น เช่น MRT หรือรถเมล์",
    ),
    (
        "Marketing & Partnerships",
        "เกี่ยวกับแคมเปญโฆษณา โปรโมชั่น หรือการร่วมมือทางธุรกิจ",
    ),
    (
        "Social Trends",
        "กระแสสังคมหรือประเด็นที่มีคนพูดถึงเกี่ยวกับ BTS",
    ),
    ("Other", "ข้อความที่ไม่เข้ากับหมวดหมู่อื่น ๆ"),
];

const COMPACT: &[(&str, &str)] = &[
    ("Service & Operations", "การให้บริการและการเดินรถ"),
    ("Incidents & Issues", "เหตุขัดข้องหรือความล่าช้า"),
    ("Passenger Experience & Sentiment", "ประสบการณ์ของผู้โดยสาร"),
    ("Comparisons & Alternatives", "เปรียบเทียบกับระบบขนส่งอื่น"),
    ("Marketing & Partnerships", "โปรโมชั่นและการตลาด"),
    ("Other", "ข้อความที่ไม่เข้าหมวดใด"),
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaxonomyError {
    #[error("category label must not be empty")]
    EmptyLabel,
    #[error("duplicate category label: {0}")]
    DuplicateLabel(String),
}

/// How a submitted block of text is turned into classification requests.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    /// Every non-blank line is classified on its own.
    #[default]
    Batch,
    /// The whole block is a single message.
    Single,
}

/// Built-in taxonomy variants.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TaxonomyPreset {
    #[default]
    Detailed,
    Compact,
}

impl TaxonomyPreset {
    pub fn taxonomy(&self) -> Taxonomy {
        let table = match self {
            TaxonomyPreset::Detailed => DETAILED,
            TaxonomyPreset::Compact => COMPACT,
        };
        Taxonomy {
            entries: table
                .iter()
                .map(|(label, description)| CategoryEntry::new(*label, *description))
                .collect(),
        }
    }

    pub fn input_mode(&self) -> InputMode {
        match self {
            TaxonomyPreset::Detailed => InputMode::Batch,
            TaxonomyPreset::Compact => InputMode::Single,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TaxonomyPreset::Detailed => "detailed",
            TaxonomyPreset::Compact => "compact",
        }
    }
}

/// Ordered, immutable mapping of category label to description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Taxonomy {
    entries: Vec<CategoryEntry>,
}

impl Taxonomy {
    pub fn new(entries: Vec<CategoryEntry>) -> Result<Self, TaxonomyError> {
        let mut seen = HashSet::new();
        for entry in &entries {
            if entry.label.trim().is_empty() {
                return Err(TaxonomyError::EmptyLabel);
            }
            if !seen.insert(entry.label.as_str()) {
                return Err(TaxonomyError::DuplicateLabel(entry.label.clone()));
            }
        }
        Ok(Self { entries })
    }

    pub fn iter(&self) -> impl Iterator<Item = &CategoryEntry> {
        self.entries.iter()
    }

    pub fn entries(&self) -> &[CategoryEntry] {
        &self.entries
    }

    pub fn labels(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.label.as_str()).collect()
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.label == label)
            .map(|e| e.description.as_str())
    }

    pub fn contains(&self, label: &str) -> bool {
        self.get(label).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `- label: description` lines joined by newlines.
    pub fn render_bullets(&self) -> String {
        self.entries
            .iter()
            .map(|e| format!("- {}: {}", e.label, e.description))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
