use crate::stats::{Trend, WordCount};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternReport {
    pub overview: Overview,
    pub recurring_symbols: Vec<RecurringSymbol>,
    pub dominant_themes: Vec<DominantTheme>,
    pub emotional_patterns: Vec<EmotionalPattern>,
    pub life_area_insights: Vec<LifeAreaInsight>,
    pub personal_growth: PersonalGrowth,
    pub word_frequency: Vec<WordCount>,
    pub timeline: Vec<PeriodInsight>,
    pub recommendations: Recommendations,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub summary: String,
    pub timespan: String,
    pub dream_count: usize,
    pub journal_count: usize,
    pub total_entries: usize,
    pub dominant_mood: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurringSymbol {
    pub symbol: String,
    /// Share of entries, 0-100.
    pub frequency: f64,
    pub description: String,
    pub possible_meaning: String,
    pub contexts: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DominantTheme {
    pub theme: String,
    /// Share of entries, 0-100.
    pub frequency: f64,
    pub description: String,
    pub related_symbols: Vec<String>,
    pub emotional_tone: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmotionalPattern {
    pub emotion: String,
    /// 0-1.
    pub average_intensity: f64,
    /// Share of entries, 0-100.
    pub frequency: f64,
    pub trend: Trend,
    pub associated_themes: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifeAreaInsight {
    pub area: String,
    pub related_symbols: Vec<String>,
    pub challenges: Vec<String>,
    pub strengths: Vec<String>,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalGrowth {
    pub potential_areas: Vec<String>,
    pub suggestions: Vec<String>,
}

impl PersonalGrowth {
    pub fn is_empty(&self) -> bool {
        self.potential_areas.is_empty() && self.suggestions.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodInsight {
    pub timeframe: String,
    pub dominant_themes: Vec<String>,
    pub dominant_emotions: Vec<String>,
    pub summary: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendations {
    pub general: Vec<String>,
    pub actionable: Vec<String>,
}
