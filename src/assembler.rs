use crate::error::{PipelineError, Result};
use crate::payload::EntryCounts;
use crate::report::{
    DominantTheme, EmotionalPattern, LifeAreaInsight, Overview, PatternReport, PeriodInsight, PersonalGrowth,
    Recommendations, RecurringSymbol,
};
use crate::stats::{MoodLabel, Trend, WordCount};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

pub type Object = Map<String, Value>;

static RE_FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)^```[A-Za-z]*\s*\n?(.*?)\s*```$").unwrap());

/// Facts the core already knows and never takes from the model.
#[derive(Debug, Clone, Default)]
pub struct AssemblyContext {
    pub time_range: String,
    pub counts: EntryCounts,
    pub mood_label: MoodLabel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Object,
    Array,
}

impl Shape {
    fn name(self) -> &'static str {
        match self {
            Shape::Object => "object",
            Shape::Array => "array",
        }
    }

    fn matches(self, v: &Value) -> bool {
        match self {
            Shape::Object => v.is_object(),
            Shape::Array => v.is_array(),
        }
    }
}

pub const REQUIRED_SECTIONS: [&str; 5] =
    ["overview", "recurringSymbols", "dominantThemes", "emotionalPatterns", "recommendations"];

const REQUIRED_SHAPES: [Shape; 5] = [Shape::Object, Shape::Array, Shape::Array, Shape::Array, Shape::Object];

fn type_of(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Parses model output text, tolerating a surrounding Markdown code fence.
pub fn parse_analysis_text(text: &str) -> Result<Value> {
    let trimmed = text.trim();
    let body = match RE_FENCE.captures(trimmed) {
        Some(caps) => caps.get(1).map(|m| m.as_str()).unwrap_or(""),
        None => trimmed,
    };
    let v: Value = serde_json::from_str(body)?;
    Ok(v)
}

/// Checks the mandatory sections are present with the right JSON shape.
pub fn validate(raw: &Value) -> Result<&Object> {
    let obj = raw
        .as_object()
        .ok_or_else(|| PipelineError::malformed("root", format!("expected object, got {}", type_of(raw))))?;
    for (section, shape) in REQUIRED_SECTIONS.iter().zip(REQUIRED_SHAPES) {
        match obj.get(*section) {
            None => return Err(PipelineError::malformed(*section, "section missing")),
            Some(v) if !shape.matches(v) => {
                return Err(PipelineError::malformed(
                    *section,
                    format!("expected {}, got {}", shape.name(), type_of(v)),
                ))
            }
            Some(_) => {}
        }
    }
    Ok(obj)
}

pub fn assemble(raw: &Value, ctx: &AssemblyContext) -> Result<PatternReport> {
    let obj = match validate(raw) {
        Ok(o) => o,
        Err(err) => {
            tracing::warn!(error = %err, "rejecting analysis result");
            return Err(err);
        }
    };
    let overview = obj.get("overview").and_then(Value::as_object);
    let recommendations = obj.get("recommendations").and_then(Value::as_object);

    let mut recurring_symbols: Vec<RecurringSymbol> = items(obj, "recurringSymbols")
        .filter_map(|o| {
            Some(RecurringSymbol {
                symbol: name_of(o, &["symbol", "name"])?,
                frequency: percent(number(o, "frequency")),
                description: text(o, &["description"]),
                possible_meaning: text(o, &["possibleMeaning", "meaning"]),
                contexts: list(o, "contexts"),
            })
        })
        .collect();
    recurring_symbols.sort_by(|a, b| b.frequency.total_cmp(&a.frequency));

    let mut dominant_themes: Vec<DominantTheme> = items(obj, "dominantThemes")
        .filter_map(|o| {
            Some(DominantTheme {
                theme: name_of(o, &["theme", "name"])?,
                frequency: percent(number(o, "frequency")),
                description: text(o, &["description"]),
                related_symbols: list(o, "relatedSymbols"),
                emotional_tone: text(o, &["emotionalTone", "tone"]),
            })
        })
        .collect();
    dominant_themes.sort_by(|a, b| b.frequency.total_cmp(&a.frequency));

    let mut emotional_patterns: Vec<EmotionalPattern> = items(obj, "emotionalPatterns")
        .filter_map(|o| {
            Some(EmotionalPattern {
                emotion: name_of(o, &["emotion", "name"])?,
                average_intensity: intensity(number(o, "averageIntensity").or_else(|| number(o, "intensity"))),
                frequency: percent(number(o, "frequency")),
                trend: trend(o.get("trend").and_then(Value::as_str)),
                associated_themes: list(o, "associatedThemes"),
            })
        })
        .collect();
    emotional_patterns.sort_by(|a, b| b.frequency.total_cmp(&a.frequency));

    let life_area_insights = items(obj, "lifeAreaInsights")
        .filter_map(|o| {
            Some(LifeAreaInsight {
                area: name_of(o, &["area", "lifeArea", "name"])?,
                related_symbols: list(o, "relatedSymbols"),
                challenges: list(o, "challenges"),
                strengths: list(o, "strengths"),
                suggestions: list(o, "suggestions"),
            })
        })
        .collect();

    let personal_growth = match obj.get("personalGrowth") {
        Some(Value::Object(o)) => PersonalGrowth {
            potential_areas: list(o, "potentialAreas"),
            suggestions: list(o, "suggestions"),
        },
        Some(other) => {
            tracing::warn!(got = type_of(other), "ignoring personalGrowth that is not an object");
            PersonalGrowth::default()
        }
        None => PersonalGrowth::default(),
    };

    let mut word_frequency: Vec<WordCount> = items(obj, "wordFrequency")
        .filter_map(|o| {
            let count = number(o, "count")?;
            Some(WordCount { word: name_of(o, &["word"])?, count: count.max(0.0).round() as usize })
        })
        .collect();
    word_frequency.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.word.cmp(&b.word)));

    let timeline = items(obj, "timeline")
        .filter_map(|o| {
            Some(PeriodInsight {
                timeframe: name_of(o, &["timeframe", "period"])?,
                dominant_themes: list(o, "dominantThemes"),
                dominant_emotions: list(o, "dominantEmotions"),
                summary: text(o, &["summary"]),
            })
        })
        .collect();

    let dominant_mood = overview
        .and_then(|o| name_of(o, &["dominantMood", "mood"]))
        .unwrap_or_else(|| mood_label_text(ctx.mood_label).to_string());

    Ok(PatternReport {
        overview: Overview {
            summary: overview.map(|o| text(o, &["summary"])).unwrap_or_default(),
            timespan: ctx.time_range.clone(),
            dream_count: ctx.counts.dreams,
            journal_count: ctx.counts.journal_entries,
            total_entries: ctx.counts.total,
            dominant_mood,
        },
        recurring_symbols,
        dominant_themes,
        emotional_patterns,
        life_area_insights,
        personal_growth,
        word_frequency,
        timeline,
        recommendations: Recommendations {
            general: recommendations.map(|o| list(o, "general")).unwrap_or_default(),
            actionable: recommendations.map(|o| list(o, "actionable")).unwrap_or_default(),
        },
    })
}

fn mood_label_text(label: MoodLabel) -> &'static str {
    match label {
        MoodLabel::Positive => "positive",
        MoodLabel::Neutral => "neutral",
        MoodLabel::Negative => "negative",
        MoodLabel::Unknown => "unknown",
    }
}

/// Object items of an optional array section; other items are skipped.
fn items<'a>(obj: &'a Object, section: &'a str) -> impl Iterator<Item = &'a Object> + 'a {
    let arr: &[Value] = match obj.get(section) {
        Some(Value::Array(a)) => a,
        Some(other) => {
            tracing::warn!(section, got = type_of(other), "ignoring section that is not an array");
            &[]
        }
        None => &[],
    };
    arr.iter().filter_map(Value::as_object)
}

fn text(o: &Object, keys: &[&str]) -> String {
    keys.iter()
        .find_map(|k| match o.get(*k) {
            Some(Value::String(s)) => Some(s.trim().to_string()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        })
        .unwrap_or_default()
}

fn name_of(o: &Object, keys: &[&str]) -> Option<String> {
    Some(text(o, keys)).filter(|s| !s.is_empty())
}

fn list(o: &Object, key: &str) -> Vec<String> {
    match o.get(key) {
        Some(Value::Array(a)) => a
            .iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s.trim().to_string()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .filter(|s| !s.is_empty())
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => Vec::new(),
    }
}

/// JSON numbers or numeric strings such as `"45%"`.
fn number(o: &Object, key: &str) -> Option<f64> {
    let x: Option<f64> = match o.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().replace(',', ".").parse().ok(),
        _ => None,
    };
    x.filter(|x| x.is_finite())
}

fn percent(v: Option<f64>) -> f64 {
    v.unwrap_or(0.0).clamp(0.0, 100.0)
}

fn intensity(v: Option<f64>) -> f64 {
    let x = v.unwrap_or(0.0);
    let scaled = if x > 10.0 && x <= 100.0 {
        x / 100.0
    } else if x > 1.0 && x <= 10.0 {
        x / 10.0
    } else {
        x
    };
    scaled.clamp(0.0, 1.0)
}

const RISING: [&str; 8] = ["ris", "increas", "grow", "up", "steig", "zunehm", "wachs", "höher"];
const FALLING: [&str; 8] = ["fall", "decreas", "declin", "down", "sink", "abnehm", "rückl", "weniger"];

/// Prefix match per word, so "disrupted" is not read as "up".
fn trend(label: Option<&str>) -> Trend {
    let Some(l) = label.map(str::to_lowercase) else { return Trend::Stable };
    let words: Vec<&str> = l.split(|c: char| !c.is_alphabetic()).filter(|w| !w.is_empty()).collect();
    let hits = |prefixes: &[&str]| words.iter().any(|w| prefixes.iter().any(|p| w.starts_with(p)));
    if hits(&RISING[..]) {
        Trend::Rising
    } else if hits(&FALLING[..]) {
        Trend::Falling
    } else {
        Trend::Stable
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numbers_from_strings_and_percent_signs() {
        let o = json!({"a": "45%", "b": 12.5, "c": "n/a", "d": "0,5"});
        let o = o.as_object().unwrap();
        assert_eq!(number(o, "a"), Some(45.0));
        assert_eq!(number(o, "b"), Some(12.5));
        assert_eq!(number(o, "c"), None);
        assert_eq!(number(o, "d"), Some(0.5));
        assert_eq!(number(o, "missing"), None);
    }

    #[test]
    fn clamps_ranges() {
        assert_eq!(percent(Some(140.0)), 100.0);
        assert_eq!(percent(Some(-3.0)), 0.0);
        assert_eq!(percent(None), 0.0);
        assert_eq!(intensity(Some(0.4)), 0.4);
        assert_eq!(intensity(Some(7.0)), 0.7);
        assert_eq!(intensity(Some(55.0)), 0.55);
        assert_eq!(intensity(Some(100.0)), 1.0);
        assert_eq!(intensity(Some(250.0)), 1.0);
        assert_eq!(intensity(Some(-1.0)), 0.0);
    }

    #[test]
    fn trend_labels() {
        assert_eq!(trend(Some("rising")), Trend::Rising);
        assert_eq!(trend(Some("Steigend")), Trend::Rising);
        assert_eq!(trend(Some("falling")), Trend::Falling);
        assert_eq!(trend(Some("abnehmend")), Trend::Falling);
        assert_eq!(trend(Some("stabil")), Trend::Stable);
        assert_eq!(trend(Some("???")), Trend::Stable);
        assert_eq!(trend(Some("disrupted")), Trend::Stable);
        assert_eq!(trend(Some("Trending up")), Trend::Rising);
        assert_eq!(trend(Some("slowly-declining")), Trend::Falling);
        assert_eq!(trend(None), Trend::Stable);
    }

    #[test]
    fn strips_code_fence() {
        let v = parse_analysis_text("```json\n{\"a\": 1}\n```").unwrap();
        assert_eq!(v, json!({"a": 1}));
        let v = parse_analysis_text("  {\"a\": 2}  ").unwrap();
        assert_eq!(v, json!({"a": 2}));
        assert!(parse_analysis_text("no json here").is_err());
    }
}
