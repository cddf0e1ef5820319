use dreamscope::assembler::{assemble, parse_analysis_text, AssemblyContext};
use dreamscope::payload::EntryCounts;
use dreamscope::stats::{MoodLabel, Trend};
use dreamscope::PipelineError;
use serde_json::{json, Value};

fn ctx() -> AssemblyContext {
    AssemblyContext {
        time_range: "30 Tage".to_string(),
        counts: EntryCounts { dreams: 2, journal_entries: 1, total: 3 },
        mood_label: MoodLabel::Positive,
    }
}

fn full_analysis() -> Value {
    json!({
        "overview": {"summary": "Water keeps returning.", "timespan": "ignored", "totalEntries": 99, "dominantMood": "calm"},
        "recurringSymbols": [
            {"symbol": "door", "frequency": 20, "description": "closed doors", "possibleMeaning": "choices", "contexts": ["house"]},
            {"symbol": "water", "frequency": "66%", "description": "rivers", "possibleMeaning": "emotion", "contexts": ["sea", "rain"]},
            "not an object",
            {"symbol": "  ", "frequency": 90}
        ],
        "dominantThemes": [
            {"theme": "transition", "frequency": 150, "description": "", "relatedSymbols": ["door"], "emotionalTone": "hopeful"}
        ],
        "emotionalPatterns": [
            {"emotion": "fear", "averageIntensity": 7, "frequency": 30, "trend": "steigend", "associatedThemes": ["transition"]},
            {"emotion": "joy", "averageIntensity": 0.4, "frequency": 60, "trend": "unclear"}
        ],
        "recommendations": {"general": ["Keep writing"], "actionable": ["Note water dreams"]}
    })
}

#[test]
fn missing_emotional_patterns_is_malformed() {
    let mut raw = full_analysis();
    raw.as_object_mut().unwrap().remove("emotionalPatterns");
    let err = assemble(&raw, &ctx()).unwrap_err();
    match &err {
        PipelineError::MalformedAnalysis { section, .. } => assert_eq!(section, "emotionalPatterns"),
        other => panic!("unexpected error {other:?}"),
    }
    assert!(err.is_retryable());
    assert!(!err.is_user_facing());
}

#[test]
fn every_required_section_is_checked() {
    for section in ["overview", "recurringSymbols", "dominantThemes", "emotionalPatterns", "recommendations"] {
        let mut raw = full_analysis();
        raw.as_object_mut().unwrap().remove(section);
        assert!(
            matches!(assemble(&raw, &ctx()), Err(PipelineError::MalformedAnalysis { .. })),
            "missing {section} was accepted"
        );
    }
}

#[test]
fn wrong_section_type_is_malformed() {
    let mut raw = full_analysis();
    raw["dominantThemes"] = json!({"theme": "not a list"});
    let err = assemble(&raw, &ctx()).unwrap_err();
    assert!(err.to_string().contains("expected array, got object"));

    let err = assemble(&json!(["not", "an", "object"]), &ctx()).unwrap_err();
    assert!(matches!(err, PipelineError::MalformedAnalysis { ref section, .. } if section == "root"));
}

#[test]
fn assembles_and_normalizes_report() {
    let report = assemble(&full_analysis(), &ctx()).expect("report");

    assert_eq!(report.overview.summary, "Water keeps returning.");
    assert_eq!(report.overview.timespan, "30 Tage");
    assert_eq!(report.overview.dream_count, 2);
    assert_eq!(report.overview.journal_count, 1);
    assert_eq!(report.overview.total_entries, 3);
    assert_eq!(report.overview.dominant_mood, "calm");

    let symbols: Vec<&str> = report.recurring_symbols.iter().map(|s| s.symbol.as_str()).collect();
    assert_eq!(symbols, vec!["water", "door"]);
    assert_eq!(report.recurring_symbols[0].frequency, 66.0);
    assert_eq!(report.recurring_symbols[0].possible_meaning, "emotion");

    assert_eq!(report.dominant_themes[0].frequency, 100.0);

    assert_eq!(report.emotional_patterns[0].emotion, "joy");
    assert_eq!(report.emotional_patterns[0].trend, Trend::Stable);
    assert_eq!(report.emotional_patterns[1].average_intensity, 0.7);
    assert_eq!(report.emotional_patterns[1].trend, Trend::Rising);

    for p in &report.emotional_patterns {
        assert!((0.0..=1.0).contains(&p.average_intensity));
        assert!((0.0..=100.0).contains(&p.frequency));
    }

    assert_eq!(report.recommendations.general, vec!["Keep writing"]);
    assert_eq!(report.recommendations.actionable, vec!["Note water dreams"]);
}

#[test]
fn optional_sections_stay_empty_when_absent() {
    let report = assemble(&full_analysis(), &ctx()).expect("report");
    assert!(report.life_area_insights.is_empty());
    assert!(report.word_frequency.is_empty());
    assert!(report.timeline.is_empty());
    assert!(report.personal_growth.is_empty());
}

#[test]
fn optional_sections_are_carried_through() {
    let mut raw = full_analysis();
    let obj = raw.as_object_mut().unwrap();
    obj.insert("lifeAreaInsights".into(), json!([{"area": "Work", "challenges": ["deadlines"], "strengths": ["focus"]}]));
    obj.insert("wordFrequency".into(), json!([{"word": "water", "count": 2}, {"word": "house", "count": "5"}]));
    obj.insert("timeline".into(), json!([{"timeframe": "2024-03", "dominantThemes": ["transition"], "summary": "calmer"}]));
    obj.insert("personalGrowth".into(), json!({"potentialAreas": ["trust"], "suggestions": ["meditate"]}));

    let report = assemble(&raw, &ctx()).expect("report");
    assert_eq!(report.life_area_insights[0].area, "Work");
    assert_eq!(report.life_area_insights[0].challenges, vec!["deadlines"]);
    assert_eq!(report.word_frequency[0].word, "house");
    assert_eq!(report.word_frequency[0].count, 5);
    assert_eq!(report.timeline[0].timeframe, "2024-03");
    assert_eq!(report.personal_growth.potential_areas, vec!["trust"]);
}

#[test]
fn dominant_mood_falls_back_to_measured_label() {
    let mut raw = full_analysis();
    raw["overview"] = json!({"summary": "short"});
    let report = assemble(&raw, &ctx()).expect("report");
    assert_eq!(report.overview.dominant_mood, "positive");
}

#[test]
fn report_serializes_in_camel_case() {
    let report = assemble(&full_analysis(), &ctx()).expect("report");
    let v = serde_json::to_value(&report).unwrap();
    assert!(v.get("recurringSymbols").is_some());
    assert_eq!(v["emotionalPatterns"][1]["trend"], "rising");
    assert_eq!(v["overview"]["totalEntries"], 3);
}

#[test]
fn analysis_text_with_fence_parses() {
    let text = format!("```json\n{}\n```", full_analysis());
    let raw = parse_analysis_text(&text).expect("parsed");
    assert!(assemble(&raw, &ctx()).is_ok());

    let err = parse_analysis_text("Sorry, I cannot help with that.").unwrap_err();
    assert!(err.is_retryable());
}
