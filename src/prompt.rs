use crate::payload::AnalysisRequest;

const RESPONSE_SHAPE: &str = r#"{
  "overview": {"summary": "", "dominantMood": ""},
  "recurringSymbols": [{"symbol": "", "frequency": 0, "description": "", "possibleMeaning": "", "contexts": [""]}],
  "dominantThemes": [{"theme": "", "frequency": 0, "description": "", "relatedSymbols": [""], "emotionalTone": ""}],
  "emotionalPatterns": [{"emotion": "", "averageIntensity": 0.0, "frequency": 0, "trend": "rising|falling|stable", "associatedThemes": [""]}],
  "lifeAreaInsights": [{"area": "", "relatedSymbols": [""], "challenges": [""], "strengths": [""], "suggestions": [""]}],
  "personalGrowth": {"potentialAreas": [""], "suggestions": [""]},
  "timeline": [{"timeframe": "", "dominantThemes": [""], "dominantEmotions": [""], "summary": ""}],
  "recommendations": {"general": [""], "actionable": [""]}
}"#;

/// Text prompt for the external model: instructions, response shape, then the payload.
pub fn render_prompt(request: &AnalysisRequest) -> serde_json::Result<String> {
    let payload = serde_json::to_string_pretty(request)?;
    Ok(format!(
        r#"You will receive {total} diary entries ({dreams} dreams, {journal} journal entries) covering "{range}".
Identify recurring symbols, dominant themes, emotional patterns and how they shift over time.

Answer with a single JSON object of exactly this shape:
{shape}

CONSTRAINTS:
- "frequency" is the share of entries in percent (0-100).
- "averageIntensity" is between 0 and 1.
- Order symbols and themes by descending frequency.
- Use the "periods" of the input as timeframes for "timeline".
- Base every statement on the entries; do not invent events.

INPUT JSON:
<{payload}>"#,
        total = request.counts.total,
        dreams = request.counts.dreams,
        journal = request.counts.journal_entries,
        range = request.time_range,
        shape = RESPONSE_SHAPE,
        payload = payload,
    ))
}
