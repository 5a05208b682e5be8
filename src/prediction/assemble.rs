//! Builds a fully populated [`PredictionResult`] from whatever the model returned.
//!
//! Every field falls back to a fixed default when it is missing or has the
//! wrong shape, so rendering never has to branch on absent data.

use serde_json::{Map, Value};

use super::model::{
    AsianHandicap, CorrectScore, DoubleChance, LiveScore, Market, MatchStatus, PlayerProp,
    PredictionResult, Probabilities, Source, Variables,
};
use crate::llm::client::Citation;
use crate::llm::extract::strip_structured_blocks;

pub const DEFAULT_MATCH_NAME: &str = "Match Analysis";
pub const DEFAULT_SUGGESTED_BET: &str = "No clear suggestion";
pub const DEFAULT_CONFIDENCE: f64 = 50.0;
pub const DEFAULT_SOURCE_TITLE: &str = "Source";
pub const DEFAULT_SOURCE_URI: &str = "#";

/// Merge parsed fields, citations and prose into one result. Total: never fails.
pub fn assemble(
    parsed: Option<&Map<String, Value>>,
    citations: &[Citation],
    raw_text: &str,
) -> PredictionResult {
    let empty = Map::new();
    let data = parsed.unwrap_or(&empty);

    PredictionResult {
        match_name: non_empty_str(data.get("matchName"))
            .unwrap_or(DEFAULT_MATCH_NAME)
            .to_string(),
        live_score: data.get("liveScore").and_then(live_score),
        probabilities: data
            .get("probabilities")
            .and_then(Value::as_object)
            .map(probabilities)
            .unwrap_or_default(),
        correct_scores: list(data.get("correctScores"), correct_score),
        additional_markets: list(data.get("additionalMarkets"), market),
        player_props: list(data.get("playerProps"), player_prop),
        variables: data
            .get("variables")
            .and_then(Value::as_object)
            .map(variables)
            .unwrap_or_default(),
        analysis: strip_structured_blocks(raw_text).trim().to_string(),
        key_factors: string_list(data.get("keyFactors")),
        suggested_bet: non_empty_str(data.get("suggestedBet"))
            .unwrap_or(DEFAULT_SUGGESTED_BET)
            .to_string(),
        confidence: percent(data.get("confidence")).unwrap_or(DEFAULT_CONFIDENCE),
        sources: citations.iter().map(source).collect(),
        suggested_follow_ups: string_list(data.get("suggestedFollowUps")),
    }
}

/// A number in [0, 100]; anything else counts as absent
fn percent(value: Option<&Value>) -> Option<f64> {
    value
        .and_then(Value::as_f64)
        .filter(|p| (0.0..=100.0).contains(p))
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Strings pass through; numbers and bools are rendered, since models
/// sometimes emit `"value": 9.5` where a string was documented
fn loose_str(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn list<T, F>(value: Option<&Value>, item: F) -> Vec<T>
where
    F: Fn(&Value) -> Option<T>,
{
    value
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(|v| item(v)).collect())
        .unwrap_or_default()
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    list(value, |v: &Value| non_empty_str(Some(v)).map(str::to_string))
}

fn probabilities(block: &Map<String, Value>) -> Probabilities {
    let defaults = Probabilities::default();
    let field = |key: &str, fallback: f64| percent(block.get(key)).unwrap_or(fallback);

    Probabilities {
        home_win: field("homeWin", defaults.home_win),
        draw: field("draw", defaults.draw),
        away_win: field("awayWin", defaults.away_win),
        over25: field("over25", defaults.over25),
        under25: field("under25", defaults.under25),
        btts_yes: field("bttsYes", defaults.btts_yes),
        btts_no: field("bttsNo", defaults.btts_no),
        double_chance: block
            .get("doubleChance")
            .and_then(Value::as_object)
            .map(double_chance)
            .unwrap_or_default(),
        asian_handicap: block
            .get("asianHandicap")
            .and_then(Value::as_object)
            .and_then(asian_handicap),
    }
}

fn double_chance(block: &Map<String, Value>) -> DoubleChance {
    let defaults = DoubleChance::default();
    DoubleChance {
        home_or_draw: percent(block.get("1X")).unwrap_or(defaults.home_or_draw),
        home_or_away: percent(block.get("12")).unwrap_or(defaults.home_or_away),
        draw_or_away: percent(block.get("X2")).unwrap_or(defaults.draw_or_away),
    }
}

fn asian_handicap(block: &Map<String, Value>) -> Option<AsianHandicap> {
    Some(AsianHandicap {
        line: loose_str(block.get("line"))?,
        home_prob: percent(block.get("homeProb"))?,
        away_prob: percent(block.get("awayProb"))?,
    })
}

fn live_score(value: &Value) -> Option<LiveScore> {
    let block = value.as_object()?;
    let status = block
        .get("status")
        .and_then(Value::as_str)
        .and_then(MatchStatus::parse)?;

    Some(LiveScore {
        home: goals(block.get("home"))?,
        away: goals(block.get("away"))?,
        status,
        clock: non_empty_str(block.get("clock")).map(str::to_string),
    })
}

/// Goal count: a non-negative whole number, `2` or `2.0`.
/// Missing or null reads as 0; any other value is invalid.
fn goals(value: Option<&Value>) -> Option<u32> {
    let value = match value {
        None | Some(Value::Null) => return Some(0),
        Some(v) => v,
    };

    let count = match value.as_u64() {
        Some(n) => n,
        None => value
            .as_f64()
            .filter(|g| g.fract() == 0.0 && *g >= 0.0 && *g <= f64::from(u32::MAX))
            .map(|g| g as u64)?,
    };
    u32::try_from(count).ok()
}

fn correct_score(value: &Value) -> Option<CorrectScore> {
    Some(CorrectScore {
        score: loose_str(value.get("score"))?,
        probability: percent(value.get("probability"))?,
    })
}

fn market(value: &Value) -> Option<Market> {
    Some(Market {
        name: non_empty_str(value.get("name"))?.to_string(),
        value: loose_str(value.get("value")).unwrap_or_default(),
        probability: percent(value.get("probability")),
    })
}

fn player_prop(value: &Value) -> Option<PlayerProp> {
    Some(PlayerProp {
        player_name: non_empty_str(value.get("playerName"))?.to_string(),
        market: loose_str(value.get("market")).unwrap_or_default(),
        prediction: loose_str(value.get("prediction")).unwrap_or_default(),
        probability: percent(value.get("probability"))?,
    })
}

fn variables(block: &Map<String, Value>) -> Variables {
    let text = |key: &str| loose_str(block.get(key)).unwrap_or_default();
    Variables {
        form: text("form"),
        h2h: text("h2h"),
        injuries: text("injuries"),
        tactics: text("tactics"),
    }
}

fn source(citation: &Citation) -> Source {
    Source {
        title: citation
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_SOURCE_TITLE)
            .to_string(),
        uri: citation
            .uri
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .unwrap_or(DEFAULT_SOURCE_URI)
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::extract::parse_structured;
    use serde_json::json;

    fn assemble_text(text: &str) -> PredictionResult {
        let parsed = parse_structured(text);
        assemble(parsed.as_ref(), &[], text)
    }

    #[test]
    fn test_no_structured_block_uses_defaults() {
        let result = assemble_text("I could not find that fixture.");

        assert_eq!(result.match_name, DEFAULT_MATCH_NAME);
        assert_eq!(result.probabilities.home_win, 33.0);
        assert_eq!(result.probabilities.draw, 34.0);
        assert_eq!(result.probabilities.away_win, 33.0);
        assert_eq!(result.probabilities.over25, 50.0);
        assert_eq!(result.probabilities.btts_no, 50.0);
        assert_eq!(result.probabilities.double_chance, DoubleChance::default());
        assert_eq!(
            result.probabilities.asian_handicap,
            Some(AsianHandicap::default())
        );
        assert_eq!(result.confidence, 50.0);
        assert!(result.correct_scores.is_empty());
        assert!(result.additional_markets.is_empty());
        assert!(result.player_props.is_empty());
        assert_eq!(result.variables, Variables::default());
        assert!(result.key_factors.is_empty());
        assert_eq!(result.suggested_bet, DEFAULT_SUGGESTED_BET);
        assert!(result.live_score.is_none());
        assert_eq!(result.analysis, "I could not find that fixture.");
    }

    #[test]
    fn test_empty_text_is_fully_defaulted() {
        let result = assemble_text("");
        assert_eq!(result.match_name, DEFAULT_MATCH_NAME);
        assert_eq!(result.analysis, "");
        assert_eq!(result.probabilities, Probabilities::default());
    }

    #[test]
    fn test_malformed_block_is_fully_defaulted() {
        let result = assemble_text("Preview\n```json\n{\"matchName\": \"A vs B\", \n```");

        assert_eq!(result.match_name, DEFAULT_MATCH_NAME);
        assert_eq!(result.probabilities, Probabilities::default());
        assert_eq!(result.analysis, "Preview");
    }

    #[test]
    fn test_valid_payload_is_copied_verbatim() {
        let payload = json!({
            "matchName": "Real Madrid vs Liverpool",
            "liveScore": { "home": 1, "away": 0, "status": "live", "clock": "67'" },
            "probabilities": {
                "homeWin": 47.5, "draw": 26, "awayWin": 26.5,
                "over25": 58, "under25": 42,
                "bttsYes": 55, "bttsNo": 45,
                "doubleChance": { "1X": 73.5, "12": 74, "X2": 52.5 },
                "asianHandicap": { "line": "-0.5/+0.5", "homeProb": 48, "awayProb": 52 }
            },
            "correctScores": [ { "score": "2-1", "probability": 11.5 }, { "score": "1-1", "probability": 10 } ],
            "additionalMarkets": [ { "name": "Corners Over 9.5", "value": "Yes", "probability": 61 } ],
            "playerProps": [ { "playerName": "Mbappe", "market": "Anytime Goalscorer", "prediction": "Yes", "probability": 44 } ],
            "variables": { "form": "WWDWL", "h2h": "3-1-1", "injuries": "Alisson doubtful", "tactics": "High press" },
            "keyFactors": ["Home advantage", "Liverpool rotation"],
            "suggestedBet": "Over 2.5 Goals",
            "confidence": 68,
            "suggestedFollowUps": ["What about corners?"]
        });
        let text = format!("Solid home edge.\n```json\n{}\n```", payload);
        let result = assemble_text(&text);

        assert_eq!(result.match_name, "Real Madrid vs Liverpool");
        assert_eq!(
            result.live_score,
            Some(LiveScore {
                home: 1,
                away: 0,
                status: MatchStatus::Live,
                clock: Some("67'".to_string()),
            })
        );
        let p = &result.probabilities;
        assert_eq!((p.home_win, p.draw, p.away_win), (47.5, 26.0, 26.5));
        assert_eq!((p.over25, p.under25, p.btts_yes, p.btts_no), (58.0, 42.0, 55.0, 45.0));
        assert_eq!(p.double_chance.home_or_draw, 73.5);
        assert_eq!(p.double_chance.draw_or_away, 52.5);
        assert_eq!(
            p.asian_handicap,
            Some(AsianHandicap {
                line: "-0.5/+0.5".to_string(),
                home_prob: 48.0,
                away_prob: 52.0,
            })
        );
        assert_eq!(result.correct_scores.len(), 2);
        assert_eq!(result.correct_scores[0].probability, 11.5);
        assert_eq!(result.additional_markets[0].probability, Some(61.0));
        assert_eq!(result.player_props[0].player_name, "Mbappe");
        assert_eq!(result.variables.injuries, "Alisson doubtful");
        assert_eq!(result.key_factors.len(), 2);
        assert_eq!(result.suggested_bet, "Over 2.5 Goals");
        assert_eq!(result.confidence, 68.0);
        assert_eq!(result.suggested_follow_ups, vec!["What about corners?"]);
        assert_eq!(result.analysis, "Solid home edge.");
    }

    #[test]
    fn test_bad_fields_fall_back_individually() {
        let parsed = json!({
            "matchName": "   ",
            "probabilities": {
                "homeWin": "fifty",
                "draw": 120,
                "awayWin": 30,
                "asianHandicap": { "line": "-1", "homeProb": 40 }
            },
            "correctScores": [ { "score": "1-0", "probability": 9 }, { "score": "2-0" }, "3-0" ],
            "confidence": -5
        });
        let result = assemble(parsed.as_object(), &[], "");

        assert_eq!(result.match_name, DEFAULT_MATCH_NAME);
        assert_eq!(result.probabilities.home_win, 33.0);
        assert_eq!(result.probabilities.draw, 34.0);
        assert_eq!(result.probabilities.away_win, 30.0);
        assert_eq!(result.probabilities.double_chance, DoubleChance::default());
        assert!(result.probabilities.asian_handicap.is_none());
        assert_eq!(result.correct_scores.len(), 1);
        assert_eq!(result.confidence, DEFAULT_CONFIDENCE);
    }

    #[test]
    fn test_zero_confidence_is_kept() {
        let parsed = json!({ "confidence": 0 });
        let result = assemble(parsed.as_object(), &[], "");
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn test_unknown_live_status_drops_live_score() {
        let parsed = json!({ "liveScore": { "home": 2, "away": 2, "status": "abandoned" } });
        let result = assemble(parsed.as_object(), &[], "");
        assert!(result.live_score.is_none());
    }

    #[test]
    fn test_citations_become_sources() {
        let citations = vec![
            Citation {
                title: Some("ESPN match preview".to_string()),
                uri: Some("https://espn.com/preview".to_string()),
            },
            Citation {
                title: None,
                uri: None,
            },
        ];
        let result = assemble(None, &citations, "");

        assert_eq!(result.sources.len(), 2);
        assert_eq!(result.sources[0].title, "ESPN match preview");
        assert_eq!(result.sources[1].title, DEFAULT_SOURCE_TITLE);
        assert_eq!(result.sources[1].uri, DEFAULT_SOURCE_URI);
    }

    #[test]
    fn test_assembly_is_repeatable() {
        let text = "text\n```json\n{\"matchName\":\"A vs B\",\"confidence\":61}\n```";
        assert_eq!(assemble_text(text), assemble_text(text));
    }

    #[test]
    fn test_brace_span_is_removed_from_analysis() {
        let text = "Hosts look strong. {\"matchName\":\"A vs B\",\"confidence\":70}";
        let result = assemble_text(text);

        assert_eq!(result.match_name, "A vs B");
        assert_eq!(result.confidence, 70.0);
        assert_eq!(result.analysis, "Hosts look strong.");
    }

    #[test]
    fn test_whole_float_goals_are_copied() {
        let parsed = json!({ "liveScore": { "home": 2.0, "away": 1, "status": "live" } });
        let live = assemble(parsed.as_object(), &[], "").live_score.unwrap();
        assert_eq!((live.home, live.away), (2, 1));
    }

    #[test]
    fn test_invalid_goals_drop_live_score() {
        for home in [json!(1.5), json!(-1), json!("two"), json!([2])] {
            let parsed = json!({ "liveScore": { "home": home, "away": 0, "status": "live" } });
            assert!(assemble(parsed.as_object(), &[], "").live_score.is_none());
        }
    }

    #[test]
    fn test_missing_goals_read_as_zero() {
        let parsed = json!({ "liveScore": { "status": "scheduled", "away": null } });
        let live = assemble(parsed.as_object(), &[], "").live_score.unwrap();
        assert_eq!((live.home, live.away), (0, 0));
        assert_eq!(live.status, MatchStatus::Scheduled);
    }
}
