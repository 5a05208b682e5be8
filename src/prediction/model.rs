use serde::{Deserialize, Serialize};

/// Match state reported by the model when the fixture is in progress or finished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchStatus {
    Live,
    HalfTime,
    FullTime,
    Scheduled,
}

impl MatchStatus {
    /// Lenient parse of the status strings models tend to emit ("HT", "Full Time", "in play", ...)
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized: String = raw
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();

        match normalized.as_str() {
            "live" | "inplay" | "inprogress" | "playing" => Some(Self::Live),
            "halftime" | "ht" => Some(Self::HalfTime),
            "fulltime" | "ft" | "finished" | "ended" => Some(Self::FullTime),
            "scheduled" | "upcoming" | "notstarted" | "ns" => Some(Self::Scheduled),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Live => "LIVE",
            Self::HalfTime => "HT",
            Self::FullTime => "FT",
            Self::Scheduled => "Scheduled",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveScore {
    pub home: u32,
    pub away: u32,
    pub status: MatchStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clock: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoubleChance {
    #[serde(rename = "1X")]
    pub home_or_draw: f64,
    #[serde(rename = "12")]
    pub home_or_away: f64,
    #[serde(rename = "X2")]
    pub draw_or_away: f64,
}

impl Default for DoubleChance {
    fn default() -> Self {
        Self {
            home_or_draw: 60.0,
            home_or_away: 80.0,
            draw_or_away: 40.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AsianHandicap {
    pub line: String,
    pub home_prob: f64,
    pub away_prob: f64,
}

impl Default for AsianHandicap {
    fn default() -> Self {
        Self {
            line: "0.0".to_string(),
            home_prob: 50.0,
            away_prob: 50.0,
        }
    }
}

/// All market probabilities, in percent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Probabilities {
    pub home_win: f64,
    pub draw: f64,
    pub away_win: f64,
    pub over25: f64,
    pub under25: f64,
    pub btts_yes: f64,
    pub btts_no: f64,
    pub double_chance: DoubleChance,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asian_handicap: Option<AsianHandicap>,
}

impl Default for Probabilities {
    fn default() -> Self {
        Self {
            home_win: 33.0,
            draw: 34.0,
            away_win: 33.0,
            over25: 50.0,
            under25: 50.0,
            btts_yes: 50.0,
            btts_no: 50.0,
            double_chance: DoubleChance::default(),
            asian_handicap: Some(AsianHandicap::default()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectScore {
    pub score: String,
    pub probability: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Market {
    pub name: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probability: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerProp {
    pub player_name: String,
    pub market: String,
    pub prediction: String,
    pub probability: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Variables {
    pub form: String,
    pub h2h: String,
    pub injuries: String,
    pub tactics: String,
}

/// Grounding citation attached by the search tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub title: String,
    pub uri: String,
}

/// A fully populated prediction, built once per successful call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResult {
    pub match_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub live_score: Option<LiveScore>,
    pub probabilities: Probabilities,
    pub correct_scores: Vec<CorrectScore>,
    pub additional_markets: Vec<Market>,
    pub player_props: Vec<PlayerProp>,
    pub variables: Variables,
    pub analysis: String,
    pub key_factors: Vec<String>,
    pub suggested_bet: String,
    pub confidence: f64,
    pub sources: Vec<Source>,
    pub suggested_follow_ups: Vec<String>,
}

impl PredictionResult {
    /// Analysis text cut to at most `max_chars` characters, with a trailing ellipsis when cut
    pub fn analysis_preview(&self, max_chars: usize) -> String {
        truncate_chars(&self.analysis, max_chars)
    }
}

/// Truncate on a char boundary, appending "..." when anything was removed
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", text[..idx].trim_end()),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_status_parse() {
        assert_eq!(MatchStatus::parse("LIVE"), Some(MatchStatus::Live));
        assert_eq!(MatchStatus::parse("half-time"), Some(MatchStatus::HalfTime));
        assert_eq!(MatchStatus::parse("HT"), Some(MatchStatus::HalfTime));
        assert_eq!(MatchStatus::parse("Full Time"), Some(MatchStatus::FullTime));
        assert_eq!(MatchStatus::parse("scheduled"), Some(MatchStatus::Scheduled));
        assert_eq!(MatchStatus::parse("postponed"), None);
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("short", 15), "short");
        assert_eq!(
            truncate_chars("BBC Sport - Premier League", 15),
            "BBC Sport - Pre..."
        );
        // multi-byte characters must not be split
        assert_eq!(truncate_chars("Atlético Madrid", 5), "Atlét...");
    }

    #[test]
    fn test_serializes_with_wire_names() {
        let json = serde_json::to_value(Probabilities::default()).unwrap();

        assert_eq!(json["homeWin"], 33.0);
        assert_eq!(json["doubleChance"]["1X"], 60.0);
        assert_eq!(json["asianHandicap"]["line"], "0.0");
    }
}
