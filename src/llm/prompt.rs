const PREDICTION_FRAMEWORK: &str = r#"You are an advanced Predictive Sports Analytics Engine.
Task: Analyze the match/game request: "{query}".

You must provide a comprehensive breakdown including:
- Main markets (1X2, O/U 2.5, BTTS).
- Advanced markets (Asian Handicap, Corners O/U, Cards O/U).
- Player Performance (Anytime goalscorer, Player cards, Shots on target).
- Tactical analysis and Variable synthesis (Form, H2H, Injuries).
- If the match is in progress or finished, the current score and match status.

Return your response with a structured JSON block at the end enclosed in triple backticks with 'json' tag.
Ensure all probability values are numbers between 0 and 100.

The JSON structure MUST follow this interface:
{
  "matchName": "Team A vs Team B",
  "liveScore": { "home": number, "away": number, "status": "live" | "half-time" | "full-time" | "scheduled", "clock": "string" },
  "probabilities": {
    "homeWin": number, "draw": number, "awayWin": number,
    "over25": number, "under25": number,
    "bttsYes": number, "bttsNo": number,
    "doubleChance": { "1X": number, "12": number, "X2": number },
    "asianHandicap": { "line": "-0.5/+0.5", "homeProb": number, "awayProb": number }
  },
  "correctScores": [ { "score": "string", "probability": number } ],
  "additionalMarkets": [ { "name": "Corners Over 9.5", "value": "string", "probability": number } ],
  "playerProps": [ { "playerName": "string", "market": "Anytime Goalscorer", "prediction": "Yes", "probability": number } ],
  "variables": { "form": "string", "h2h": "string", "injuries": "string", "tactics": "string" },
  "keyFactors": ["string"],
  "suggestedBet": "string",
  "confidence": number,
  "suggestedFollowUps": ["What about corners?", "Any anytime goalscorers?", "Show H2H history"]
}

Omit "liveScore" when the match has not kicked off.
Be statistical. Use Google Search for the latest lineups, form, and odds."#;

/// Fill the prediction template with the user's query, verbatim
pub fn build_prompt(query: &str) -> String {
    PREDICTION_FRAMEWORK.replace("{query}", query)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_embedded_verbatim() {
        let prompt = build_prompt("Real Madrid vs Liverpool \"tonight\"");
        assert!(prompt.contains("request: \"Real Madrid vs Liverpool \"tonight\"\"."));
        assert!(!prompt.contains("{query}"));
    }

    #[test]
    fn test_prompt_mandates_schema_and_search() {
        let prompt = build_prompt("Arsenal vs Chelsea");

        assert!(prompt.contains("triple backticks with 'json' tag"));
        assert!(prompt.contains("between 0 and 100"));
        assert!(prompt.contains("\"homeWin\""));
        assert!(prompt.contains("\"suggestedFollowUps\""));
        assert!(prompt.contains("Use Google Search"));
    }

    #[test]
    fn test_query_with_placeholder_text_is_not_expanded_twice() {
        // the template is filled once, so a query mentioning {query} stays literal
        let prompt = build_prompt("{query}");
        assert_eq!(prompt.matches("{query}").count(), 1);
    }
}
