use console::Style;
use std::io::{self, Write};
use std::path::Path;

use crate::config::AppConfig;
use crate::models::{ChatMessage, Role};
use crate::prediction::model::truncate_chars;
use crate::prediction::PredictionResult;

const BAR_WIDTH: usize = 20;
const FOOTER: &str = "Statistical probabilities only • Gamble responsibly";

/// Display limits taken from config.toml
#[derive(Debug, Clone, Copy)]
pub struct DisplayOptions {
    pub analysis_preview_chars: usize,
    pub source_title_chars: usize,
}

impl DisplayOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            analysis_preview_chars: config.analysis_preview_chars,
            source_title_chars: config.source_title_chars,
        }
    }
}

/// Terminal output formatting.
/// Cargo-style status lines go to stderr; chat bubbles and predictions to stdout.
pub struct Output {
    green: Style,
    blue: Style,
    bold: Style,
    dim: Style,
}

impl Output {
    pub fn new() -> Self {
        Self {
            green: Style::new().green().bold(),
            blue: Style::new().cyan().bold(),
            bold: Style::new().bold(),
            dim: Style::new().dim(),
        }
    }

    /// Status line for an operation in progress
    /// Format: "   Analyzing Real Madrid vs Liverpool" (verb right-aligned to 12 columns)
    pub fn status(&self, action: &str, target: &str) {
        eprintln!("{:>12} {}", self.green.apply_to(action), target);
    }

    /// Created or found a resource
    /// Format: "    Creating config at /path/to/config"
    /// Followed by a blank line
    pub fn resource_action(&self, action: &str, resource: &str, path: &Path) {
        eprintln!(
            "{:>12} {} at {}",
            self.green.apply_to(action),
            resource,
            path.display()
        );
        eprintln!();
    }

    /// Completion line
    /// Format: "    Finished chat session for global scope"
    /// Preceded by a blank line
    pub fn finish(&self, action: &str, scope: &str) {
        eprintln!();
        eprintln!(
            "{:>12} {} for {} scope",
            self.green.apply_to("Finished"),
            action,
            scope
        );
    }

    /// Dimmed side remark
    /// Format: "        Note /menu for quick options"
    pub fn note(&self, message: &str) {
        eprintln!("{:>12} {}", self.dim.apply_to("Note"), message);
    }

    /// Yellow warning, padded by blank lines
    /// Format: "     Warning this will delete the stored conversation"
    pub fn warning(&self, message: &str) {
        eprintln!();
        eprintln!(
            "{:>12} {}",
            Style::new().yellow().bold().apply_to("Warning"),
            message
        );
        eprintln!();
    }

    /// Red error on stderr
    /// Format: "       Error Prediction failed after 3 attempts: ..."
    pub fn error(&self, message: &str) {
        eprintln!(
            "{:>12} {}",
            Style::new().red().bold().apply_to("Error"),
            message
        );
    }

    /// Plain message on stdout, indented past the verb column
    /// Format: "             Conversation cleared."
    pub fn info(&self, message: &str) {
        println!("{:>12} {}", "", message);
    }

    /// Confirmation prompt; returns whether the user typed `expected`
    /// Format: "             Type yes to confirm: "
    pub fn confirm(&self, expected: &str) -> io::Result<bool> {
        println!();
        print!(
            "{:>12} Type {} to confirm: ",
            "",
            Style::new().green().bold().apply_to(expected)
        );
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;

        Ok(input.trim() == expected)
    }

    /// One chat bubble, with the rendered prediction when it carries one
    /// Format: "You 21:04"
    ///         "  Real Madrid vs Liverpool"
    /// Followed by a blank line
    pub fn message(&self, message: &ChatMessage, options: &DisplayOptions) {
        let (who, style) = match message.role {
            Role::User => ("You", &self.green),
            Role::Assistant => ("Bot", &self.blue),
        };
        let time = message
            .timestamp()
            .map(|t| t.with_timezone(&chrono::Local).format("%H:%M").to_string())
            .unwrap_or_default();

        println!("{} {}", style.apply_to(who), self.dim.apply_to(time));
        for line in message.content.lines() {
            println!("  {}", line);
        }
        if let Some(prediction) = &message.prediction {
            self.prediction(prediction, options);
        }
        println!();
    }

    /// Every bubble of a transcript, oldest first
    pub fn transcript(&self, messages: &[ChatMessage], options: &DisplayOptions) {
        for message in messages {
            self.message(message, options);
        }
    }

    /// Full prediction card: header, optional live score, market sections,
    /// suggested bet, sources, numbered follow-ups and footer
    /// Format: "  Real Madrid vs Liverpool"
    ///         "  LIVE 1 - 0 67'"
    ///         "  Home       █████████░░░░░░░░░░░ 47%"
    pub fn prediction(&self, p: &PredictionResult, options: &DisplayOptions) {
        println!();
        println!("  {}", self.bold.apply_to(&p.match_name));

        if let Some(live) = &p.live_score {
            let clock = live
                .clock
                .as_deref()
                .map(|c| format!(" {}", c))
                .unwrap_or_default();
            println!(
                "  {} {} - {}{}",
                Style::new().red().bold().apply_to(live.status.label()),
                live.home,
                live.away,
                self.dim.apply_to(clock)
            );
        }

        let probs = &p.probabilities;
        self.section("Match Result");
        self.bar("Home", probs.home_win);
        self.bar("Draw", probs.draw);
        self.bar("Away", probs.away_win);

        self.section("Goals");
        self.bar("Over 2.5", probs.over25);
        self.bar("Under 2.5", probs.under25);
        self.bar("BTTS Yes", probs.btts_yes);
        self.bar("BTTS No", probs.btts_no);

        self.section("Double Chance");
        let dc = &probs.double_chance;
        println!(
            "  1X {}   12 {}   X2 {}",
            percent(dc.home_or_draw),
            percent(dc.home_or_away),
            percent(dc.draw_or_away)
        );

        if let Some(ah) = &probs.asian_handicap {
            self.section(&format!("Asian Handicap {}", ah.line));
            self.bar("Home", ah.home_prob);
            self.bar("Away", ah.away_prob);
        }

        if !p.correct_scores.is_empty() {
            self.section("Correct Score");
            let scores: Vec<String> = p
                .correct_scores
                .iter()
                .map(|cs| format!("{} {}", self.bold.apply_to(&cs.score), percent(cs.probability)))
                .collect();
            println!("  {}", scores.join("   "));
        }

        if !p.additional_markets.is_empty() {
            self.section("Markets");
            for market in &p.additional_markets {
                let prob = market.probability.map(percent).unwrap_or_default();
                println!("  {:<28} {:<10} {}", market.name, market.value, prob);
            }
        }

        if !p.player_props.is_empty() {
            self.section("Player Props");
            for prop in &p.player_props {
                println!(
                    "  {:<20} {:<22} {:<6} {}",
                    prop.player_name,
                    prop.market,
                    prop.prediction,
                    percent(prop.probability)
                );
            }
        }

        let vars = &p.variables;
        let variables = [
            ("Form", &vars.form),
            ("H2H", &vars.h2h),
            ("Injuries", &vars.injuries),
            ("Tactics", &vars.tactics),
        ];
        if variables.iter().any(|(_, v)| !v.is_empty()) {
            self.section("Variables");
            for (label, value) in variables.iter().filter(|(_, v)| !v.is_empty()) {
                println!("  {:<9} {}", self.dim.apply_to(label), value);
            }
        }

        if !p.key_factors.is_empty() {
            self.section("Key Factors");
            for factor in &p.key_factors {
                println!("  • {}", factor);
            }
        }

        if !p.analysis.is_empty() {
            self.section("Analysis");
            for line in p.analysis_preview(options.analysis_preview_chars).lines() {
                println!("  {}", line);
            }
        }

        println!();
        println!(
            "  {} {}  {}",
            self.green.apply_to("Suggested bet:"),
            p.suggested_bet,
            self.dim
                .apply_to(format!("(confidence {})", percent(p.confidence)))
        );

        if !p.sources.is_empty() {
            let titles: Vec<String> = p
                .sources
                .iter()
                .map(|s| truncate_chars(&s.title, options.source_title_chars))
                .collect();
            println!("  {} {}", self.dim.apply_to("Sources:"), titles.join(" | "));
        }

        if !p.suggested_follow_ups.is_empty() {
            self.section("Ask next");
            for (i, follow_up) in p.suggested_follow_ups.iter().enumerate() {
                println!("  {} {}", self.dim.apply_to(format!("[{}]", i + 1)), follow_up);
            }
        }

        println!();
        println!("  {}", self.dim.apply_to(FOOTER.to_uppercase()));
    }

    /// Section heading, preceded by a blank line
    /// Format: "  MATCH RESULT"
    fn section(&self, title: &str) {
        println!();
        println!("  {}", self.dim.apply_to(title.to_uppercase()));
    }

    /// Labelled probability bar
    /// Format: "  Over 2.5   ████████████░░░░░░░░ 58%"
    fn bar(&self, label: &str, value: f64) {
        println!(
            "  {:<10} {} {}",
            label,
            self.green.apply_to(bar(value)),
            percent(value)
        );
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixed-width bar for a value in [0, 100]
fn bar(value: f64) -> String {
    let filled = ((value.clamp(0.0, 100.0) / 100.0) * BAR_WIDTH as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

/// "47%" or "47.5%"
fn percent(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}%", value)
    } else {
        format!("{:.1}%", value)
    }
}
