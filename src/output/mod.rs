//! Rendering of finished searches.
use crate::i18n::{Locale, MessageKey, message};
use crate::search::SearchOutcome;
use clap::ValueEnum;
use colored::*;
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Turns a finished search into the text shown to the user.
pub trait OutputFormatterTrait: Send + Sync {
    fn format(&self, outcome: &SearchOutcome, term: &str) -> String;
    fn name(&self) -> &str;
}

pub fn formatter_for(format: OutputFormat, locale: Locale) -> Box<dyn OutputFormatterTrait> {
    match format {
        OutputFormat::Text => Box::new(TextFormatter::new(locale)),
        OutputFormat::Json => Box::new(JsonFormatter),
    }
}

pub struct TextFormatter {
    locale: Locale,
    use_color: bool,
}

impl TextFormatter {
    pub fn new(locale: Locale) -> Self {
        Self {
            locale,
            use_color: is_terminal::is_terminal(&std::io::stdout()),
        }
    }

    pub fn plain(locale: Locale) -> Self {
        Self {
            locale,
            use_color: false,
        }
    }

    fn paint(&self, text: String, style: fn(ColoredString) -> ColoredString) -> String {
        if self.use_color {
            style(text.as_str().normal()).to_string()
        } else {
            text
        }
    }
}

impl OutputFormatterTrait for TextFormatter {
    fn format(&self, outcome: &SearchOutcome, term: &str) -> String {
        let mut lines = Vec::new();

        if outcome.matches.is_empty() {
            lines.push(self.paint(
                message(MessageKey::NoMatches, self.locale, &[("term", term)]),
                |s| s.yellow(),
            ));
            return lines.join("\n") + "\n";
        }

        let count = outcome.file_count().to_string();
        lines.push(self.paint(
            message(
                MessageKey::Found,
                self.locale,
                &[("term", term), ("count", &count)],
            ),
            |s| s.green(),
        ));
        lines.push(String::new());
        lines.push(self.paint(
            message(MessageKey::ResultsHeader, self.locale, &[]),
            |s| s.green().bold(),
        ));

        for found in &outcome.matches {
            let path = found.path.display().to_string();
            let numbers = found
                .lines
                .iter()
                .map(|n| n.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            let hits = found.count().to_string();
            lines.push(self.paint(
                message(MessageKey::ResultFile, self.locale, &[("path", &path)]),
                |s| s.cyan(),
            ));
            lines.push(message(
                MessageKey::ResultLines,
                self.locale,
                &[("count", &hits), ("lines", &numbers)],
            ));
        }

        lines.join("\n") + "\n"
    }

    fn name(&self) -> &str {
        "text"
    }
}

pub struct JsonFormatter;

impl OutputFormatterTrait for JsonFormatter {
    fn format(&self, outcome: &SearchOutcome, term: &str) -> String {
        let results: Vec<_> = outcome
            .matches
            .iter()
            .map(|m| {
                json!({
                    "path": m.path.display().to_string(),
                    "count": m.count(),
                    "lines": m.lines,
                })
            })
            .collect();
        let doc = json!({
            "term": term,
            "files": outcome.file_count(),
            "results": results,
        });
        serde_json::to_string_pretty(&doc).unwrap_or_else(|_| "{}".to_string()) + "\n"
    }

    fn name(&self) -> &str {
        "json"
    }
}
