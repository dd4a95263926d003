//! Turning ranked messages into an answer.
//!
//! The query picks an [`Intent`]; the intent picks which extraction
//! template runs over each matched message.

mod extract;

use std::fmt;

use serde::Serialize;

use crate::mail::Email;
use crate::search::Score;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Contract,
    Transfer,
    Performance,
    Injury,
    General,
}

/// Checked in order; the first intent with a matching keyword wins.
const INTENT_KEYWORDS: &[(Intent, &[&str])] = &[
    (Intent::Contract, &["契約", "年俸", "給与", "salary", "contract"]),
    (Intent::Transfer, &["移籍", "transfer", "移籍金"]),
    (
        Intent::Performance,
        &["出場", "appearances", "試合", "matches", "ゴール", "goals"],
    ),
    (Intent::Injury, &["怪我", "injury", "負傷"]),
];

impl Intent {
    pub fn classify(query: &str) -> Self {
        let query = query.to_lowercase();
        INTENT_KEYWORDS
            .iter()
            .find(|(_, words)| words.iter().any(|word| query.contains(word)))
            .map(|(intent, _)| *intent)
            .unwrap_or(Intent::General)
    }

    pub fn heading(&self) -> &'static str {
        match self {
            Intent::Contract => "Contract information",
            Intent::Transfer => "Transfer information",
            Intent::Performance => "Performance statistics",
            Intent::Injury => "Injury information",
            Intent::General => "Related information",
        }
    }

    fn extract(&self, email: &Email) -> Vec<Fact> {
        let text = format!("{}\n{}", email.subject, email.body);
        match self {
            Intent::Contract => extract::contract_facts(&text),
            Intent::Transfer => extract::transfer_facts(&text),
            Intent::Performance => extract::performance_facts(&text),
            Intent::Injury => extract::injury_facts(&text),
            Intent::General => extract::excerpt(&email.body),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fact {
    pub label: String,
    pub value: String,
}

impl Fact {
    pub fn new(label: &str, value: String) -> Self {
        Self {
            label: label.to_string(),
            value,
        }
    }
}

/// Facts pulled from one message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceFacts {
    pub source: String,
    pub subject: String,
    pub score: Score,
    pub facts: Vec<Fact>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Answer {
    pub query: String,
    pub intent: Intent,
    pub sources: Vec<SourceFacts>,
}

impl Answer {
    /// Build an answer from messages in rank order.
    ///
    /// A message with nothing extractable still appears, with no facts.
    pub fn build<'a>(query: &str, matched: impl IntoIterator<Item = (&'a Email, Score)>) -> Self {
        let intent = Intent::classify(query);
        let sources = matched
            .into_iter()
            .map(|(email, score)| SourceFacts {
                source: email.source(),
                subject: email.subject.clone(),
                score,
                facts: intent.extract(email),
            })
            .collect();

        Self {
            query: query.to_string(),
            intent,
            sources,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return writeln!(f, "No relevant emails were found.");
        }

        writeln!(f, "{}:", self.intent.heading())?;
        for source in &self.sources {
            writeln!(f)?;
            writeln!(f, "**Source: {}**", source.source)?;
            if !source.subject.is_empty() {
                writeln!(f, "Subject: {} (score: {})", source.subject, source.score)?;
            }
            for fact in &source.facts {
                writeln!(f, "- {}: {}", fact.label, fact.value)?;
            }
        }
        Ok(())
    }
}
