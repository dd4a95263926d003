//! Regex extraction templates.
//!
//! Every function takes message text and returns the facts it could find,
//! in a fixed order. Nothing found means an empty list.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::Fact;

/// Non-blank lines shown for a general question.
const EXCERPT_LINES: usize = 5;

static WEEKLY_WAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"£([\d,]+)/week|£([\d,]+) per week|Weekly Wage: £([\d,]+)|Base Salary: £([\d,]+) per week",
    )
    .expect("valid wage pattern")
});
static DURATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Duration: (\d+) years|Contract: (\d+) years").expect("valid duration pattern")
});
static BONUS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Bonus: £([\d,]+)").expect("valid bonus pattern"));

static TRANSFER_FEE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Transfer Fee: £([\d,]+) million|Fee: £([\d,]+) million|€([\d,]+) million")
        .expect("valid fee pattern")
});
static FROM_CLUB: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"from ([A-Za-z ]+)").expect("valid club pattern"));

static APPEARANCES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+) appearances").expect("valid appearances pattern"));
static GOALS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+) goals").expect("valid goals pattern"));
static ASSISTS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+) assists").expect("valid assists pattern"));
static CLEAN_SHEETS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+) clean sheets").expect("valid clean sheets pattern"));

/// First participating capture group of an alternation, with its group number.
fn first_group<'t>(caps: &Captures<'t>) -> Option<(usize, &'t str)> {
    caps.iter()
        .enumerate()
        .skip(1)
        .find_map(|(i, m)| m.map(|m| (i, m.as_str())))
}

fn first_number(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|caps| first_group(&caps).map(|(_, value)| value.to_string()))
}

fn push_stat(facts: &mut Vec<Fact>, re: &Regex, text: &str, label: &str, unit: &str) {
    if let Some(n) = first_number(re, text) {
        facts.push(Fact::new(label, format!("{n} {unit}").trim_end().to_string()));
    }
}

pub fn contract_facts(text: &str) -> Vec<Fact> {
    let mut facts = Vec::new();

    if let Some(wage) = first_number(&WEEKLY_WAGE, text) {
        facts.push(Fact::new("Weekly wage", format!("£{wage}")));
    }

    if let Some(years) = first_number(&DURATION, text) {
        facts.push(Fact::new("Contract length", format!("{years} years")));
    }

    let bonuses: Vec<String> = BONUS
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).map(|m| format!("£{}", m.as_str())))
        .collect();
    if !bonuses.is_empty() {
        facts.push(Fact::new("Bonuses", bonuses.join(", ")));
    }

    push_stat(&mut facts, &APPEARANCES, text, "Appearances", "matches");
    push_stat(&mut facts, &GOALS, text, "Goals", "");

    facts
}

pub fn transfer_facts(text: &str) -> Vec<Fact> {
    let mut facts = Vec::new();

    if let Some((group, amount)) = TRANSFER_FEE.captures(text).and_then(|caps| first_group(&caps)) {
        // the third branch is the euro figure
        let currency = if group == 3 { "€" } else { "£" };
        facts.push(Fact::new("Transfer fee", format!("{currency}{amount} million")));
    }

    if let Some(club) = FROM_CLUB
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|club| !club.is_empty())
    {
        facts.push(Fact::new("From club", club.to_string()));
    }

    facts
}

pub fn performance_facts(text: &str) -> Vec<Fact> {
    let mut facts = Vec::new();

    push_stat(&mut facts, &APPEARANCES, text, "Appearances", "matches");
    push_stat(&mut facts, &GOALS, text, "Goals", "");
    push_stat(&mut facts, &ASSISTS, text, "Assists", "");
    push_stat(&mut facts, &CLEAN_SHEETS, text, "Clean sheets", "");

    facts
}

pub fn injury_facts(text: &str) -> Vec<Fact> {
    let lower = text.to_lowercase();
    if !lower.contains("injury") && !text.contains("怪我") {
        return vec![];
    }

    text.lines()
        .filter(|line| {
            let line = line.to_lowercase();
            line.contains("injury") || line.contains("injured")
        })
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| Fact::new("Injury", line.to_string()))
        .collect()
}

pub fn excerpt(body: &str) -> Vec<Fact> {
    body.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(EXCERPT_LINES)
        .map(|line| Fact::new("Excerpt", line.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(facts: &[Fact]) -> Vec<(&str, &str)> {
        facts
            .iter()
            .map(|f| (f.label.as_str(), f.value.as_str()))
            .collect()
    }

    #[test]
    fn test_contract_weekly_wage_variants() {
        for (text, expected) in [
            ("offer of £180,000/week", "£180,000"),
            ("£95,000 per week base", "£95,000"),
            ("Weekly Wage: £250,000", "£250,000"),
        ] {
            let facts = contract_facts(text);
            assert_eq!(values(&facts), vec![("Weekly wage", expected)], "{text}");
        }
    }

    #[test]
    fn test_contract_full_terms() {
        let text = "Weekly Wage: £300,000\n\
            Duration: 5 years\n\
            Signing Bonus: £2,000,000\n\
            Loyalty Bonus: £500,000\n\
            Last season: 38 appearances, 21 goals";

        let facts = contract_facts(text);
        assert_eq!(
            values(&facts),
            vec![
                ("Weekly wage", "£300,000"),
                ("Contract length", "5 years"),
                ("Bonuses", "£2,000,000, £500,000"),
                ("Appearances", "38 matches"),
                ("Goals", "21"),
            ]
        );
    }

    #[test]
    fn test_contract_alternate_duration_label() {
        let facts = contract_facts("Contract: 4 years");
        assert_eq!(values(&facts), vec![("Contract length", "4 years")]);
    }

    #[test]
    fn test_transfer_pound_fee_and_origin() {
        let text = "Gabriel Fernandez joins from Real Madrid\nTransfer Fee: £85 million";
        let facts = transfer_facts(text);
        assert_eq!(
            values(&facts),
            vec![("Transfer fee", "£85 million"), ("From club", "Real Madrid")]
        );
    }

    #[test]
    fn test_transfer_euro_fee() {
        let facts = transfer_facts("Agreed at €70 million plus add-ons");
        assert_eq!(values(&facts), vec![("Transfer fee", "€70 million")]);
    }

    #[test]
    fn test_transfer_origin_stays_on_one_line() {
        let facts = transfer_facts("Signed from Bayer Leverkusen\nNext steps follow");
        assert_eq!(values(&facts), vec![("From club", "Bayer Leverkusen")]);
    }

    #[test]
    fn test_performance_stats() {
        let text = "45 appearances, 12 goals, 9 assists and 17 clean sheets";
        assert_eq!(
            values(&performance_facts(text)),
            vec![
                ("Appearances", "45 matches"),
                ("Goals", "12"),
                ("Assists", "9"),
                ("Clean sheets", "17"),
            ]
        );
    }

    #[test]
    fn test_injury_lines() {
        let text = "Medical update\nHamstring injury sustained in training\nFit again next month\nPreviously injured in 2039";
        assert_eq!(
            values(&injury_facts(text)),
            vec![
                ("Injury", "Hamstring injury sustained in training"),
                ("Injury", "Previously injured in 2039"),
            ]
        );
    }

    #[test]
    fn test_injury_requires_mention() {
        // "injured" alone does not open the injury section
        assert!(injury_facts("He was injured last week").is_empty());
    }

    #[test]
    fn test_excerpt_skips_blank_lines_and_caps() {
        let body = "one\n\n two \nthree\nfour\n\nfive\nsix";
        let facts = excerpt(body);
        assert_eq!(facts.len(), EXCERPT_LINES);
        assert_eq!(facts[1].value, "two");
        assert_eq!(facts[4].value, "five");
    }

    #[test]
    fn test_nothing_found() {
        assert!(contract_facts("no numbers here").is_empty());
        assert!(transfer_facts("No fee mentioned").is_empty());
        assert!(performance_facts("rested").is_empty());
    }
}
