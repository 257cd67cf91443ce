use std::fmt;

use crate::normalize::NormalizedMatch;

pub const HOME_LABEL: &str = "Home";
pub const AWAY_LABEL: &str = "Away";

#[derive(Debug, Clone, PartialEq)]
pub struct PieShare {
    pub label: &'static str,
    pub percentage: f64,
}

/// Display record for the drilled-down match.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchInfo {
    pub date: String,
    pub tournament: String,
    pub country: String,
    pub city: String,
    pub selected_team: String,
    pub opponent_team: String,
    pub selected_score: u32,
    pub opponent_score: u32,
    pub selected_pct: f64,
    pub opponent_pct: f64,
    pub even_split: bool,
}

impl MatchInfo {
    pub fn lines(&self) -> Vec<String> {
        let mut percentage = format!(
            "Percentage: {}% - {}%",
            round_pct(self.selected_pct),
            round_pct(self.opponent_pct)
        );
        if self.even_split {
            percentage.push_str(" (goalless)");
        }
        vec![
            format!("Date: {}", self.date),
            format!("Tournament: {}", self.tournament),
            String::new(),
            format!("Country: {}, City: {}", self.country, self.city),
            String::new(),
            format!("Match: {} vs {}", self.selected_team, self.opponent_team),
            format!("Score: {} - {}", self.selected_score, self.opponent_score),
            percentage,
        ]
    }
}

impl fmt::Display for MatchInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.lines().join("\n"))
    }
}

fn round_pct(pct: f64) -> i64 {
    pct.round() as i64
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrillDown {
    pub shares: [PieShare; 2],
    pub info: MatchInfo,
}

/// Splits the match score into home/away shares. A 0-0 match has no
/// meaningful ratio and is shown as an even split.
pub fn aggregate(m: &NormalizedMatch) -> ([PieShare; 2], MatchInfo) {
    let total = u64::from(m.selected_score) + u64::from(m.opponent_score);
    let (selected_pct, opponent_pct, even_split) = if total == 0 {
        (50.0, 50.0, true)
    } else {
        let total = total as f64;
        (
            f64::from(m.selected_score) / total * 100.0,
            f64::from(m.opponent_score) / total * 100.0,
            false,
        )
    };

    let shares = [
        PieShare {
            label: HOME_LABEL,
            percentage: selected_pct,
        },
        PieShare {
            label: AWAY_LABEL,
            percentage: opponent_pct,
        },
    ];
    let info = MatchInfo {
        date: m.date_label(),
        tournament: m.tournament.clone(),
        country: m.country.clone(),
        city: m.city.clone(),
        selected_team: m.selected_team.clone(),
        opponent_team: m.opponent_team.clone(),
        selected_score: m.selected_score,
        opponent_score: m.opponent_score,
        selected_pct,
        opponent_pct,
        even_split,
    };
    (shares, info)
}

pub fn drill_down(m: &NormalizedMatch) -> DrillDown {
    let (shares, info) = aggregate(m);
    DrillDown { shares, info }
}
