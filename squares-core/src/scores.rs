//! Live score ingestion from the public ESPN scoreboard feed.
//!
//! Collaborator to the engine: settlement only ever consumes the two
//! score integers, never this feed.

use crate::error::{Result, SquaresError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const ESPN_SCOREBOARD_URL: &str =
    "https://site.api.espn.com/apis/site/v2/sports/football/nfl/scoreboard";

/// Snapshot of a game in progress. Quarter 0 means the game has not
/// started; 5 means final (or overtime).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameScore {
    pub team1: u32,
    pub team2: u32,
    pub quarter: u8,
    pub time_remaining: String,
    pub is_live: bool,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct Scoreboard {
    #[serde(default)]
    events: Vec<Event>,
}

#[derive(Debug, Deserialize)]
struct Event {
    #[serde(default)]
    name: String,
    status: EventStatus,
    #[serde(default)]
    competitions: Vec<Competition>,
}

#[derive(Debug, Deserialize)]
struct EventStatus {
    #[serde(rename = "type")]
    kind: StatusType,
    #[serde(default)]
    period: u8,
    #[serde(rename = "displayClock", default)]
    display_clock: String,
}

#[derive(Debug, Deserialize)]
struct StatusType {
    #[serde(default)]
    state: String,
    #[serde(default)]
    completed: bool,
}

#[derive(Debug, Deserialize)]
struct Competition {
    #[serde(default)]
    competitors: Vec<Competitor>,
}

#[derive(Debug, Deserialize)]
struct Competitor {
    team: TeamInfo,
    #[serde(default)]
    score: String,
}

#[derive(Debug, Deserialize)]
struct TeamInfo {
    #[serde(rename = "displayName", default)]
    display_name: String,
}

/// Polls the league scoreboard for one matchup.
pub struct ScoreFeed {
    client: reqwest::Client,
    endpoint: String,
}

impl ScoreFeed {
    pub fn new() -> Self {
        Self::with_endpoint(ESPN_SCOREBOARD_URL)
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    /// Fetch the current score for a matchup. `Ok(None)` when the feed
    /// has no game for these teams (yet).
    pub async fn fetch_score(&self, team1: &str, team2: &str) -> Result<Option<GameScore>> {
        let board: Scoreboard = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| SquaresError::score_feed(format!("request failed: {}", e)))?
            .json()
            .await
            .map_err(|e| SquaresError::score_feed(format!("bad scoreboard payload: {}", e)))?;

        Ok(parse_scoreboard(&board, team1, team2))
    }
}

impl Default for ScoreFeed {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_scoreboard(board: &Scoreboard, team1: &str, team2: &str) -> Option<GameScore> {
    let team1_lower = team1.to_lowercase();
    let team2_lower = team2.to_lowercase();

    let event = board.events.iter().find(|event| {
        let name = event.name.to_lowercase();
        (name.contains(&team1_lower) && name.contains(&team2_lower))
            || name.contains("super bowl")
    })?;

    let competition = event.competitions.first()?;

    let mut team1_score = 0;
    let mut team2_score = 0;
    for competitor in &competition.competitors {
        let display = competitor.team.display_name.to_lowercase();
        let score: u32 = competitor.score.parse().unwrap_or(0);

        if display.contains(&team1_lower) {
            team1_score = score;
        } else if display.contains(&team2_lower) {
            team2_score = score;
        }
    }

    let state = event.status.kind.state.as_str();
    let is_live = state == "in";
    let completed = event.status.kind.completed || state == "post";

    let quarter = if is_live {
        // Cap at 4; overtime still settles as the fourth quarter.
        event.status.period.clamp(1, 4)
    } else if completed {
        5
    } else {
        0
    };

    Some(GameScore {
        team1: team1_score,
        team2: team2_score,
        quarter,
        time_remaining: if event.status.display_clock.is_empty() {
            "0:00".to_string()
        } else {
            event.status.display_clock.clone()
        },
        is_live,
        last_updated: Utc::now(),
    })
}
