//! Export a game's settled state and event log to various formats

use crate::{Error, Result};
use bout_core::{Event, Tick};
use bout_views::{
    BoutEvent, BoxTrips, Game, GameStage, JamClock, Penalties, PeriodClock, Ruleset, Team,
    TeamTimeouts, Timeline,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;

/// Export format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// RON format (Rust Object Notation)
    Ron,
    /// JSON format (requires serde_json feature)
    Json,
    /// CSV format (event log only)
    Csv,
    /// Human-readable text format
    Text,
}

/// Read-only exporter over a settled game
pub struct Exporter<'a> {
    game: &'a Game,
}

impl<'a> Exporter<'a> {
    pub fn new(game: &'a Game) -> Self {
        Self { game }
    }

    /// Export to a string in the specified format
    pub fn export(&self, format: ExportFormat) -> Result<String> {
        match format {
            ExportFormat::Ron => self.to_ron(),
            ExportFormat::Json => self.to_json(),
            ExportFormat::Csv => self.to_csv(),
            ExportFormat::Text => self.to_text(),
        }
    }

    /// Export to a writer
    pub fn export_to<W: Write>(&self, writer: &mut W, format: ExportFormat) -> Result<()> {
        let content = self.export(format)?;
        writer
            .write_all(content.as_bytes())
            .map_err(|e| Error::ExportError(e.to_string()))?;
        Ok(())
    }

    pub fn to_ron(&self) -> Result<String> {
        let export = ExportData::from_game(self.game)?;
        ron::ser::to_string_pretty(&export, ron::ser::PrettyConfig::default())
            .map_err(|e| Error::Serialization(e.to_string()))
    }

    #[cfg(feature = "serde_json")]
    pub fn to_json(&self) -> Result<String> {
        let export = ExportData::from_game(self.game)?;
        serde_json::to_string_pretty(&export).map_err(|e| Error::Serialization(e.to_string()))
    }

    #[cfg(not(feature = "serde_json"))]
    pub fn to_json(&self) -> Result<String> {
        Err(Error::ExportError(
            "JSON export requires the 'serde_json' feature".to_string(),
        ))
    }

    /// One row per logged event
    pub fn to_csv(&self) -> Result<String> {
        let mut output = String::from("tick_ms,id,kind,root\n");
        for event in self.game.events()? {
            let root = event.root.map(|r| r.id.to_string()).unwrap_or_default();
            output.push_str(&format!(
                "{},{},{},{}\n",
                event.tick.millis(),
                event.id,
                event.kind(),
                root
            ));
        }
        Ok(output)
    }

    pub fn to_text(&self) -> Result<String> {
        let data = ExportData::from_game(self.game)?;
        let mut output = String::new();

        output.push_str("=== Game Export ===\n\n");
        output.push_str(&format!("Stage: {}\n", data.stage.stage));
        output.push_str(&format!(
            "Period {} jam {} ({} jams total)\n",
            data.stage.period, data.stage.jam, data.stage.total_jams
        ));
        output.push_str(&format!(
            "Period clock: {} remaining\n",
            data.period_clock.watch.remaining(data.rules.period_duration)
        ));
        output.push_str(&format!("Events logged: {}\n", data.events.len()));

        for team in &data.teams {
            output.push_str(&format!("\n--- {} ---\n", team.team));
            output.push_str(&format!(
                "Timeouts remaining: {}, reviews remaining: {}\n",
                team.timeouts_remaining, team.reviews_remaining
            ));
            for trip in &team.box_trips.trips {
                let served = trip
                    .elapsed
                    .map(|t| t.to_string())
                    .unwrap_or_else(|| "in box".to_string());
                output.push_str(&format!(
                    "  box: #{} period {} jam {} ({})\n",
                    trip.skater, trip.period, trip.jam, served
                ));
            }
            for penalty in &team.penalties.penalties {
                output.push_str(&format!(
                    "  penalty: #{} {} at {}\n",
                    penalty.skater, penalty.code, penalty.issued
                ));
            }
        }

        output.push_str("\n=== Timeline ===\n\n");
        for interval in &data.timeline.history {
            output.push_str(&format!(
                "  {} {} for {} [{}]\n",
                interval.start, interval.stage, interval.duration, interval.opened_kind
            ));
        }
        if let Some(open) = &data.timeline.current {
            output.push_str(&format!("  {} {} (ongoing)\n", open.start, open.stage));
        }

        output.push_str("\n=== Events ===\n\n");
        let mut current_tick: Option<Tick> = None;
        for event in &data.events {
            if current_tick != Some(event.tick) {
                output.push_str(&format!("\n--- {} ---\n", event.tick));
                current_tick = Some(event.tick);
            }
            let root = event
                .root
                .map(|r| format!(" <- {}", r.id))
                .unwrap_or_default();
            output.push_str(&format!("  #{} {}{}\n", event.id, event.kind(), root));
        }

        Ok(output)
    }
}

/// Data structure for full game export
#[derive(Debug, Clone, Serialize)]
struct ExportData {
    version: u32,
    exported_at: DateTime<Utc>,
    latest_tick: Option<Tick>,
    rules: Ruleset,
    stage: GameStage,
    jam_clock: JamClock,
    period_clock: PeriodClock,
    timeline: Timeline,
    teams: Vec<TeamSummary>,
    events: Vec<Event<BoutEvent>>,
}

impl ExportData {
    fn from_game(game: &Game) -> Result<Self> {
        let rules = (*game.rules()?).clone();
        let teams = Team::ALL
            .into_iter()
            .map(|team| TeamSummary::from_game(game, team, &rules))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            version: 1,
            exported_at: Utc::now(),
            latest_tick: game.latest_tick(),
            stage: (*game.stage()?).clone(),
            jam_clock: (*game.state::<JamClock>()?).clone(),
            period_clock: (*game.state::<PeriodClock>()?).clone(),
            timeline: (*game.state::<Timeline>()?).clone(),
            events: game.events()?,
            rules,
            teams,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
struct TeamSummary {
    team: Team,
    timeouts_remaining: u32,
    reviews_remaining: u32,
    box_trips: BoxTrips,
    penalties: Penalties,
}

impl TeamSummary {
    fn from_game(game: &Game, team: Team, rules: &Ruleset) -> Result<Self> {
        let timeouts = game.team::<TeamTimeouts>(team)?;
        Ok(Self {
            team,
            timeouts_remaining: timeouts.timeouts_remaining(rules),
            reviews_remaining: timeouts.reviews_remaining(rules),
            box_trips: (*game.team::<BoxTrips>(team)?).clone(),
            penalties: (*game.team::<Penalties>(team)?).clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_game() -> Game {
        let mut game = Game::new().unwrap();
        game.submit(Tick(0), BoutEvent::JamStarted).unwrap();
        game.submit(
            Tick(5_000),
            BoutEvent::PenaltyIssued {
                team: Team::Away,
                skater: "12".into(),
                code: "B".into(),
            },
        )
        .unwrap();
        game.tick(Tick(125_000)).unwrap();
        game
    }

    #[test]
    fn test_export_ron() {
        let game = create_test_game();
        let ron = Exporter::new(&game).to_ron().unwrap();

        assert!(ron.contains("version"));
        assert!(ron.contains("events"));
        assert!(ron.contains("PenaltyIssued"));
    }

    #[test]
    fn test_export_csv() {
        let game = create_test_game();
        let csv = Exporter::new(&game).to_csv().unwrap();

        assert!(csv.starts_with("tick_ms,id,kind,root\n"));
        // JamStarted, PenaltyIssued and the clock-driven JamEnded
        assert_eq!(csv.lines().count(), 4);
        assert!(csv.contains("120000,"));
    }

    #[test]
    fn test_export_text() {
        let game = create_test_game();
        let text = Exporter::new(&game).to_text().unwrap();

        assert!(text.contains("Game Export"));
        assert!(text.contains("Stage: lineup"));
        assert!(text.contains("penalty: #12 B"));
    }

    #[test]
    fn test_export_to_writer() {
        let game = create_test_game();
        let mut out = Vec::new();
        Exporter::new(&game)
            .export_to(&mut out, ExportFormat::Csv)
            .unwrap();

        assert!(String::from_utf8(out).unwrap().starts_with("tick_ms"));
    }

    #[cfg(not(feature = "serde_json"))]
    #[test]
    fn test_json_needs_feature() {
        let game = create_test_game();
        assert!(matches!(
            Exporter::new(&game).to_json(),
            Err(Error::ExportError(_))
        ));
    }
}
