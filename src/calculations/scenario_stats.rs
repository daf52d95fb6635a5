// How an asset reacted after each release scenario

use crate::calculations::odds::round_to;
use crate::calculations::outcome::resolve_direction;
use crate::types::{Direction, OutcomeBucket, PerBucket};
use serde::{Deserialize, Serialize};

/// Running reaction tally for one scenario (below / meets / above forecast)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScenarioStats {
    pub occurrence_count: u64,
    pub up_count: u64,
    pub down_count: u64,
    /// Mean absolute post-release return
    pub avg_move: f64,
}

impl ScenarioStats {
    /// Fold one settled release into the tally. Flat moves count as an
    /// occurrence but neither up nor down.
    pub fn record(&mut self, return_pct: f64) -> Option<Direction> {
        let n = self.occurrence_count as f64;
        self.avg_move = (self.avg_move * n + return_pct.abs()) / (n + 1.0);
        self.occurrence_count += 1;

        let direction = resolve_direction(return_pct);
        match direction {
            Some(Direction::Up) => self.up_count += 1,
            Some(Direction::Down) => self.down_count += 1,
            None => {}
        }
        direction
    }

    /// Share of occurrences that moved up, in percent (2 dp)
    pub fn up_prob(&self) -> f64 {
        self.share(self.up_count)
    }

    pub fn down_prob(&self) -> f64 {
        self.share(self.down_count)
    }

    fn share(&self, count: u64) -> f64 {
        if self.occurrence_count == 0 {
            return 0.0;
        }
        round_to(count as f64 / self.occurrence_count as f64 * 100.0, 2)
    }
}

pub type ReactionStats = PerBucket<ScenarioStats>;

/// One row of the scenario table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScenarioRow {
    pub scenario: OutcomeBucket,
    pub count: u64,
    pub up_count: u64,
    pub down_count: u64,
    pub up_prob: f64,
    pub down_prob: f64,
    pub avg_move: f64,
}

pub fn scenario_rows(stats: &ReactionStats) -> Vec<ScenarioRow> {
    stats
        .iter()
        .map(|(scenario, s)| ScenarioRow {
            scenario,
            count: s.occurrence_count,
            up_count: s.up_count,
            down_count: s.down_count,
            up_prob: s.up_prob(),
            down_prob: s.down_prob(),
            avg_move: s.avg_move,
        })
        .collect()
}
