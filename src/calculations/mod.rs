pub mod binary;
pub mod odds;
pub mod outcome;
pub mod scenario_stats;
pub mod stake;
