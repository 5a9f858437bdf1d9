use clap::Subcommand;
use taskpulse_core::{aggregate_week, overview, score, BiasEstimator, Clock, Config, SystemClock};

use super::{open_repository, print_json, CommandResult};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Daily on-time/late/overdue counts for the last 7 days
    Week,
    /// Weekly score and tier
    Score,
    /// All-time completion and estimation insights
    Overview,
    /// Current estimation bias coefficient
    Bias,
}

pub fn run(action: StatsAction) -> CommandResult {
    let data = open_repository()?.load()?;
    let now = SystemClock.now();

    match action {
        StatsAction::Week => {
            let report = aggregate_week(&data.tasks, &now);
            print_json(&report)?;
        }
        StatsAction::Score => {
            let report = aggregate_week(&data.tasks, &now);
            print_json(&score(&report.totals))?;
        }
        StatsAction::Overview => {
            print_json(&overview(&data.tasks, &now.timezone()))?;
        }
        StatsAction::Bias => {
            let estimator = BiasEstimator::with_policy(Config::load().bias_policy());
            print_json(&estimator.estimate(&data.tasks, &now))?;
        }
    }
    Ok(())
}
