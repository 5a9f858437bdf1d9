use taskpulse_core::{Clock, Config, RiskEvaluator, SystemClock};

use super::{open_repository, print_json, CommandResult};

/// One evaluation pass: bias, capped warnings, overdue ids.
pub fn run() -> CommandResult {
    let data = open_repository()?.load()?;
    let evaluator = RiskEvaluator::new(Config::load().risk_policy());
    let report = evaluator.evaluate(&data.tasks, &SystemClock.now());
    print_json(&report)
}
