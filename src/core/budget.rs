//! Hour-budget math for jobs and sections.

use serde::{Deserialize, Serialize};

/// How a job or section stands against its hour budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetStatus {
    /// At or under 100% of the estimate.
    OnBudget,
    /// Over the estimate but within 120%.
    OverBudget,
    /// Past 120% of the estimate.
    SignificantlyOver,
}

/// Percentage of the budget consumed. A zero or negative budget reads as 0
/// so unbudgeted work never shows as blown.
#[must_use]
pub fn budget_percent(completed_hours: f64, total_hours: f64) -> f64 {
    if total_hours <= 0.0 {
        return 0.0;
    }
    completed_hours / total_hours * 100.0
}

#[must_use]
pub fn budget_status(completed_hours: f64, total_hours: f64) -> BudgetStatus {
    let percent = budget_percent(completed_hours, total_hours);
    if percent <= 100.0 {
        BudgetStatus::OnBudget
    } else if percent <= 120.0 {
        BudgetStatus::OverBudget
    } else {
        BudgetStatus::SignificantlyOver
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_percent_handles_zero_budget() {
        assert_eq!(budget_percent(10.0, 0.0), 0.0);
        assert_eq!(budget_percent(0.0, 40.0), 0.0);
        assert!((budget_percent(20.0, 40.0) - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_budget_status_thresholds() {
        assert_eq!(budget_status(40.0, 40.0), BudgetStatus::OnBudget);
        assert_eq!(budget_status(44.0, 40.0), BudgetStatus::OverBudget);
        assert_eq!(budget_status(48.0, 40.0), BudgetStatus::OverBudget);
        assert_eq!(budget_status(48.1, 40.0), BudgetStatus::SignificantlyOver);
        assert_eq!(budget_status(10.0, 0.0), BudgetStatus::OnBudget, "unbudgeted is on budget");
    }

    #[test]
    fn test_budget_status_serializes_snake_case() {
        let json = serde_json::to_string(&BudgetStatus::SignificantlyOver).unwrap();
        assert_eq!(json, "\"significantly_over\"");
    }
}
