mod engine;
mod format;
mod planner;
pub mod primitives;
mod types;
mod validate;

pub use engine::{
    simulate_budgeting, simulate_debt_payoff, simulate_education_fund, simulate_emergency_fund,
    simulate_investing, simulate_major_purchase,
};
pub use planner::{simulate_budget_optimization, simulate_debt_management, simulate_wealth_building};
pub use types::*;
pub use validate::{MAX_YEARS, ValidationError, validate};

/// Validates the input, then runs the matching simulator.
pub fn run_scenario(input: &ScenarioInput) -> Result<ScenarioOutput, ValidationError> {
    validate(input)?;
    Ok(match input {
        ScenarioInput::Budgeting(input) => ScenarioOutput::Budgeting(simulate_budgeting(input)),
        ScenarioInput::EmergencyFund(input) => {
            ScenarioOutput::EmergencyFund(simulate_emergency_fund(input))
        }
        ScenarioInput::DebtPayoff(input) => ScenarioOutput::DebtPayoff(simulate_debt_payoff(input)),
        ScenarioInput::Investing(input) => ScenarioOutput::Investing(simulate_investing(input)),
        ScenarioInput::EducationFund(input) => {
            ScenarioOutput::EducationFund(simulate_education_fund(input))
        }
        ScenarioInput::MajorPurchase(input) => {
            ScenarioOutput::MajorPurchase(simulate_major_purchase(input))
        }
        ScenarioInput::WealthBuilding(input) => {
            ScenarioOutput::WealthBuilding(simulate_wealth_building(input))
        }
        ScenarioInput::BudgetOptimization(input) => {
            ScenarioOutput::BudgetOptimization(simulate_budget_optimization(input))
        }
        ScenarioInput::DebtManagement(input) => {
            ScenarioOutput::DebtManagement(simulate_debt_management(input))
        }
    })
}
