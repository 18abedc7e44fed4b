//! Input checks run before any simulator. The simulators only guard what
//! they need to terminate; everything a caller can get wrong is caught here.

use thiserror::Error;

use super::primitives::MAX_PERIODS;
use super::types::{
    BudgetOptimizationInput, BudgetingInput, DebtManagementInput, DebtPayoffInput,
    EducationFundInput, EmergencyFundInput, ExpenseGroup, InvestingInput, MajorPurchaseInput,
    ScenarioInput, WealthBuildingInput,
};

/// Longest horizon, in years, accepted by the year-based simulators.
pub const MAX_YEARS: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must be a finite number")]
    NotFinite { field: String },
    #[error("{field} must not be negative")]
    Negative { field: String },
    #[error("{field} must be greater than zero")]
    NotPositive { field: String },
    #[error("{field} must be between 0 and 100")]
    PercentOutOfRange { field: String },
    #[error("{field} must be between 0 and 1")]
    FractionOutOfRange { field: String },
    #[error("{field} must be at most {max}")]
    TooLarge { field: String, max: u32 },
    #[error("{0}")]
    Inconsistent(String),
}

type Result<T = ()> = std::result::Result<T, ValidationError>;

fn finite(field: &str, value: f64) -> Result {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::NotFinite {
            field: field.to_string(),
        })
    }
}

fn non_negative(field: &str, value: f64) -> Result {
    finite(field, value)?;
    if value < 0.0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }
    Ok(())
}

fn positive(field: &str, value: f64) -> Result {
    finite(field, value)?;
    if value <= 0.0 {
        return Err(ValidationError::NotPositive {
            field: field.to_string(),
        });
    }
    Ok(())
}

fn percent(field: &str, value: f64) -> Result {
    finite(field, value)?;
    if !(0.0..=100.0).contains(&value) {
        return Err(ValidationError::PercentOutOfRange {
            field: field.to_string(),
        });
    }
    Ok(())
}

fn fraction(field: &str, value: f64) -> Result {
    finite(field, value)?;
    if !(0.0..=1.0).contains(&value) {
        return Err(ValidationError::FractionOutOfRange {
            field: field.to_string(),
        });
    }
    Ok(())
}

fn count_in_range(field: &str, value: u32, max: u32) -> Result {
    if value == 0 {
        return Err(ValidationError::NotPositive {
            field: field.to_string(),
        });
    }
    if value > max {
        return Err(ValidationError::TooLarge {
            field: field.to_string(),
            max,
        });
    }
    Ok(())
}

pub fn validate(input: &ScenarioInput) -> Result {
    match input {
        ScenarioInput::Budgeting(input) => validate_budgeting(input),
        ScenarioInput::EmergencyFund(input) => validate_emergency_fund(input),
        ScenarioInput::DebtPayoff(input) => validate_debt_payoff(input),
        ScenarioInput::Investing(input) => validate_investing(input),
        ScenarioInput::EducationFund(input) => validate_education_fund(input),
        ScenarioInput::MajorPurchase(input) => validate_major_purchase(input),
        ScenarioInput::WealthBuilding(input) => validate_wealth_building(input),
        ScenarioInput::BudgetOptimization(input) => validate_budget_optimization(input),
        ScenarioInput::DebtManagement(input) => validate_debt_management(input),
    }
}

fn validate_budgeting(input: &BudgetingInput) -> Result {
    non_negative("monthly_net_income", input.monthly_net_income)?;
    for (category, _, amount) in input.lines() {
        non_negative(category, amount)?;
    }
    Ok(())
}

fn validate_emergency_fund(input: &EmergencyFundInput) -> Result {
    positive("monthly_expenses", input.monthly_expenses)?;
    if input.months_of_expenses == 0 {
        return Err(ValidationError::NotPositive {
            field: "months_of_expenses".to_string(),
        });
    }
    non_negative("current_emergency_savings", input.current_emergency_savings)?;
    non_negative("monthly_savings", input.monthly_savings)?;
    percent(
        "annual_interest_rate_percent",
        input.annual_interest_rate_percent,
    )
}

fn validate_debt_payoff(input: &DebtPayoffInput) -> Result {
    positive("debt", input.debt)?;
    // A payment below the interest is a valid question with a non-convergent answer.
    non_negative("monthly_payment", input.monthly_payment)?;
    percent("annual_interest_rate", input.annual_interest_rate)?;
    non_negative("extra_payment", input.extra_payment)
}

fn validate_investing(input: &InvestingInput) -> Result {
    non_negative("initial", input.initial)?;
    non_negative("monthly", input.monthly)?;
    percent("return_rate", input.return_rate)?;
    count_in_range("years", input.years, MAX_YEARS)?;
    if input.initial == 0.0 && input.monthly == 0.0 {
        return Err(ValidationError::Inconsistent(
            "initial or monthly must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

fn validate_education_fund(input: &EducationFundInput) -> Result {
    positive("today_cost", input.today_cost)?;
    count_in_range("years", input.years, MAX_YEARS)?;
    non_negative("current_savings", input.current_savings)?;
    non_negative("monthly_contrib", input.monthly_contrib)?;
    percent("return_rate", input.return_rate)?;
    percent("inflation_rate", input.inflation_rate)
}

fn validate_major_purchase(input: &MajorPurchaseInput) -> Result {
    positive("price", input.price)?;
    percent("down_pct", input.down_pct)?;
    count_in_range("years_to_save", input.years_to_save, MAX_YEARS)?;
    non_negative("current_savings", input.current_savings)?;
    non_negative("monthly_contrib", input.monthly_contrib)?;
    percent("savings_return", input.savings_return)?;
    percent("loan_rate", input.loan_rate)?;
    if input.down_pct < 100.0 {
        count_in_range("loan_term", input.loan_term, MAX_YEARS)?;
    }
    Ok(())
}

fn validate_wealth_building(input: &WealthBuildingInput) -> Result {
    if input.goal_name.trim().is_empty() {
        return Err(ValidationError::Inconsistent(
            "goal_name must not be empty".to_string(),
        ));
    }
    if input.target_age <= input.current_age {
        return Err(ValidationError::Inconsistent(
            "target_age must be greater than current_age".to_string(),
        ));
    }
    count_in_range(
        "target_age - current_age",
        input.target_age - input.current_age,
        MAX_YEARS,
    )?;
    positive("target_amount", input.target_amount)?;
    non_negative("current_savings", input.current_savings)?;
    non_negative("monthly_contribution", input.monthly_contribution)?;
    percent(
        "annual_contribution_increase",
        input.annual_contribution_increase,
    )?;
    percent("expected_annual_return", input.expected_annual_return)?;
    percent("inflation_rate", input.inflation_rate)?;
    percent("advisor_fee_percent", input.advisor_fee_percent)
}

fn validate_budget_optimization(input: &BudgetOptimizationInput) -> Result {
    count_in_range("projection_months", input.projection_months, MAX_PERIODS)?;
    non_negative("income.monthly_net_income", input.income.monthly_net_income)?;
    non_negative(
        "income.other_monthly_income",
        input.income.other_monthly_income,
    )?;

    let expenses = &input.expenses;
    let groups: [(&str, &dyn ExpenseGroup); 3] = [
        ("fixed_needs", &expenses.fixed_needs),
        ("variable_needs", &expenses.variable_needs),
        ("wants_discretionary", &expenses.wants_discretionary),
    ];
    for (group, items) in groups {
        for (name, amount) in items.items() {
            non_negative(&format!("expenses.{group}.{name}"), amount)?;
        }
    }

    non_negative(
        "savings_goals.target_monthly_savings",
        input.savings_goals.target_monthly_savings,
    )?;
    non_negative(
        "savings_goals.emergency_fund_target",
        input.savings_goals.emergency_fund_target,
    )?;

    // Per-month rates; each compounds for up to MAX_PERIODS months.
    if let Some(factors) = &input.what_if_factors {
        fraction(
            "what_if_factors.income_growth_rate",
            factors.income_growth_rate,
        )?;
        fraction(
            "what_if_factors.wants_reduction_rate",
            factors.wants_reduction_rate,
        )?;
        fraction(
            "what_if_factors.savings_increase_rate",
            factors.savings_increase_rate,
        )?;
    }
    Ok(())
}

fn validate_debt_management(input: &DebtManagementInput) -> Result {
    count_in_range("projection_period", input.projection_period, MAX_PERIODS)?;

    for (idx, loan) in input.loans.iter().enumerate() {
        let field = |name: &str| format!("loans[{idx}].{name}");
        non_negative(&field("principal_amount"), loan.principal_amount)?;
        non_negative(&field("outstanding_balance"), loan.outstanding_balance)?;
        percent(&field("annual_interest_rate"), loan.annual_interest_rate)?;
        non_negative(&field("monthly_payment"), loan.monthly_payment)?;
        if loan.monthly_payment == 0.0
            && loan.outstanding_balance > 0.0
            && loan.remaining_term_months == 0
        {
            return Err(ValidationError::Inconsistent(format!(
                "loan '{}' needs a monthly_payment or remaining_term_months",
                loan.loan_name
            )));
        }
    }

    let financials = &input.business_financials;
    non_negative(
        "business_financials.avg_monthly_revenue",
        financials.avg_monthly_revenue,
    )?;
    non_negative(
        "business_financials.avg_monthly_operating_expenses",
        financials.avg_monthly_operating_expenses,
    )?;
    non_negative(
        "business_financials.current_cash_reserves",
        financials.current_cash_reserves,
    )?;

    non_negative(
        "growth_needs.capital_required",
        input.growth_needs.capital_required,
    )?;
    if let Some(roi) = input.growth_needs.expected_roi {
        non_negative("growth_needs.expected_roi", roi)?;
    }

    let proposed = &input.proposed_financing;
    non_negative(
        "proposed_financing.proposed_loan_amount",
        proposed.proposed_loan_amount,
    )?;
    percent(
        "proposed_financing.proposed_annual_interest_rate",
        proposed.proposed_annual_interest_rate,
    )?;
    if proposed.proposed_loan_amount > 0.0 && proposed.proposed_loan_term == 0 {
        return Err(ValidationError::Inconsistent(
            "proposed_financing.proposed_loan_term must be greater than zero when a loan \
             amount is proposed"
                .to_string(),
        ));
    }

    percent("reinvestment_rate", input.reinvestment_rate)
}
