use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScenarioKind {
    Budgeting,
    EmergencyFund,
    DebtPayoff,
    Investing,
    EducationFund,
    MajorPurchase,
    WealthBuilding,
    BudgetOptimization,
    DebtManagement,
}

impl ScenarioKind {
    pub const ALL: [ScenarioKind; 9] = [
        ScenarioKind::Budgeting,
        ScenarioKind::EmergencyFund,
        ScenarioKind::DebtPayoff,
        ScenarioKind::Investing,
        ScenarioKind::EducationFund,
        ScenarioKind::MajorPurchase,
        ScenarioKind::WealthBuilding,
        ScenarioKind::BudgetOptimization,
        ScenarioKind::DebtManagement,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ScenarioKind::Budgeting => "budgeting",
            ScenarioKind::EmergencyFund => "emergency-fund",
            ScenarioKind::DebtPayoff => "debt-payoff",
            ScenarioKind::Investing => "investing",
            ScenarioKind::EducationFund => "education-fund",
            ScenarioKind::MajorPurchase => "major-purchase",
            ScenarioKind::WealthBuilding => "wealth-building",
            ScenarioKind::BudgetOptimization => "budget-optimization",
            ScenarioKind::DebtManagement => "debt-management",
        }
    }
}

impl fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScenarioKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        ScenarioKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| format!("unknown scenario type '{s}'"))
    }
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BudgetingInput {
    pub monthly_net_income: f64,
    #[serde(default)]
    pub housing_expense: f64,
    #[serde(default)]
    pub food_grocery_expense: f64,
    #[serde(default)]
    pub utilities_expense: f64,
    #[serde(default)]
    pub transportation_expense: f64,
    #[serde(default)]
    pub debt_payments_expense: f64,
    #[serde(default)]
    pub medical_healthcare_expense: f64,
    #[serde(default)]
    pub education_expense: f64,
    #[serde(default)]
    pub household_supplies_maintenance_expense: f64,
    #[serde(default)]
    pub personal_care_shopping_expense: f64,
    #[serde(default)]
    pub entertainment_recreation_expense: f64,
    #[serde(default)]
    pub gifts_donations_expense: f64,
    #[serde(default)]
    pub savings_investment_contribution: f64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetGroup {
    Needs,
    Wants,
    Savings,
}

impl BudgetingInput {
    pub fn lines(&self) -> [(&'static str, BudgetGroup, f64); 12] {
        [
            ("housing", BudgetGroup::Needs, self.housing_expense),
            ("food_grocery", BudgetGroup::Needs, self.food_grocery_expense),
            ("utilities", BudgetGroup::Needs, self.utilities_expense),
            ("transportation", BudgetGroup::Needs, self.transportation_expense),
            ("debt_payments", BudgetGroup::Needs, self.debt_payments_expense),
            (
                "medical_healthcare",
                BudgetGroup::Needs,
                self.medical_healthcare_expense,
            ),
            ("education", BudgetGroup::Needs, self.education_expense),
            (
                "household_supplies_maintenance",
                BudgetGroup::Needs,
                self.household_supplies_maintenance_expense,
            ),
            (
                "personal_care_shopping",
                BudgetGroup::Wants,
                self.personal_care_shopping_expense,
            ),
            (
                "entertainment_recreation",
                BudgetGroup::Wants,
                self.entertainment_recreation_expense,
            ),
            ("gifts_donations", BudgetGroup::Wants, self.gifts_donations_expense),
            (
                "savings_investment",
                BudgetGroup::Savings,
                self.savings_investment_contribution,
            ),
        ]
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EmergencyFundInput {
    pub monthly_expenses: f64,
    pub months_of_expenses: u32,
    #[serde(default)]
    pub current_emergency_savings: f64,
    #[serde(default)]
    pub monthly_savings: f64,
    #[serde(default)]
    pub annual_interest_rate_percent: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DebtPayoffInput {
    pub debt: f64,
    pub monthly_payment: f64,
    /// Annual rate in percent, e.g. 12 for 12%.
    #[serde(alias = "interest_rate")]
    pub annual_interest_rate: f64,
    #[serde(default)]
    pub extra_payment: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InvestingInput {
    #[serde(default)]
    pub initial: f64,
    #[serde(default)]
    pub monthly: f64,
    pub return_rate: f64,
    pub years: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EducationFundInput {
    pub today_cost: f64,
    pub years: u32,
    #[serde(default)]
    pub current_savings: f64,
    #[serde(default)]
    pub monthly_contrib: f64,
    pub return_rate: f64,
    pub inflation_rate: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MajorPurchaseInput {
    pub price: f64,
    pub down_pct: f64,
    pub years_to_save: u32,
    #[serde(default)]
    pub current_savings: f64,
    #[serde(default)]
    pub monthly_contrib: f64,
    #[serde(default)]
    pub savings_return: f64,
    pub loan_rate: f64,
    /// Loan term in years.
    pub loan_term: u32,
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskProfile {
    #[serde(alias = "Conservative")]
    Conservative,
    #[default]
    #[serde(alias = "Moderate")]
    Moderate,
    #[serde(alias = "Aggressive")]
    Aggressive,
}

impl RiskProfile {
    pub fn label(self) -> &'static str {
        match self {
            RiskProfile::Conservative => "conservative",
            RiskProfile::Moderate => "moderate",
            RiskProfile::Aggressive => "aggressive",
        }
    }
}

/// Rates on this input are annual percentages (7 means 7%).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WealthBuildingInput {
    pub goal_name: String,
    pub current_age: u32,
    pub target_age: u32,
    pub target_amount: f64,
    #[serde(default)]
    pub current_savings: f64,
    #[serde(default)]
    pub monthly_contribution: f64,
    #[serde(default)]
    pub annual_contribution_increase: f64,
    #[serde(default = "default_expected_return")]
    pub expected_annual_return: f64,
    #[serde(default = "default_inflation")]
    pub inflation_rate: f64,
    #[serde(default)]
    pub risk_profile: RiskProfile,
    #[serde(default)]
    pub advisor_fee_percent: f64,
}

fn default_expected_return() -> f64 {
    7.0
}

fn default_inflation() -> f64 {
    3.5
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct IncomeDetails {
    #[serde(alias = "monthly_gross_income")]
    pub monthly_net_income: f64,
    #[serde(default)]
    pub other_monthly_income: f64,
}

impl IncomeDetails {
    pub fn total(&self) -> f64 {
        self.monthly_net_income + self.other_monthly_income
    }
}

pub trait ExpenseGroup {
    fn items(&self) -> Vec<(&'static str, f64)>;

    fn total(&self) -> f64 {
        self.items().iter().map(|(_, amount)| amount).sum()
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct FixedNeeds {
    pub rent: f64,
    pub utilities: f64,
    pub loan_payments: f64,
    pub insurance_premiums: f64,
    pub tuition_fees: f64,
    pub groceries: f64,
    pub transportation: f64,
}

impl ExpenseGroup for FixedNeeds {
    fn items(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("rent", self.rent),
            ("utilities", self.utilities),
            ("loan_payments", self.loan_payments),
            ("insurance_premiums", self.insurance_premiums),
            ("tuition_fees", self.tuition_fees),
            ("groceries", self.groceries),
            ("transportation", self.transportation),
        ]
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct VariableNeeds {
    pub household_supplies: f64,
    pub medical_health: f64,
    pub misc_needs: f64,
}

impl ExpenseGroup for VariableNeeds {
    fn items(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("household_supplies", self.household_supplies),
            ("medical_health", self.medical_health),
            ("misc_needs", self.misc_needs),
        ]
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct WantsDiscretionary {
    pub dining_out: f64,
    pub entertainment_hobbies: f64,
    pub personal_care: f64,
    pub shopping_leisure: f64,
    pub travel_vacation: f64,
    pub misc_wants: f64,
}

impl ExpenseGroup for WantsDiscretionary {
    fn items(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("dining_out", self.dining_out),
            ("entertainment_hobbies", self.entertainment_hobbies),
            ("personal_care", self.personal_care),
            ("shopping_leisure", self.shopping_leisure),
            ("travel_vacation", self.travel_vacation),
            ("misc_wants", self.misc_wants),
        ]
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Expenses {
    pub fixed_needs: FixedNeeds,
    pub variable_needs: VariableNeeds,
    pub wants_discretionary: WantsDiscretionary,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SavingsGoals {
    pub target_monthly_savings: f64,
    pub emergency_fund_target: f64,
}

/// Per-period adjustments as fractions (0.05 means 5% per month), applied
/// from the second month onward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct WhatIfFactors {
    pub income_growth_rate: f64,
    pub wants_reduction_rate: f64,
    pub savings_increase_rate: f64,
}

impl WhatIfFactors {
    pub fn is_neutral(&self) -> bool {
        self.income_growth_rate == 0.0
            && self.wants_reduction_rate == 0.0
            && self.savings_increase_rate == 0.0
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BudgetOptimizationInput {
    pub projection_months: u32,
    pub income: IncomeDetails,
    #[serde(default)]
    pub expenses: Expenses,
    #[serde(default)]
    pub savings_goals: SavingsGoals,
    #[serde(default)]
    pub what_if_factors: Option<WhatIfFactors>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoanDetails {
    pub loan_name: String,
    #[serde(default)]
    pub principal_amount: f64,
    pub outstanding_balance: f64,
    pub annual_interest_rate: f64,
    /// Zero means "derive from the remaining term".
    #[serde(default)]
    pub monthly_payment: f64,
    #[serde(default)]
    pub remaining_term_months: u32,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BusinessFinancials {
    pub avg_monthly_revenue: f64,
    pub avg_monthly_operating_expenses: f64,
    #[serde(default)]
    pub current_cash_reserves: f64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct GrowthNeeds {
    pub capital_required: f64,
    pub expected_roi: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ProposedFinancing {
    pub proposed_loan_amount: f64,
    pub proposed_annual_interest_rate: f64,
    /// Term in months.
    pub proposed_loan_term: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DebtManagementInput {
    pub projection_period: u32,
    #[serde(default)]
    pub loans: Vec<LoanDetails>,
    pub business_financials: BusinessFinancials,
    #[serde(default)]
    pub growth_needs: GrowthNeeds,
    #[serde(default)]
    pub proposed_financing: ProposedFinancing,
    #[serde(default)]
    pub reinvestment_rate: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "scenario", content = "input", rename_all = "kebab-case")]
pub enum ScenarioInput {
    Budgeting(BudgetingInput),
    EmergencyFund(EmergencyFundInput),
    DebtPayoff(DebtPayoffInput),
    Investing(InvestingInput),
    EducationFund(EducationFundInput),
    MajorPurchase(MajorPurchaseInput),
    WealthBuilding(WealthBuildingInput),
    BudgetOptimization(BudgetOptimizationInput),
    DebtManagement(DebtManagementInput),
}

impl ScenarioInput {
    pub fn kind(&self) -> ScenarioKind {
        match self {
            ScenarioInput::Budgeting(_) => ScenarioKind::Budgeting,
            ScenarioInput::EmergencyFund(_) => ScenarioKind::EmergencyFund,
            ScenarioInput::DebtPayoff(_) => ScenarioKind::DebtPayoff,
            ScenarioInput::Investing(_) => ScenarioKind::Investing,
            ScenarioInput::EducationFund(_) => ScenarioKind::EducationFund,
            ScenarioInput::MajorPurchase(_) => ScenarioKind::MajorPurchase,
            ScenarioInput::WealthBuilding(_) => ScenarioKind::WealthBuilding,
            ScenarioInput::BudgetOptimization(_) => ScenarioKind::BudgetOptimization,
            ScenarioInput::DebtManagement(_) => ScenarioKind::DebtManagement,
        }
    }

    pub fn from_value(kind: ScenarioKind, value: Value) -> serde_json::Result<Self> {
        Ok(match kind {
            ScenarioKind::Budgeting => ScenarioInput::Budgeting(serde_json::from_value(value)?),
            ScenarioKind::EmergencyFund => {
                ScenarioInput::EmergencyFund(serde_json::from_value(value)?)
            }
            ScenarioKind::DebtPayoff => ScenarioInput::DebtPayoff(serde_json::from_value(value)?),
            ScenarioKind::Investing => ScenarioInput::Investing(serde_json::from_value(value)?),
            ScenarioKind::EducationFund => {
                ScenarioInput::EducationFund(serde_json::from_value(value)?)
            }
            ScenarioKind::MajorPurchase => {
                ScenarioInput::MajorPurchase(serde_json::from_value(value)?)
            }
            ScenarioKind::WealthBuilding => {
                ScenarioInput::WealthBuilding(serde_json::from_value(value)?)
            }
            ScenarioKind::BudgetOptimization => {
                ScenarioInput::BudgetOptimization(serde_json::from_value(value)?)
            }
            ScenarioKind::DebtManagement => {
                ScenarioInput::DebtManagement(serde_json::from_value(value)?)
            }
        })
    }

    pub fn to_value(&self) -> serde_json::Result<Value> {
        match self {
            ScenarioInput::Budgeting(input) => serde_json::to_value(input),
            ScenarioInput::EmergencyFund(input) => serde_json::to_value(input),
            ScenarioInput::DebtPayoff(input) => serde_json::to_value(input),
            ScenarioInput::Investing(input) => serde_json::to_value(input),
            ScenarioInput::EducationFund(input) => serde_json::to_value(input),
            ScenarioInput::MajorPurchase(input) => serde_json::to_value(input),
            ScenarioInput::WealthBuilding(input) => serde_json::to_value(input),
            ScenarioInput::BudgetOptimization(input) => serde_json::to_value(input),
            ScenarioInput::DebtManagement(input) => serde_json::to_value(input),
        }
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionStatus {
    Completed,
    GoalReached,
    /// Goal already satisfied before the first period; nothing simulated.
    AlreadyMet,
    /// The goal can never be reached with these inputs; detected up front.
    NonConvergent,
    /// Still short of the goal after `MAX_PERIODS` periods.
    HorizonExceeded,
}

impl ProjectionStatus {
    pub fn is_failure(self) -> bool {
        matches!(
            self,
            ProjectionStatus::NonConvergent | ProjectionStatus::HorizonExceeded
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MathSection {
    pub heading: String,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MathExplanation {
    pub title: String,
    pub sections: Vec<MathSection>,
}

impl MathExplanation {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            sections: Vec::new(),
        }
    }

    pub fn section<I, S>(mut self, heading: impl Into<String>, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sections.push(MathSection {
            heading: heading.into(),
            items: items.into_iter().map(Into::into).collect(),
        });
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectionResult<P, M> {
    pub status: ProjectionStatus,
    pub periods: Vec<P>,
    pub metrics: M,
    pub summary: String,
    pub math_explanation: MathExplanation,
}

#[derive(Debug, Clone, Serialize)]
pub struct BudgetLine {
    pub category: &'static str,
    pub group: BudgetGroup,
    pub amount: f64,
    pub share_of_income: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BudgetingMetrics {
    pub total_income: f64,
    pub total_expenses: f64,
    pub savings_contribution: f64,
    pub remaining_balance: f64,
    pub savings_rate: f64,
    pub needs_share: f64,
    pub wants_share: f64,
    pub savings_share: f64,
    pub over_budget: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DebtPayoffPeriod {
    pub period: u32,
    pub payment: f64,
    pub interest: f64,
    pub principal: f64,
    pub balance: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DebtPayoffMetrics {
    pub monthly_rate: f64,
    pub scheduled_payment: f64,
    pub first_period_interest: f64,
    pub months_to_payoff: Option<u32>,
    pub total_interest: f64,
    pub total_paid: f64,
    pub remaining_balance: f64,
    pub months_saved_by_extra: Option<u32>,
    pub interest_saved_by_extra: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SavingsPeriod {
    pub period: u32,
    pub contribution: f64,
    pub interest: f64,
    pub balance: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmergencyFundMetrics {
    pub target_amount: f64,
    pub monthly_rate: f64,
    pub months_to_target: Option<u32>,
    /// Unclamped balance after the last simulated month.
    pub final_balance: f64,
    pub total_contributions: f64,
    pub total_interest: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct InvestingMetrics {
    pub monthly_rate: f64,
    pub months: u32,
    pub future_value: f64,
    pub lump_sum_value: f64,
    pub contributions_value: f64,
    pub total_contributed: f64,
    pub total_growth: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EducationYear {
    pub year: u32,
    pub projected_cost: f64,
    pub projected_savings: f64,
    pub gap: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct EducationFundMetrics {
    pub future_cost: f64,
    pub projected_savings: f64,
    pub gap: f64,
    pub funded_ratio: Option<f64>,
    pub required_monthly_contribution: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MajorPurchaseMetrics {
    pub down_payment: f64,
    pub projected_savings: f64,
    pub down_payment_gap: f64,
    pub loan_principal: f64,
    pub loan_periods: u32,
    pub monthly_loan_payment: f64,
    pub total_interest: f64,
    pub total_loan_cost: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WealthYear {
    pub year: u32,
    pub age: u32,
    pub monthly_contribution: f64,
    pub contributions_to_date: f64,
    pub nominal_balance: f64,
    pub real_balance: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct WealthBuildingMetrics {
    pub years: u32,
    pub net_annual_return: f64,
    pub fv_initial_savings: f64,
    pub projected_nominal: f64,
    pub projected_real: f64,
    pub target_real: f64,
    pub real_gap: f64,
    pub goal_met: bool,
    pub total_contributions: f64,
    pub required_monthly_contribution: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BudgetMonth {
    pub month: u32,
    pub total_income: f64,
    pub fixed_expenses: f64,
    pub variable_expenses: f64,
    pub wants_expenses: f64,
    pub target_savings: f64,
    pub net_cash_flow: f64,
    pub cumulative_savings: f64,
    pub cumulative_deficit: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BudgetOptimizationMetrics {
    pub avg_net_cash_flow: f64,
    pub discretionary_spending_percent: f64,
    pub monthly_discretionary_spending: f64,
    pub total_discretionary_spending: f64,
    pub highest_discretionary_category: Option<&'static str>,
    pub projected_emergency_fund_months: Option<f64>,
    pub cumulative_savings: f64,
    pub cumulative_deficit: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CashFlowMonth {
    pub month: u32,
    pub starting_cash: f64,
    pub revenue: f64,
    pub operating_expenses: f64,
    pub loan_interest: f64,
    pub loan_principal: f64,
    pub net_operating_cash_flow: f64,
    pub ending_cash: f64,
    pub outstanding_debt: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DebtManagementMetrics {
    pub loan_count: usize,
    pub starting_debt: f64,
    pub proposed_monthly_payment: f64,
    pub first_month_debt_service: f64,
    pub debt_service_coverage_ratio: Option<f64>,
    pub total_interest: f64,
    pub total_principal: f64,
    pub ending_cash: f64,
    pub ending_debt: f64,
    pub lowest_cash: f64,
    /// 0 when cash never drops below the starting reserves.
    pub lowest_cash_month: u32,
    pub negative_cash_months: u32,
    pub funding_gap: f64,
    pub expected_annual_growth_return: Option<f64>,
    pub reinvestment_pool: f64,
}

pub type BudgetingResult = ProjectionResult<BudgetLine, BudgetingMetrics>;
pub type DebtPayoffResult = ProjectionResult<DebtPayoffPeriod, DebtPayoffMetrics>;
pub type EmergencyFundResult = ProjectionResult<SavingsPeriod, EmergencyFundMetrics>;
pub type InvestingResult = ProjectionResult<SavingsPeriod, InvestingMetrics>;
pub type EducationFundResult = ProjectionResult<EducationYear, EducationFundMetrics>;
pub type MajorPurchaseResult = ProjectionResult<SavingsPeriod, MajorPurchaseMetrics>;
pub type WealthBuildingResult = ProjectionResult<WealthYear, WealthBuildingMetrics>;
pub type BudgetOptimizationResult = ProjectionResult<BudgetMonth, BudgetOptimizationMetrics>;
pub type DebtManagementResult = ProjectionResult<CashFlowMonth, DebtManagementMetrics>;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "scenario", rename_all = "kebab-case")]
pub enum ScenarioOutput {
    Budgeting(BudgetingResult),
    EmergencyFund(EmergencyFundResult),
    DebtPayoff(DebtPayoffResult),
    Investing(InvestingResult),
    EducationFund(EducationFundResult),
    MajorPurchase(MajorPurchaseResult),
    WealthBuilding(WealthBuildingResult),
    BudgetOptimization(BudgetOptimizationResult),
    DebtManagement(DebtManagementResult),
}

macro_rules! each_output {
    ($output:expr, $result:ident => $body:expr) => {
        match $output {
            ScenarioOutput::Budgeting($result) => $body,
            ScenarioOutput::EmergencyFund($result) => $body,
            ScenarioOutput::DebtPayoff($result) => $body,
            ScenarioOutput::Investing($result) => $body,
            ScenarioOutput::EducationFund($result) => $body,
            ScenarioOutput::MajorPurchase($result) => $body,
            ScenarioOutput::WealthBuilding($result) => $body,
            ScenarioOutput::BudgetOptimization($result) => $body,
            ScenarioOutput::DebtManagement($result) => $body,
        }
    };
}

impl ScenarioOutput {
    pub fn kind(&self) -> ScenarioKind {
        match self {
            ScenarioOutput::Budgeting(_) => ScenarioKind::Budgeting,
            ScenarioOutput::EmergencyFund(_) => ScenarioKind::EmergencyFund,
            ScenarioOutput::DebtPayoff(_) => ScenarioKind::DebtPayoff,
            ScenarioOutput::Investing(_) => ScenarioKind::Investing,
            ScenarioOutput::EducationFund(_) => ScenarioKind::EducationFund,
            ScenarioOutput::MajorPurchase(_) => ScenarioKind::MajorPurchase,
            ScenarioOutput::WealthBuilding(_) => ScenarioKind::WealthBuilding,
            ScenarioOutput::BudgetOptimization(_) => ScenarioKind::BudgetOptimization,
            ScenarioOutput::DebtManagement(_) => ScenarioKind::DebtManagement,
        }
    }

    pub fn status(&self) -> ProjectionStatus {
        each_output!(self, result => result.status)
    }

    pub fn summary(&self) -> &str {
        each_output!(self, result => &result.summary)
    }

    pub fn math_explanation(&self) -> &MathExplanation {
        each_output!(self, result => &result.math_explanation)
    }

    pub fn period_count(&self) -> usize {
        each_output!(self, result => result.periods.len())
    }

    pub fn periods_value(&self) -> serde_json::Result<Value> {
        each_output!(self, result => serde_json::to_value(&result.periods))
    }

    pub fn metrics_value(&self) -> serde_json::Result<Value> {
        each_output!(self, result => serde_json::to_value(&result.metrics))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scenario_kind_parses_kebab_and_snake_case() {
        assert_eq!(
            "emergency-fund".parse::<ScenarioKind>(),
            Ok(ScenarioKind::EmergencyFund)
        );
        assert_eq!(
            "budget_optimization".parse::<ScenarioKind>(),
            Ok(ScenarioKind::BudgetOptimization)
        );
        assert!("retirement".parse::<ScenarioKind>().is_err());
        for kind in ScenarioKind::ALL {
            assert_eq!(kind.as_str().parse::<ScenarioKind>(), Ok(kind));
        }
    }

    #[test]
    fn from_value_reads_untagged_debt_payoff_body() {
        let input = ScenarioInput::from_value(
            ScenarioKind::DebtPayoff,
            json!({"debt": 1000.0, "monthly_payment": 100.0, "interest_rate": 12.0}),
        )
        .expect("valid body");

        assert_eq!(input.kind(), ScenarioKind::DebtPayoff);
        let ScenarioInput::DebtPayoff(debt) = input else {
            panic!("wrong variant");
        };
        assert_eq!(debt.annual_interest_rate, 12.0);
        assert_eq!(debt.extra_payment, 0.0);
    }

    #[test]
    fn from_value_rejects_missing_required_field() {
        let err = ScenarioInput::from_value(ScenarioKind::Investing, json!({"initial": 10.0}))
            .expect_err("return_rate and years are required");
        assert!(err.to_string().contains("return_rate"));
    }

    #[test]
    fn wealth_building_defaults_match_advisor_profile() {
        let input: WealthBuildingInput = serde_json::from_value(json!({
            "goal_name": "Retirement",
            "current_age": 30,
            "target_age": 60,
            "target_amount": 1000000.0,
            "risk_profile": "Aggressive"
        }))
        .expect("valid body");

        assert_eq!(input.expected_annual_return, 7.0);
        assert_eq!(input.inflation_rate, 3.5);
        assert_eq!(input.risk_profile, RiskProfile::Aggressive);
    }

    #[test]
    fn expense_groups_total_their_items() {
        let wants = WantsDiscretionary {
            dining_out: 1500.0,
            travel_vacation: 500.0,
            ..Default::default()
        };
        assert_eq!(wants.total(), 2000.0);
        assert_eq!(wants.items().len(), 6);
    }

    #[test]
    fn math_explanation_builder_keeps_section_order() {
        let math = MathExplanation::new("Example")
            .section("First", ["a"])
            .section("Second", vec!["b".to_string(), "c".to_string()]);
        assert_eq!(math.sections.len(), 2);
        assert_eq!(math.sections[1].heading, "Second");
        assert_eq!(math.sections[1].items, vec!["b", "c"]);
    }
}
