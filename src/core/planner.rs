//! Multi-factor projections: growing contributions, what-if budgets and
//! multi-loan cash flow.

use super::format::{humanize, money, percent, round_to};
use super::primitives::{
    ContributionTiming, MONTHS_PER_YEAR, amortize_step, amortized_payment, compound, deflate,
    is_zero_rate, monthly_rate, required_contribution,
};
use super::types::{
    BudgetMonth, BudgetOptimizationInput, BudgetOptimizationMetrics, BudgetOptimizationResult,
    CashFlowMonth, DebtManagementInput, DebtManagementMetrics, DebtManagementResult,
    ExpenseGroup, MathExplanation, ProjectionResult, ProjectionStatus, WealthBuildingInput,
    WealthBuildingMetrics, WealthBuildingResult, WealthYear,
};

const PROPOSED_LOAN_NAME: &str = "Proposed financing";

pub fn simulate_wealth_building(input: &WealthBuildingInput) -> WealthBuildingResult {
    let years = input.target_age.saturating_sub(input.current_age);
    let months = years * MONTHS_PER_YEAR;
    // Advisor fees drag the return before it is spread over months.
    let net_annual_return = (input.expected_annual_return - input.advisor_fee_percent) / 100.0;
    let rate = net_annual_return / MONTHS_PER_YEAR as f64;
    let inflation = input.inflation_rate / 100.0;
    let step_up = input.annual_contribution_increase / 100.0;

    let mut balance = input.current_savings;
    let mut contributed = 0.0;
    let mut periods = Vec::with_capacity(years as usize);
    for year in 1..=years {
        let monthly = input.monthly_contribution * (1.0 + step_up).powf(f64::from(year - 1));
        for _ in 0..MONTHS_PER_YEAR {
            balance = balance * (1.0 + rate) + monthly;
            contributed += monthly;
        }
        periods.push(WealthYear {
            year,
            age: input.current_age + year,
            monthly_contribution: monthly,
            contributions_to_date: contributed,
            nominal_balance: balance,
            real_balance: deflate(balance, inflation, year),
        });
    }

    let fv_initial_savings = compound(input.current_savings, rate, months);
    let projected_real = deflate(balance, inflation, years);
    let target_real = deflate(input.target_amount, inflation, years);
    // Hitting the real target means hitting the nominal target in nominal money.
    let required_monthly_contribution = required_contribution(
        input.target_amount - fv_initial_savings,
        rate,
        months,
        ContributionTiming::Ordinary,
    );
    let metrics = WealthBuildingMetrics {
        years,
        net_annual_return,
        fv_initial_savings,
        projected_nominal: balance,
        projected_real,
        target_real,
        real_gap: projected_real - target_real,
        goal_met: projected_real >= target_real,
        total_contributions: contributed,
        required_monthly_contribution,
    };

    let outcome = if metrics.goal_met {
        format!(
            "That meets the target of {} in today's money with {} to spare.",
            money(target_real),
            money(metrics.real_gap)
        )
    } else {
        format!(
            "That leaves you {} short of the target of {} in today's money. A flat monthly \
             contribution of about {} would reach it.",
            money(-metrics.real_gap),
            money(target_real),
            money(required_monthly_contribution)
        )
    };
    let summary = format!(
        "For your goal \"{}\" ({} by age {}), a {} plan returning {}% after fees projects {} \
         in {years} years, worth {} in today's money. {outcome}",
        input.goal_name,
        money(input.target_amount),
        input.target_age,
        input.risk_profile.label(),
        round_to(net_annual_return * 100.0, 2),
        money(balance),
        money(projected_real),
    );

    let growth_items = if is_zero_rate(rate) {
        vec![
            "Net return is 0, so savings only grow by contributions.".to_string(),
            format!("FV(initial) = {}", money(fv_initial_savings)),
        ]
    } else {
        vec![
            format!(
                "r = ({}% - {}% fee) ÷ 12 ÷ 100 = {rate:.6}, n = {months}",
                input.expected_annual_return, input.advisor_fee_percent
            ),
            "FV(initial) = Savings × (1 + r)^n".to_string(),
            format!(
                "FV(initial) = {} × (1 + {rate:.6})^{months} = {}",
                money(input.current_savings),
                money(fv_initial_savings)
            ),
        ]
    };
    let math_explanation = MathExplanation::new("Wealth Building Projection")
        .section("Net Return", growth_items)
        .section(
            "Growing Contributions",
            [
                "Monthly contribution in year k = Monthly × (1 + increase)^(k - 1)".to_string(),
                "Each month: Balance = Balance × (1 + r) + Contribution".to_string(),
                format!("Total contributed = {}", money(contributed)),
                format!("Projected balance = {}", money(balance)),
            ],
        )
        .section(
            "Inflation Adjustment",
            [
                "Real value = Nominal ÷ (1 + inflation)^years".to_string(),
                format!(
                    "Projected real = {} ÷ (1 + {inflation:.4})^{years} = {}",
                    money(balance),
                    money(projected_real)
                ),
                format!(
                    "Target real = {} ÷ (1 + {inflation:.4})^{years} = {}",
                    money(input.target_amount),
                    money(target_real)
                ),
            ],
        )
        .section(
            "Required Contribution",
            [
                "Required = (Target - FV(initial)) × r ÷ ((1 + r)^n - 1)".to_string(),
                format!("Required = {}", money(required_monthly_contribution)),
            ],
        );

    ProjectionResult {
        status: ProjectionStatus::Completed,
        periods,
        metrics,
        summary,
        math_explanation,
    }
}

/// Saturates at the largest finite magnitude so compounded what-if growth
/// never produces `inf - inf`.
fn bounded(value: f64) -> f64 {
    value.clamp(-f64::MAX, f64::MAX)
}

pub fn simulate_budget_optimization(input: &BudgetOptimizationInput) -> BudgetOptimizationResult {
    let factors = input.what_if_factors.unwrap_or_default();
    let fixed = bounded(input.expenses.fixed_needs.total());
    let variable = bounded(input.expenses.variable_needs.total());
    let wants_items = input.expenses.wants_discretionary.items();
    let base_income = input.income.total();
    let base_wants = bounded(wants_items.iter().map(|(_, amount)| amount).sum());
    let base_savings = input.savings_goals.target_monthly_savings;

    let mut income = base_income;
    let mut wants = base_wants;
    let mut savings = base_savings;
    let mut cumulative_savings = 0.0;
    let mut cumulative_deficit = 0.0;
    let mut total_cash_flow = 0.0;
    let mut total_wants = 0.0;
    let mut periods = Vec::with_capacity(input.projection_months as usize);
    for month in 1..=input.projection_months {
        if month > 1 {
            income = bounded(income * (1.0 + factors.income_growth_rate));
            wants *= 1.0 - factors.wants_reduction_rate;
            savings = bounded(savings * (1.0 + factors.savings_increase_rate));
        }
        let expenses = bounded(fixed + variable + wants);
        let net_cash_flow = bounded(bounded(income - expenses) - savings);
        // Surplus and shortfall are separate ledgers; they never offset.
        if net_cash_flow >= 0.0 {
            cumulative_savings = bounded(cumulative_savings + net_cash_flow);
        } else {
            cumulative_deficit = bounded(cumulative_deficit - net_cash_flow);
        }
        total_cash_flow = bounded(total_cash_flow + net_cash_flow);
        total_wants = bounded(total_wants + wants);
        periods.push(BudgetMonth {
            month,
            total_income: income,
            fixed_expenses: fixed,
            variable_expenses: variable,
            wants_expenses: wants,
            target_savings: savings,
            net_cash_flow,
            cumulative_savings,
            cumulative_deficit,
        });
    }

    let avg_net_cash_flow = if input.projection_months > 0 {
        total_cash_flow / f64::from(input.projection_months)
    } else {
        0.0
    };
    let discretionary_share = if base_income > 0.0 {
        base_wants / base_income
    } else {
        0.0
    };
    let highest_discretionary_category = wants_items
        .iter()
        .filter(|(_, amount)| *amount > 0.0)
        .fold(None, |best: Option<(&'static str, f64)>, &(name, amount)| match best {
            Some((_, top)) if top >= amount => best,
            _ => Some((name, amount)),
        })
        .map(|(name, _)| name);
    let emergency_target = input.savings_goals.emergency_fund_target;
    let projected_emergency_fund_months =
        (base_savings > 0.0).then(|| emergency_target / base_savings);

    let metrics = BudgetOptimizationMetrics {
        avg_net_cash_flow,
        discretionary_spending_percent: round_to(discretionary_share, 4),
        monthly_discretionary_spending: base_wants,
        total_discretionary_spending: total_wants,
        highest_discretionary_category,
        projected_emergency_fund_months,
        cumulative_savings,
        cumulative_deficit,
    };

    let mut summary = format!(
        "Over {} months you are projected to have an average monthly {} of {}. \
         Discretionary spending takes {} of your income",
        input.projection_months,
        if avg_net_cash_flow < 0.0 { "deficit" } else { "surplus" },
        money(avg_net_cash_flow.abs()),
        percent(discretionary_share),
    );
    match highest_discretionary_category {
        Some(category) => summary.push_str(&format!(", led by {}.", humanize(category))),
        None => summary.push('.'),
    }
    match projected_emergency_fund_months {
        Some(months) if emergency_target > 0.0 => summary.push_str(&format!(
            " Saving {} a month funds your {} emergency fund in {months:.1} months.",
            money(base_savings),
            money(emergency_target)
        )),
        None if emergency_target > 0.0 => summary.push_str(&format!(
            " With no monthly savings target, your {} emergency fund is not being funded.",
            money(emergency_target)
        )),
        _ => {}
    }
    if cumulative_deficit > 0.0 {
        summary.push_str(&format!(
            " Shortfall months add up to {} over the projection.",
            money(cumulative_deficit)
        ));
    }
    if !factors.is_neutral() {
        summary.push_str(&format!(
            " This includes what-if changes from month 2: income up {} a month, discretionary \
             spending down {} a month and savings up {} a month.",
            percent(factors.income_growth_rate),
            percent(factors.wants_reduction_rate),
            percent(factors.savings_increase_rate)
        ));
    }

    let mut explanation = MathExplanation::new("Budget Optimization Projection")
        .section(
            "Formulas",
            [
                "Total Monthly Income (TMI) = Monthly Net Income + Other Monthly Income",
                "Total Monthly Expenses (TME) = Fixed + Variable + Discretionary",
                "Net Cash Flow (NCF) = TMI - TME - Target Monthly Savings",
                "Cumulative Savings grows by positive NCF; Cumulative Deficit grows by negative NCF",
            ],
        )
        .section(
            "Your Numbers",
            [
                format!("TMI = {}", money(base_income)),
                format!(
                    "TME = {} + {} + {} = {}",
                    money(fixed),
                    money(variable),
                    money(base_wants),
                    money(fixed + variable + base_wants)
                ),
                format!("Target savings = {}", money(base_savings)),
                format!("Average NCF = {}", money(avg_net_cash_flow)),
            ],
        );
    if !factors.is_neutral() {
        explanation = explanation.section(
            "What-If Adjustments (from month 2)",
            [
                format!("Income × (1 + {})", factors.income_growth_rate),
                format!("Discretionary × (1 - {})", factors.wants_reduction_rate),
                format!("Savings × (1 + {})", factors.savings_increase_rate),
            ],
        );
    }

    ProjectionResult {
        status: ProjectionStatus::Completed,
        periods,
        metrics,
        summary,
        math_explanation: explanation,
    }
}

#[derive(Debug)]
struct LoanState {
    name: String,
    balance: f64,
    rate: f64,
    payment: f64,
}

fn loan_states(input: &DebtManagementInput) -> Vec<LoanState> {
    let mut loans: Vec<LoanState> = input
        .loans
        .iter()
        .map(|loan| {
            let rate = monthly_rate(loan.annual_interest_rate);
            let payment = if loan.monthly_payment > 0.0 {
                loan.monthly_payment
            } else {
                amortized_payment(loan.outstanding_balance, rate, loan.remaining_term_months)
            };
            LoanState {
                name: loan.loan_name.clone(),
                balance: loan.outstanding_balance,
                rate,
                payment,
            }
        })
        .collect();

    let proposed = &input.proposed_financing;
    if proposed.proposed_loan_amount > 0.0 {
        let rate = monthly_rate(proposed.proposed_annual_interest_rate);
        loans.push(LoanState {
            name: PROPOSED_LOAN_NAME.to_string(),
            balance: proposed.proposed_loan_amount,
            rate,
            payment: amortized_payment(
                proposed.proposed_loan_amount,
                rate,
                proposed.proposed_loan_term,
            ),
        });
    }
    loans
}

pub fn simulate_debt_management(input: &DebtManagementInput) -> DebtManagementResult {
    let financials = &input.business_financials;
    let mut loans = loan_states(input);
    let starting_debt: f64 = loans.iter().map(|loan| loan.balance).sum();
    let proposed_monthly_payment = loans
        .iter()
        .find(|loan| loan.name == PROPOSED_LOAN_NAME)
        .map_or(0.0, |loan| loan.payment);

    let mut cash = financials.current_cash_reserves;
    let mut lowest_cash = cash;
    let mut lowest_cash_month = 0;
    let mut negative_cash_months = 0;
    let mut first_month_debt_service = 0.0;
    let mut total_interest = 0.0;
    let mut total_principal = 0.0;
    let mut reinvestment_pool = 0.0;
    let mut periods = Vec::with_capacity(input.projection_period as usize);

    for month in 1..=input.projection_period {
        let starting_cash = cash;
        let mut loan_interest = 0.0;
        let mut loan_principal = 0.0;
        for loan in loans.iter_mut().filter(|loan| loan.balance > 0.0) {
            let step = amortize_step(loan.balance, loan.rate, loan.payment);
            loan_interest += step.interest;
            loan_principal += step.principal;
            loan.balance = step.balance;
        }

        let net_operating_cash_flow = financials.avg_monthly_revenue
            - (financials.avg_monthly_operating_expenses + loan_interest);
        cash = starting_cash + net_operating_cash_flow - loan_principal;
        let outstanding_debt = loans.iter().map(|loan| loan.balance).sum();

        if month == 1 {
            first_month_debt_service = loan_interest + loan_principal;
        }
        total_interest += loan_interest;
        total_principal += loan_principal;
        let free_cash_flow = net_operating_cash_flow - loan_principal;
        reinvestment_pool += free_cash_flow.max(0.0) * input.reinvestment_rate / 100.0;
        if cash < lowest_cash {
            lowest_cash = cash;
            lowest_cash_month = month;
        }
        if cash < 0.0 {
            negative_cash_months += 1;
        }

        periods.push(CashFlowMonth {
            month,
            starting_cash,
            revenue: financials.avg_monthly_revenue,
            operating_expenses: financials.avg_monthly_operating_expenses,
            loan_interest,
            loan_principal,
            net_operating_cash_flow,
            ending_cash: cash,
            outstanding_debt,
        });
    }

    let operating_income =
        financials.avg_monthly_revenue - financials.avg_monthly_operating_expenses;
    let debt_service_coverage_ratio =
        (first_month_debt_service > 0.0).then(|| operating_income / first_month_debt_service);
    let growth = &input.growth_needs;
    let metrics = DebtManagementMetrics {
        loan_count: loans.len(),
        starting_debt,
        proposed_monthly_payment,
        first_month_debt_service,
        debt_service_coverage_ratio,
        total_interest,
        total_principal,
        ending_cash: cash,
        ending_debt: loans.iter().map(|loan| loan.balance).sum(),
        lowest_cash,
        lowest_cash_month,
        negative_cash_months,
        funding_gap: (growth.capital_required - input.proposed_financing.proposed_loan_amount)
            .max(0.0),
        expected_annual_growth_return: growth
            .expected_roi
            .map(|roi| growth.capital_required * roi / 100.0),
        reinvestment_pool,
    };

    let summary = debt_management_summary(input, &metrics);

    let loan_items: Vec<String> = loans
        .iter()
        .map(|loan| {
            format!(
                "{}: payment {} at {:.4}% a month",
                loan.name,
                money(loan.payment),
                loan.rate * 100.0
            )
        })
        .collect();
    let math_explanation = MathExplanation::new("Debt Management Cash Flow")
        .section(
            "Each Month",
            [
                "Interest per loan = Balance × r; Principal = Payment - Interest",
                "Net Operating Cash Flow = Revenue - (Operating Expenses + Total Interest)",
                "Ending Cash = Starting Cash + Net Operating Cash Flow - Total Principal",
            ],
        )
        .section("Loans", loan_items)
        .section(
            "Coverage",
            [
                "DSCR = (Revenue - Operating Expenses) ÷ Month 1 Debt Service".to_string(),
                match debt_service_coverage_ratio {
                    Some(ratio) => format!(
                        "DSCR = {} ÷ {} = {ratio:.2}",
                        money(operating_income),
                        money(first_month_debt_service)
                    ),
                    None => "DSCR = not applicable (no debt service)".to_string(),
                },
            ],
        );

    ProjectionResult {
        status: ProjectionStatus::Completed,
        periods,
        metrics,
        summary,
        math_explanation,
    }
}

fn debt_management_summary(input: &DebtManagementInput, metrics: &DebtManagementMetrics) -> String {
    let mut summary = format!(
        "Over {} months your cash moves from {} to {} while total debt goes from {} to {}.",
        input.projection_period,
        money(input.business_financials.current_cash_reserves),
        money(metrics.ending_cash),
        money(metrics.starting_debt),
        money(metrics.ending_debt)
    );
    if let Some(ratio) = metrics.debt_service_coverage_ratio {
        summary.push_str(&format!(
            " Month 1 debt service of {} is covered {ratio:.2}x by operating income.",
            money(metrics.first_month_debt_service)
        ));
    }
    if metrics.negative_cash_months > 0 {
        summary.push_str(&format!(
            " Cash is negative in {} of {} months, bottoming at {} in month {}. Build a buffer \
             before taking on more debt.",
            metrics.negative_cash_months,
            input.projection_period,
            money(metrics.lowest_cash),
            metrics.lowest_cash_month
        ));
    } else if metrics.lowest_cash_month > 0 {
        summary.push_str(&format!(
            " Cash dips to its lowest point of {} in month {} but stays positive.",
            money(metrics.lowest_cash),
            metrics.lowest_cash_month
        ));
    } else {
        summary.push_str(" Cash never falls below your starting reserves.");
    }
    if metrics.funding_gap > 0.0 {
        summary.push_str(&format!(
            " Your growth plan still needs {} beyond the proposed financing.",
            money(metrics.funding_gap)
        ));
    }
    if let Some(expected) = metrics.expected_annual_growth_return {
        summary.push_str(&format!(
            " The growth capital is expected to return about {} a year.",
            money(expected)
        ));
    }
    if metrics.reinvestment_pool > 0.0 {
        summary.push_str(&format!(
            " Setting aside {}% of free cash flow builds a {} reinvestment pool.",
            input.reinvestment_rate,
            money(metrics.reinvestment_pool)
        ));
    }
    summary
}
