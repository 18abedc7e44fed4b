use super::format::{money, percent};
use super::primitives::{
    ContributionTiming, MAX_PERIODS, MONTHS_PER_YEAR, amortize_step, amortized_payment,
    annuity_future_value, compound, is_zero_rate, monthly_rate, required_contribution,
};
use super::types::{
    BudgetGroup, BudgetLine, BudgetingInput, BudgetingMetrics, BudgetingResult, DebtPayoffInput,
    DebtPayoffMetrics, DebtPayoffPeriod, DebtPayoffResult, EducationFundInput,
    EducationFundMetrics, EducationFundResult, EducationYear, EmergencyFundInput,
    EmergencyFundMetrics, EmergencyFundResult, InvestingInput, InvestingMetrics, InvestingResult,
    MajorPurchaseInput, MajorPurchaseMetrics, MajorPurchaseResult, MathExplanation,
    ProjectionResult, ProjectionStatus, SavingsPeriod,
};

const NEEDS_GUIDELINE: f64 = 0.50;
const WANTS_GUIDELINE: f64 = 0.30;
const SAVINGS_GUIDELINE: f64 = 0.20;

#[derive(Debug)]
struct PayoffRun {
    status: ProjectionStatus,
    periods: Vec<DebtPayoffPeriod>,
    total_interest: f64,
    total_paid: f64,
    balance: f64,
}

impl PayoffRun {
    fn months_to_payoff(&self) -> Option<u32> {
        match self.status {
            ProjectionStatus::GoalReached => Some(self.periods.len() as u32),
            ProjectionStatus::AlreadyMet => Some(0),
            _ => None,
        }
    }
}

pub fn simulate_budgeting(input: &BudgetingInput) -> BudgetingResult {
    let income = input.monthly_net_income;
    let share = |amount: f64| if income > 0.0 { amount / income } else { 0.0 };

    let mut needs = 0.0;
    let mut wants = 0.0;
    let mut savings = 0.0;
    let mut periods = Vec::with_capacity(12);
    for (category, group, amount) in input.lines() {
        match group {
            BudgetGroup::Needs => needs += amount,
            BudgetGroup::Wants => wants += amount,
            BudgetGroup::Savings => savings += amount,
        }
        periods.push(BudgetLine {
            category,
            group,
            amount,
            share_of_income: share(amount),
        });
    }

    let total_expenses = needs + wants;
    let remaining_balance = income - total_expenses - savings;
    let metrics = BudgetingMetrics {
        total_income: income,
        total_expenses,
        savings_contribution: savings,
        remaining_balance,
        savings_rate: share(savings),
        needs_share: share(needs),
        wants_share: share(wants),
        savings_share: share(savings),
        over_budget: remaining_balance < 0.0,
    };

    let leftover = if remaining_balance >= 0.0 {
        format!(
            "After setting aside {} for savings you have {} left over each month.",
            money(savings),
            money(remaining_balance)
        )
    } else {
        format!(
            "After setting aside {} for savings you are short {} each month.",
            money(savings),
            money(-remaining_balance)
        )
    };
    let summary = format!(
        "Your expenses total {} against a monthly income of {}. {} Needs take {} of income \
         (guideline {}), wants {} (guideline {}) and savings {} (guideline {}).",
        money(total_expenses),
        money(income),
        leftover,
        percent(metrics.needs_share),
        percent(NEEDS_GUIDELINE),
        percent(metrics.wants_share),
        percent(WANTS_GUIDELINE),
        percent(metrics.savings_share),
        percent(SAVINGS_GUIDELINE),
    );

    let math_explanation = MathExplanation::new("Monthly Budget Breakdown")
        .section(
            "Formulas",
            [
                "Total Expenses = Needs + Wants",
                "Remaining Balance = Income - Total Expenses - Savings",
                "Share of Income = Amount ÷ Income",
            ],
        )
        .section(
            "Your Numbers",
            [
                format!("Income = {}", money(income)),
                format!("Needs = {}", money(needs)),
                format!("Wants = {}", money(wants)),
                format!("Savings = {}", money(savings)),
                format!(
                    "Remaining Balance = {} - {} - {} = {}",
                    money(income),
                    money(total_expenses),
                    money(savings),
                    money(remaining_balance)
                ),
            ],
        )
        .section(
            "50/30/20 Guideline",
            [
                format!("Needs: {} of income (target 50%)", percent(metrics.needs_share)),
                format!("Wants: {} of income (target 30%)", percent(metrics.wants_share)),
                format!(
                    "Savings: {} of income (target 20%)",
                    percent(metrics.savings_share)
                ),
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

fn run_payoff(debt: f64, rate: f64, payment: f64) -> PayoffRun {
    let mut run = PayoffRun {
        status: ProjectionStatus::AlreadyMet,
        periods: Vec::new(),
        total_interest: 0.0,
        total_paid: 0.0,
        balance: debt.max(0.0),
    };
    if debt <= 0.0 {
        return run;
    }
    // A payment that cannot beat the first month's interest never shrinks the balance.
    if payment <= debt * rate {
        run.status = ProjectionStatus::NonConvergent;
        return run;
    }

    run.status = ProjectionStatus::HorizonExceeded;
    for period in 1..=MAX_PERIODS {
        let step = amortize_step(run.balance, rate, payment);
        run.total_interest += step.interest;
        run.total_paid += step.payment;
        run.balance = step.balance;
        run.periods.push(DebtPayoffPeriod {
            period,
            payment: step.payment,
            interest: step.interest,
            principal: step.principal,
            balance: step.balance,
        });
        if run.balance <= 0.0 {
            run.status = ProjectionStatus::GoalReached;
            break;
        }
    }
    run
}

pub fn simulate_debt_payoff(input: &DebtPayoffInput) -> DebtPayoffResult {
    let rate = monthly_rate(input.annual_interest_rate);
    let payment = input.monthly_payment + input.extra_payment;
    let first_period_interest = input.debt.max(0.0) * rate;
    let run = run_payoff(input.debt, rate, payment);

    let (months_saved_by_extra, interest_saved_by_extra) =
        if input.extra_payment > 0.0 && run.status == ProjectionStatus::GoalReached {
            let baseline = run_payoff(input.debt, rate, input.monthly_payment);
            if baseline.status == ProjectionStatus::GoalReached {
                (
                    Some(baseline.periods.len().saturating_sub(run.periods.len()) as u32),
                    Some(baseline.total_interest - run.total_interest),
                )
            } else {
                (None, None)
            }
        } else {
            (None, None)
        };

    let metrics = DebtPayoffMetrics {
        monthly_rate: rate,
        scheduled_payment: payment,
        first_period_interest,
        months_to_payoff: run.months_to_payoff(),
        total_interest: run.total_interest,
        total_paid: run.total_paid,
        remaining_balance: run.balance,
        months_saved_by_extra,
        interest_saved_by_extra,
    };

    let mut summary = match run.status {
        ProjectionStatus::AlreadyMet => "There is no outstanding balance to pay off.".to_string(),
        ProjectionStatus::NonConvergent => format!(
            "Your payment of {} does not cover the first month's interest of {}, so the \
             balance can never shrink. Pay more than {} a month to make progress.",
            money(payment),
            money(first_period_interest),
            money(first_period_interest)
        ),
        ProjectionStatus::HorizonExceeded => format!(
            "After {MAX_PERIODS} months you would still owe {}. The debt is not paid off \
             within the horizon; a larger monthly payment is needed.",
            money(run.balance)
        ),
        ProjectionStatus::GoalReached | ProjectionStatus::Completed => {
            let months = run.periods.len();
            format!(
                "You will be debt-free in {months} months ({:.1} years), paying {} in \
                 interest on a {} balance.",
                months as f64 / MONTHS_PER_YEAR as f64,
                money(run.total_interest),
                money(input.debt)
            )
        }
    };
    if let (Some(months), Some(interest)) = (months_saved_by_extra, interest_saved_by_extra) {
        summary.push_str(&format!(
            " The extra {} each month saves {months} months and {} in interest.",
            money(input.extra_payment),
            money(interest)
        ));
    }

    let math_explanation = MathExplanation::new("Debt Payoff Calculation")
        .section(
            "Monthly Interest Rate",
            [format!(
                "r = {}% ÷ 12 ÷ 100 = {rate:.6}",
                input.annual_interest_rate
            )],
        )
        .section(
            "Each Month",
            [
                "Interest = Balance × r",
                "Principal = Payment - Interest",
                "New Balance = Balance - Principal (never below zero)",
            ],
        )
        .section(
            "Your Numbers",
            [
                format!("Starting debt = {}", money(input.debt)),
                format!(
                    "Payment = {} + {} extra = {}",
                    money(input.monthly_payment),
                    money(input.extra_payment),
                    money(payment)
                ),
                format!(
                    "First month interest = {} × {rate:.6} = {}",
                    money(input.debt),
                    money(first_period_interest)
                ),
            ],
        )
        .section(
            "Result",
            [
                format!("Months simulated = {}", run.periods.len()),
                format!("Total interest = {}", money(run.total_interest)),
                format!("Total paid = {}", money(run.total_paid)),
            ],
        );

    ProjectionResult {
        status: run.status,
        periods: run.periods,
        metrics,
        summary,
        math_explanation,
    }
}

pub fn simulate_emergency_fund(input: &EmergencyFundInput) -> EmergencyFundResult {
    let target = input.monthly_expenses * input.months_of_expenses as f64;
    let rate = monthly_rate(input.annual_interest_rate_percent);
    let contribution = input.monthly_savings;

    let mut balance = input.current_emergency_savings;
    let mut periods = Vec::new();
    let mut total_contributions = 0.0;
    let mut total_interest = 0.0;

    let status = if balance >= target {
        ProjectionStatus::AlreadyMet
    } else if contribution <= 0.0 && (rate <= 0.0 || balance <= 0.0) {
        ProjectionStatus::NonConvergent
    } else {
        let mut status = ProjectionStatus::HorizonExceeded;
        for period in 1..=MAX_PERIODS {
            let interest = balance * rate;
            balance += interest + contribution;
            total_interest += interest;
            total_contributions += contribution;
            periods.push(SavingsPeriod {
                period,
                contribution,
                interest,
                // Display value stops at the target; the period count stays true.
                balance: balance.min(target),
            });
            if balance >= target {
                status = ProjectionStatus::GoalReached;
                break;
            }
        }
        status
    };

    let months_to_target = match status {
        ProjectionStatus::AlreadyMet => Some(0),
        ProjectionStatus::GoalReached => Some(periods.len() as u32),
        _ => None,
    };
    let metrics = EmergencyFundMetrics {
        target_amount: target,
        monthly_rate: rate,
        months_to_target,
        final_balance: balance,
        total_contributions,
        total_interest,
    };

    let summary = match status {
        ProjectionStatus::AlreadyMet => format!(
            "Your current savings of {} already cover your {} target ({} months of \
             expenses). No additional months are needed.",
            money(input.current_emergency_savings),
            money(target),
            input.months_of_expenses
        ),
        ProjectionStatus::NonConvergent => format!(
            "With no monthly savings and nothing earning interest, your emergency fund \
             cannot grow toward the {} target.",
            money(target)
        ),
        ProjectionStatus::HorizonExceeded => format!(
            "Saving {} a month you would have {} after {MAX_PERIODS} months, still short of \
             the {} target.",
            money(contribution),
            money(balance),
            money(target)
        ),
        ProjectionStatus::GoalReached | ProjectionStatus::Completed => {
            let months = periods.len();
            format!(
                "You will reach your {} emergency fund in {months} months ({:.1} years) by \
                 saving {} a month at {}% annual interest.",
                money(target),
                months as f64 / MONTHS_PER_YEAR as f64,
                money(contribution),
                input.annual_interest_rate_percent
            )
        }
    };

    let math_explanation = MathExplanation::new("Emergency Fund Growth")
        .section(
            "Target",
            [format!(
                "Target = {} monthly expenses × {} months = {}",
                money(input.monthly_expenses),
                input.months_of_expenses,
                money(target)
            )],
        )
        .section(
            "Each Month",
            [
                format!(
                    "r = {}% ÷ 12 ÷ 100 = {rate:.6}",
                    input.annual_interest_rate_percent
                ),
                "Balance = Balance × (1 + r) + Monthly Savings".to_string(),
                "Stop when Balance ≥ Target".to_string(),
            ],
        )
        .section(
            "Result",
            [
                format!("Starting savings = {}", money(input.current_emergency_savings)),
                format!("Total contributed = {}", money(total_contributions)),
                format!("Interest earned = {}", money(total_interest)),
                match months_to_target {
                    Some(months) => format!("Months to target = {months}"),
                    None => "Months to target = not reached".to_string(),
                },
            ],
        );

    ProjectionResult {
        status,
        periods,
        metrics,
        summary,
        math_explanation,
    }
}

/// Month-by-month trace with contributions made at the start of each month.
fn project_savings(initial: f64, monthly: f64, rate: f64, months: u32) -> Vec<SavingsPeriod> {
    let mut balance = initial;
    (1..=months)
        .map(|period| {
            balance += monthly;
            let interest = balance * rate;
            balance += interest;
            SavingsPeriod {
                period,
                contribution: monthly,
                interest,
                balance,
            }
        })
        .collect()
}

/// Closed form matching [`project_savings`]: lump sum plus annuity-due.
fn savings_future_value(initial: f64, monthly: f64, rate: f64, months: u32) -> (f64, f64) {
    (
        compound(initial, rate, months),
        annuity_future_value(monthly, rate, months, ContributionTiming::Due),
    )
}

pub fn simulate_investing(input: &InvestingInput) -> InvestingResult {
    let rate = monthly_rate(input.return_rate);
    let months = input.years * MONTHS_PER_YEAR;
    let periods = project_savings(input.initial, input.monthly, rate, months);
    let (lump_sum_value, contributions_value) =
        savings_future_value(input.initial, input.monthly, rate, months);
    let future_value = lump_sum_value + contributions_value;
    let total_contributed = input.initial + input.monthly * months as f64;

    let metrics = InvestingMetrics {
        monthly_rate: rate,
        months,
        future_value,
        lump_sum_value,
        contributions_value,
        total_contributed,
        total_growth: future_value - total_contributed,
    };

    let summary = format!(
        "Investing {} upfront and {} every month for {} years at {}% a year could grow to \
         {}. You put in {} yourself; {} comes from investment growth.",
        money(input.initial),
        money(input.monthly),
        input.years,
        input.return_rate,
        money(future_value),
        money(total_contributed),
        money(metrics.total_growth)
    );

    let growth_items = if is_zero_rate(rate) {
        vec![
            "r = 0, so there is no growth:".to_string(),
            format!(
                "FV = {} + {} × {months} = {}",
                money(input.initial),
                money(input.monthly),
                money(future_value)
            ),
        ]
    } else {
        vec![
            format!("r = {}% ÷ 12 ÷ 100 = {rate:.6}, n = {months}", input.return_rate),
            "FV(lump sum) = P × (1 + r)^n".to_string(),
            "FV(contributions) = C × ((1 + r)^n - 1) ÷ r × (1 + r)".to_string(),
            format!("FV(lump sum) = {}", money(lump_sum_value)),
            format!("FV(contributions) = {}", money(contributions_value)),
        ]
    };
    let math_explanation = MathExplanation::new("Investment Growth Projection")
        .section("Compound Growth", growth_items)
        .section(
            "Result",
            [
                format!("Future value = {}", money(future_value)),
                format!("Total contributed = {}", money(total_contributed)),
                format!("Growth = {}", money(metrics.total_growth)),
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

pub fn simulate_education_fund(input: &EducationFundInput) -> EducationFundResult {
    let rate = monthly_rate(input.return_rate);
    let inflation = input.inflation_rate / 100.0;
    let months = input.years * MONTHS_PER_YEAR;

    let cost_after = |years: u32| compound(input.today_cost, inflation, years);
    let savings_after = |months: u32| {
        let (lump, stream) =
            savings_future_value(input.current_savings, input.monthly_contrib, rate, months);
        lump + stream
    };

    let periods = (1..=input.years)
        .map(|year| {
            let projected_cost = cost_after(year);
            let projected_savings = savings_after(year * MONTHS_PER_YEAR);
            EducationYear {
                year,
                projected_cost,
                projected_savings,
                gap: projected_savings - projected_cost,
            }
        })
        .collect();

    let future_cost = cost_after(input.years);
    let projected_savings = savings_after(months);
    let gap = projected_savings - future_cost;
    let required_monthly_contribution = if gap < 0.0 {
        required_contribution(
            future_cost - compound(input.current_savings, rate, months),
            rate,
            months,
            ContributionTiming::Due,
        )
    } else {
        0.0
    };
    let metrics = EducationFundMetrics {
        future_cost,
        projected_savings,
        gap,
        funded_ratio: (future_cost > 0.0).then(|| projected_savings / future_cost),
        required_monthly_contribution,
    };

    let summary = if gap >= 0.0 {
        format!(
            "In {} years your education savings of {} are projected to exceed the expected \
             cost of {} by {}.",
            input.years,
            money(projected_savings),
            money(future_cost),
            money(gap)
        )
    } else {
        format!(
            "In {} years your education savings of {} are projected to fall short of the \
             expected cost of {} by {}. Saving about {} a month would close the gap.",
            input.years,
            money(projected_savings),
            money(future_cost),
            money(-gap),
            money(required_monthly_contribution)
        )
    };

    let math_explanation = MathExplanation::new("Education Fund Projection")
        .section(
            "Future Cost",
            [
                "Future Cost = Today's Cost × (1 + inflation)^years".to_string(),
                format!(
                    "{} × (1 + {inflation:.4})^{} = {}",
                    money(input.today_cost),
                    input.years,
                    money(future_cost)
                ),
            ],
        )
        .section(
            "Future Savings",
            [
                format!("r = {}% ÷ 12 ÷ 100 = {rate:.6}, n = {months}", input.return_rate),
                "FV = Savings × (1 + r)^n + Monthly × ((1 + r)^n - 1) ÷ r × (1 + r)".to_string(),
                format!("FV = {}", money(projected_savings)),
            ],
        )
        .section(
            "Gap",
            [
                "Gap = FV - Future Cost".to_string(),
                format!(
                    "{} - {} = {}",
                    money(projected_savings),
                    money(future_cost),
                    money(gap)
                ),
                format!(
                    "Monthly contribution needed to close the gap = {}",
                    money(required_monthly_contribution)
                ),
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

pub fn simulate_major_purchase(input: &MajorPurchaseInput) -> MajorPurchaseResult {
    let savings_rate = monthly_rate(input.savings_return);
    let saving_months = input.years_to_save * MONTHS_PER_YEAR;
    let periods = project_savings(
        input.current_savings,
        input.monthly_contrib,
        savings_rate,
        saving_months,
    );
    let (lump, stream) = savings_future_value(
        input.current_savings,
        input.monthly_contrib,
        savings_rate,
        saving_months,
    );
    let projected_savings = lump + stream;

    let down_payment = input.price * input.down_pct / 100.0;
    let loan_principal = (input.price - down_payment).max(0.0);
    let loan_rate = monthly_rate(input.loan_rate);
    let loan_periods = input.loan_term * MONTHS_PER_YEAR;
    let monthly_loan_payment = amortized_payment(loan_principal, loan_rate, loan_periods);
    let total_interest = if is_zero_rate(loan_rate) || loan_principal <= 0.0 {
        0.0
    } else {
        (monthly_loan_payment * loan_periods as f64 - loan_principal).max(0.0)
    };

    let metrics = MajorPurchaseMetrics {
        down_payment,
        projected_savings,
        down_payment_gap: projected_savings - down_payment,
        loan_principal,
        loan_periods,
        monthly_loan_payment,
        total_interest,
        total_loan_cost: loan_principal + total_interest,
    };

    let savings_outcome = if metrics.down_payment_gap >= 0.0 {
        format!(
            "covering the down payment with {} to spare",
            money(metrics.down_payment_gap)
        )
    } else {
        format!(
            "leaving {} of the down payment still to save",
            money(-metrics.down_payment_gap)
        )
    };
    let summary = format!(
        "A {}% down payment on {} is {}. Saving {} a month for {} years grows your fund to \
         {}, {}. Financing the remaining {} over {} years at {}% costs {} a month and {} in \
         total interest.",
        input.down_pct,
        money(input.price),
        money(down_payment),
        money(input.monthly_contrib),
        input.years_to_save,
        money(projected_savings),
        savings_outcome,
        money(loan_principal),
        input.loan_term,
        input.loan_rate,
        money(monthly_loan_payment),
        money(total_interest)
    );

    let loan_items = if is_zero_rate(loan_rate) {
        vec![
            "Loan rate is 0, so the payment is a straight split:".to_string(),
            format!(
                "Payment = {} ÷ {loan_periods} = {}",
                money(loan_principal),
                money(monthly_loan_payment)
            ),
        ]
    } else {
        vec![
            format!(
                "r = {}% ÷ 12 ÷ 100 = {loan_rate:.6}, n = {loan_periods}",
                input.loan_rate
            ),
            "Payment = L × r ÷ (1 - (1 + r)^-n)".to_string(),
            format!("Payment = {}", money(monthly_loan_payment)),
            format!(
                "Total interest = Payment × n - L = {}",
                money(total_interest)
            ),
        ]
    };
    let math_explanation = MathExplanation::new("Major Purchase Plan")
        .section(
            "Down Payment",
            [format!(
                "Down Payment = {} × {}% = {}",
                money(input.price),
                input.down_pct,
                money(down_payment)
            )],
        )
        .section(
            "Savings",
            [
                "FV = Savings × (1 + r)^n + Monthly × ((1 + r)^n - 1) ÷ r × (1 + r)".to_string(),
                format!("FV after {saving_months} months = {}", money(projected_savings)),
            ],
        )
        .section("Loan", loan_items);

    ProjectionResult {
        status: ProjectionStatus::Completed,
        periods,
        metrics,
        summary,
        math_explanation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn debt_input(debt: f64, monthly_payment: f64, rate: f64, extra: f64) -> DebtPayoffInput {
        DebtPayoffInput {
            debt,
            monthly_payment,
            annual_interest_rate: rate,
            extra_payment: extra,
        }
    }

    fn emergency_input(current: f64, monthly: f64, rate: f64) -> EmergencyFundInput {
        EmergencyFundInput {
            monthly_expenses: 20_000.0,
            months_of_expenses: 6,
            current_emergency_savings: current,
            monthly_savings: monthly,
            annual_interest_rate_percent: rate,
        }
    }

    fn education_input(current: f64, monthly: f64) -> EducationFundInput {
        EducationFundInput {
            today_cost: 500_000.0,
            years: 10,
            current_savings: current,
            monthly_contrib: monthly,
            return_rate: 6.0,
            inflation_rate: 4.0,
        }
    }

    #[test]
    fn debt_payoff_regression_fixture() {
        let result = simulate_debt_payoff(&debt_input(120_000.0, 5_000.0, 12.0, 0.0));

        assert_eq!(result.status, ProjectionStatus::GoalReached);
        assert_approx(result.metrics.monthly_rate, 0.01);
        assert_approx(result.metrics.first_period_interest, 1_200.0);
        assert_eq!(result.metrics.months_to_payoff, Some(28));
        assert_eq!(result.periods.len(), 28);
        assert_approx(result.metrics.total_interest, 17_909.432_578_664_688);
        assert_approx(result.metrics.total_paid, 120_000.0 + 17_909.432_578_664_688);
        assert_eq!(result.periods.last().map(|p| p.balance), Some(0.0));
        assert_approx(result.periods[0].interest, 1_200.0);
        assert_approx(result.periods[0].principal, 3_800.0);
        assert!(result.summary.contains("28 months"));
    }

    #[test]
    fn debt_payoff_reruns_are_identical() {
        let input = debt_input(120_000.0, 5_000.0, 12.0, 0.0);
        let left = simulate_debt_payoff(&input);
        let right = simulate_debt_payoff(&input);
        assert_eq!(left.periods, right.periods);
        assert_eq!(left.metrics.total_interest, right.metrics.total_interest);
    }

    #[test]
    fn debt_payoff_detects_non_convergence_on_first_period() {
        let result = simulate_debt_payoff(&debt_input(120_000.0, 1_200.0, 12.0, 0.0));

        assert_eq!(result.status, ProjectionStatus::NonConvergent);
        assert!(result.periods.is_empty());
        assert_eq!(result.metrics.months_to_payoff, None);
        assert_eq!(result.metrics.total_interest, 0.0);
        assert!(result.summary.contains("does not cover"));
    }

    #[test]
    fn debt_payoff_reports_horizon_exceeded() {
        // 1% monthly on 100k is 1000 interest; 1001 barely dents it.
        let result = simulate_debt_payoff(&debt_input(100_000.0, 1_001.0, 12.0, 0.0));

        assert_eq!(result.status, ProjectionStatus::HorizonExceeded);
        assert_eq!(result.periods.len(), MAX_PERIODS as usize);
        assert!(result.metrics.remaining_balance > 0.0);
        assert_eq!(result.metrics.months_to_payoff, None);
    }

    #[test]
    fn debt_payoff_zero_rate_is_linear() {
        let result = simulate_debt_payoff(&debt_input(1_000.0, 100.0, 0.0, 0.0));
        assert_eq!(result.metrics.months_to_payoff, Some(10));
        assert_eq!(result.metrics.total_interest, 0.0);
    }

    #[test]
    fn debt_payoff_zero_payment_without_interest_is_non_convergent() {
        let result = simulate_debt_payoff(&debt_input(1_000.0, 0.0, 0.0, 0.0));
        assert_eq!(result.status, ProjectionStatus::NonConvergent);
    }

    #[test]
    fn debt_payoff_reports_extra_payment_savings() {
        let with_extra = simulate_debt_payoff(&debt_input(120_000.0, 4_000.0, 12.0, 1_000.0));
        let baseline = simulate_debt_payoff(&debt_input(120_000.0, 4_000.0, 12.0, 0.0));

        // Same total payment as the regression fixture.
        assert_eq!(with_extra.metrics.months_to_payoff, Some(28));
        let saved_months = baseline.periods.len() as u32 - 28;
        assert_eq!(with_extra.metrics.months_saved_by_extra, Some(saved_months));
        assert_approx(
            with_extra.metrics.interest_saved_by_extra.unwrap_or_default(),
            baseline.metrics.total_interest - with_extra.metrics.total_interest,
        );
        assert!(with_extra.summary.contains("extra"));
    }

    #[test]
    fn emergency_fund_short_circuits_when_target_met() {
        let result = simulate_emergency_fund(&emergency_input(150_000.0, 5_000.0, 3.0));

        assert_eq!(result.status, ProjectionStatus::AlreadyMet);
        assert_eq!(result.metrics.months_to_target, Some(0));
        assert!(result.periods.is_empty());
        assert_eq!(result.metrics.total_contributions, 0.0);
    }

    #[test]
    fn emergency_fund_zero_rate_counts_whole_months() {
        // Target 120k, start 20k, 10k a month -> 10 months.
        let result = simulate_emergency_fund(&emergency_input(20_000.0, 10_000.0, 0.0));

        assert_eq!(result.status, ProjectionStatus::GoalReached);
        assert_eq!(result.metrics.months_to_target, Some(10));
        assert_approx(result.metrics.final_balance, 120_000.0);
    }

    #[test]
    fn emergency_fund_clamps_displayed_balance_to_target() {
        // 25k a month overshoots 120k in month 5 (125k).
        let result = simulate_emergency_fund(&emergency_input(0.0, 25_000.0, 0.0));

        assert_eq!(result.metrics.months_to_target, Some(5));
        assert_approx(result.periods[4].balance, 120_000.0);
        assert_approx(result.metrics.final_balance, 125_000.0);
        assert_approx(result.periods[3].balance, 100_000.0);
    }

    #[test]
    fn emergency_fund_compounds_interest_before_contribution() {
        let result = simulate_emergency_fund(&emergency_input(100_000.0, 1_000.0, 12.0));
        let first = result.periods[0];
        assert_approx(first.interest, 1_000.0);
        assert_approx(first.balance, 102_000.0);
    }

    #[test]
    fn emergency_fund_without_growth_is_non_convergent() {
        let result = simulate_emergency_fund(&emergency_input(10_000.0, 0.0, 0.0));
        assert_eq!(result.status, ProjectionStatus::NonConvergent);
        assert!(result.periods.is_empty());
    }

    #[test]
    fn emergency_fund_interest_only_growth_can_exceed_horizon() {
        // 1 peso at 1% a year needs far more than 600 months to hit 120k.
        let result = simulate_emergency_fund(&emergency_input(1.0, 0.0, 1.0));
        assert_eq!(result.status, ProjectionStatus::HorizonExceeded);
        assert_eq!(result.periods.len(), MAX_PERIODS as usize);
    }

    #[test]
    fn investing_without_growth_sums_contributions_exactly() {
        let result = simulate_investing(&InvestingInput {
            initial: 0.0,
            monthly: 1_000.0,
            return_rate: 0.0,
            years: 1,
        });

        assert_eq!(result.metrics.future_value, 12_000.0);
        assert_eq!(result.periods.len(), 12);
        assert_eq!(result.periods[11].balance, 12_000.0);
        assert_eq!(result.metrics.total_growth, 0.0);
        assert_eq!(result.math_explanation.sections[0].items[0], "r = 0, so there is no growth:");
    }

    #[test]
    fn investing_matches_hand_calculation() {
        // 1000 upfront, 100 a month, 12% -> r = 0.01 over 12 months.
        let result = simulate_investing(&InvestingInput {
            initial: 1_000.0,
            monthly: 100.0,
            return_rate: 12.0,
            years: 1,
        });
        let growth = 1.01_f64.powi(12);
        let expected = 1_000.0 * growth + 100.0 * (growth - 1.0) / 0.01 * 1.01;
        assert_approx(result.metrics.future_value, expected);
        assert_approx(result.metrics.total_contributed, 2_200.0);
    }

    #[test]
    fn education_fund_gap_polarity_matches_summary() {
        let short = simulate_education_fund(&education_input(10_000.0, 500.0));
        assert!(short.metrics.gap < 0.0);
        assert!(short.summary.contains("fall short"));
        assert!(!short.summary.contains("exceed"));
        assert!(short.metrics.required_monthly_contribution > 500.0);

        let ahead = simulate_education_fund(&education_input(600_000.0, 0.0));
        assert!(ahead.metrics.gap > 0.0);
        assert!(ahead.summary.contains("exceed"));
        assert!(!ahead.summary.contains("fall short"));
        assert_eq!(ahead.metrics.required_monthly_contribution, 0.0);
    }

    #[test]
    fn education_fund_future_cost_uses_annual_inflation() {
        let result = simulate_education_fund(&education_input(0.0, 1_000.0));
        assert_approx(result.metrics.future_cost, 500_000.0 * 1.04_f64.powi(10));
        assert_eq!(result.periods.len(), 10);
        let last = result.periods[9];
        assert_approx(last.projected_cost, result.metrics.future_cost);
        assert_approx(last.projected_savings, result.metrics.projected_savings);
        assert_approx(result.metrics.gap, last.gap);
    }

    #[test]
    fn major_purchase_zero_rate_loan_splits_evenly() {
        let result = simulate_major_purchase(&MajorPurchaseInput {
            price: 1_000_000.0,
            down_pct: 20.0,
            years_to_save: 3,
            current_savings: 50_000.0,
            monthly_contrib: 5_000.0,
            savings_return: 4.0,
            loan_rate: 0.0,
            loan_term: 20,
        });

        assert_eq!(result.metrics.down_payment, 200_000.0);
        assert_eq!(result.metrics.loan_principal, 800_000.0);
        assert_eq!(result.metrics.loan_periods, 240);
        assert_eq!(result.metrics.monthly_loan_payment, 800_000.0 / 240.0);
        assert_eq!(result.metrics.total_interest, 0.0);
        assert_eq!(result.periods.len(), 36);
    }

    #[test]
    fn major_purchase_interest_is_payments_minus_principal() {
        let result = simulate_major_purchase(&MajorPurchaseInput {
            price: 1_000_000.0,
            down_pct: 20.0,
            years_to_save: 2,
            current_savings: 0.0,
            monthly_contrib: 10_000.0,
            savings_return: 0.0,
            loan_rate: 6.0,
            loan_term: 30,
        });

        let payment = result.metrics.monthly_loan_payment;
        assert!((payment - 4_796.40).abs() < 0.01, "got {payment}");
        assert_approx(result.metrics.total_interest, payment * 360.0 - 800_000.0);
        assert_approx(result.metrics.projected_savings, 240_000.0);
        assert_approx(result.metrics.down_payment_gap, 40_000.0);
        assert!(result.summary.contains("to spare"));
    }

    #[test]
    fn budgeting_flags_overspending_and_guideline_shares() {
        let result = simulate_budgeting(&BudgetingInput {
            monthly_net_income: 40_000.0,
            housing_expense: 15_000.0,
            food_grocery_expense: 10_000.0,
            entertainment_recreation_expense: 12_000.0,
            savings_investment_contribution: 8_000.0,
            ..Default::default()
        });

        assert_approx(result.metrics.total_expenses, 37_000.0);
        assert_approx(result.metrics.remaining_balance, -5_000.0);
        assert!(result.metrics.over_budget);
        assert_approx(result.metrics.needs_share, 0.625);
        assert_approx(result.metrics.wants_share, 0.3);
        assert_approx(result.metrics.savings_rate, 0.2);
        assert_eq!(result.periods.len(), 12);
        assert!(result.summary.contains("short"));
    }

    #[test]
    fn budgeting_zero_income_has_zero_shares() {
        let result = simulate_budgeting(&BudgetingInput {
            housing_expense: 1_000.0,
            ..Default::default()
        });
        assert_eq!(result.metrics.needs_share, 0.0);
        assert!(result.periods.iter().all(|line| line.share_of_income == 0.0));
    }

    proptest! {
        #[test]
        fn debt_payoff_converges_when_payment_beats_interest(
            debt in 100.0f64..1_000_000.0,
            annual in 0.0f64..40.0,
            payment_multiple in 1.05f64..50.0,
        ) {
            let rate = monthly_rate(annual);
            // Keep the payment comfortably above the 600-month annuity payment.
            let floor = amortized_payment(debt, rate, MAX_PERIODS / 2).max(debt * rate);
            let payment = floor * payment_multiple;
            let result = simulate_debt_payoff(&debt_input(debt, payment, annual, 0.0));

            prop_assert_eq!(result.status, ProjectionStatus::GoalReached);
            prop_assert!(result.periods.len() <= MAX_PERIODS as usize);
            prop_assert!(result.periods.last().map(|p| p.balance).unwrap_or(1.0) <= 0.0);
            prop_assert!(result.metrics.total_interest >= 0.0);
        }

        #[test]
        fn debt_payoff_non_convergent_without_iterating(
            debt in 100.0f64..1_000_000.0,
            annual in 0.1f64..100.0,
            fraction in 0.0f64..=1.0,
        ) {
            let payment = debt * monthly_rate(annual) * fraction;
            let result = simulate_debt_payoff(&debt_input(debt, payment, annual, 0.0));

            prop_assert_eq!(result.status, ProjectionStatus::NonConvergent);
            prop_assert!(result.periods.is_empty());
        }

        #[test]
        fn investing_trace_matches_closed_form(
            initial in 0.0f64..1_000_000.0,
            monthly in 0.0f64..50_000.0,
            annual in 0.0f64..30.0,
            years in 1u32..50,
        ) {
            let result = simulate_investing(&InvestingInput {
                initial,
                monthly,
                return_rate: annual,
                years,
            });
            let traced = result.periods.last().map(|p| p.balance).unwrap_or(0.0);
            let closed = result.metrics.future_value;
            prop_assert!((traced - closed).abs() <= (closed.abs() * 1e-6).max(1e-9));
        }

        #[test]
        fn emergency_fund_met_target_never_iterates(
            expenses in 1.0f64..100_000.0,
            months in 1u32..24,
            surplus in 0.0f64..100_000.0,
        ) {
            let target = expenses * months as f64;
            let result = simulate_emergency_fund(&EmergencyFundInput {
                monthly_expenses: expenses,
                months_of_expenses: months,
                current_emergency_savings: target + surplus,
                monthly_savings: 1_000.0,
                annual_interest_rate_percent: 5.0,
            });
            prop_assert_eq!(result.metrics.months_to_target, Some(0));
            prop_assert!(result.periods.is_empty());
        }

        #[test]
        fn education_summary_polarity_follows_gap(
            current in 0.0f64..2_000_000.0,
            monthly in 0.0f64..50_000.0,
            years in 1u32..25,
            inflation in 0.0f64..15.0,
        ) {
            let result = simulate_education_fund(&EducationFundInput {
                today_cost: 400_000.0,
                years,
                current_savings: current,
                monthly_contrib: monthly,
                return_rate: 5.0,
                inflation_rate: inflation,
            });
            let gap = result.metrics.projected_savings - result.metrics.future_cost;
            prop_assert_eq!(result.metrics.gap, gap);
            prop_assert_eq!(result.summary.contains("exceed"), gap >= 0.0);
            prop_assert_eq!(result.summary.contains("fall short"), gap < 0.0);
        }
    }
}
