use crate::infra::engine_from_config;
use clap::Args;
use loan_engine::config::AppConfig;
use loan_engine::error::AppError;
use loan_engine::lending::{
    ApplicantProfile, DecisionBasis, EmiQuote, FeasibilityVerdict, LoanEvaluationEngine,
    LoanRequest, RepaymentPoint,
};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub(crate) struct EmiArgs {
    /// Principal to borrow
    #[arg(long)]
    pub(crate) loan_amount: f64,
    /// Repayment tenure in whole months
    #[arg(long)]
    pub(crate) tenure_months: u32,
    /// Annual interest rate in percent; predicted when omitted
    #[arg(long)]
    pub(crate) interest: Option<f64>,
}

#[derive(Args, Debug)]
pub(crate) struct FeasibilityArgs {
    /// CIBIL credit score (300-900)
    #[arg(long)]
    pub(crate) cibil: i32,
    /// Monthly income
    #[arg(long)]
    pub(crate) income: f64,
    /// Monthly expenses
    #[arg(long)]
    pub(crate) expense: f64,
    /// Requested loan amount
    #[arg(long)]
    pub(crate) loan_amount: f64,
    /// Annual interest rate in percent; predicted when omitted
    #[arg(long)]
    pub(crate) interest: Option<f64>,
}

#[derive(Args, Debug)]
pub(crate) struct SeriesArgs {
    #[arg(long)]
    pub(crate) loan_amount: f64,
    #[arg(long)]
    pub(crate) tenure_months: u32,
    /// Annual interest rate in percent; predicted when omitted
    #[arg(long)]
    pub(crate) interest: Option<f64>,
    /// Write the schedule as CSV instead of printing it
    #[arg(long)]
    pub(crate) csv: Option<PathBuf>,
}

pub(crate) fn run_emi(args: EmiArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let engine = engine_from_config(&config)?;

    let request = LoanRequest {
        principal: args.loan_amount,
        tenure_months: args.tenure_months,
        annual_interest_rate: args.interest,
    };
    let quote = engine.evaluate_emi(&request)?;
    render_quote(&quote);
    Ok(())
}

pub(crate) fn run_feasibility(args: FeasibilityArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let engine = engine_from_config(&config)?;

    let profile = ApplicantProfile {
        credit_score: args.cibil,
        monthly_income: args.income,
        monthly_expense: args.expense,
        loan_amount: args.loan_amount,
        annual_interest_rate: args.interest,
    };
    let verdict = engine.evaluate_feasibility(&profile)?;
    render_verdict(&verdict);
    Ok(())
}

pub(crate) fn run_series(args: SeriesArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let engine = engine_from_config(&config)?;
    render_series(&engine, args)
}

pub(crate) fn render_series(
    engine: &LoanEvaluationEngine,
    args: SeriesArgs,
) -> Result<(), AppError> {
    let request = LoanRequest {
        principal: args.loan_amount,
        tenure_months: args.tenure_months,
        annual_interest_rate: args.interest,
    };
    let schedule = engine.repayment_schedule(&request)?;

    match args.csv {
        Some(path) => {
            write_series_csv(&path, &schedule.points)?;
            println!(
                "Wrote {} months (EMI {:.2}) to {}",
                schedule.points.len(),
                schedule.emi,
                path.display()
            );
        }
        None => {
            println!(
                "EMI {:.2} at {:.2}% ({}) over {} months",
                schedule.emi,
                schedule.annual_rate,
                schedule.rate_source.label(),
                args.tenure_months
            );
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            writeln!(out, "month  cumulative_paid  cumulative_interest")?;
            for point in &schedule.points {
                writeln!(
                    out,
                    "{:>5}  {:>15.2}  {:>19.2}",
                    point.month, point.cumulative_paid, point.cumulative_interest
                )?;
            }
        }
    }
    Ok(())
}

pub(crate) fn render_quote(quote: &EmiQuote) {
    println!("EMI quote ({} months)", quote.tenure_months);
    println!(
        "- Interest rate: {:.2}% ({})",
        quote.annual_rate,
        quote.rate_source.label()
    );
    println!("- Monthly installment: {:.2}", quote.emi);
    println!("- Total repayment: {:.2}", quote.total_repayment);
    println!("- Total interest: {:.2}", quote.total_interest);
    if let Some(r2) = quote.regressor_r2_score {
        println!("- Interest model R2: {:.2}", r2);
    }
}

pub(crate) fn render_verdict(verdict: &FeasibilityVerdict) {
    println!("{}", verdict.message);
    let basis = match verdict.decided_by {
        DecisionBasis::AffordabilityGuardrail => "affordability guardrail",
        DecisionBasis::Classifier => "feasibility classifier",
    };
    println!("Decided by {basis} | EMI {:.2}", verdict.emi);
    if let Some(accuracy) = verdict.model_accuracy {
        println!("Classifier accuracy: {:.2}%", accuracy);
    }

    if !verdict.suggestions.is_empty() {
        println!("\nSuggestions");
        for suggestion in &verdict.suggestions {
            println!("- {}", suggestion);
        }
    }

    if !verdict.insights.is_empty() {
        println!("\nInsights");
        for insight in &verdict.insights {
            println!("- {}", insight);
        }
    }
}

pub(crate) fn write_series_csv(path: &Path, points: &[RepaymentPoint]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path).map_err(std::io::Error::from)?;
    for point in points {
        writer.serialize(point).map_err(std::io::Error::from)?;
    }
    writer.flush()?;
    Ok(())
}
