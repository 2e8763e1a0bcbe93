use crate::infra::{build_dispatch, InMemoryEvaluationRepository, ScoringInput};
use chrono::Utc;
use clap::Args;
use recruit_ai::config::{AiConfig, AppConfig};
use recruit_ai::error::AppError;
use recruit_ai::workflows::screening::{
    can_finalize, Answer, EvaluationConfig, EvaluationRecord, ManualReview, MethodUsed, Question,
    ScoringAggregator, ScreeningService, SessionId, SessionVerdict,
};
use serde_json::json;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// JSON file holding evaluation results (a bare array or `{ "evaluations", "threshold" }`)
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Approval threshold override (0-100)
    #[arg(long)]
    pub(crate) threshold: Option<f64>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Session identifier to use for the scripted candidate
    #[arg(long)]
    pub(crate) session: Option<String>,
    /// Reviewer name recorded on the manual review step
    #[arg(long, default_value = "demo-reviewer")]
    pub(crate) reviewer: String,
    /// Approval threshold override (0-100)
    #[arg(long)]
    pub(crate) threshold: Option<f64>,
    /// Leave the manual question unreviewed to show the finalization guard
    #[arg(long)]
    pub(crate) skip_review: bool,
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let raw = fs::read_to_string(&args.input)?;
    let input: ScoringInput = serde_json::from_str(&raw)?;
    let (evaluations, file_threshold) = input.into_parts();

    let threshold = match args.threshold.or(file_threshold) {
        Some(threshold) => threshold,
        None => AppConfig::load()?.evaluation.approval_threshold,
    };
    let aggregator = ScoringAggregator::new(threshold);

    let check = can_finalize(evaluations.iter().map(|scored| &scored.result));
    let verdict = aggregator.score(&evaluations);

    println!("Scoring {} evaluation(s) from {}", evaluations.len(), args.input.display());
    render_verdict(&verdict, aggregator.threshold());
    if !check.allowed {
        println!("  Not final: {}", check.reason);
    }
    println!(
        "{}",
        serde_json::to_string_pretty(&json!({ "verdict": verdict, "finalization": check }))?
    );
    Ok(())
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        session,
        reviewer,
        threshold,
        skip_review,
    } = args;

    let session_id = SessionId(
        session.unwrap_or_else(|| format!("demo-{}", Utc::now().format("%Y%m%d%H%M%S"))),
    );
    let config = match threshold {
        Some(threshold) => EvaluationConfig {
            approval_threshold: threshold,
        },
        None => EvaluationConfig::default(),
    };

    let ai_config = AiConfig::default();
    let service = ScreeningService::new(
        Arc::new(InMemoryEvaluationRepository::default()),
        Arc::new(build_dispatch(&ai_config)),
        config,
    );

    println!("Screening session demo ({session_id})");
    let mut manual_record: Option<EvaluationRecord> = None;
    for (question, answer) in demo_questionnaire()? {
        let record = service
            .record_answer(session_id.clone(), &question, answer)
            .await?;
        render_record(&question, &record);
        if record.result.method_used == MethodUsed::Manual && record.is_pending() {
            manual_record = Some(record);
        }
    }

    let check = service.can_finalize(&session_id)?;
    println!("\nFinalization check: {}", check.reason);

    if let Some(record) = manual_record.filter(|_| !skip_review) {
        let reviewed = service.apply_manual_review(
            &record.id,
            ManualReview {
                complies: true,
                score: 80.0,
                reason: Some("clear availability and sensible notice period".to_string()),
                reviewer,
            },
        )?;
        println!(
            "Manual review applied to {} (revision {}): {}",
            reviewed.id, reviewed.revision, reviewed.result.reason
        );
        let check = service.can_finalize(&session_id)?;
        println!("Finalization check: {}", check.reason);
    }

    let verdict = service.session_verdict(&session_id)?;
    println!();
    render_verdict(&verdict, service.aggregator().threshold());

    let distribution = service.method_distribution(&session_id)?;
    println!("Method distribution:");
    for method in [MethodUsed::FixedRule, MethodUsed::Ai, MethodUsed::Manual] {
        let stats = distribution.get(method);
        println!(
            "  - {}: {} evaluation(s), average score {:.2}",
            method.label(),
            stats.count,
            stats.average_score
        );
    }

    Ok(())
}

fn render_record(question: &Question, record: &EvaluationRecord) {
    let status = match record.result.complies {
        Some(true) => "pass",
        Some(false) => "fail",
        None => "pending",
    };
    println!(
        "- {} [{}] {} -> {} ({:.0}) {}",
        question.id,
        record.result.method_used.label(),
        record.answer.as_text(),
        status,
        record.result.score,
        record.result.reason
    );
}

fn render_verdict(verdict: &SessionVerdict, threshold: f64) {
    println!(
        "Verdict: {} | {:.2}/{:.2} points ({:.2}%, threshold {:.2}%)",
        verdict.outcome.label(),
        verdict.total_score,
        verdict.max_score,
        verdict.percentage,
        threshold
    );
    println!("  Reason: {}", verdict.reason);
    println!(
        "  {} passed / {} failed / {} pending of {} evaluation(s)",
        verdict.stats.passed, verdict.stats.failed, verdict.stats.pending, verdict.stats.total
    );
}

fn demo_questionnaire() -> Result<Vec<(Question, Answer)>, AppError> {
    let entries = [
        (
            json!({
                "id": "work_permit",
                "text": "Do you hold a valid work permit?",
                "field_type": "yes_no",
                "rule": { "tag": "equals", "expected": "yes" },
                "weight": 2.0,
                "is_eliminatory": true,
            }),
            Answer::from("Yes"),
        ),
        (
            json!({
                "id": "experience",
                "text": "How many years of warehouse experience do you have?",
                "field_type": "number",
                "rule": { "tag": "range", "operator": ">=", "value": 2 },
                "weight": 1.5,
            }),
            Answer::from("3 years"),
        ),
        (
            json!({
                "id": "shifts",
                "text": "Which shifts can you cover?",
                "field_type": "multi_choice",
                "rule": { "tag": "options", "valid_options": ["morning", "afternoon", "night"] },
            }),
            Answer::from(vec!["Morning", "Weekend"]),
        ),
        (
            json!({
                "id": "motivation",
                "text": "Why do you want to join the logistics team?",
                "field_type": "long_text",
                "evaluation_method": "ai_optional",
                "use_ai": true,
                "rule": { "keywords": ["team", "safety", "growth"], "mode": "any" },
            }),
            Answer::from("I enjoy working in a team and care about safety on the floor."),
        ),
        (
            json!({
                "id": "availability",
                "text": "When could you start and what notice period do you have?",
                "field_type": "long_text",
                "evaluation_method": "manual",
            }),
            Answer::from("Two weeks from signing; my current notice period is 10 days."),
        ),
    ];

    entries
        .into_iter()
        .map(|(question, answer)| -> Result<(Question, Answer), AppError> {
            Ok((serde_json::from_value(question)?, answer))
        })
        .collect()
}
