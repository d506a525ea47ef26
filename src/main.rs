use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{ArgGroup, Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

mod api;
mod error;
mod flow;
mod models;
mod report;
mod summary;
mod trend;

use api::SurveyApi;
use flow::{FlowState, ResponseFlow};
use models::{DataPoint, NewSurvey, QuestionKind, RespondentInfo, SurveyPatch, SurveyStatus};

#[derive(Parser)]
#[command(name = "survey-pulse")]
#[command(about = "Survey analytics and response collection client", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum StatusArg {
    Draft,
    Active,
    Closed,
}

impl From<StatusArg> for SurveyStatus {
    fn from(value: StatusArg) -> Self {
        match value {
            StatusArg::Draft => SurveyStatus::Draft,
            StatusArg::Active => SurveyStatus::Active,
            StatusArg::Closed => SurveyStatus::Closed,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List surveys
    Surveys,
    /// Show a survey and its questions
    Show {
        id: i64,
        #[arg(long)]
        public_link: Option<String>,
    },
    /// Create a survey from a JSON definition file
    Create {
        #[arg(long)]
        json: PathBuf,
    },
    /// Change a survey's status and/or mint a shareable public link
    #[command(group(
        ArgGroup::new("change")
            .args(["status", "link"])
            .multiple(true)
            .required(true)
    ))]
    Publish {
        id: i64,
        #[arg(long)]
        status: Option<StatusArg>,
        #[arg(long)]
        link: bool,
    },
    /// Answer a survey from a JSON answers file and submit one response
    Respond {
        id: i64,
        #[arg(long)]
        public_link: Option<String>,
        #[arg(long)]
        answers: PathBuf,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        department: Option<String>,
    },
    /// Show aggregated results with completion rates
    Results {
        id: i64,
    },
    /// Fit a trend line over daily response counts from a CSV file
    Trend {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long, default_value_t = 7)]
        horizon: u32,
    },
    /// Generate a markdown report
    Report {
        id: i64,
        #[arg(long)]
        counts_csv: Option<PathBuf>,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("survey_pulse=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let base_url = std::env::var("SURVEY_API_URL")
        .unwrap_or_else(|_| "http://localhost:8000/api".to_string());
    let api = SurveyApi::new(base_url)?;

    match cli.command {
        Commands::Surveys => {
            let surveys = api.list_surveys().await?;
            if surveys.is_empty() {
                println!("No surveys yet.");
                return Ok(());
            }
            for survey in surveys {
                println!(
                    "- [{}] {} ({}, {} responses)",
                    survey.id,
                    survey.title,
                    status_label(survey.status),
                    survey.response_count.unwrap_or(0)
                );
            }
        }
        Commands::Show { id, public_link } => {
            let survey = api.fetch_survey(id, public_link.as_deref()).await?;
            println!("{} ({})", survey.title, status_label(survey.status));
            if !survey.description.is_empty() {
                println!("{}", survey.description);
            }
            if let Some(link) = &survey.public_link {
                println!("Public link: {link}");
            }
            for question in &survey.questions {
                let required = if question.required { " (required)" } else { "" };
                println!(
                    "{}. [{}] {}{}",
                    question.order,
                    kind_label(question.kind),
                    question.question,
                    required
                );
                if !question.description.is_empty() {
                    println!("   {}", question.description);
                }
                for option in &question.options {
                    println!("   - {}", option.text);
                }
            }
        }
        Commands::Create { json } => {
            let raw = std::fs::read_to_string(&json)
                .with_context(|| format!("failed to read {}", json.display()))?;
            let definition: NewSurvey =
                serde_json::from_str(&raw).context("invalid survey definition")?;
            let survey = api.create_survey(&definition).await?;
            println!("Created survey {} ({}).", survey.id, survey.title);
        }
        Commands::Publish { id, status, link } => {
            let patch = SurveyPatch {
                public_link: link.then(mint_public_link),
                status: status.map(SurveyStatus::from),
            };
            let survey = api.update_survey(id, &patch).await?;
            println!("Survey {} is now {}.", survey.id, status_label(survey.status));
            if let Some(link) = &survey.public_link {
                println!("Public link: {link}");
            }
        }
        Commands::Respond {
            id,
            public_link,
            answers,
            email,
            name,
            department,
        } => {
            let answers = load_answers(&answers)?;
            let survey = api.fetch_survey(id, public_link.as_deref()).await?;
            let respondent = RespondentInfo {
                email,
                name,
                department,
            };

            let (mut flow, payload) = fill_flow(survey, respondent, &answers)?;

            match api.submit_response(&payload).await {
                Ok(receipt) => {
                    flow.submit_succeeded();
                    println!(
                        "{}",
                        receipt
                            .message
                            .unwrap_or_else(|| "Response submitted successfully".to_string())
                    );
                }
                Err(err) => {
                    flow.submit_failed(err.to_string());
                    return Err(err).context("submission failed; re-run to retry");
                }
            }
        }
        Commands::Results { id } => {
            let results = api.fetch_results(id).await?;
            println!("{} responses in total.", results.total_responses);

            let records = summary::completion_records(&results);
            let rollup = summary::summarize(&records);
            for record in &records {
                println!(
                    "- {}: {:.0}% completion ({} answered)",
                    record.name,
                    summary::rate(record),
                    record.completed
                );
            }
            println!(
                "Average completion {}%. Best: {}. Needs attention: {}.",
                rollup.average, rollup.best, rollup.worst
            );
        }
        Commands::Trend { csv, horizon } => {
            let points = load_daily_counts(&csv)?;
            if points.is_empty() {
                println!("No data points in {}.", csv.display());
                return Ok(());
            }

            let fit = trend::compute_trend(&points);
            let direction = if fit.slope > 0.0 { "increasing" } else { "decreasing" };
            println!(
                "Trend is {direction} (slope {:.3}, intercept {:.3}).",
                fit.slope, fit.intercept
            );
            println!("{} avg. daily responses.", trend::average_daily(&points));
            match trend::projected_growth_percent(&points) {
                Some(percent) => println!("{percent}% projected growth."),
                None => println!("Projected growth: no data."),
            }

            println!("Projection for the next {horizon} days:");
            for point in trend::project_forward(&points, fit, horizon) {
                println!("- {}: {:.1}", point.date, point.value);
            }
        }
        Commands::Report {
            id,
            counts_csv,
            out,
        } => {
            let survey = api.fetch_survey(id, None).await?;
            let results = api.fetch_results(id).await?;
            let points = match counts_csv {
                Some(path) => load_daily_counts(&path)?,
                None => Vec::new(),
            };
            let report = report::build_report(&survey, &results, &points);
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}

/// Walks the response flow over a prepared answer set. Required questions
/// without an answer fail here, before anything is sent.
fn fill_flow(
    survey: models::Survey,
    respondent: RespondentInfo,
    answers: &HashMap<i64, String>,
) -> anyhow::Result<(ResponseFlow, models::ResponsePayload)> {
    let mut flow = ResponseFlow::new(survey);
    if !respondent.is_empty() {
        flow.set_respondent_info(respondent);
    }
    flow.begin_questions();

    let total = flow.survey().questions.len();
    while let FlowState::AnsweringQuestion(index) = flow.state() {
        let question = &flow.survey().questions[index];
        let id = question.id;
        let prompt = question.question.clone();

        if let Some(text) = answers.get(&id) {
            flow.record_answer(text.clone());
        }
        if index + 1 == total {
            break;
        }
        if !flow.advance() {
            return Err(error::ApiError::Validation(format!(
                "question {id} is required but has no answer: {prompt}"
            ))
            .into());
        }
    }

    let payload = flow.begin_submit().ok_or_else(|| {
        error::ApiError::Validation("the last question is required but has no answer".to_string())
    })?;
    Ok((flow, payload))
}

/// Answers file format: `{"<question id>": "<answer text>", ...}`.
fn load_answers(path: &Path) -> anyhow::Result<HashMap<i64, String>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).context("invalid answers file")
}

/// Daily counts CSV with a `date,count` header, as exported by the survey
/// service. Rows are sorted by date after loading.
fn load_daily_counts(path: &Path) -> anyhow::Result<Vec<DataPoint>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let mut points = Vec::new();
    for row in reader.deserialize::<DataPoint>() {
        points.push(row?);
    }
    points.sort_by_key(|point| point.date);
    Ok(points)
}

/// Eight hex characters, same shape the survey service mints server-side.
fn mint_public_link() -> String {
    Uuid::new_v4().to_string()[..8].to_string()
}

fn status_label(status: Option<SurveyStatus>) -> &'static str {
    match status {
        Some(SurveyStatus::Draft) => "draft",
        Some(SurveyStatus::Active) => "active",
        Some(SurveyStatus::Closed) => "closed",
        None => "unknown",
    }
}

fn kind_label(kind: QuestionKind) -> &'static str {
    match kind {
        QuestionKind::MultipleChoice => "multiple choice",
        QuestionKind::Text => "text",
        QuestionKind::Rating => "rating",
        QuestionKind::YesNo => "yes/no",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn daily_counts_load_sorted_by_date() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "date,count").unwrap();
        writeln!(file, "2026-03-03,9").unwrap();
        writeln!(file, "2026-03-01,4").unwrap();
        writeln!(file, "2026-03-02,6").unwrap();
        file.flush().unwrap();

        let points = load_daily_counts(file.path()).unwrap();
        assert_eq!(points.len(), 3);
        assert!(points.windows(2).all(|w| w[0].date < w[1].date));
        assert_eq!(points[0].count, 4);
    }

    #[test]
    fn answers_file_maps_question_ids() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"1": "Yes", "2": "Better docs"}}"#).unwrap();
        file.flush().unwrap();

        let answers = load_answers(file.path()).unwrap();
        assert_eq!(answers.get(&1).map(String::as_str), Some("Yes"));
        assert_eq!(answers.len(), 2);
    }

    #[test]
    fn unanswered_required_question_fails_before_submission() {
        let survey = models::Survey {
            id: 1,
            title: "Feedback".to_string(),
            description: String::new(),
            status: None,
            public_link: None,
            questions: vec![models::Question {
                id: 9,
                kind: QuestionKind::Text,
                question: "What should we improve?".to_string(),
                description: String::new(),
                required: true,
                order: 0,
                options: Vec::new(),
            }],
            response_count: None,
        };

        let err = fill_flow(survey, RespondentInfo::default(), &HashMap::new()).unwrap_err();
        assert!(err.to_string().contains("required"));
    }

    #[test]
    fn minted_links_are_eight_chars() {
        let link = mint_public_link();
        assert_eq!(link.len(), 8);
        assert!(link.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
