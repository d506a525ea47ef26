use crate::models::{CompletionRecord, QuestionResponses, SurveyResults};

pub const NO_DATA: &str = "No data";

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionSummary {
    pub average: i64,
    pub best: String,
    pub worst: String,
}

/// Completion rate as a percentage. A record with no responses at all has
/// no defined rate and reads as 0.
pub fn rate(record: &CompletionRecord) -> f64 {
    let total = record.completed + record.incomplete;
    if total == 0 {
        return 0.0;
    }
    record.completed as f64 / total as f64 * 100.0
}

/// Mean rate plus best and worst performer. Ties keep the earliest record,
/// scanning left to right.
pub fn summarize(records: &[CompletionRecord]) -> CompletionSummary {
    let Some(first) = records.first() else {
        return CompletionSummary {
            average: 0,
            best: NO_DATA.to_string(),
            worst: NO_DATA.to_string(),
        };
    };

    let mut total = 0.0;
    let mut best = first;
    let mut worst = first;
    for record in records {
        let value = rate(record);
        total += value;
        if value > rate(best) {
            best = record;
        }
        if value < rate(worst) {
            worst = record;
        }
    }

    CompletionSummary {
        average: (total / records.len() as f64).round() as i64,
        best: best.name.clone(),
        worst: worst.name.clone(),
    }
}

/// Derives the completion-rate rows for a results payload: a question counts
/// as completed for every response that answered it, incomplete for the rest.
pub fn completion_records(results: &SurveyResults) -> Vec<CompletionRecord> {
    results
        .questions
        .iter()
        .map(|question| {
            let mut completed = match &question.responses {
                QuestionResponses::Options(options) => {
                    options.iter().map(|o| o.count).sum::<u64>()
                }
                QuestionResponses::Texts(texts) => texts.len() as u64,
            };
            if completed == 0 {
                if let Some(distribution) = &question.distribution {
                    completed = distribution.iter().map(|r| r.count).sum();
                }
            }

            CompletionRecord {
                name: shorten(&question.question),
                completed,
                incomplete: results.total_responses.saturating_sub(completed),
            }
        })
        .collect()
}

fn shorten(label: &str) -> String {
    if label.chars().count() > 40 {
        let head: String = label.chars().take(40).collect();
        format!("{head}...")
    } else {
        label.to_string()
    }
}
