use std::fmt::Write;

use chrono::Utc;

use crate::models::{DataPoint, QuestionResponses, Survey, SurveyResults};
use crate::summary;
use crate::trend;

/// Renders the creator-facing markdown report: completion rates, the
/// per-question breakdown, and (when daily counts are supplied) the trend
/// analysis that backs the dashboard chart.
pub fn build_report(survey: &Survey, results: &SurveyResults, points: &[DataPoint]) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Survey Report: {}", survey.title);
    let _ = writeln!(
        output,
        "Generated {} ({} responses collected)",
        Utc::now().date_naive(),
        results.total_responses
    );

    let records = summary::completion_records(results);
    let rollup = summary::summarize(&records);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Completion Rates");

    if records.is_empty() {
        let _ = writeln!(output, "No responses recorded yet.");
    } else {
        for record in &records {
            let _ = writeln!(
                output,
                "- {}: {:.0}% ({} of {} responses)",
                record.name,
                summary::rate(record),
                record.completed,
                record.completed + record.incomplete
            );
        }
        let _ = writeln!(output);
        let _ = writeln!(
            output,
            "Average completion {}%. Best: {}. Needs attention: {}.",
            rollup.average, rollup.best, rollup.worst
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Question Breakdown");

    for question in &results.questions {
        let _ = writeln!(output);
        let _ = writeln!(output, "### {}", question.question);

        if let Some(average) = question.average_rating {
            let _ = writeln!(output, "Average rating {average:.1}");
        }

        match &question.responses {
            QuestionResponses::Options(options) if !options.is_empty() => {
                for option in options {
                    let _ = writeln!(
                        output,
                        "- {}: {} ({}%)",
                        option.option,
                        option.count,
                        share(option.count, results.total_responses)
                    );
                }
            }
            QuestionResponses::Texts(texts) if !texts.is_empty() => {
                for text in texts.iter().take(5) {
                    let _ = writeln!(output, "- \"{text}\"");
                }
            }
            _ => {
                if let Some(distribution) = &question.distribution {
                    for bucket in distribution {
                        let _ = writeln!(output, "- {}/10: {}", bucket.rating, bucket.count);
                    }
                } else {
                    let _ = writeln!(output, "No answers for this question.");
                }
            }
        }
    }

    if !points.is_empty() {
        let fit = trend::compute_trend(points);
        let direction = if fit.slope > 0.0 { "Increasing" } else { "Decreasing" };
        let growth = match trend::projected_growth_percent(points) {
            Some(percent) => format!("{percent}%"),
            None => "n/a".to_string(),
        };

        let _ = writeln!(output);
        let _ = writeln!(output, "## Response Trend");
        let _ = writeln!(
            output,
            "{} trend, {} avg. daily responses, {} projected growth.",
            direction,
            trend::average_daily(points),
            growth
        );
        let _ = writeln!(output);
        let _ = writeln!(output, "Next 7 days (projected):");
        for point in trend::project_forward(points, fit, 7) {
            let _ = writeln!(output, "- {}: {:.1}", point.date, point.value);
        }
    }

    output
}

fn share(count: u64, total: u64) -> u64 {
    if total == 0 {
        return 0;
    }
    ((count as f64 / total as f64) * 100.0).round() as u64
}
