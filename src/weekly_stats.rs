use chrono::NaiveDate;

use crate::models::{Fixture, Prediction, PredictionStatus};
use crate::time_format::parse_utc;

pub const PERFECT_POINTS: u32 = 3;
pub const CORRECT_POINTS: u32 = 1;

// First matchday weekend per season; week numbers count from here.
const SEASON_STARTS: &[(u16, (i32, u32, u32))] = &[
    (2023, (2023, 8, 11)),
    (2024, (2024, 8, 16)),
    (2025, (2025, 8, 15)),
    (2026, (2026, 8, 14)),
];

pub fn season_start(season: u16) -> Option<NaiveDate> {
    SEASON_STARTS
        .iter()
        .find(|(year, _)| *year == season)
        .and_then(|(_, (y, m, d))| NaiveDate::from_ymd_opt(*y, *m, *d))
}

/// Calendar week within the season: `floor(days_since_start / 7) + 1`.
/// Anything dated before the start lands in week 1.
pub fn week_for_date(date: NaiveDate, season_start: NaiveDate) -> u32 {
    let days = date.signed_duration_since(season_start).num_days();
    if days < 0 {
        return 1;
    }
    (days / 7) as u32 + 1
}

/// A settled prediction joined with its fixture's date. Input to the weekly
/// bucketing; everything here is already-fetched, already-trusted data.
#[derive(Debug, Clone)]
pub struct PredictionOutcome {
    pub date: NaiveDate,
    pub points: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeeklyPerformance {
    pub week: u32,
    pub points: u32,
    pub predictions: u32,
    pub perfect: u32,
    pub correct: u32,
    pub incorrect: u32,
    pub average: f64,
}

#[derive(Debug, Clone, Default)]
pub struct SeasonSummary {
    pub total_points: u32,
    pub total_predictions: u32,
    pub weeks_with_data: u32,
    /// (week, points) of the strongest and weakest week.
    pub best_week: Option<(u32, u32)>,
    pub worst_week: Option<(u32, u32)>,
    pub average_per_week: f64,
    /// 0-100; 100 means every week scored the same.
    pub consistency: u8,
}

/// Joins settled predictions against their fixtures. Predictions without a
/// processed score or with an unknown/unparseable fixture date are skipped.
pub fn outcomes_from_predictions(
    predictions: &[Prediction],
    fixtures: &[Fixture],
) -> Vec<PredictionOutcome> {
    let mut out = Vec::with_capacity(predictions.len());
    for prediction in predictions {
        if prediction.prediction_status != PredictionStatus::Processed {
            continue;
        }
        let Some(points) = prediction.points else {
            continue;
        };
        let Some(fixture) = fixtures
            .iter()
            .find(|f| f.fixture_id == prediction.fixture_id)
        else {
            continue;
        };
        let Some(date) = parse_utc(&fixture.date).map(|dt| dt.date_naive()) else {
            continue;
        };
        out.push(PredictionOutcome { date, points });
    }
    out
}

/// Buckets outcomes into season weeks. Only weeks with at least one
/// prediction appear; the sum of per-week points equals the sum over the
/// input.
pub fn compute_weekly_performance(
    outcomes: &[PredictionOutcome],
    season_start: NaiveDate,
) -> Vec<WeeklyPerformance> {
    let mut weeks: Vec<WeeklyPerformance> = Vec::new();

    for outcome in outcomes {
        let week = week_for_date(outcome.date, season_start);
        let idx = match weeks.iter().position(|w| w.week == week) {
            Some(idx) => idx,
            None => {
                weeks.push(WeeklyPerformance {
                    week,
                    points: 0,
                    predictions: 0,
                    perfect: 0,
                    correct: 0,
                    incorrect: 0,
                    average: 0.0,
                });
                weeks.len() - 1
            }
        };
        let entry = &mut weeks[idx];
        entry.points += outcome.points;
        entry.predictions += 1;
        match outcome.points {
            PERFECT_POINTS => entry.perfect += 1,
            CORRECT_POINTS => entry.correct += 1,
            _ => entry.incorrect += 1,
        }
    }

    for entry in &mut weeks {
        entry.average = entry.points as f64 / entry.predictions as f64;
    }
    weeks.sort_by_key(|w| w.week);
    weeks
}

/// Season-wide aggregates over the weekly buckets.
pub fn season_summary(weeks: &[WeeklyPerformance]) -> SeasonSummary {
    let mut summary = SeasonSummary {
        weeks_with_data: weeks.len() as u32,
        consistency: 100,
        ..SeasonSummary::default()
    };
    if weeks.is_empty() {
        return summary;
    }

    for week in weeks {
        summary.total_points += week.points;
        summary.total_predictions += week.predictions;
        let best = summary.best_week.get_or_insert((week.week, week.points));
        if week.points > best.1 {
            *best = (week.week, week.points);
        }
        let worst = summary.worst_week.get_or_insert((week.week, week.points));
        if week.points < worst.1 {
            *worst = (week.week, week.points);
        }
    }

    let n = weeks.len() as f64;
    let mean = summary.total_points as f64 / n;
    summary.average_per_week = mean;

    // Consistency: coefficient of variation of weekly points, flipped onto a
    // 0-100 display scale. Fewer than two weeks has nothing to vary.
    if weeks.len() >= 2 && mean > 0.0 {
        let variance = weeks
            .iter()
            .map(|w| {
                let d = w.points as f64 - mean;
                d * d
            })
            .sum::<f64>()
            / n;
        let cv = variance.sqrt() / mean;
        summary.consistency = (100.0 * (1.0 - cv.min(1.0))).round() as u8;
    }

    summary
}
