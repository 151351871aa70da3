//! Statistics over a user's test history.
//!
//! Percentages are whole numbers, rounded half away from zero. A result with
//! a total of zero counts as 0%.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{Days, NaiveDate};

use crate::models::TestHistory;

/// Length of the activity calendar, ending today.
pub const ACTIVITY_DAYS: u64 = 365;

const MOCK_MARKER: &str = "mock quiz";
const UNKNOWN_TOPIC: &str = "General";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryStats {
    pub total: usize,
    pub average: u32,
    pub best: u32,
    pub mock: usize,
    pub regular: usize,
    pub topics: Vec<TopicAverage>,
    pub active_days: usize,
    pub max_per_day: usize,
    pub streak: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicAverage {
    pub topic: String,
    pub count: usize,
    pub average: u32,
}

/// One cell of the activity calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayActivity {
    pub date: NaiveDate,
    pub count: usize,
    pub average: u32,
}

/// One attempt on a progress chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressPoint {
    /// 1-based position in date order.
    pub attempt: usize,
    pub date: NaiveDate,
    pub quiz_name: String,
    pub score: u32,
}

fn raw_percentage(score: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    f64::from(score) / f64::from(total) * 100.0
}

/// `round(score / total * 100)`.
pub fn percentage(score: u32, total: u32) -> u32 {
    raw_percentage(score, total).round() as u32
}

fn mean_percentage<'a>(results: impl IntoIterator<Item = &'a TestHistory>) -> u32 {
    let (sum, count) = results
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), r| {
            (sum + raw_percentage(r.score, r.total), count + 1)
        });
    if count == 0 {
        return 0;
    }
    (sum / count as f64).round() as u32
}

/// Whether a result came from a mock test.
pub fn is_mock(quiz_name: &str) -> bool {
    quiz_name.to_lowercase().contains(MOCK_MARKER)
}

pub fn summarize(results: &[TestHistory], today: NaiveDate) -> HistoryStats {
    let mock = results.iter().filter(|r| is_mock(&r.quiz_name)).count();

    let mut by_topic: BTreeMap<&str, Vec<&TestHistory>> = BTreeMap::new();
    for result in results {
        let topic = match result.topic.trim() {
            "" => UNKNOWN_TOPIC,
            topic => topic,
        };
        by_topic.entry(topic).or_default().push(result);
    }
    let topics = by_topic
        .into_iter()
        .map(|(topic, entries)| TopicAverage {
            topic: topic.to_string(),
            count: entries.len(),
            average: mean_percentage(entries),
        })
        .collect();

    let activity = daily_activity(results, today);

    HistoryStats {
        total: results.len(),
        average: mean_percentage(results),
        best: results
            .iter()
            .map(|r| percentage(r.score, r.total))
            .max()
            .unwrap_or(0),
        mock,
        regular: results.len() - mock,
        topics,
        active_days: activity.iter().filter(|d| d.count > 0).count(),
        max_per_day: activity.iter().map(|d| d.count).max().unwrap_or(0),
        streak: streak(results, today),
    }
}

/// Tests taken per day over the last [`ACTIVITY_DAYS`] days, oldest first.
pub fn daily_activity(results: &[TestHistory], today: NaiveDate) -> Vec<DayActivity> {
    let mut by_day: HashMap<NaiveDate, Vec<&TestHistory>> = HashMap::new();
    for result in results {
        by_day.entry(result.date.date_naive()).or_default().push(result);
    }

    let Some(first) = today.checked_sub_days(Days::new(ACTIVITY_DAYS - 1)) else {
        return Vec::new();
    };

    first
        .iter_days()
        .take_while(|date| *date <= today)
        .map(|date| {
            let entries = by_day.remove(&date).unwrap_or_default();
            DayActivity {
                date,
                count: entries.len(),
                average: mean_percentage(entries),
            }
        })
        .collect()
}

/// Consecutive active days ending today, or yesterday when nothing was taken
/// today yet.
pub fn streak(results: &[TestHistory], today: NaiveDate) -> usize {
    let active: HashSet<NaiveDate> = results.iter().map(|r| r.date.date_naive()).collect();

    let start = if active.contains(&today) {
        Some(today)
    } else {
        today.pred_opt().filter(|day| active.contains(day))
    };
    let Some(start) = start else {
        return 0;
    };

    let mut count = 0;
    let mut day = Some(start);
    while let Some(d) = day.filter(|d| active.contains(d)) {
        count += 1;
        day = d.pred_opt();
    }
    count
}

/// Score per attempt in date order.
pub fn progress<'a>(results: impl IntoIterator<Item = &'a TestHistory>) -> Vec<ProgressPoint> {
    let mut ordered: Vec<&TestHistory> = results.into_iter().collect();
    ordered.sort_by_key(|r| r.date);

    ordered
        .into_iter()
        .enumerate()
        .map(|(i, r)| ProgressPoint {
            attempt: i + 1,
            date: r.date.date_naive(),
            quiz_name: r.quiz_name.clone(),
            score: percentage(r.score, r.total),
        })
        .collect()
}
