use chrono::{Datelike, Local, TimeZone, Timelike, Weekday};

use crate::{
    models::{ChannelId, ChannelRecord, Program},
    services::data_manager::ChannelDataManager,
};

use super::{Evaluator, NOT_RECOMMENDED};

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;
const MAX_PROGRAM_SPAN_SEC: i64 = 12 * 60 * 60;

/// Damping applied to overlap between windows on different days of the week
pub const MULTIPLIER_FOR_UNMATCHED_DAY_OF_WEEK: f64 = 0.7;

/// Day-of-week and time-of-day window of a program
///
/// Both bounds are seconds since midnight of the start day, so a program
/// running past midnight ends after `24 * 60 * 60`. The span is capped at 12 hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramTime {
    pub week_day: Weekday,
    pub start_time_of_day_sec: i64,
    pub end_time_of_day_sec: i64,
}

impl ProgramTime {
    /// Window of `program` in the local time zone
    pub fn from_program(program: &Program) -> Option<Self> {
        Self::from_program_in(program, &Local)
    }

    /// Window of `program` in `tz`; `None` if the start time is not representable
    pub fn from_program_in<Tz: TimeZone>(program: &Program, tz: &Tz) -> Option<Self> {
        let start = tz.timestamp_millis_opt(program.start_time_utc_ms).single()?;
        let start_time_of_day_sec = i64::from(start.num_seconds_from_midnight());
        let span_sec = ((program.end_time_utc_ms - program.start_time_utc_ms) / 1000)
            .clamp(0, MAX_PROGRAM_SPAN_SEC);
        Some(Self {
            week_day: start.weekday(),
            start_time_of_day_sec,
            end_time_of_day_sec: start_time_of_day_sec + span_sec,
        })
    }

    pub fn span_sec(&self) -> i64 {
        self.end_time_of_day_sec - self.start_time_of_day_sec
    }
}

/// Overlap in seconds between two windows compared by time of day
///
/// A window on the following (or preceding) day of the week is also compared
/// shifted by a day, so a window running past midnight overlaps the next
/// day's early windows. Overlap across different days of the week is damped by
/// [`MULTIPLIER_FOR_UNMATCHED_DAY_OF_WEEK`].
pub fn calculate_overlapped_interval_score(t1: &ProgramTime, t2: &ProgramTime) -> f64 {
    let day_offset =
        (7 + t2.week_day.num_days_from_monday() - t1.week_day.num_days_from_monday()) % 7;
    let shifts: &[i64] = match day_offset {
        1 => &[0, SECONDS_PER_DAY],
        6 => &[-SECONDS_PER_DAY, 0],
        _ => &[0],
    };
    let overlap_sec: i64 = shifts
        .iter()
        .map(|shift| {
            let start = t1.start_time_of_day_sec.max(t2.start_time_of_day_sec + shift);
            let end = t1.end_time_of_day_sec.min(t2.end_time_of_day_sec + shift);
            (end - start).max(0)
        })
        .sum();

    if day_offset == 0 {
        overlap_sec as f64
    } else {
        overlap_sec as f64 * MULTIPLIER_FOR_UNMATCHED_DAY_OF_WEEK
    }
}

/// Splits text into words on whitespace and punctuation
///
/// Apostrophes stay inside words ("don't"); leading and trailing ones are
/// trimmed ("'Allo" is "Allo").
pub fn split_text_to_words(text: &str) -> Vec<&str> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .map(|word| word.trim_matches('\''))
        .filter(|word| !word.is_empty())
        .collect()
}

/// Length of the longest run of consecutive words shared by both lists
pub fn calculate_maximum_matched_word_sequence_length(words1: &[&str], words2: &[&str]) -> usize {
    // Row i holds run lengths ending at words1[i - 1] against every words2 prefix.
    let mut previous = vec![0usize; words2.len() + 1];
    let mut current = vec![0usize; words2.len() + 1];
    let mut longest = 0;

    for w1 in words1 {
        for (j, w2) in words2.iter().enumerate() {
            current[j + 1] = if w1 == w2 { previous[j] + 1 } else { 0 };
            longest = longest.max(current[j + 1]);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    longest
}

/// Fraction of `base`'s words covered by the longest word run shared with `text`
///
/// 0.0 whenever either side is missing, empty or has no words.
pub fn calculate_title_match_score(base: Option<&str>, text: Option<&str>) -> f64 {
    let (Some(base), Some(text)) = (base, text) else {
        return 0.0;
    };
    let base_words = split_text_to_words(base);
    if base_words.is_empty() {
        return 0.0;
    }
    let text_words = split_text_to_words(text);
    let matched = calculate_maximum_matched_word_sequence_length(&base_words, &text_words);
    matched as f64 / base_words.len() as f64
}

/// Scores a channel's current program against its viewing routine
///
/// Every retained watch entry with program metadata is compared with the
/// current program: title match times the share of the current program's
/// window covered by the watched window. The channel scores its best entry.
#[derive(Debug, Clone)]
pub struct RoutineWatchEvaluator<Tz: TimeZone = Local> {
    tz: Tz,
}

impl Default for RoutineWatchEvaluator<Local> {
    fn default() -> Self {
        Self { tz: Local }
    }
}

impl RoutineWatchEvaluator<Local> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<Tz: TimeZone> RoutineWatchEvaluator<Tz> {
    /// Evaluator deriving days and times of day in `tz`
    pub fn with_time_zone(tz: Tz) -> Self {
        Self { tz }
    }

    fn score_entry(&self, watched: &Program, candidate: &Program, candidate_time: &ProgramTime) -> f64 {
        let title_score =
            calculate_title_match_score(watched.title.as_deref(), candidate.title.as_deref());
        if title_score <= 0.0 {
            return 0.0;
        }
        let Some(watched_time) = ProgramTime::from_program_in(watched, &self.tz) else {
            return 0.0;
        };
        let overlap = calculate_overlapped_interval_score(&watched_time, candidate_time);
        let time_score = (overlap / candidate_time.span_sec() as f64).min(1.0);
        title_score * time_score
    }
}

impl<Tz> Evaluator for RoutineWatchEvaluator<Tz>
where
    Tz: TimeZone + Send,
{
    fn name(&self) -> &'static str {
        "routine_watch"
    }

    // Scores are computed from the records on demand; nothing is cached.
    fn on_channel_record_list_changed(&mut self, _records: &[&ChannelRecord]) {}

    fn evaluate_channel(&self, data_manager: &dyn ChannelDataManager, channel_id: ChannelId) -> f64 {
        let Some(record) = data_manager.channel_record(channel_id) else {
            return NOT_RECOMMENDED;
        };
        let Some(candidate) = record.current_program() else {
            return NOT_RECOMMENDED;
        };
        let Some(candidate_time) = ProgramTime::from_program_in(candidate, &self.tz) else {
            return NOT_RECOMMENDED;
        };
        if candidate_time.span_sec() <= 0 {
            return NOT_RECOMMENDED;
        }

        record
            .watch_history()
            .filter_map(|entry| entry.program.as_ref())
            .map(|watched| self.score_entry(watched, candidate, &candidate_time))
            .reduce(f64::max)
            .unwrap_or(NOT_RECOMMENDED)
    }
}
