use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Smallest workout that keeps a day (and the streak) alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinimumSet {
    pub pushups: i64,
    pub situps: i64,
    pub squats: i64,
    pub pullups: i64,
}

impl Default for MinimumSet {
    fn default() -> Self {
        Self {
            pushups: 5,
            situps: 10,
            squats: 10,
            pullups: 1,
        }
    }
}

/// Rep counts for the four tracked exercises.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reps {
    pub pushups: i64,
    pub situps: i64,
    pub squats: i64,
    pub pullups: i64,
}

impl Reps {
    pub fn new(pushups: i64, situps: i64, squats: i64, pullups: i64) -> Self {
        Self {
            pushups,
            situps,
            squats,
            pullups,
        }
    }

    /// Negative counts become zero
    pub fn clamped(self) -> Self {
        Self {
            pushups: self.pushups.max(0),
            situps: self.situps.max(0),
            squats: self.squats.max(0),
            pullups: self.pullups.max(0),
        }
    }

    pub fn meets(&self, minimum: &MinimumSet) -> bool {
        self.pushups >= minimum.pushups
            && self.situps >= minimum.situps
            && self.squats >= minimum.squats
            && self.pullups >= minimum.pullups
    }

    /// Each count raised to at least the minimum
    pub fn raised_to(self, minimum: &MinimumSet) -> Self {
        Self {
            pushups: self.pushups.max(minimum.pushups),
            situps: self.situps.max(minimum.situps),
            squats: self.squats.max(minimum.squats),
            pullups: self.pullups.max(minimum.pullups),
        }
    }

    /// Grit earned by locking these reps in.
    ///
    /// One point per 10 pushups, 15 situps, 20 squats and 3 pullups, plus a
    /// bonus point when every exercise was touched.
    pub fn grit_restore(&self) -> i64 {
        let mut grit = self.pushups / 10 + self.situps / 15 + self.squats / 20 + self.pullups / 3;
        if self.pushups > 0 && self.situps > 0 && self.squats > 0 && self.pullups > 0 {
            grit += 1;
        }
        grit
    }

    pub fn total(&self) -> i64 {
        self.pushups + self.situps + self.squats + self.pullups
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WorkoutLog {
    pub date: NaiveDate,
    pub pushups: i64,
    pub situps: i64,
    pub squats: i64,
    pub pullups: i64,
    #[serde(skip_serializing)]
    pub other_json: Option<String>,
    pub minimum_set_done: bool,
    pub locked_in_at: Option<DateTime<Utc>>,
    pub last_edited_at: Option<DateTime<Utc>>,
}

impl WorkoutLog {
    pub fn reps(&self) -> Reps {
        Reps::new(self.pushups, self.situps, self.squats, self.pullups)
    }

    pub fn is_locked_in(&self) -> bool {
        self.locked_in_at.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LockInOutcome {
    pub grit_restored: i64,
    pub coins_from_overflow: i64,
    pub already_locked: bool,
}
