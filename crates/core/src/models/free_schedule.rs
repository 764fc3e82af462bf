use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Days per week and periods per day in the availability grid.
pub const GRID_DAYS: u8 = 7;
pub const GRID_PERIODS: u8 = 15;

/// One selected cell in a tutor's weekly availability grid.
/// `day` is 0-based (Monday = 0), `period` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FreeCell {
    pub day: u8,
    pub period: u8,
}

impl FreeCell {
    pub fn in_grid(&self) -> bool {
        self.day < GRID_DAYS && (1..=GRID_PERIODS).contains(&self.period)
    }
}

/// A tutor's declared availability for one week: the selected cell set
/// plus a free-form note. Saved wholesale; independent of any concrete
/// appointment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FreeSchedule {
    pub tutor_id: String,
    pub week: i32,
    pub cells: Vec<FreeCell>,
    pub note: String,
    pub updated_at: DateTime<Utc>,
}

impl FreeSchedule {
    /// An empty grid for a week nothing has been saved for yet.
    pub fn empty(tutor_id: impl Into<String>, week: i32) -> Self {
        Self {
            tutor_id: tutor_id.into(),
            week,
            cells: Vec::new(),
            note: String::new(),
            updated_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetFreeScheduleRequest {
    pub week: i32,
    pub cells: Vec<FreeCell>,
    #[serde(default)]
    pub note: String,
    /// When set, the same cells and note are also saved for `week + 1`.
    /// The copy is independent; later edits do not propagate.
    #[serde(default)]
    pub repeat_next: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetFreeScheduleResponse {
    /// Weeks whose grids were replaced by this save: the requested week,
    /// plus the next one when `repeat_next` was set.
    pub weeks_saved: Vec<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FreeScheduleResponse {
    pub week: i32,
    pub cells: Vec<FreeCell>,
    pub note: String,
}

impl From<FreeSchedule> for FreeScheduleResponse {
    fn from(schedule: FreeSchedule) -> Self {
        Self {
            week: schedule.week,
            cells: schedule.cells,
            note: schedule.note,
        }
    }
}
