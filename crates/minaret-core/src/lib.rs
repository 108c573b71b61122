//! Core types: prayer vocabulary, wall-clock parsing, day windows

pub mod clock;
pub mod prayer;
pub mod window;

pub use clock::{Clock, ClockParseError};
pub use prayer::{PrayerName, Schedule, ScheduleError};
pub use window::DayWindow;
