//! Production timers for a bakery: proofing and baking countdowns with
//! status escalation and tray-rotation reminders.

pub mod infra;
pub mod timers;
pub mod utils;
