mod duration;
pub use duration::parse_duration_secs;

mod event_handler;
pub use event_handler::EventHandler;

pub mod logger;
