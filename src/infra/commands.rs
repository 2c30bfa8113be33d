//! Text commands read from stdin, mapped onto timer service events.

use crate::{
    timers::{
        ProductId, Timer, TimerConfig, TimerId, TimerKind, TimerService, TimerServiceEvent,
        TimerServiceReply, views::TimerView,
    },
    utils::parse_duration_secs,
};
use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use std::{fmt::Write as _, str::FromStr};

#[derive(Parser)]
#[command(no_binary_name = true, disable_version_flag = true)]
struct CommandLine {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start a proofing or baking timer
    Start {
        kind: TimerKind,
        name: String,
        #[arg(value_parser = parse_duration_secs)]
        duration: i64,
        /// Offset from start for the tray rotation reminder (baking only)
        #[arg(long, value_parser = parse_duration_secs)]
        rotate_at: Option<i64>,
        #[arg(long)]
        product: Option<String>,
    },
    /// Cancel a timer without completing it
    Stop { id: String },
    /// Add time to a running timer
    Extend {
        id: String,
        #[arg(value_parser = parse_duration_secs)]
        by: i64,
    },
    /// Show all timers, most urgent first
    List,
    /// Show the timer that finishes next
    Next,
    /// Show the timer running for a product
    Find { product: String },
    /// Number of active timers
    Count,
    Quit,
}

pub enum Input {
    Event(TimerServiceEvent),
    Quit,
}

/// Parses one line of input. Timer ids may be abbreviated to a unique prefix.
pub fn parse_line(line: &str, service: &TimerService) -> Result<Input> {
    let args = shlex::split(line).ok_or_else(|| anyhow!("Invalid quoting"))?;
    let command = CommandLine::try_parse_from(args)?.command;

    let event = match command {
        Command::Start {
            kind,
            name,
            duration,
            rotate_at,
            product,
        } => {
            let spec = TimerSpec {
                kind,
                product_id: product.map(ProductId).unwrap_or_else(|| product_for(&name)),
                name,
                duration_secs: duration,
                rotate_at_secs: rotate_at.map(non_negative).transpose()?,
            };
            TimerServiceEvent::Start(spec.into_config())
        }
        Command::Stop { id } => TimerServiceEvent::Stop(service.resolve(&id)?),
        Command::Extend { id, by } => TimerServiceEvent::Extend {
            id: service.resolve(&id)?,
            delta_secs: by,
        },
        Command::List => TimerServiceEvent::List,
        Command::Next => TimerServiceEvent::NextToComplete,
        Command::Find { product } => TimerServiceEvent::FindByProduct(ProductId(product)),
        Command::Count => TimerServiceEvent::Count,
        Command::Quit => return Ok(Input::Quit),
    };

    Ok(Input::Event(event))
}

/// A timer given on the command line as `KIND:NAME:DURATION[:ROTATE_AT]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerSpec {
    pub kind: TimerKind,
    pub name: String,
    pub product_id: ProductId,
    pub duration_secs: i64,
    pub rotate_at_secs: Option<u64>,
}

impl TimerSpec {
    pub fn into_config(self) -> TimerConfig {
        let config = TimerConfig::new(
            TimerId::new(),
            self.product_id,
            self.name,
            self.kind,
            self.duration_secs,
        );
        match self.rotate_at_secs {
            Some(rotate_at) => config.rotate_at(rotate_at),
            None => config,
        }
    }
}

impl FromStr for TimerSpec {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(':').collect();
        let (kind, name, duration, rotate_at) = match parts.as_slice() {
            [kind, name, duration] => (kind, name, duration, None),
            [kind, name, duration, rotate_at] => (kind, name, duration, Some(rotate_at)),
            _ => bail!("expected KIND:NAME:DURATION[:ROTATE_AT], got '{s}'"),
        };

        if name.trim().is_empty() {
            bail!("timer name is empty in '{s}'");
        }

        let rotate_at_secs = rotate_at
            .map(|text| parse_duration_secs(text).map_err(|e| anyhow!(e)))
            .transpose()?
            .map(non_negative)
            .transpose()?;

        Ok(Self {
            kind: kind.parse().map_err(|e: String| anyhow!(e))?,
            name: name.to_string(),
            product_id: product_for(name),
            duration_secs: parse_duration_secs(duration)
                .map_err(|e| anyhow!(e))
                .with_context(|| format!("bad duration in '{s}'"))?,
            rotate_at_secs,
        })
    }
}

pub fn render(reply: &TimerServiceReply) -> String {
    match reply {
        TimerServiceReply::Started(timer) => format!("started {}", describe(timer)),
        TimerServiceReply::Stopped(timer) => format!("stopped {}", describe(timer)),
        TimerServiceReply::Extended(timer) => format!("extended {}", describe(timer)),
        TimerServiceReply::Timers(views) if views.is_empty() => "no active timers".to_owned(),
        TimerServiceReply::Timers(views) => {
            views.iter().fold(String::new(), |mut out, view| {
                let _ = writeln!(out, "{}", row(view));
                out
            })
        }
        TimerServiceReply::Timer(Some(view)) => row(view),
        TimerServiceReply::Timer(None) => "no matching timer".to_owned(),
        TimerServiceReply::Count(count) => count.to_string(),
    }
}

fn describe(timer: &Timer) -> String {
    format!(
        "{} {} ({}, {}s)",
        short_id(&timer.id),
        timer.name,
        timer.kind,
        timer.duration_secs()
    )
}

fn row(view: &TimerView) -> String {
    let rotate = if view.rotate_pending { " rotate pending" } else { "" };
    format!(
        "{}  {:<16} {:<9} {:>8} {:>3}% {}{}",
        short_id(&view.id),
        view.name,
        view.kind,
        view.countdown,
        view.progress_percent,
        view.status,
        rotate
    )
}

fn short_id(id: &TimerId) -> String {
    id.to_string().chars().take(8).collect()
}

fn product_for(name: &str) -> ProductId {
    ProductId(name.trim().to_lowercase().replace(' ', "-"))
}

fn non_negative(secs: i64) -> Result<u64> {
    u64::try_from(secs).map_err(|_| anyhow!("offset must not be negative, got {secs}s"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        infra::console::TracingNotifier,
        timers::{Registry, RegistrySettings, SystemClock},
    };
    use std::sync::Arc;
    use test_case::test_case;

    struct NoopScheduler;

    impl crate::timers::Scheduler for NoopScheduler {
        fn every(
            &self,
            _interval: std::time::Duration,
            _callback: crate::timers::ScheduledFn,
        ) -> crate::timers::ScheduleHandle {
            crate::timers::ScheduleHandle(0)
        }

        fn cancel(&self, _handle: crate::timers::ScheduleHandle) {}
    }

    fn service() -> TimerService {
        TimerService::new(Registry::shared(
            Arc::new(SystemClock),
            Arc::new(NoopScheduler),
            Arc::new(TracingNotifier),
            None,
            RegistrySettings::default(),
        ))
    }

    #[test]
    fn timer_spec_with_rotation() {
        let spec: TimerSpec = "baking:Country Loaf:40m:20m".parse().expect("valid spec");
        assert_eq!(TimerKind::Baking, spec.kind);
        assert_eq!("Country Loaf", spec.name);
        assert_eq!(ProductId::from("country-loaf"), spec.product_id);
        assert_eq!(2400, spec.duration_secs);
        assert_eq!(Some(1200), spec.rotate_at_secs);
    }

    #[test_case("proofing:Rye"; "missing duration")]
    #[test_case("roasting:Rye:10m"; "unknown kind")]
    #[test_case("baking::10m"; "empty name")]
    #[test_case("baking:Rye:10m:-5"; "negative rotation")]
    #[test_case("baking:Rye:ten"; "bad duration")]
    fn bad_timer_specs(text: &str) {
        assert!(text.parse::<TimerSpec>().is_err());
    }

    #[test]
    fn start_line_builds_config() {
        let service = service();
        let input = parse_line(
            "start baking 'Seeded Rye' 35m --rotate-at 15m --product rye-1",
            &service,
        )
        .expect("valid line");

        match input {
            Input::Event(TimerServiceEvent::Start(config)) => {
                assert_eq!("Seeded Rye", config.name);
                assert_eq!(ProductId::from("rye-1"), config.product_id);
                assert_eq!(2100, config.duration_secs);
                assert_eq!(Some(900), config.rotate_at_secs);
            }
            _ => panic!("expected a start event"),
        }
    }

    #[test]
    fn stop_line_resolves_prefix() {
        let mut service = service();
        let timer = service
            .registry()
            .lock()
            .start(
                "proofing:Brioche:2h"
                    .parse::<TimerSpec>()
                    .expect("valid spec")
                    .into_config(),
            )
            .expect("timer should start");

        let line = format!("stop {}", short_id(&timer.id));
        let Input::Event(event) = parse_line(&line, &service).expect("valid line") else {
            panic!("expected an event");
        };
        let reply = crate::utils::EventHandler::handle_event(&mut service, event)
            .expect("stop should succeed");

        assert!(render(&reply).starts_with("stopped"));
    }

    #[test]
    fn quit_and_errors() {
        let service = service();
        assert!(matches!(parse_line("quit", &service), Ok(Input::Quit)));
        assert!(parse_line("start baking", &service).is_err());
        assert!(parse_line("extend abc 10m", &service).is_err());
        assert!(parse_line("start 'unterminated", &service).is_err());
    }

    #[test]
    fn renders_empty_list() {
        assert_eq!(
            "no active timers",
            render(&TimerServiceReply::Timers(Vec::new()))
        );
        assert_eq!("3", render(&TimerServiceReply::Count(3)));
    }
}
