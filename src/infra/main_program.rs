use crate::{
    infra::{
        commands::{Input, TimerSpec, parse_line, render},
        config::Config,
        console::{DashboardLog, TracingNotifier},
        tokio_scheduler::TokioScheduler,
    },
    timers::{Registry, SystemClock, TimerService, TimerServiceEvent},
    utils::EventHandler,
};
use anyhow::{Context, Result};
use std::{sync::Arc, time::Duration};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

const IDLE_CHECK_INTERVAL: Duration = Duration::from_secs(1);

pub struct MainProgram {
    config: Config,
    timers: Vec<TimerSpec>,
}

impl MainProgram {
    pub fn new(config: Config, timers: Vec<TimerSpec>) -> Self {
        Self { config, timers }
    }

    /// Runs until `quit`, Ctrl-C, or stdin closing with no timers left.
    pub async fn run(self) -> Result<()> {
        self.log_startup_banner();

        let scheduler = TokioScheduler::current().context("Failed to create scheduler")?;
        let registry = Registry::shared(
            Arc::new(SystemClock),
            Arc::new(scheduler),
            Arc::new(TracingNotifier),
            Some(Arc::new(DashboardLog::default())),
            self.config.registry_settings(),
        );
        let mut service = TimerService::new(registry);

        for spec in self.timers {
            let name = spec.name.clone();
            let reply = service
                .handle_event(TimerServiceEvent::Start(spec.into_config()))
                .with_context(|| format!("Failed to start timer '{name}'"))?;
            println!("{}", render(&reply));
        }

        Self::run_inner(&mut service).await?;

        let remaining = service.registry().lock().count();
        info!(remaining, "Shutting down");
        Ok(())
    }

    async fn run_inner(service: &mut TimerService) -> Result<()> {
        info!("Type 'help' for commands, CTRL-C to terminate");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdin_open = true;
        let mut idle_check = tokio::time::interval(IDLE_CHECK_INTERVAL);

        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            tokio::select! {
                result = &mut ctrl_c => {
                    result.context("Error waiting for CTRL-C")?;
                    info!("Interrupted");
                    break;
                }

                line = lines.next_line(), if stdin_open => {
                    match line.context("Failed to read stdin")? {
                        Some(line) => {
                            if !Self::handle_line(service, &line) {
                                break;
                            }
                        }
                        None => {
                            info!("Input closed, waiting for running timers");
                            stdin_open = false;
                        }
                    }
                }

                _ = idle_check.tick(), if !stdin_open => {
                    if service.is_idle() {
                        break;
                    }
                }
            }
        }

        Ok(())
    }

    /// Returns false when the user asked to quit.
    fn handle_line(service: &mut TimerService, line: &str) -> bool {
        if line.trim().is_empty() {
            return true;
        }

        match parse_line(line, service) {
            Ok(Input::Quit) => return false,
            Ok(Input::Event(event)) => match service.handle_event(event) {
                Ok(reply) => println!("{}", render(&reply).trim_end()),
                Err(err) => warn!("{err}"),
            },
            Err(err) => println!("{err}"),
        }
        true
    }

    fn log_startup_banner(&self) {
        info!(
            warning_threshold_secs = self.config.warning_threshold_secs,
            critical_threshold_secs = self.config.critical_threshold_secs,
            tick_interval_ms = self.config.tick_interval_ms,
            "proofmaster - version {}",
            env!("CARGO_PKG_VERSION")
        );
    }
}
