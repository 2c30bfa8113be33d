use crate::{
    timers::{
        registry::SharedRegistry,
        timer::{ProductId, Timer, TimerConfig, TimerId},
        views::TimerView,
    },
    utils::EventHandler,
};
use anyhow::{Result, bail};

/// Front door to the registry for event-driven callers.
pub struct TimerService {
    registry: SharedRegistry,
}

impl TimerService {
    pub fn new(registry: SharedRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &SharedRegistry {
        &self.registry
    }

    pub fn is_idle(&self) -> bool {
        self.registry.lock().count() == 0
    }

    /// Resolves a full id or a unique prefix of one.
    pub fn resolve(&self, text: &str) -> Result<TimerId> {
        if let Ok(id) = text.parse::<TimerId>() {
            return Ok(id);
        }

        let registry = self.registry.lock();
        let matches: Vec<TimerId> = registry
            .list()
            .into_iter()
            .map(|timer| timer.id)
            .filter(|id| id.to_string().starts_with(text))
            .collect();

        match matches.as_slice() {
            [id] => Ok(*id),
            [] => bail!("no active timer matches '{text}'"),
            _ => bail!("'{text}' matches {} timers", matches.len()),
        }
    }

    fn start(&self, config: TimerConfig) -> Result<TimerServiceReply> {
        let timer = self.registry.lock().start(config)?;
        Ok(TimerServiceReply::Started(timer))
    }

    fn stop(&self, id: TimerId) -> Result<TimerServiceReply> {
        let timer = self.registry.lock().stop(&id)?;
        Ok(TimerServiceReply::Stopped(timer))
    }

    fn extend(&self, id: TimerId, delta_secs: i64) -> Result<TimerServiceReply> {
        let timer = self.registry.lock().extend(&id, delta_secs)?;
        Ok(TimerServiceReply::Extended(timer))
    }

    fn list(&self) -> TimerServiceReply {
        TimerServiceReply::Timers(self.registry.lock().snapshot().timers)
    }

    fn next_to_complete(&self) -> TimerServiceReply {
        TimerServiceReply::Timer(self.registry.lock().snapshot().summary.next_to_complete)
    }

    fn find_by_product(&self, product_id: &ProductId) -> TimerServiceReply {
        let registry = self.registry.lock();
        let id = registry.find_by_product(product_id).map(|timer| timer.id);
        let view = id.and_then(|id| {
            registry
                .snapshot()
                .timers
                .into_iter()
                .find(|view| view.id == id)
        });
        TimerServiceReply::Timer(view)
    }
}

pub enum TimerServiceEvent {
    Start(TimerConfig),
    Stop(TimerId),
    Extend { id: TimerId, delta_secs: i64 },
    List,
    NextToComplete,
    FindByProduct(ProductId),
    Count,
}

#[derive(Debug, PartialEq, Eq)]
pub enum TimerServiceReply {
    Started(Timer),
    Stopped(Timer),
    Extended(Timer),
    Timers(Vec<TimerView>),
    Timer(Option<TimerView>),
    Count(usize),
}

impl EventHandler for TimerService {
    type Event = TimerServiceEvent;
    type Output = TimerServiceReply;

    fn handle_event(&mut self, event: Self::Event) -> Result<Self::Output> {
        match event {
            TimerServiceEvent::Start(config) => self.start(config),
            TimerServiceEvent::Stop(id) => self.stop(id),
            TimerServiceEvent::Extend { id, delta_secs } => self.extend(id, delta_secs),
            TimerServiceEvent::List => Ok(self.list()),
            TimerServiceEvent::NextToComplete => Ok(self.next_to_complete()),
            TimerServiceEvent::FindByProduct(product_id) => Ok(self.find_by_product(&product_id)),
            TimerServiceEvent::Count => Ok(TimerServiceReply::Count(self.registry.lock().count())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timers::{
        clock::tests::FakeClock,
        error::TimerError,
        notify::tests::RecordingNotifier,
        registry::{Registry, RegistrySettings},
        scheduler::tests::ManualScheduler,
        timer::TimerKind,
    };
    use std::sync::Arc;

    fn service() -> TimerService {
        let registry = Registry::shared(
            Arc::new(FakeClock::new(0)),
            Arc::new(ManualScheduler::new()),
            Arc::new(RecordingNotifier::default()),
            None,
            RegistrySettings::default(),
        );
        TimerService::new(registry)
    }

    fn config(product: &str, duration_secs: i64) -> TimerConfig {
        TimerConfig::new(
            TimerId::new(),
            ProductId::from(product),
            product,
            TimerKind::Proofing,
            duration_secs,
        )
    }

    fn started(service: &mut TimerService, config: TimerConfig) -> Timer {
        match service.handle_event(TimerServiceEvent::Start(config)) {
            Ok(TimerServiceReply::Started(timer)) => timer,
            _ => panic!("expected timer to start"),
        }
    }

    #[test]
    fn events_drive_the_registry() {
        let mut service = service();
        let timer = started(&mut service, config("brioche", 900));
        started(&mut service, config("rye", 300));

        assert!(matches!(
            service.handle_event(TimerServiceEvent::Count),
            Ok(TimerServiceReply::Count(2))
        ));

        let reply = service.handle_event(TimerServiceEvent::Extend {
            id: timer.id,
            delta_secs: 60,
        });
        assert!(matches!(reply, Ok(TimerServiceReply::Extended(t)) if t.duration_secs() == 960));

        let reply = service.handle_event(TimerServiceEvent::NextToComplete);
        assert!(matches!(reply, Ok(TimerServiceReply::Timer(Some(view))) if view.name == "rye"));

        let reply = service.handle_event(TimerServiceEvent::Stop(timer.id));
        assert!(matches!(reply, Ok(TimerServiceReply::Stopped(t)) if t.id == timer.id));

        let reply = service.handle_event(TimerServiceEvent::List);
        assert!(matches!(reply, Ok(TimerServiceReply::Timers(views)) if views.len() == 1));
        assert!(!service.is_idle());
    }

    #[test]
    fn registry_errors_surface() {
        let mut service = service();
        let id = TimerId::new();

        let err = service
            .handle_event(TimerServiceEvent::Stop(id))
            .expect_err("unknown id should fail");

        assert_eq!(
            Some(&TimerError::NotFound(id)),
            err.downcast_ref::<TimerError>()
        );
    }

    #[test]
    fn find_by_product_returns_view() {
        let mut service = service();
        let timer = started(&mut service, config("focaccia", 600));

        let reply = service.handle_event(TimerServiceEvent::FindByProduct(ProductId::from(
            "focaccia",
        )));
        assert!(matches!(reply, Ok(TimerServiceReply::Timer(Some(view))) if view.id == timer.id));

        let reply = service.handle_event(TimerServiceEvent::FindByProduct(ProductId::from("rye")));
        assert!(matches!(reply, Ok(TimerServiceReply::Timer(None))));
    }

    #[test]
    fn resolves_id_prefixes() {
        let mut service = service();
        let timer = started(&mut service, config("baguette", 600));
        let text = timer.id.to_string();

        assert_eq!(timer.id, service.resolve(&text).expect("full id"));
        assert_eq!(timer.id, service.resolve(&text[..8]).expect("prefix"));
        assert!(service.resolve("zzzz").is_err());
    }
}
