use anyhow::Result;

pub trait EventHandler {
    type Event;
    type Output;

    fn handle_event(&mut self, event: Self::Event) -> Result<Self::Output>;
}
