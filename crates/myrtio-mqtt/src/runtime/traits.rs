use super::event::SessionEvent;
use super::outbox::SessionControl;

/// Application logic driven by the runtime.
///
/// Handlers are synchronous and must not block; anything that needs the
/// network goes through `session`.
pub trait MqttModule {
    fn on_event(&mut self, event: &SessionEvent<'_>, session: &mut dyn SessionControl);
}

impl<M: MqttModule + ?Sized> MqttModule for &mut M {
    fn on_event(&mut self, event: &SessionEvent<'_>, session: &mut dyn SessionControl) {
        (**self).on_event(event, session);
    }
}
