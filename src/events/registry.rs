//! Observer registry

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::{ActivityWriter, LifecycleObserver, Payload};
use crate::error::BizdeskResult;

/// Channel name -> observers, in subscription order
#[derive(Default)]
pub struct ObserverRegistry {
    channels: HashMap<String, Vec<Arc<dyn LifecycleObserver>>>,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe an observer to a channel
    ///
    /// Returns `false` (and changes nothing) if an observer with the same
    /// name is already on that channel, so repeated bootstrap can't double-log.
    pub fn subscribe(&mut self, channel: &str, observer: Arc<dyn LifecycleObserver>) -> bool {
        let listeners = self.channels.entry(channel.to_string()).or_default();
        if listeners.iter().any(|o| o.name() == observer.name()) {
            tracing::debug!(channel, observer = observer.name(), "Observer already subscribed");
            return false;
        }
        tracing::debug!(channel, observer = observer.name(), "Observer subscribed");
        listeners.push(observer);
        true
    }

    pub fn is_subscribed(&self, channel: &str, name: &str) -> bool {
        self.channels
            .get(channel)
            .is_some_and(|listeners| listeners.iter().any(|o| o.name() == name))
    }

    pub fn listener_count(&self, channel: &str) -> usize {
        self.channels.get(channel).map_or(0, Vec::len)
    }

    /// Deliver a notification to every observer of `event`
    ///
    /// Observers run in subscription order; the first error stops delivery
    /// and is returned to the caller.
    pub fn dispatch(
        &self,
        writer: &dyn ActivityWriter,
        event: &str,
        payload: &[Payload],
    ) -> BizdeskResult<()> {
        let Some(listeners) = self.channels.get(event) else {
            return Ok(());
        };

        for observer in listeners {
            observer.handle(writer, event, payload)?;
        }

        Ok(())
    }
}

impl fmt::Debug for ObserverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (channel, listeners) in &self.channels {
            let names: Vec<_> = listeners.iter().map(|o| o.name()).collect();
            map.entry(channel, &names);
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::AuditRecord;
    use crate::error::BizdeskError;
    use std::sync::Mutex;

    struct NullWriter;

    impl ActivityWriter for NullWriter {
        fn write_activity(&self, _record: AuditRecord) -> BizdeskResult<()> {
            Ok(())
        }
    }

    struct Recorder {
        name: &'static str,
        seen: Mutex<Vec<String>>,
        fail: bool,
    }

    impl Recorder {
        fn new(name: &'static str) -> Arc<Self> {
            Arc::new(Self {
                name,
                seen: Mutex::new(Vec::new()),
                fail: false,
            })
        }

        fn failing(name: &'static str) -> Arc<Self> {
            Arc::new(Self {
                name,
                seen: Mutex::new(Vec::new()),
                fail: true,
            })
        }
    }

    impl LifecycleObserver for Recorder {
        fn name(&self) -> &str {
            self.name
        }

        fn handle(
            &self,
            _writer: &dyn ActivityWriter,
            event: &str,
            _payload: &[Payload],
        ) -> BizdeskResult<()> {
            self.seen.lock().unwrap().push(event.to_string());
            if self.fail {
                return Err(BizdeskError::Storage("observer failed".into()));
            }
            Ok(())
        }
    }

    #[test]
    fn test_subscribe_is_idempotent_per_name() {
        let mut registry = ObserverRegistry::new();
        let recorder = Recorder::new("recorder");

        assert!(registry.subscribe("created", recorder.clone()));
        assert!(!registry.subscribe("created", recorder.clone()));
        assert!(registry.subscribe("updated", recorder.clone()));

        assert_eq!(registry.listener_count("created"), 1);
        assert!(registry.is_subscribed("updated", "recorder"));
        assert!(!registry.is_subscribed("deleted", "recorder"));

        registry.dispatch(&NullWriter, "created", &[]).unwrap();
        assert_eq!(recorder.seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_dispatch_only_reaches_channel_listeners() {
        let mut registry = ObserverRegistry::new();
        let recorder = Recorder::new("recorder");
        registry.subscribe("deleted", recorder.clone());

        registry.dispatch(&NullWriter, "created", &[]).unwrap();
        registry.dispatch(&NullWriter, "deleted", &[]).unwrap();

        assert_eq!(*recorder.seen.lock().unwrap(), vec!["deleted".to_string()]);
    }

    #[test]
    fn test_first_error_stops_dispatch() {
        let mut registry = ObserverRegistry::new();
        let failing = Recorder::failing("first");
        let second = Recorder::new("second");
        registry.subscribe("created", failing.clone());
        registry.subscribe("created", second.clone());

        let result = registry.dispatch(&NullWriter, "created", &[]);

        assert!(matches!(result, Err(BizdeskError::Storage(_))));
        assert_eq!(failing.seen.lock().unwrap().len(), 1);
        assert!(second.seen.lock().unwrap().is_empty());
    }
}
