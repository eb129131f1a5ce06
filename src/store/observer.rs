/// Events broadcast by [ActivityStore](super::ActivityStore). Events carry no
/// payload; observers read the store once the mutating call has returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    /// The current activity or the history changed.
    ActivityChanged,
    /// A shell asked for the history surface to be presented.
    HistoryRequested,
}

/// Receives [StoreEvent]s from the store.
pub trait StoreObserver {
    fn on_event(&mut self, event: StoreEvent);
}

/// Handle returned by [ObserverRegistry::subscribe], used to cancel the
/// subscription later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Keeps the subscribed observers of a store. Delivery is synchronous and
/// single threaded: [emit](Self::emit) invokes every observer in subscription
/// order before returning, and only after the state and the durable copy have
/// been updated.
#[derive(Default)]
pub struct ObserverRegistry {
    observers: Vec<(SubscriptionId, Box<dyn StoreObserver>)>,
    next_id: u64,
}

impl ObserverRegistry {
    pub fn subscribe(&mut self, observer: Box<dyn StoreObserver>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, observer));
        id
    }

    /// Removes a subscription. Unknown ids are ignored.
    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.observers.retain(|(key, _)| *key != id);
    }

    pub fn emit(&mut self, event: StoreEvent) {
        for (_, observer) in self.observers.iter_mut() {
            observer.on_event(event);
        }
    }
}
