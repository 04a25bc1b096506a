//! Change notification for store state.
//!
//! Stores own a `Listeners<T>` and call `notify` after every state change;
//! views subscribe a callback and re-render on receipt. Everything runs on
//! one thread, so callbacks are plain boxed closures.

pub type SubscriptionId = u64;

pub struct Listeners<T> {
    next_id: SubscriptionId,
    callbacks: Vec<(SubscriptionId, Box<dyn Fn(&T)>)>,
}

impl<T> Default for Listeners<T> {
    fn default() -> Self {
        Self {
            next_id: 1,
            callbacks: Vec::new(),
        }
    }
}

impl<T> Listeners<T> {
    pub fn subscribe(&mut self, callback: impl Fn(&T) + 'static) -> SubscriptionId {
        let id = self.next_id;
        self.next_id += 1;
        self.callbacks.push((id, Box::new(callback)));
        id
    }

    /// Returns false if the id was not subscribed
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(sid, _)| *sid != id);
        self.callbacks.len() != before
    }

    /// Callbacks run in registration order
    pub fn notify(&self, state: &T) {
        for (_, callback) in &self.callbacks {
            callback(state);
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }
}
