//! Background delivery of store changes to a [`Transport`].
//!
//! Changes are queued on a channel and sent by a single worker thread, in the
//! order the store committed them. A slow or hung remote delays only the
//! worker, never the write that produced the change.

use std::{
    sync::{
        mpsc::{self, Receiver, Sender},
        Arc,
    },
    thread::{self, JoinHandle},
};

use crate::{
    domain::{Recipe, RecipeId},
    transport::{Transport, TransportError},
};

/// A committed change, waiting to be announced to the remote.
#[derive(Debug)]
pub enum Change {
    Created(Recipe),
    Updated(Recipe),
    Deleted(RecipeId),
}

impl Change {
    fn deliver(&self, transport: &dyn Transport) -> Result<(), TransportError> {
        match self {
            Self::Created(recipe) => transport.create(recipe),
            Self::Updated(recipe) => transport.update(recipe),
            Self::Deleted(id) => transport.delete(*id),
        }
    }

    const fn action(&self) -> &'static str {
        match self {
            Self::Created(_) => "create",
            Self::Updated(_) => "update",
            Self::Deleted(_) => "delete",
        }
    }
}

enum Message {
    Change(Change),
    Flush(Sender<()>),
}

/// Owns the transport and the worker thread that talks to it.
///
/// Dropping the mirror closes the queue and waits for the worker to finish
/// whatever is still queued.
pub struct Mirror {
    transport: Arc<dyn Transport>,
    queue: Option<Sender<Message>>,
    worker: Option<JoinHandle<()>>,
}

impl Mirror {
    pub fn spawn(transport: Arc<dyn Transport>) -> Self {
        let (queue, inbox) = mpsc::channel();
        let worker = {
            let transport = Arc::clone(&transport);
            thread::spawn(move || run_worker(transport.as_ref(), &inbox))
        };
        Self {
            transport,
            queue: Some(queue),
            worker: Some(worker),
        }
    }

    /// The transport, for synchronous requests such as listing.
    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    /// Queues `change` and returns immediately.
    pub fn send(&self, change: Change) {
        let action = change.action();
        if !self.post(Message::Change(change)) {
            tracing::warn!("Remote mirror has stopped, dropping {action}");
        }
    }

    /// Blocks until every change queued so far has been attempted.
    pub fn flush(&self) {
        let (done, wait) = mpsc::channel();
        if self.post(Message::Flush(done)) {
            // an error here means the worker is gone, so nothing is pending
            let _ = wait.recv();
        }
    }

    fn post(&self, message: Message) -> bool {
        self.queue
            .as_ref()
            .is_some_and(|queue| queue.send(message).is_ok())
    }
}

impl Drop for Mirror {
    fn drop(&mut self) {
        drop(self.queue.take());
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::warn!("Remote mirror worker panicked");
            }
        }
    }
}

fn run_worker(transport: &dyn Transport, inbox: &Receiver<Message>) {
    for message in inbox {
        match message {
            Message::Change(change) => {
                if let Err(e) = change.deliver(transport) {
                    tracing::warn!("Failed to mirror {} to remote: {e}", change.action());
                }
            }
            Message::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
    tracing::debug!("Remote mirror worker stopped");
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{Condvar, Mutex},
        time::{Duration, Instant},
    };

    use super::*;
    use crate::domain::{Difficulty, RecipeInput};

    fn recipe(title: &str) -> Recipe {
        let data = RecipeInput {
            title: title.to_string(),
            description: "d".to_string(),
            ingredients: "i".to_string(),
            steps: "s".to_string(),
            tags: "t".to_string(),
            difficulty: Some(Difficulty::Easy),
        }
        .normalize()
        .unwrap();
        Recipe::new(data, chrono::Utc::now())
    }

    /// Records calls, optionally holding each one until released.
    #[derive(Default)]
    struct GatedTransport {
        calls: Mutex<Vec<String>>,
        gate: Mutex<bool>,
        opened: Condvar,
        gated: bool,
    }

    impl GatedTransport {
        fn record(&self, call: String) -> Result<(), TransportError> {
            if self.gated {
                let open = self.gate.lock().unwrap();
                drop(self.opened.wait_while(open, |open| !*open).unwrap());
            }
            self.calls.lock().unwrap().push(call);
            Ok(())
        }

        fn open(&self) {
            *self.gate.lock().unwrap() = true;
            self.opened.notify_all();
        }
    }

    impl Transport for GatedTransport {
        fn list(&self) -> Result<Vec<Recipe>, TransportError> {
            Ok(Vec::new())
        }

        fn create(&self, recipe: &Recipe) -> Result<(), TransportError> {
            self.record(format!("create {}", recipe.title()))
        }

        fn update(&self, recipe: &Recipe) -> Result<(), TransportError> {
            self.record(format!("update {}", recipe.title()))
        }

        fn delete(&self, id: RecipeId) -> Result<(), TransportError> {
            self.record(format!("delete {id}"))
        }
    }

    #[test]
    fn changes_are_delivered_in_order() {
        let transport = Arc::new(GatedTransport::default());
        let mirror = Mirror::spawn(transport.clone());
        let id = RecipeId::new();

        mirror.send(Change::Created(recipe("Soup")));
        mirror.send(Change::Updated(recipe("Stew")));
        mirror.send(Change::Deleted(id));
        mirror.flush();

        assert_eq!(
            *transport.calls.lock().unwrap(),
            [
                "create Soup".to_string(),
                "update Stew".to_string(),
                format!("delete {id}"),
            ]
        );
    }

    #[test]
    fn send_does_not_wait_for_the_remote() {
        let transport = Arc::new(GatedTransport {
            gated: true,
            ..GatedTransport::default()
        });
        let mirror = Mirror::spawn(transport.clone());

        let start = Instant::now();
        mirror.send(Change::Created(recipe("Soup")));
        mirror.send(Change::Created(recipe("Cake")));

        assert!(start.elapsed() < Duration::from_millis(500));
        assert!(transport.calls.lock().unwrap().is_empty());

        transport.open();
        drop(mirror);
        assert_eq!(transport.calls.lock().unwrap().len(), 2);
    }
}
