use std::{
    fmt::{Display, Formatter},
    future::Future,
    pin::Pin,
    sync::Arc,
};

use tokio::{
    sync::{broadcast, oneshot},
    time::Instant,
};

struct RawContext {
    _sender: oneshot::Sender<()>,
    deadline: Option<Instant>,
    cancel_receiver: broadcast::Receiver<()>,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum CancelReason {
    Deadline,
    Cancel,
}

impl Display for CancelReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Deadline => write!(f, "Deadline"),
            Self::Cancel => write!(f, "Cancel"),
        }
    }
}

impl RawContext {
    #[must_use]
    fn new(deadline: Option<Instant>) -> (Self, Handler) {
        let (sender, recv) = oneshot::channel();
        let (cancel_sender, cancel_receiver) = broadcast::channel(1);

        (
            Self {
                _sender: sender,
                deadline,
                cancel_receiver,
            },
            Handler {
                recv,
                cancel_sender,
            },
        )
    }

    fn done(&self) -> Pin<Box<dyn Future<Output = CancelReason> + '_ + Send>> {
        let mut recv = self.cancel_receiver.resubscribe();
        Box::pin(async move {
            match self.deadline {
                Some(deadline) => {
                    tokio::select! {
                        _ = tokio::time::sleep_until(deadline) => CancelReason::Deadline,
                        _ = recv.recv() => CancelReason::Cancel,
                    }
                }
                None => {
                    let _ = recv.recv().await;
                    CancelReason::Cancel
                }
            }
        })
    }
}

pub struct Handler {
    recv: oneshot::Receiver<()>,
    cancel_sender: broadcast::Sender<()>,
}

impl Handler {
    /// Resolves once every context handed out has been dropped.
    pub async fn done(&mut self) {
        let _ = (&mut self.recv).await;
    }

    /// Cancels all contexts and waits for them to be dropped.
    pub async fn cancel(self) {
        drop(self.cancel_sender);

        let _ = self.recv.await;
    }
}

#[derive(Clone)]
pub struct Context(Arc<RawContext>);

impl Context {
    pub fn new() -> (Self, Handler) {
        let (ctx, handler) = RawContext::new(None);
        (Self(Arc::new(ctx)), handler)
    }

    pub fn with_deadline(deadline: Instant) -> (Self, Handler) {
        let (ctx, handler) = RawContext::new(Some(deadline));
        (Self(Arc::new(ctx)), handler)
    }

    pub fn with_timeout(timeout: std::time::Duration) -> (Self, Handler) {
        Self::with_deadline(Instant::now() + timeout)
    }

    pub async fn done(&self) -> CancelReason {
        self.0.done().await
    }
}
