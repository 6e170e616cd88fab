//! Shareable fetch units.
//!
//! A [`FetchUnit`] is the value stored per key: a cloneable handle to one
//! delegate call. Every clone observes the same outcome. The delegate is not
//! started until the unit is first joined, so a unit that loses the
//! conditional install is dropped without ever calling the fetcher.
//!
//! Once started, the delegate runs in its own tokio task. Dropping a joiner
//! (cancelling its `request()` future) therefore never cancels the fetch for
//! the remaining joiners.

use std::any::Any;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use tracing::{debug, warn};

use super::stats::StatsRecorder;
use crate::error::{CacheError, InternalError};
use crate::traits::ResourceFetcher;
use crate::types::Resource;

pub(crate) type Outcome<T, E> = Result<Arc<Resource<T>>, CacheError<E>>;

static NEXT_UNIT_ID: AtomicU64 = AtomicU64::new(1);

pub(crate) struct FetchUnit<T, E> {
    id: u64,
    outcome: Shared<BoxFuture<'static, Outcome<T, E>>>,
}

impl<T, E> Clone for FetchUnit<T, E> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            outcome: self.outcome.clone(),
        }
    }
}

impl<T, E> FetchUnit<T, E>
where
    T: Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    /// Prepare (but do not start) a fetch of `key`.
    pub(crate) fn new<K>(
        fetcher: Arc<dyn ResourceFetcher<K, T, Error = E>>,
        key: K,
        stats: Arc<StatsRecorder>,
    ) -> Self
    where
        K: Send + Sync + 'static,
    {
        let id = NEXT_UNIT_ID.fetch_add(1, Ordering::Relaxed);
        let outcome = async move {
            stats.fetch_started();
            debug!(cache = stats.name(), unit = id, "starting delegate fetch");

            let task = tokio::spawn(async move { fetcher.fetch(&key).await });
            let outcome = match task.await {
                Ok(Ok(resource)) => Ok(Arc::new(resource)),
                Ok(Err(err)) => Err(CacheError::Fetch(Arc::new(err))),
                Err(err) if err.is_panic() => {
                    let message = panic_message(err.into_panic());
                    warn!(cache = stats.name(), unit = id, %message, "delegate fetch panicked");
                    Err(InternalError::FetchPanicked(message).into())
                }
                Err(_) => {
                    warn!(cache = stats.name(), unit = id, "delegate fetch cancelled");
                    Err(InternalError::FetchCancelled.into())
                }
            };

            stats.fetch_finished(outcome.is_ok());
            debug!(cache = stats.name(), unit = id, ok = outcome.is_ok(), "delegate fetch finished");
            outcome
        }
        .boxed()
        .shared();

        Self { id, outcome }
    }

    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    pub(crate) fn is_same(&self, other: &Self) -> bool {
        self.id == other.id
    }

    /// Whether the fetch already completed with an error.
    pub(crate) fn has_failed(&self) -> bool {
        matches!(self.outcome.peek(), Some(Err(_)))
    }

    /// Wait for the outcome, driving the fetch if nobody has started it yet.
    pub(crate) async fn join(&self) -> Outcome<T, E> {
        self.outcome.clone().await
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
