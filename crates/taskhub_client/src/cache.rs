use futures::future::BoxFuture;
use std::collections::HashMap;
use std::future::Future;
use tokio::sync::{mpsc, oneshot};

/// Logical identifier tuple for cached remote data, e.g. `["user"]`.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.len() >= prefix.0.len() && self.0.iter().zip(&prefix.0).all(|(a, b)| a == b)
    }
}

pub type Fetcher<T> = Box<dyn FnOnce() -> BoxFuture<'static, Result<T, String>> + Send>;

#[derive(Clone, Debug)]
pub struct QuerySnapshot<T> {
    pub value: Option<T>,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl<T> Default for QuerySnapshot<T> {
    fn default() -> Self {
        Self {
            value: None,
            is_loading: false,
            error: None,
        }
    }
}

enum CacheCommand<T> {
    Fetch {
        key: QueryKey,
        fetcher: Fetcher<T>,
        reply: oneshot::Sender<Result<T, String>>,
    },
    Peek {
        key: QueryKey,
        reply: oneshot::Sender<QuerySnapshot<T>>,
    },
    Invalidate {
        prefix: QueryKey,
        reply: oneshot::Sender<()>,
    },
    Settled {
        key: QueryKey,
        generation: u64,
        result: Result<T, String>,
    },
}

struct Entry<T> {
    value: Option<T>,
    error: Option<String>,
    stale: bool,
}

impl<T> Default for Entry<T> {
    fn default() -> Self {
        Self {
            value: None,
            error: None,
            stale: false,
        }
    }
}

/// Request-deduplicating, invalidatable cache for one family of remote
/// values. Constructed explicitly and injected into consumers; the state
/// lives in a single task and is only reached through the command queue.
pub struct QueryCache<T> {
    tx: mpsc::Sender<CacheCommand<T>>,
}

impl<T> Clone for QueryCache<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<T: Clone + Send + 'static> QueryCache<T> {
    /// Must be called from within a tokio runtime.
    pub fn new() -> Self {
        let (tx, mut rx) = mpsc::channel::<CacheCommand<T>>(256);
        let mut state = CacheState {
            entries: HashMap::new(),
            in_flight: HashMap::new(),
            waiters: HashMap::new(),
            next_generation: 0,
            tx: tx.clone(),
        };
        tokio::spawn(async move {
            while let Some(cmd) = rx.recv().await {
                state.handle(cmd);
            }
        });
        Self { tx }
    }

    /// Returns the cached value when it is present, fresh and not in error;
    /// otherwise joins the in-flight request for `key` or initiates one.
    /// Concurrent callers for the same key share a single fetcher
    /// invocation and observe the same resolved value.
    pub async fn fetch(
        &self,
        key: QueryKey,
        fetcher: impl FnOnce() -> BoxFuture<'static, Result<T, String>> + Send + 'static,
    ) -> Result<T, String> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(CacheCommand::Fetch {
                key,
                fetcher: Box::new(fetcher),
                reply,
            })
            .await
            .map_err(|_| "query cache stopped".to_owned())?;
        rx.await.map_err(|_| "query cache stopped".to_owned())?
    }

    pub async fn peek(&self, key: QueryKey) -> QuerySnapshot<T> {
        let (reply, rx) = oneshot::channel();
        if self
            .tx
            .send(CacheCommand::Peek { key, reply })
            .await
            .is_err()
        {
            return QuerySnapshot::default();
        }
        rx.await.unwrap_or_default()
    }

    /// Marks every entry under `prefix` as stale. The acknowledgement
    /// orders the caller's subsequent reads after the staleness mark.
    pub async fn invalidate(&self, prefix: QueryKey) {
        let (reply, rx) = oneshot::channel();
        if self
            .tx
            .send(CacheCommand::Invalidate { prefix, reply })
            .await
            .is_err()
        {
            return;
        }
        let _ = rx.await;
    }

    /// Runs the mutation; on success invalidates `prefix` before returning,
    /// so the caller's next read refetches. On failure the cache is left
    /// untouched and the error is surfaced to the caller.
    pub async fn mutate<M>(
        &self,
        prefix: QueryKey,
        operation: impl Future<Output = Result<M, String>>,
    ) -> Result<M, String> {
        let out = operation.await?;
        self.invalidate(prefix).await;
        Ok(out)
    }
}

struct CacheState<T> {
    entries: HashMap<QueryKey, Entry<T>>,
    // Generation of the request allowed to settle each key. Only the most
    // recently initiated fetch may update the visible entry.
    in_flight: HashMap<QueryKey, u64>,
    waiters: HashMap<QueryKey, Vec<oneshot::Sender<Result<T, String>>>>,
    next_generation: u64,
    tx: mpsc::Sender<CacheCommand<T>>,
}

impl<T: Clone + Send + 'static> CacheState<T> {
    fn handle(&mut self, cmd: CacheCommand<T>) {
        match cmd {
            CacheCommand::Fetch {
                key,
                fetcher,
                reply,
            } => self.fetch(key, fetcher, reply),
            CacheCommand::Peek { key, reply } => {
                let entry = self.entries.get(&key);
                let _ = reply.send(QuerySnapshot {
                    value: entry.and_then(|e| e.value.clone()),
                    is_loading: self.in_flight.contains_key(&key),
                    error: entry.and_then(|e| e.error.clone()),
                });
            }
            CacheCommand::Invalidate { prefix, reply } => {
                self.invalidate(&prefix);
                let _ = reply.send(());
            }
            CacheCommand::Settled {
                key,
                generation,
                result,
            } => self.settle(key, generation, result),
        }
    }

    fn fetch(&mut self, key: QueryKey, fetcher: Fetcher<T>, reply: oneshot::Sender<Result<T, String>>) {
        // Serve from cache only when the value is fresh: not stale, not in
        // error, and no refetch on the wire. A read that overlaps a refetch
        // joins it instead of seeing the old value.
        if !self.in_flight.contains_key(&key) {
            if let Some(entry) = self.entries.get(&key) {
                if let Some(value) = &entry.value {
                    if !entry.stale && entry.error.is_none() {
                        let _ = reply.send(Ok(value.clone()));
                        return;
                    }
                }
            }
        }

        self.waiters.entry(key.clone()).or_default().push(reply);

        let start_new = match self.in_flight.get(&key) {
            None => true,
            // A request initiated before the entry went stale must not be
            // the one that satisfies a post-invalidation read.
            Some(_) => self.entries.get(&key).is_some_and(|e| e.stale),
        };
        if start_new {
            self.start_fetch(key, fetcher);
        }
    }

    fn start_fetch(&mut self, key: QueryKey, fetcher: Fetcher<T>) {
        self.next_generation += 1;
        let generation = self.next_generation;
        self.in_flight.insert(key.clone(), generation);
        if let Some(entry) = self.entries.get_mut(&key) {
            entry.stale = false;
        }

        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = fetcher().await;
            let _ = tx
                .send(CacheCommand::Settled {
                    key,
                    generation,
                    result,
                })
                .await;
        });
    }

    fn settle(&mut self, key: QueryKey, generation: u64, result: Result<T, String>) {
        if self.in_flight.get(&key) != Some(&generation) {
            // Superseded; the newest generation serves the waiters.
            return;
        }
        self.in_flight.remove(&key);

        let entry = self.entries.entry(key.clone()).or_default();
        match &result {
            Ok(value) => {
                entry.value = Some(value.clone());
                entry.error = None;
            }
            // Keep whatever was known before; the error flag surfaces until
            // the next explicit fetch retries.
            Err(err) => {
                entry.error = Some(err.clone());
            }
        }

        for waiter in self.waiters.remove(&key).unwrap_or_default() {
            let _ = waiter.send(result.clone());
        }
    }

    fn invalidate(&mut self, prefix: &QueryKey) {
        for (key, entry) in self.entries.iter_mut() {
            if key.starts_with(prefix) {
                entry.stale = true;
            }
        }
        // A fetch may be in flight for a key that has no entry yet; it must
        // still be superseded by the next read.
        let pending: Vec<QueryKey> = self
            .in_flight
            .keys()
            .filter(|key| key.starts_with(prefix) && !self.entries.contains_key(*key))
            .cloned()
            .collect();
        for key in pending {
            self.entries.insert(
                key,
                Entry {
                    stale: true,
                    ..Entry::default()
                },
            );
        }
    }
}
