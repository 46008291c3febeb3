//! Fan-out of blocking per-item work with a structured join.
//!
//! Each item gets its own task in a `JoinSet`; the blocking body (a curl
//! transfer, a file hash) runs on `spawn_blocking`. An optional semaphore caps
//! how many bodies run at once.

use anyhow::Result;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Runs `work` for every item and returns the outputs in input order.
///
/// `on_done` is called on the joining task as each output arrives (completion
/// order), which is where stage progress bars tick. `limit` of `None` starts
/// every item at once.
pub async fn run_blocking_all<T, R, F, D>(
    items: Vec<T>,
    limit: Option<usize>,
    work: F,
    mut on_done: D,
) -> Result<Vec<R>>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T) -> R + Send + Sync + 'static,
    D: FnMut(&R),
{
    let total = items.len();
    let work = Arc::new(work);
    let semaphore = limit.map(|n| Arc::new(Semaphore::new(n.max(1))));
    let mut join_set = JoinSet::new();

    for (index, item) in items.into_iter().enumerate() {
        let work = Arc::clone(&work);
        let semaphore = semaphore.clone();
        join_set.spawn(async move {
            let _permit = match semaphore {
                Some(s) => Some(s.acquire_owned().await?),
                None => None,
            };
            let out = tokio::task::spawn_blocking(move || work(item)).await?;
            Ok::<_, anyhow::Error>((index, out))
        });
    }

    let mut slots: Vec<Option<R>> = (0..total).map(|_| None).collect();
    while let Some(joined) = join_set.join_next().await {
        let (index, out) = joined.map_err(|e| anyhow::anyhow!("batch task join: {}", e))??;
        on_done(&out);
        slots[index] = Some(out);
    }

    Ok(slots.into_iter().flatten().collect())
}
