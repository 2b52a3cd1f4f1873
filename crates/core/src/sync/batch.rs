//! Bounded-parallel batch runner used by account and transaction sync.

use std::future::Future;

use futures::stream::{FuturesUnordered, StreamExt};
use log::info;

use crate::errors::Result;

/// Processes `items` in consecutive batches of `batch_size`.
///
/// Items of one batch run concurrently; `process_item` receives the item and
/// its index within the batch. Once every item of a batch has settled the
/// per-item results are handed to `after_batch`, and only then does the next
/// batch start. The first failure (in completion order) fails the run, but
/// its siblings are still driven to completion before the error is returned.
/// The error therefore surfaces once the whole batch has settled, not at the
/// moment it happens: in-flight requests are never abandoned halfway, at the
/// cost of the caller waiting for the slowest sibling.
pub async fn run_batched<T, R, F, Fut, A, AFut>(
    items: Vec<T>,
    batch_size: usize,
    process_item: F,
    mut after_batch: A,
) -> Result<()>
where
    F: Fn(T, usize) -> Fut,
    Fut: Future<Output = Result<R>>,
    A: FnMut(Vec<R>) -> AFut,
    AFut: Future<Output = Result<()>>,
{
    let batch_size = batch_size.max(1);
    let mut items = items.into_iter().peekable();
    let mut batch_number = 0usize;

    while items.peek().is_some() {
        let batch: Vec<T> = items.by_ref().take(batch_size).collect();
        batch_number += 1;

        let results = join_batch(
            batch
                .into_iter()
                .enumerate()
                .map(|(index, item)| process_item(item, index)),
        )
        .await?;
        after_batch(results).await?;

        info!("Finished {}. batch", batch_number);
    }

    Ok(())
}

/// Awaits all futures and returns their results in input order, or the first
/// error observed.
async fn join_batch<R, Fut>(futures: impl Iterator<Item = Fut>) -> Result<Vec<R>>
where
    Fut: Future<Output = Result<R>>,
{
    let mut pending: FuturesUnordered<_> = futures
        .enumerate()
        .map(|(index, future)| async move { (index, future.await) })
        .collect();

    let mut results: Vec<Option<R>> = (0..pending.len()).map(|_| None).collect();
    let mut first_error = None;

    while let Some((index, outcome)) = pending.next().await {
        match outcome {
            Ok(value) => results[index] = Some(value),
            Err(err) => {
                if first_error.is_none() {
                    first_error = Some(err);
                }
            }
        }
    }

    match first_error {
        Some(err) => Err(err),
        None => Ok(results.into_iter().flatten().collect()),
    }
}

/// No-op `after_batch` hook.
pub async fn ignore_batch<R>(_results: Vec<R>) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    #[tokio::test]
    async fn batches_are_sequential_and_indexes_restart() {
        let batches = Arc::new(Mutex::new(Vec::<Vec<usize>>::new()));
        let recorded = Arc::clone(&batches);

        run_batched(
            vec!["a", "b", "c", "d", "e"],
            2,
            |_item, index| async move { Ok(index) },
            move |indexes: Vec<usize>| {
                let recorded = Arc::clone(&recorded);
                async move {
                    recorded.lock().unwrap().push(indexes);
                    Ok(())
                }
            },
        )
        .await
        .unwrap();

        assert_eq!(
            *batches.lock().unwrap(),
            vec![vec![0, 1], vec![0, 1], vec![0]]
        );
    }

    #[tokio::test]
    async fn results_keep_input_order_within_batch() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&seen);

        run_batched(
            vec![30u64, 10, 20],
            3,
            |delay, _index| async move {
                tokio::time::sleep(Duration::from_millis(delay)).await;
                Ok(delay)
            },
            move |values: Vec<u64>| {
                let recorded = Arc::clone(&recorded);
                async move {
                    recorded.lock().unwrap().extend(values);
                    Ok(())
                }
            },
        )
        .await
        .unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![30, 10, 20]);
    }

    #[tokio::test]
    async fn failure_stops_later_batches_but_not_siblings() {
        let completed = Arc::new(AtomicUsize::new(0));
        let after_batch_calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&completed);
        let calls = Arc::clone(&after_batch_calls);

        let result = run_batched(
            vec![0u64, 1, 2, 3, 4],
            3,
            move |item, _index| {
                let counter = Arc::clone(&counter);
                async move {
                    if item == 0 {
                        return Err(Error::api(500, "boom"));
                    }
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(item)
                }
            },
            move |_values: Vec<u64>| {
                let calls = Arc::clone(&calls);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            },
        )
        .await;

        assert!(matches!(result, Err(Error::Api { status: 500, .. })));
        // Siblings 1 and 2 finished, batch [3, 4] never started.
        assert_eq!(completed.load(Ordering::SeqCst), 2);
        assert_eq!(after_batch_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn empty_input_runs_nothing() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        run_batched(
            Vec::<u8>::new(),
            4,
            |item, _index| async move { Ok(item) },
            move |_values: Vec<u8>| {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            },
        )
        .await
        .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn zero_batch_size_processes_one_at_a_time() {
        let sizes = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&sizes);

        run_batched(
            vec![1, 2, 3],
            0,
            |item, _index| async move { Ok(item) },
            move |values: Vec<i32>| {
                let recorded = Arc::clone(&recorded);
                async move {
                    recorded.lock().unwrap().push(values.len());
                    Ok(())
                }
            },
        )
        .await
        .unwrap();

        assert_eq!(*sizes.lock().unwrap(), vec![1, 1, 1]);
    }
}
