//! Bounded fan-out / fan-in over independent fetch units.
//!
//! Every unit is spawned on the runtime straight away and waits for one of
//! `max_workers` permits before doing any work. Results are gathered in
//! whatever order the tasks finish and then laid back out in input order, so
//! callers always see a stable sequence with exactly one slot per unit.

use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// Runs `fetch` once per distinct unit with at most `max_workers` in flight.
///
/// `fetch` must hand back the identity it was given along with its value.
/// A unit whose task panics is reported and filled with `T::default()`.
/// Duplicate units are fetched once and keep their first position.
pub async fn fan_out<K, T, F, Fut>(units: Vec<K>, max_workers: usize, fetch: F) -> Vec<(K, T)>
where
    K: Clone + Eq + Hash + Debug + Send + 'static,
    T: Default + Send + 'static,
    F: Fn(K) -> Fut,
    Fut: Future<Output = (K, T)> + Send + 'static,
{
    let mut seen = HashSet::with_capacity(units.len());
    let units: Vec<K> = units
        .into_iter()
        .filter(|unit| seen.insert(unit.clone()))
        .collect();

    if units.is_empty() {
        return Vec::new();
    }

    let permits = Arc::new(Semaphore::new(max_workers.max(1)));
    let mut tasks = JoinSet::new();

    for unit in &units {
        let permits = Arc::clone(&permits);
        let job = fetch(unit.clone());

        tasks.spawn(async move {
            let _permit = permits.acquire_owned().await.ok();
            job.await
        });
    }
    debug!(submitted = units.len(), max_workers, "batch dispatched");

    let mut completed: HashMap<K, T> = HashMap::with_capacity(units.len());
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((unit, value)) => {
                debug!(?unit, remaining = tasks.len(), "unit finished");
                completed.insert(unit, value);
            }
            Err(e) => warn!(error = %e, "worker task did not finish"),
        }
    }

    units
        .into_iter()
        .map(|unit| {
            let value = completed.remove(&unit).unwrap_or_default();
            (unit, value)
        })
        .collect()
}
