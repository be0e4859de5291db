use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use tracing::{debug, warn};

use crate::client::BuildNumber;
use crate::codec::ResourceIndex;
use crate::error::{ResError, Result};

pub type IndexResult = Result<Arc<ResourceIndex>>;
type SharedFetch = Shared<BoxFuture<'static, IndexResult>>;
type Slots = Mutex<HashMap<BuildNumber, Slot>>;

struct Slot {
    /// 每次发起拉取递增，用来区分同一个 build 前后两次不同的拉取
    generation: u64,
    pending: SharedFetch,
}

/// 按 build 缓存「正在进行或已完成」的索引拉取。
///
/// - 同一个 build 第一次被请求时立即登记共享的 future，之后的请求直接等待它（single-flight）；
/// - 拉取在独立的 tokio 任务中执行，调用方放弃等待也不会中断拉取；
/// - 拉取失败时由该任务自己移除槽位，即使已经没有调用方在等待，下一次请求也会重新拉取；
/// - 成功的结果一直保留，直到 [`IndexFetchCache::clear`]。
pub struct IndexFetchCache {
    kind: &'static str,
    slots: Arc<Slots>,
    generations: AtomicU64,
}

impl IndexFetchCache {
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            slots: Arc::new(Mutex::new(HashMap::new())),
            generations: AtomicU64::new(0),
        }
    }

    pub async fn get_or_fetch<F, Fut>(&self, build: BuildNumber, fetch: F) -> IndexResult
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = IndexResult> + Send + 'static,
    {
        self.slot_for(build, fetch).await
    }

    fn slot_for<F, Fut>(&self, build: BuildNumber, fetch: F) -> SharedFetch
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = IndexResult> + Send + 'static,
    {
        let mut slots = lock(&self.slots);
        if let Some(slot) = slots.get(&build) {
            debug!(kind = self.kind, build, "index cache hit");
            return slot.pending.clone();
        }

        debug!(kind = self.kind, build, "index cache miss, starting fetch");
        let generation = self.generations.fetch_add(1, Ordering::Relaxed);
        let fetch_task = tokio::spawn(fetch());
        // fetch 本身可能 panic，失败后的清理放在另一个任务里，保证一定会执行
        let driver = tokio::spawn(drive_fetch(
            fetch_task,
            Arc::downgrade(&self.slots),
            self.kind,
            build,
            generation,
        ));
        let pending = async move {
            driver.await.unwrap_or_else(|join_err| {
                Err(ResError::FetchAborted {
                    build,
                    reason: join_err.to_string(),
                })
            })
        }
        .boxed()
        .shared();
        slots.insert(
            build,
            Slot {
                generation,
                pending: pending.clone(),
            },
        );
        pending
    }

    pub fn contains(&self, build: BuildNumber) -> bool {
        lock(&self.slots).contains_key(&build)
    }

    pub fn len(&self) -> usize {
        lock(&self.slots).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.slots).is_empty()
    }

    pub fn clear(&self) {
        lock(&self.slots).clear();
    }
}

async fn drive_fetch(
    fetch_task: tokio::task::JoinHandle<IndexResult>,
    slots: Weak<Slots>,
    kind: &'static str,
    build: BuildNumber,
    generation: u64,
) -> IndexResult {
    let result = match fetch_task.await {
        Ok(result) => result,
        Err(join_err) => Err(ResError::FetchAborted {
            build,
            reason: join_err.to_string(),
        }),
    };
    if let Err(err) = &result {
        if let Some(slots) = slots.upgrade() {
            evict_failed(&slots, kind, build, generation, err);
        }
    }
    result
}

fn evict_failed(
    slots: &Slots,
    kind: &'static str,
    build: BuildNumber,
    generation: u64,
    err: &ResError,
) {
    let mut slots = lock(slots);
    // 只移除这次拉取自己的槽位，clear 之后重新发起的拉取不受影响
    if slots.get(&build).is_some_and(|slot| slot.generation == generation) {
        slots.remove(&build);
        warn!(kind, build, error = %err, "index fetch failed, evicted");
    }
}

fn lock(slots: &Slots) -> MutexGuard<'_, HashMap<BuildNumber, Slot>> {
    slots.lock().unwrap_or_else(PoisonError::into_inner)
}
