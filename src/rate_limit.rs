use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;
use std::time::Duration;

// Rate limit entry - tracks requests per client identity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitRecord {
    pub count: u32,
    pub reset_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub remaining: u32,
    pub reset_time: DateTime<Utc>,
}

/// Keyed storage for rate limit records.
///
/// `update` must call the closure exactly once, without any other update
/// for the same identity interleaving between its read and its write.
pub trait RateLimitStore: Send + Sync {
    fn get(&self, identity: &str) -> Option<RateLimitRecord>;

    fn set(&self, identity: &str, record: RateLimitRecord);

    fn update(&self, identity: &str, f: &mut dyn FnMut(&mut Option<RateLimitRecord>));

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// In-process store. Records are never evicted, so memory grows with the
// number of distinct identities seen over the process lifetime.
#[derive(Default)]
pub struct MemoryStore {
    records: DashMap<String, RateLimitRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RateLimitStore for MemoryStore {
    fn get(&self, identity: &str) -> Option<RateLimitRecord> {
        self.records.get(identity).map(|r| *r)
    }

    fn set(&self, identity: &str, record: RateLimitRecord) {
        self.records.insert(identity.to_string(), record);
    }

    // The entry holds the shard write lock until it is dropped
    fn update(&self, identity: &str, f: &mut dyn FnMut(&mut Option<RateLimitRecord>)) {
        match self.records.entry(identity.to_string()) {
            Entry::Occupied(mut occupied) => {
                let mut slot = Some(*occupied.get());
                f(&mut slot);
                match slot {
                    Some(record) => {
                        occupied.insert(record);
                    }
                    None => {
                        occupied.remove();
                    }
                }
            }
            Entry::Vacant(vacant) => {
                let mut slot = None;
                f(&mut slot);
                if let Some(record) = slot {
                    vacant.insert(record);
                }
            }
        }
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}

// Fixed-window limiter: the counter resets entirely once reset_time passes.
#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn RateLimitStore>,
    window: Duration,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn RateLimitStore>, window: Duration) -> Self {
        Self { store, window }
    }

    pub fn in_memory(window: Duration) -> Self {
        Self::new(Arc::new(MemoryStore::new()), window)
    }

    pub fn tracked_identities(&self) -> usize {
        self.store.len()
    }

    pub fn check(&self, identity: &str, quota: u32) -> RateLimitDecision {
        self.check_at(identity, quota, Utc::now())
    }

    pub fn check_at(&self, identity: &str, quota: u32, now: DateTime<Utc>) -> RateLimitDecision {
        let window = chrono::Duration::from_std(self.window).unwrap_or(chrono::Duration::MAX);
        let mut decision = None;

        self.store.update(identity, &mut |slot: &mut Option<RateLimitRecord>| {
            decision = Some(match *slot {
                Some(ref mut record) if now <= record.reset_time => {
                    if record.count >= quota {
                        // over limit, leave the record alone
                        RateLimitDecision {
                            allowed: false,
                            remaining: 0,
                            reset_time: record.reset_time,
                        }
                    } else {
                        record.count += 1;
                        RateLimitDecision {
                            allowed: true,
                            remaining: quota - record.count,
                            reset_time: record.reset_time,
                        }
                    }
                }
                // window expired or first request..? Start a new one
                _ => {
                    let record = RateLimitRecord {
                        count: 1,
                        reset_time: now.checked_add_signed(window).unwrap_or(DateTime::<Utc>::MAX_UTC),
                    };
                    *slot = Some(record);
                    RateLimitDecision {
                        allowed: true,
                        remaining: quota.saturating_sub(1),
                        reset_time: record.reset_time,
                    }
                }
            });
        });

        decision.expect("RateLimitStore::update must call the closure exactly once")
    }
}
