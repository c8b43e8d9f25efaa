use std::sync::atomic::{AtomicU64, Ordering};

static POLLS_CREATED: AtomicU64 = AtomicU64::new(0);
static VOTES_REGISTERED: AtomicU64 = AtomicU64::new(0);
static VOTES_REJECTED: AtomicU64 = AtomicU64::new(0);
static VIEWS_REGISTERED: AtomicU64 = AtomicU64::new(0);
static VIEW_INCREMENT_FAILURES: AtomicU64 = AtomicU64::new(0);

pub fn poll_created() {
    POLLS_CREATED.fetch_add(1, Ordering::Relaxed);
}

pub fn vote_registered() {
    VOTES_REGISTERED.fetch_add(1, Ordering::Relaxed);
}

pub fn vote_rejected() {
    VOTES_REJECTED.fetch_add(1, Ordering::Relaxed);
}

pub fn view_registered() {
    VIEWS_REGISTERED.fetch_add(1, Ordering::Relaxed);
}

/// A view increment failed while the read it belonged to succeeded.
pub fn view_increment_failed() {
    VIEW_INCREMENT_FAILURES.fetch_add(1, Ordering::Relaxed);
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EngineMetricsSnapshot {
    pub polls_created: u64,
    pub votes_registered: u64,
    pub votes_rejected: u64,
    pub views_registered: u64,
    pub view_increment_failures: u64,
}

pub fn metrics_snapshot() -> EngineMetricsSnapshot {
    EngineMetricsSnapshot {
        polls_created: POLLS_CREATED.load(Ordering::Relaxed),
        votes_registered: VOTES_REGISTERED.load(Ordering::Relaxed),
        votes_rejected: VOTES_REJECTED.load(Ordering::Relaxed),
        views_registered: VIEWS_REGISTERED.load(Ordering::Relaxed),
        view_increment_failures: VIEW_INCREMENT_FAILURES.load(Ordering::Relaxed),
    }
}
