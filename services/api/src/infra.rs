use chrono::NaiveDate;
use internship_placement::workflows::placement::{
    Clock, InMemoryNoticePublisher, InMemoryPlacementRepository, PlacementEngine, PlacementPolicy,
    SequentialIdGenerator,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

pub(crate) type MemoryPlacementEngine =
    PlacementEngine<InMemoryPlacementRepository, SequentialIdGenerator, InMemoryNoticePublisher>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Engine wired to the in-memory adapters; the notice buffer is returned so callers can read it.
pub(crate) fn in_memory_engine(
    policy: PlacementPolicy,
    clock: Arc<dyn Clock>,
) -> (MemoryPlacementEngine, Arc<InMemoryNoticePublisher>) {
    let notices = Arc::new(InMemoryNoticePublisher::default());
    let engine = PlacementEngine::with_clock(
        Arc::new(InMemoryPlacementRepository::default()),
        Arc::new(SequentialIdGenerator::default()),
        notices.clone(),
        policy,
        clock,
    );
    (engine, notices)
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
