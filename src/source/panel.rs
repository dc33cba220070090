//! The refresh orchestrator.

use std::sync::Arc;

use chrono::Local;
use panelwatch_query::{QueryError, QueryRangeRequest, RangeQuery, Series, TimeRange};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::{PanelRequest, RefreshState, SourceEvent, TargetUpdate};
use crate::data::interval::refresh_period;
use crate::data::ChartState;

/// Fetches a panel's targets and collects the results.
///
/// At most one polling timer exists at any time. Every path that arms a timer
/// clears the previous one first, and dropping the source clears it too.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use panelwatch::source::{PanelRequest, PanelSource};
/// use panelwatch_query::{Panel, QueryClient};
///
/// # tokio_test::block_on(async {
/// let client = QueryClient::builder().build().unwrap();
/// let panel = Panel::builder().target(|t| t.expr("up")).build();
/// let request = PanelRequest::new(panel).with_live_tail(true);
///
/// let mut source = PanelSource::new(Arc::new(client), request, tokio::runtime::Handle::current());
/// source.mount();
/// source.poll();
/// println!("{} series", source.chart().series().count());
/// # });
/// ```
#[derive(Debug)]
pub struct PanelSource {
    fetcher: Arc<dyn RangeQuery>,
    runtime: Handle,
    request: Arc<PanelRequest>,
    chart: ChartState,
    timer: Option<JoinHandle<()>>,
    state: RefreshState,
    mounted: bool,
    tx: mpsc::UnboundedSender<SourceEvent>,
    rx: mpsc::UnboundedReceiver<SourceEvent>,
}

impl PanelSource {
    pub fn new(fetcher: Arc<dyn RangeQuery>, request: PanelRequest, runtime: Handle) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            fetcher,
            runtime,
            request: Arc::new(request),
            chart: ChartState::new(),
            timer: None,
            state: RefreshState::Idle,
            mounted: false,
            tx,
            rx,
        }
    }

    /// Start showing the panel: fetch every target, then poll if live tail is on.
    pub fn mount(&mut self) {
        info!(
            "Mounting panel '{}' ({} targets, {} to {})",
            self.request.panel.title,
            self.request.panel.targets.len(),
            self.request.range.from,
            self.request.range.to
        );
        self.mounted = true;
        self.chart.seed(self.request.panel.targets.len());
        self.issue_batch();
        self.arm_if_live();
    }

    /// Stop polling. Results still in flight are applied if they arrive.
    pub fn unmount(&mut self) {
        if self.mounted {
            info!("Unmounting panel '{}'", self.request.panel.title);
        }
        self.clear_timer();
        self.mounted = false;
        self.state = RefreshState::Idle;
    }

    /// Turn polling on or off.
    pub fn set_live_tail(&mut self, live_tail: bool) {
        Arc::make_mut(&mut self.request).live_tail = live_tail;
        self.clear_timer();

        if live_tail && self.mounted {
            self.arm_timer();
        } else {
            self.state = RefreshState::Idle;
        }
    }

    /// Replace what the panel fetches and fetch it right away.
    ///
    /// Used for date range, target, variable and refresh period changes.
    pub fn reconfigure(&mut self, request: PanelRequest) {
        debug!(
            "Reconfiguring panel: {} to {}, refresh {}, live tail {}",
            request.range.from, request.range.to, request.refresh, request.live_tail
        );
        self.clear_timer();
        self.request = Arc::new(request);
        self.chart.retain_targets(self.request.panel.targets.len());
        self.chart.seed(self.request.panel.targets.len());

        if self.mounted {
            self.issue_batch();
            self.arm_if_live();
        }
    }

    /// Commit a new date range. Explicit ranges turn live tail off.
    pub fn set_range(&mut self, range: TimeRange) {
        let request = (*self.request).clone().with_range(range).with_live_tail(false);
        self.reconfigure(request);
    }

    /// Fetch every target once without touching the timer.
    pub fn refresh_now(&mut self) {
        self.issue_batch();
    }

    /// Apply every result that has arrived. Never blocks.
    ///
    /// Returns true if anything changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        while let Ok(event) = self.rx.try_recv() {
            self.handle(event);
            changed = true;
        }
        changed
    }

    /// Wait until no requests are outstanding.
    pub async fn wait_idle(&mut self) {
        self.poll();
        while self.chart.is_busy() {
            match self.rx.recv().await {
                Some(event) => self.handle(event),
                None => break,
            }
        }
    }

    pub fn chart(&self) -> &ChartState {
        &self.chart
    }

    pub fn request(&self) -> &PanelRequest {
        &self.request
    }

    pub fn state(&self) -> RefreshState {
        self.state
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Number of live polling timers: 0 or 1.
    pub fn active_timers(&self) -> usize {
        self.timer.iter().filter(|t| !t.is_finished()).count()
    }

    pub fn description(&self) -> String {
        self.fetcher.description()
    }

    fn handle(&mut self, event: SourceEvent) {
        match event {
            SourceEvent::BatchIssued(targets) => self.chart.begin_batch(targets),
            SourceEvent::Target(update) => self.chart.apply(update),
        }
    }

    fn issue_batch(&mut self) {
        let issued = spawn_batch(&self.runtime, &self.fetcher, &self.request, &self.tx);
        self.chart.begin_batch(issued);
    }

    fn arm_if_live(&mut self) {
        if self.request.live_tail {
            self.arm_timer();
        } else {
            self.state = RefreshState::OneShot;
        }
    }

    fn arm_timer(&mut self) {
        self.clear_timer();

        let period = refresh_period(&self.request.refresh);
        let fetcher = Arc::clone(&self.fetcher);
        let request = Arc::clone(&self.request);
        let tx = self.tx.clone();
        debug!("Polling every {:?}", period);

        self.timer = Some(self.runtime.spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let runtime = Handle::current();

            loop {
                ticker.tick().await;
                // Announce before spawning so the batch is counted ahead of its results
                if tx.send(SourceEvent::BatchIssued(request.panel.targets.len())).is_err() {
                    break;
                }
                spawn_batch(&runtime, &fetcher, &request, &tx);
            }
        }));
        self.state = RefreshState::Polling;
    }

    fn clear_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
            debug!("Cleared polling timer");
        }
    }
}

impl Drop for PanelSource {
    fn drop(&mut self) {
        self.clear_timer();
    }
}

/// Spawn one request task per target. Returns the number spawned.
fn spawn_batch(
    runtime: &Handle,
    fetcher: &Arc<dyn RangeQuery>,
    request: &Arc<PanelRequest>,
    tx: &mpsc::UnboundedSender<SourceEvent>,
) -> usize {
    let targets = request.panel.targets.len();
    debug!("Fetching {} targets", targets);

    for target in 0..targets {
        let fetcher = Arc::clone(fetcher);
        let request = Arc::clone(request);
        let tx = tx.clone();

        runtime.spawn(async move {
            let outcome = run_target(fetcher.as_ref(), &request, target)
                .await
                .map_err(|e| {
                    warn!("Target {} failed: {}", target, e);
                    e.to_string()
                });
            // The source may be gone; nothing left to update
            let _ = tx.send(SourceEvent::Target(TargetUpdate { target, outcome }));
        });
    }
    targets
}

async fn run_target(
    fetcher: &dyn RangeQuery,
    request: &PanelRequest,
    index: usize,
) -> Result<Vec<Series>, QueryError> {
    let Some(target) = request.panel.targets.get(index) else {
        return Ok(Vec::new());
    };
    let query = QueryRangeRequest::for_target(
        &request.panel,
        target,
        &request.vars,
        &request.range,
        Local::now(),
    )?;
    let response = fetcher.query_range(&query).await?;
    response.into_series(target)
}
