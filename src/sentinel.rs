use {
    crate::{
        estimator::{self, EstimatorState, Utilization},
        source::{ProcStatFile, StatsSource},
        stat,
    },
    std::{mem, time::Duration},
    tokio::{
        sync::watch,
        task,
        time::{self, MissedTickBehavior},
    },
    tracing::{debug, error, info, warn},
};

/// how often kernel statistics are sampled.
pub const PERIOD: Duration = Duration::from_millis(250);

/// observes kernel statistics.
#[derive(Debug, Default)]
pub struct Sentinel<S = ProcStatFile> {
    /// the underlying source of kernel statistics.
    source: S,
    /// the totals seen at the last successful sample.
    state: EstimatorState,
    /// whether the last sample could not be read.
    stale: bool,
}

/// === impl Sentinel ===

impl<S: StatsSource> Sentinel<S> {
    /// creates a new [`Sentinel`] reading from the given source.
    pub fn new(source: S) -> Self {
        Self {
            source,
            state: EstimatorState::default(),
            stale: false,
        }
    }

    /// returns the cpu utilization since this was last successfully called.
    ///
    /// returns `None` if no statistics could be read. the state is left untouched in that case,
    /// so the next sample is compared against the last good one.
    pub fn observe(&mut self) -> Option<Utilization> {
        let Self {
            source,
            state,
            stale,
        } = self;

        let Some(totals) = stat::read(&*source).and_then(|time| time.totals()) else {
            if !mem::replace(stale, true) {
                warn!("cpu statistics are unavailable, holding the last sample");
            }
            return None;
        };
        if mem::replace(stale, false) {
            info!("cpu statistics are available again");
        }

        let (utilization, next) = estimator::step(totals, *state);
        *state = next;

        debug!(%totals, %utilization, "sampled cpu statistics");
        Some(utilization)
    }

    pub fn state(&self) -> EstimatorState {
        self.state
    }

    /// returns true if the last sample could not be read.
    pub fn is_stale(&self) -> bool {
        self.stale
    }
}

/// samples the cpu every [`PERIOD`], publishing each utilization to `tx`.
///
/// each read happens on the blocking pool, so a stalled read never holds up the caller's
/// runtime. this returns once every receiver has been dropped.
pub async fn sample<S>(mut sentinel: Sentinel<S>, tx: watch::Sender<Utilization>)
where
    S: StatsSource + Send + 'static,
{
    let mut ticker = time::interval(PERIOD);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        if tx.is_closed() {
            break;
        }

        let observed = task::spawn_blocking(move || {
            let utilization = sentinel.observe();
            (sentinel, utilization)
        })
        .await;

        let utilization = match observed {
            Ok((returned, utilization)) => {
                sentinel = returned;
                utilization
            }
            Err(error) => {
                error!(%error, "cpu sampler failed");
                return;
            }
        };

        let Some(utilization) = utilization else {
            continue;
        };

        if tx.send(utilization).is_err() {
            break;
        }
    }

    info!("cpu sampler stopped");
}

#[cfg(test)]
mod tests {
    use {super::*, crate::source::MockStatFile};

    const IDLE: &str = "cpu  100 0 100 700 100 0 0 0 0 0\nintr 1462898\n";
    const BUSY: &str = "cpu  200 0 200 800 100 0 0 0 0 0\nintr 1462999\n";

    #[test]
    fn first_observation_is_zero() {
        let mut sentinel = Sentinel::new(MockStatFile::new([IDLE]));
        assert_eq!(sentinel.observe(), Some(Utilization::ZERO));
        assert!(!sentinel.state().is_initial());
    }

    #[test]
    fn two_thirds_busy() {
        let mut sentinel = Sentinel::new(MockStatFile::new([IDLE, BUSY]));
        sentinel.observe();
        let utilization = sentinel.observe().unwrap();
        assert!((utilization.fraction() - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn absent_reads_leave_state_untouched() {
        let mut sentinel = Sentinel::new(MockStatFile::new([
            IDLE,
            "cpu  1 2 3\n",
            "",
            "cpu  a 0 0 0 0 0 0 0 0 0\n",
            BUSY,
        ]));
        sentinel.observe();
        let before = sentinel.state();

        for _ in 0..3 {
            assert_eq!(sentinel.observe(), None);
            assert_eq!(sentinel.state(), before);
        }

        // the mock is exhausted after this, and reads as a missing file.
        let utilization = sentinel.observe().unwrap();
        assert!((utilization.fraction() - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(sentinel.observe(), None);
    }

    #[test]
    fn staleness_follows_the_source() {
        let mut sentinel = Sentinel::new(MockStatFile::new([IDLE, "", "", BUSY]));
        sentinel.observe();
        assert!(!sentinel.is_stale());

        sentinel.observe();
        assert!(sentinel.is_stale());
        sentinel.observe();
        assert!(sentinel.is_stale());

        sentinel.observe();
        assert!(!sentinel.is_stale());
    }

    #[test]
    fn iowait_dip_keeps_a_busy_reading() {
        let mut sentinel = Sentinel::new(MockStatFile::new([
            "cpu  1000 0 1000 5000 200 0 0 0 0 0\n",
            "cpu  1100 0 1100 5010 180 0 0 0 0 0\n",
        ]));
        sentinel.observe();
        let utilization = sentinel.observe().unwrap();
        assert!(utilization.fraction() > 0.9, "{utilization}");
    }

    #[tokio::test]
    async fn sample_publishes_in_order() {
        let sentinel = Sentinel::new(MockStatFile::new([IDLE, "garbage", BUSY]));
        let (tx, mut rx) = watch::channel(Utilization::new(-1.0));
        let sampler = tokio::spawn(sample(sentinel, tx));

        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), Utilization::ZERO);

        rx.changed().await.unwrap();
        let utilization = *rx.borrow_and_update();
        assert!((utilization.fraction() - 2.0 / 3.0).abs() < 1e-9);

        drop(rx);
        sampler.await.unwrap();
    }

    #[tokio::test]
    async fn sample_stops_without_receivers() {
        let sentinel = Sentinel::new(MockStatFile::default());
        let (tx, rx) = watch::channel(Utilization::ZERO);
        drop(rx);
        sample(sentinel, tx).await;
    }
}
