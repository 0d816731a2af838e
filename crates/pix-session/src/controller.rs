//! # Payment Session Controller
//!
//! State machine for one checkout session:
//!
//! ```text
//!  Idle ──start()──▶ Creating ──ok──▶ AwaitingPayment ──paid/approved──▶ Paid
//!                       │  ▲               │
//!                    err│  └───retry()─────┤
//!                       ▼                  │
//!                     Error ──retry()──────┘ (re-enters Creating)
//! ```
//!
//! While `AwaitingPayment`, a polling task owned by the controller checks the
//! status proxy every `poll_interval`. The task is aborted on `stop()`, on
//! `retry()`, and when the controller is dropped; it exits by itself once the
//! session is `Paid`.
//!
//! State is published on a `tokio::sync::watch` channel. The controller's
//! methods and the polling task are the only writers, and the polling task
//! only writes through `send_if_modified` after checking that the session is
//! still waiting on the same external id.

use crate::api::CheckoutApi;
use pix_core::{new_external_id, ChargeRequest, ChargeStatus, CheckoutPlan, PixPayment};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, instrument, warn};

/// Gap between status checks
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Floor for `poll_interval`; tokio intervals reject a zero period
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// How long the "copied" indicator stays up
pub const DEFAULT_COPIED_RESET: Duration = Duration::from_secs(2);

const MISSING_PIX_CODE: &str = "PIX code not returned by the payment API";

/// Session parameters
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Amount, buyer and label of the page being served
    pub plan: CheckoutPlan,
    pub poll_interval: Duration,
    pub copied_reset: Duration,
}

impl SessionConfig {
    pub fn new(plan: CheckoutPlan) -> Self {
        Self {
            plan,
            poll_interval: DEFAULT_POLL_INTERVAL,
            copied_reset: DEFAULT_COPIED_RESET,
        }
    }

    /// Builder: set the polling interval, raised to `MIN_POLL_INTERVAL`
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval.max(MIN_POLL_INTERVAL);
        self
    }

    /// Builder: set how long the copied indicator stays up
    pub fn with_copied_reset(mut self, delay: Duration) -> Self {
        self.copied_reset = delay;
        self
    }
}

/// Where the session is in its lifecycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Creating { external_id: String },
    Error { message: String },
    AwaitingPayment { external_id: String, pix: PixPayment },
    Paid { external_id: String },
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Creating { .. } => "creating",
            SessionState::Error { .. } => "error",
            SessionState::AwaitingPayment { .. } => "awaiting_payment",
            SessionState::Paid { .. } => "paid",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Paid { .. })
    }

    /// `Error` and `AwaitingPayment` accept a manual retry
    pub fn can_retry(&self) -> bool {
        matches!(
            self,
            SessionState::Error { .. } | SessionState::AwaitingPayment { .. }
        )
    }

    pub fn external_id(&self) -> Option<&str> {
        match self {
            SessionState::Creating { external_id }
            | SessionState::AwaitingPayment { external_id, .. }
            | SessionState::Paid { external_id } => Some(external_id),
            _ => None,
        }
    }

    pub fn pix(&self) -> Option<&PixPayment> {
        match self {
            SessionState::AwaitingPayment { pix, .. } => Some(pix),
            _ => None,
        }
    }
}

/// What the presentation layer renders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionView {
    pub state: SessionState,
    /// Transient "code copied" indicator
    pub copied: bool,
}

impl Default for SessionView {
    fn default() -> Self {
        Self {
            state: SessionState::Idle,
            copied: false,
        }
    }
}

/// Bookkeeping of the polling task; lives exactly as long as the task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollState {
    pub external_id: String,
    pub last_status: Option<ChargeStatus>,
    pub is_terminal: bool,
}

impl PollState {
    fn new(external_id: String) -> Self {
        Self {
            external_id,
            last_status: None,
            is_terminal: false,
        }
    }

    fn observe(&mut self, status: ChargeStatus) {
        if self.last_status != Some(status) {
            debug!(
                "Charge {} status {:?} -> {}",
                self.external_id, self.last_status, status
            );
        }
        self.last_status = Some(status);
        self.is_terminal = status.is_settled();
    }
}

/// Drives one checkout session
pub struct SessionController {
    api: Arc<dyn CheckoutApi>,
    config: SessionConfig,
    view: Arc<watch::Sender<SessionView>>,
    poller: Option<JoinHandle<()>>,
    copy_reset: Option<JoinHandle<()>>,
}

impl SessionController {
    pub fn new(api: Arc<dyn CheckoutApi>, config: SessionConfig) -> Self {
        let (view, _) = watch::channel(SessionView::default());
        Self {
            api,
            config,
            view: Arc::new(view),
            poller: None,
            copy_reset: None,
        }
    }

    /// Receive every view change
    pub fn subscribe(&self) -> watch::Receiver<SessionView> {
        self.view.subscribe()
    }

    pub fn view(&self) -> SessionView {
        self.view.borrow().clone()
    }

    pub fn state(&self) -> SessionState {
        self.view.borrow().state.clone()
    }

    pub fn plan(&self) -> &CheckoutPlan {
        &self.config.plan
    }

    /// True while a polling task is alive
    pub fn is_polling(&self) -> bool {
        self.poller.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Mount: create the charge. Does nothing unless the session is `Idle`.
    #[instrument(skip(self), fields(plan = %self.config.plan.id))]
    pub async fn start(&mut self) {
        if self.state() != SessionState::Idle {
            warn!("Session already started (state={})", self.state().name());
            return;
        }
        self.create_charge().await;
    }

    /// Create a fresh charge from `Error` or `AwaitingPayment`.
    ///
    /// Returns `false` when the current state does not allow a retry.
    #[instrument(skip(self), fields(plan = %self.config.plan.id))]
    pub async fn retry(&mut self) -> bool {
        let state = self.state();
        if !state.can_retry() {
            debug!("Retry ignored in state {}", state.name());
            return false;
        }
        self.create_charge().await;
        true
    }

    /// Unmount: cancel the polling task and the copy indicator timer
    pub fn stop(&mut self) {
        self.stop_polling();
        if let Some(handle) = self.copy_reset.take() {
            handle.abort();
        }
    }

    /// Hand out the PIX code for the clipboard and raise the copied indicator.
    ///
    /// Must be called inside a Tokio runtime. Returns `None` outside
    /// `AwaitingPayment`.
    pub fn copy_code(&mut self) -> Option<String> {
        let code = {
            let view = self.view.borrow();
            view.state.pix()?.code.clone()
        };

        self.view.send_modify(|v| v.copied = true);

        if let Some(handle) = self.copy_reset.take() {
            handle.abort();
        }
        let view = Arc::clone(&self.view);
        let delay = self.config.copied_reset;
        self.copy_reset = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            view.send_modify(|v| v.copied = false);
        }));

        Some(code)
    }

    async fn create_charge(&mut self) {
        self.stop_polling();

        let external_id = new_external_id();
        self.set_state(SessionState::Creating {
            external_id: external_id.clone(),
        });

        let request = ChargeRequest::for_plan(&self.config.plan, external_id.clone());
        info!(
            "Creating charge {} for {}",
            external_id,
            self.config.plan.display_amount()
        );

        let next = match self.api.create_pix(&request).await {
            Ok(charge) => match charge.pix {
                Some(pix) => SessionState::AwaitingPayment {
                    external_id: external_id.clone(),
                    pix,
                },
                None => {
                    error!("Charge {} created without a PIX code", external_id);
                    SessionState::Error {
                        message: MISSING_PIX_CODE.to_string(),
                    }
                }
            },
            Err(e) => {
                error!("Charge creation failed: {}", e);
                SessionState::Error {
                    message: e.user_message(),
                }
            }
        };

        let awaiting = matches!(next, SessionState::AwaitingPayment { .. });
        self.set_state(next);

        if awaiting {
            self.start_polling(external_id);
        }
    }

    fn set_state(&self, state: SessionState) {
        debug!("Session -> {}", state.name());
        self.view.send_modify(|v| {
            v.state = state;
            v.copied = false;
        });
    }

    fn start_polling(&mut self, external_id: String) {
        self.stop_polling();

        let api = Arc::clone(&self.api);
        let view = Arc::clone(&self.view);
        // The field is public, so the builder's floor may have been bypassed
        let period = self.config.poll_interval.max(MIN_POLL_INTERVAL);

        self.poller = Some(tokio::spawn(poll_until_settled(
            api,
            view,
            external_id,
            period,
        )));
    }

    fn stop_polling(&mut self) {
        if let Some(handle) = self.poller.take() {
            handle.abort();
            debug!("Polling stopped");
        }
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        self.stop();
    }
}

fn is_awaiting(view: &SessionView, external_id: &str) -> bool {
    matches!(
        &view.state,
        SessionState::AwaitingPayment { external_id: current, .. } if current == external_id
    )
}

/// Move `AwaitingPayment(external_id)` to `Paid`. Any other state is left as is.
fn settle(view: &watch::Sender<SessionView>, external_id: &str) -> bool {
    view.send_if_modified(|v| {
        if !is_awaiting(v, external_id) {
            return false;
        }
        v.state = SessionState::Paid {
            external_id: external_id.to_string(),
        };
        v.copied = false;
        true
    })
}

async fn poll_until_settled(
    api: Arc<dyn CheckoutApi>,
    view: Arc<watch::Sender<SessionView>>,
    external_id: String,
    period: Duration,
) {
    let mut poll = PollState::new(external_id);
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    debug!("Polling {} every {:?}", poll.external_id, period);

    while !poll.is_terminal {
        ticker.tick().await;

        let awaiting = is_awaiting(&view.borrow(), &poll.external_id);
        if !awaiting {
            debug!("Session left AwaitingPayment, polling {} ends", poll.external_id);
            return;
        }

        match api.check_payment(&poll.external_id).await {
            Ok(charge) => poll.observe(charge.status),
            Err(e) if e.is_not_found() => {
                debug!("Charge {} not visible yet, still pending", poll.external_id);
            }
            Err(e) => {
                warn!("Payment check for {} failed: {}", poll.external_id, e);
            }
        }
    }

    if settle(&view, &poll.external_id) {
        info!("Payment confirmed for {}", poll.external_id);
    } else {
        debug!("Stale confirmation for {} ignored", poll.external_id);
    }
}
