//! Checkout payment state machine.
//!
//! The card widget lives in the browser; the browser relays its lifecycle
//! callbacks (mount, ready, error, submit) to the server, which drives a
//! [`CheckoutMachine`] stored in the customer's session.
//!
//! ```text
//!   idle ──mount──▶ loading ──ready──▶ ready ──submit──▶ processing
//!    ▲                                                     │
//!    │                                 ┌───────────────────┼──────────┐
//!    │                                 ▼                   ▼          ▼
//!    └────────────retry─────────── rejected            pending    approved
//! ```
//!
//! Non-card methods skip the widget and start in `ready`.
//!
//! Every operation returns a [`Transition`]. Events that make no sense in
//! the current state are ignored rather than treated as errors: a double
//! click on "pay", or a callback from a widget that has since been
//! replaced, must leave the state untouched.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::{PaymentFailure, PaymentMethod, PaymentOutcome};

/// Where the current payment attempt stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutState {
    /// Waiting for the provider script and the page container.
    #[default]
    Idle,
    /// The card widget is being created.
    Loading,
    /// The widget accepts input, or the redirect button is shown.
    Ready,
    /// A payment was submitted and the backend has not answered yet.
    Processing,
    Approved,
    Pending,
    Rejected,
}

impl CheckoutState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Processing => "processing",
            Self::Approved => "approved",
            Self::Pending => "pending",
            Self::Rejected => "rejected",
        }
    }

    /// The attempt is over (successfully or not).
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Approved | Self::Pending | Self::Rejected)
    }
}

impl fmt::Display for CheckoutState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies one mount of the card widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MountGeneration(u64);

impl MountGeneration {
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for MountGeneration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Tracks the single live widget mount.
///
/// Acquiring releases whatever was mounted before and hands out a fresh
/// generation. Only callbacks carrying the live generation are honored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WidgetSlot {
    generation: u64,
    mounted: bool,
}

impl WidgetSlot {
    /// Start a new mount, invalidating the previous one.
    pub const fn acquire(&mut self) -> MountGeneration {
        self.generation += 1;
        self.mounted = true;
        MountGeneration(self.generation)
    }

    pub const fn release(&mut self) {
        self.mounted = false;
    }

    #[must_use]
    pub const fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// The live mount, if any.
    #[must_use]
    pub const fn current(&self) -> Option<MountGeneration> {
        if self.mounted {
            Some(MountGeneration(self.generation))
        } else {
            None
        }
    }

    #[must_use]
    pub const fn is_current(&self, generation: MountGeneration) -> bool {
        self.mounted && self.generation == generation.0
    }
}

/// Why an event left the machine untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    /// A payment is already in flight.
    AlreadyProcessing,
    /// The callback came from a widget that is no longer mounted.
    StaleMount,
    /// The attempt already finished.
    Finished,
    /// The event does not apply to the current state or method.
    NotApplicable,
}

/// Effect of feeding an event to the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "result")]
pub enum Transition {
    Applied { state: CheckoutState },
    Ignored { state: CheckoutState, reason: IgnoreReason },
}

impl Transition {
    #[must_use]
    pub const fn state(&self) -> CheckoutState {
        match *self {
            Self::Applied { state } | Self::Ignored { state, .. } => state,
        }
    }

    #[must_use]
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

/// The payment state for one order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutMachine {
    method: PaymentMethod,
    state: CheckoutState,
    slot: WidgetSlot,
    failure: Option<PaymentFailure>,
}

impl Default for CheckoutMachine {
    fn default() -> Self {
        Self::new(PaymentMethod::default())
    }
}

impl CheckoutMachine {
    #[must_use]
    pub fn new(method: PaymentMethod) -> Self {
        Self {
            method,
            state: Self::initial_state(method),
            slot: WidgetSlot::default(),
            failure: None,
        }
    }

    const fn initial_state(method: PaymentMethod) -> CheckoutState {
        if method.is_card() {
            CheckoutState::Idle
        } else {
            CheckoutState::Ready
        }
    }

    #[must_use]
    pub const fn state(&self) -> CheckoutState {
        self.state
    }

    #[must_use]
    pub const fn method(&self) -> PaymentMethod {
        self.method
    }

    /// Failure behind the current `rejected` state.
    #[must_use]
    pub const fn failure(&self) -> Option<PaymentFailure> {
        self.failure
    }

    #[must_use]
    pub const fn slot(&self) -> &WidgetSlot {
        &self.slot
    }

    #[must_use]
    pub const fn can_retry(&self) -> bool {
        matches!(self.state, CheckoutState::Rejected)
    }

    const fn applied(&self) -> Transition {
        Transition::Applied { state: self.state }
    }

    const fn ignored(&self, reason: IgnoreReason) -> Transition {
        Transition::Ignored {
            state: self.state,
            reason,
        }
    }

    /// Reason to ignore any user-driven change, if the attempt is locked.
    const fn locked(&self) -> Option<IgnoreReason> {
        match self.state {
            CheckoutState::Processing => Some(IgnoreReason::AlreadyProcessing),
            CheckoutState::Approved | CheckoutState::Pending => Some(IgnoreReason::Finished),
            _ => None,
        }
    }

    /// Switch payment method, dropping any mounted widget.
    pub fn select_method(&mut self, method: PaymentMethod) -> Transition {
        if let Some(reason) = self.locked() {
            return self.ignored(reason);
        }
        self.slot.release();
        self.method = method;
        self.failure = None;
        self.state = Self::initial_state(method);
        self.applied()
    }

    /// The browser is about to create the card widget.
    ///
    /// Any previous mount is released first, so remounting after a page
    /// refresh is safe.
    ///
    /// # Errors
    ///
    /// Returns the [`IgnoreReason`] when no widget belongs in the current
    /// state (non-card method, payment in flight, attempt finished).
    pub fn begin_mount(&mut self) -> Result<MountGeneration, IgnoreReason> {
        if let Some(reason) = self.locked() {
            return Err(reason);
        }
        if !self.method.is_card() {
            return Err(IgnoreReason::NotApplicable);
        }
        match self.state {
            CheckoutState::Idle | CheckoutState::Loading | CheckoutState::Ready => {
                self.slot.release();
                let generation = self.slot.acquire();
                self.state = CheckoutState::Loading;
                Ok(generation)
            }
            _ => Err(IgnoreReason::NotApplicable),
        }
    }

    /// The checkout page was rendered again.
    ///
    /// A widget from the previous page no longer exists, so a card attempt
    /// that was loading or ready goes back to `idle` and waits for a fresh
    /// mount. Any other state is left as it is.
    pub fn page_rendered(&mut self) -> Transition {
        if !self.method.is_card() {
            return self.ignored(IgnoreReason::NotApplicable);
        }
        match self.state {
            CheckoutState::Loading | CheckoutState::Ready => {
                self.slot.release();
                self.state = CheckoutState::Idle;
                self.applied()
            }
            _ => self.ignored(IgnoreReason::NotApplicable),
        }
    }

    /// The widget finished rendering.
    pub fn widget_ready(&mut self, generation: MountGeneration) -> Transition {
        if !self.slot.is_current(generation) {
            return self.ignored(IgnoreReason::StaleMount);
        }
        match self.state {
            CheckoutState::Loading => {
                self.state = CheckoutState::Ready;
                self.applied()
            }
            _ => self.ignored(IgnoreReason::NotApplicable),
        }
    }

    /// The widget reported an error before a payment was submitted.
    pub fn widget_failed(&mut self, generation: MountGeneration) -> Transition {
        if !self.slot.is_current(generation) {
            return self.ignored(IgnoreReason::StaleMount);
        }
        match self.state {
            CheckoutState::Loading | CheckoutState::Ready => {
                self.reject(PaymentFailure::WidgetError);
                self.applied()
            }
            _ => self.ignored(IgnoreReason::NotApplicable),
        }
    }

    /// The payment could not be set up (public key or provider script).
    pub fn setup_failed(&mut self, failure: PaymentFailure) -> Transition {
        match self.state {
            CheckoutState::Idle | CheckoutState::Loading => {
                self.reject(failure);
                self.applied()
            }
            _ => self.ignored(IgnoreReason::NotApplicable),
        }
    }

    /// The widget submitted card data. A second submit while a payment is
    /// in flight is a no-op.
    pub fn submit(&mut self, generation: MountGeneration) -> Transition {
        if let Some(reason) = self.locked() {
            return self.ignored(reason);
        }
        if !self.slot.is_current(generation) {
            return self.ignored(IgnoreReason::StaleMount);
        }
        match self.state {
            CheckoutState::Ready => {
                self.state = CheckoutState::Processing;
                self.applied()
            }
            _ => self.ignored(IgnoreReason::NotApplicable),
        }
    }

    /// The backend answered the payment request.
    pub fn resolve(&mut self, outcome: PaymentOutcome) -> Transition {
        if self.state != CheckoutState::Processing {
            return self.ignored(IgnoreReason::NotApplicable);
        }
        self.slot.release();
        match outcome {
            PaymentOutcome::Approved => self.state = CheckoutState::Approved,
            PaymentOutcome::Pending => self.state = CheckoutState::Pending,
            PaymentOutcome::Rejected(failure) => self.reject(failure),
        }
        self.applied()
    }

    /// The backend call failed outright.
    pub fn processing_failed(&mut self) -> Transition {
        self.resolve(PaymentOutcome::Rejected(PaymentFailure::ProcessingError))
    }

    /// Start over after a rejection.
    ///
    /// Card methods return to `idle` and wait for a new mount; redirect
    /// methods have nothing to mount and go straight back to `ready`.
    pub fn retry(&mut self) -> Transition {
        if self.state != CheckoutState::Rejected {
            return self.ignored(IgnoreReason::NotApplicable);
        }
        self.slot.release();
        self.failure = None;
        self.state = Self::initial_state(self.method);
        self.applied()
    }

    fn reject(&mut self, failure: PaymentFailure) {
        self.slot.release();
        self.failure = Some(failure);
        self.state = CheckoutState::Rejected;
    }
}
