//! Checkout flow controller orchestrating the hosted OTP verification flow.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::domain::entities::{CheckoutSession, ContactMethod, OtpChallenge, SessionStatus};
use crate::errors::{ApiError, FlowError, FlowResult};

use super::clock::Clock;
use super::config::CheckoutFlowConfig;
use super::countdown::{ExpiryCountdown, ExpiryTick, ResendCooldown};
use super::traits::{CheckoutApi, FlowNotifier, Navigator};
use super::types::{
    BootstrapOutcome, FlowMode, FlowNotice, FlowSnapshot, FlowState, OtpIssued, RequestOutcome,
    ResendOutcome, SubmitOutcome,
};

/// Lockout detail kept so repeated submits fail the same way.
#[derive(Debug, Clone)]
struct LockoutInfo {
    message: String,
    redirect_url: Option<String>,
}

/// Mutable flow state behind the controller's mutex.
///
/// The lock is never held across an await; async operations stage under
/// the lock, release it for the network call, then re-acquire to apply
/// the response.
#[derive(Debug)]
struct FlowInner {
    session: Option<CheckoutSession>,
    mode: FlowMode,
    state: FlowState,
    contact: Option<ContactMethod>,
    challenge: Option<OtpChallenge>,
    verified_name: Option<String>,
    lockout: Option<LockoutInfo>,
    generating: bool,
    verifying: bool,
    expiry: Option<ExpiryCountdown>,
    cooldown: Option<ResendCooldown>,
    redirect: Option<JoinHandle<()>>,
}

impl FlowInner {
    fn new() -> Self {
        Self {
            session: None,
            mode: FlowMode::Standard,
            state: FlowState::CollectingContact,
            contact: None,
            challenge: None,
            verified_name: None,
            lockout: None,
            generating: false,
            verifying: false,
            expiry: None,
            cooldown: None,
            redirect: None,
        }
    }
}

/// Client-side state machine for the hosted checkout verification flow.
///
/// Drives a session from contact collection through code entry to
/// completion, owning the countdown timers and scheduled navigation
/// along the way. All state lives behind a mutex so the controller can
/// be shared across tasks; responses that arrive after a newer action
/// has been dispatched are discarded instead of applied.
///
/// The server stays authoritative for the attempt budget: counters are
/// taken from verification responses, never decremented locally.
pub struct CheckoutFlow<A, N, V, C>
where
    A: CheckoutApi,
    N: FlowNotifier + 'static,
    V: Navigator + 'static,
    C: Clock + 'static,
{
    api: Arc<A>,
    notifier: Arc<N>,
    navigator: Arc<V>,
    clock: Arc<C>,
    config: CheckoutFlowConfig,
    dispatch_seq: AtomicU64,
    inner: Mutex<FlowInner>,
}

impl<A, N, V, C> CheckoutFlow<A, N, V, C>
where
    A: CheckoutApi,
    N: FlowNotifier + 'static,
    V: Navigator + 'static,
    C: Clock + 'static,
{
    /// Create a new checkout flow controller.
    ///
    /// # Arguments
    /// * `api` - verification service client
    /// * `notifier` - sink for user-facing notices
    /// * `navigator` - performs scheduled redirects
    /// * `clock` - time source for countdowns
    /// * `config` - flow configuration
    pub fn new(
        api: Arc<A>,
        notifier: Arc<N>,
        navigator: Arc<V>,
        clock: Arc<C>,
        config: CheckoutFlowConfig,
    ) -> Self {
        Self {
            api,
            notifier,
            navigator,
            clock,
            config,
            dispatch_seq: AtomicU64::new(0),
            inner: Mutex::new(FlowInner::new()),
        }
    }

    /// Resolve the session for `session_token` and prepare the flow.
    ///
    /// This method:
    /// 1. Fetches the session from the verification service
    /// 2. Shows the success view for sessions already completed
    /// 3. Refuses expired, failed, and cancelled sessions
    /// 4. Detects direct checkouts from a preset contact and requests a
    ///    code immediately, skipping contact collection
    /// 5. Otherwise enters contact collection
    ///
    /// A direct checkout whose initial code request fails still lands in
    /// the code entry step without an active challenge; resend recovers
    /// it since no cooldown was started.
    pub async fn bootstrap(&self, session_token: &str) -> FlowResult<BootstrapOutcome> {
        let seq = self.bump_seq();
        {
            let mut inner = self.inner();
            Self::reset(&mut inner);
        }
        tracing::info!(event = "bootstrap", "Resolving checkout session");

        let session = match self.api.fetch_session(session_token).await {
            Ok(session) => session,
            Err(err) => {
                let reason = match &err {
                    ApiError::Http { message, .. } => message.clone(),
                    ApiError::Transport { .. } => "Failed to load checkout session".to_string(),
                };
                tracing::warn!(
                    error = %err,
                    event = "session_load_failed",
                    "Checkout session could not be resolved"
                );
                self.notifier.notify(FlowNotice::SessionLoadFailed {
                    message: reason.clone(),
                });
                return Err(FlowError::SessionUnresolvable { reason });
            }
        };

        if self.current_seq() != seq {
            tracing::debug!(
                event = "stale_response_discarded",
                operation = "bootstrap",
                "Discarding superseded session response"
            );
            return Ok(BootstrapOutcome::Superseded);
        }

        match session.status {
            SessionStatus::Completed => {
                let mut inner = self.inner();
                inner.session = Some(session);
                inner.state = FlowState::Completed;
                drop(inner);
                tracing::info!(
                    event = "session_already_completed",
                    "Session was verified before this visit"
                );
                Ok(BootstrapOutcome::Ready {
                    mode: FlowMode::Standard,
                    state: FlowState::Completed,
                })
            }
            SessionStatus::Expired | SessionStatus::Failed | SessionStatus::Cancelled => {
                let status = session.status;
                tracing::warn!(
                    status = %status,
                    event = "session_closed",
                    "Session is in a terminal status"
                );
                let notice = FlowNotice::SessionClosed { status };
                let reason = notice.to_string();
                self.notifier.notify(notice);
                Err(FlowError::SessionUnresolvable { reason })
            }
            SessionStatus::Pending => match session.preset_contact() {
                None => {
                    let mut inner = self.inner();
                    inner.session = Some(session);
                    inner.mode = FlowMode::Standard;
                    inner.state = FlowState::CollectingContact;
                    drop(inner);
                    tracing::info!(
                        mode = "standard",
                        event = "flow_ready",
                        "Collecting contact from the payer"
                    );
                    Ok(BootstrapOutcome::Ready {
                        mode: FlowMode::Standard,
                        state: FlowState::CollectingContact,
                    })
                }
                Some(contact) => {
                    {
                        let mut inner = self.inner();
                        inner.session = Some(session);
                        inner.mode = FlowMode::Direct;
                        inner.state = FlowState::AwaitingCode;
                        inner.contact = Some(contact.clone());
                        inner.generating = true;
                    }
                    tracing::info!(
                        mode = "direct",
                        contact = %contact.masked(),
                        event = "flow_ready",
                        "Requesting code for preset contact"
                    );

                    let result = self
                        .api
                        .generate_code(session_token, &contact, self.config.code_length)
                        .await;

                    let mut inner = self.inner();
                    inner.generating = false;
                    if self.current_seq() != seq {
                        drop(inner);
                        tracing::debug!(
                            event = "stale_response_discarded",
                            operation = "bootstrap",
                            "Discarding superseded generation response"
                        );
                        return Ok(BootstrapOutcome::Superseded);
                    }

                    match result {
                        Ok(issued) => {
                            let destination = contact.value().to_string();
                            self.apply_issued(&mut inner, contact, issued);
                            drop(inner);
                            self.notifier.notify(FlowNotice::CodeSent {
                                destination: Some(destination),
                            });
                        }
                        Err(err) => {
                            drop(inner);
                            let flow_err = Self::map_generation_error(err, "Failed to send OTP");
                            tracing::warn!(
                                error = %flow_err,
                                event = "otp_generate_failed",
                                "Could not issue code for preset contact"
                            );
                            self.notify_generation_failure(&flow_err);
                        }
                    }

                    Ok(BootstrapOutcome::Ready {
                        mode: FlowMode::Direct,
                        state: FlowState::AwaitingCode,
                    })
                }
            },
        }
    }

    /// Validate `contact` and request a one-time code for it.
    ///
    /// This method:
    /// 1. Validates the contact locally; a bad value fails without any
    ///    network call or notice
    /// 2. Sends the generation request
    /// 3. On success binds the contact, stores the challenge, starts the
    ///    expiry countdown and the resend cooldown, and moves to code
    ///    entry
    /// 4. Maps rejections: 429 to throttled, 402 to quota exhausted
    pub async fn request_code(&self, contact: ContactMethod) -> FlowResult<RequestOutcome> {
        contact.validate()?;

        let (seq, session_token) = {
            let mut inner = self.inner();
            let session_token = match inner.session.as_ref() {
                Some(session) => session.session_token.clone(),
                None => {
                    return Err(FlowError::InvalidState {
                        operation: "request_code".to_string(),
                    })
                }
            };
            if inner.state != FlowState::CollectingContact {
                return Err(FlowError::InvalidState {
                    operation: "request_code".to_string(),
                });
            }
            if inner.generating {
                return Err(FlowError::ActionPending {
                    action: "code generation".to_string(),
                });
            }
            inner.generating = true;
            (self.bump_seq(), session_token)
        };

        tracing::info!(
            contact = %contact.masked(),
            kind = contact.kind(),
            event = "otp_requested",
            "Requesting one-time code"
        );

        let result = self
            .api
            .generate_code(&session_token, &contact, self.config.code_length)
            .await;

        let mut inner = self.inner();
        inner.generating = false;

        if self.current_seq() != seq {
            drop(inner);
            tracing::debug!(
                event = "stale_response_discarded",
                operation = "request_code",
                "Discarding superseded generation response"
            );
            return Ok(RequestOutcome::Superseded);
        }

        match result {
            Ok(issued) => {
                let destination = contact.value().to_string();
                self.apply_issued(&mut inner, contact, issued);
                drop(inner);
                self.notifier.notify(FlowNotice::CodeSent { destination: None });
                Ok(RequestOutcome::Sent { destination })
            }
            Err(err) => {
                drop(inner);
                let flow_err = Self::map_generation_error(err, "Failed to generate OTP");
                tracing::warn!(
                    error = %flow_err,
                    event = "otp_generate_failed",
                    "Code generation rejected"
                );
                self.notify_generation_failure(&flow_err);
                Err(flow_err)
            }
        }
    }

    /// Request a fresh code for the bound contact.
    ///
    /// A resend during the cooldown is a quiet no-op reporting the
    /// seconds left. On success the previous challenge is replaced
    /// wholesale: new reference, new expiry, cleared digits, and a full
    /// attempt budget until the server says otherwise.
    pub async fn resend_code(&self) -> FlowResult<ResendOutcome> {
        let (seq, session_token, contact) = {
            let mut inner = self.inner();
            let session_token = match inner.session.as_ref() {
                Some(session) => session.session_token.clone(),
                None => {
                    return Err(FlowError::InvalidState {
                        operation: "resend_code".to_string(),
                    })
                }
            };
            if inner.state != FlowState::AwaitingCode {
                return Err(FlowError::InvalidState {
                    operation: "resend_code".to_string(),
                });
            }
            if let Some(cooldown) = inner.cooldown.as_ref() {
                let seconds_left = cooldown.seconds_left();
                if seconds_left > 0 {
                    return Ok(ResendOutcome::CooldownActive { seconds_left });
                }
            }
            if inner.generating {
                return Err(FlowError::ActionPending {
                    action: "code generation".to_string(),
                });
            }
            let contact = match inner.contact.clone() {
                Some(contact) => contact,
                None => {
                    return Err(FlowError::InvalidState {
                        operation: "resend_code".to_string(),
                    })
                }
            };
            inner.generating = true;
            (self.bump_seq(), session_token, contact)
        };

        tracing::info!(
            contact = %contact.masked(),
            event = "otp_resend",
            "Resending one-time code"
        );

        let result = self
            .api
            .generate_code(&session_token, &contact, self.config.code_length)
            .await;

        let mut inner = self.inner();
        inner.generating = false;

        if self.current_seq() != seq {
            drop(inner);
            tracing::debug!(
                event = "stale_response_discarded",
                operation = "resend_code",
                "Discarding superseded generation response"
            );
            return Ok(ResendOutcome::Superseded);
        }

        match result {
            Ok(issued) => {
                self.apply_issued(&mut inner, contact, issued);
                drop(inner);
                self.notifier.notify(FlowNotice::CodeResent);
                Ok(ResendOutcome::Sent)
            }
            Err(err) => {
                drop(inner);
                let flow_err = Self::map_generation_error(err, "Failed to resend OTP");
                tracing::warn!(
                    error = %flow_err,
                    event = "otp_resend_failed",
                    "Resend rejected"
                );
                self.notify_generation_failure(&flow_err);
                Err(flow_err)
            }
        }
    }

    /// Submit the entered code for verification.
    ///
    /// This method:
    /// 1. Requires every digit slot to be filled
    /// 2. Sends the code with the challenge reference
    /// 3. On acceptance completes the flow, storing the receiver's first
    ///    name and scheduling the redirect when one was configured
    /// 4. On rejection takes the attempt counters from the server and
    ///    clears the entered digits
    /// 5. On lockout moves to the locked state, from which further
    ///    submits fail locally without a network call
    pub async fn submit_code(&self) -> FlowResult<SubmitOutcome> {
        let (seq, session_token, reference, code) = {
            let mut inner = self.inner();
            let session_token = match inner.session.as_ref() {
                Some(session) => session.session_token.clone(),
                None => {
                    return Err(FlowError::InvalidState {
                        operation: "submit_code".to_string(),
                    })
                }
            };
            match inner.state {
                FlowState::AwaitingCode => {}
                FlowState::Locked => {
                    let (message, redirect_url) = match inner.lockout.clone() {
                        Some(lockout) => (lockout.message, lockout.redirect_url),
                        None => ("Too many failed attempts".to_string(), None),
                    };
                    return Err(FlowError::Locked {
                        message,
                        redirect_url,
                    });
                }
                _ => {
                    return Err(FlowError::InvalidState {
                        operation: "submit_code".to_string(),
                    })
                }
            }
            let (reference, code, filled, expected) = match inner.challenge.as_ref() {
                Some(challenge) => (
                    challenge.reference.clone(),
                    challenge.digits.code(),
                    challenge.digits.filled_count(),
                    challenge.digits.code_length(),
                ),
                None => {
                    return Err(FlowError::InvalidState {
                        operation: "submit_code".to_string(),
                    })
                }
            };
            let code = match code {
                Some(code) => code,
                None => {
                    drop(inner);
                    self.notifier.notify(FlowNotice::IncompleteCode);
                    return Err(FlowError::IncompleteCode { filled, expected });
                }
            };
            if inner.verifying {
                return Err(FlowError::ActionPending {
                    action: "verification".to_string(),
                });
            }
            inner.verifying = true;
            (self.current_seq(), session_token, reference, code)
        };

        tracing::info!(event = "otp_submit", "Submitting code for verification");

        let result = self.api.verify_code(&session_token, &reference, &code).await;

        let mut inner = self.inner();
        inner.verifying = false;

        if self.current_seq() != seq {
            drop(inner);
            tracing::debug!(
                event = "stale_response_discarded",
                operation = "submit_code",
                "Discarding superseded verification response"
            );
            return Ok(SubmitOutcome::Superseded);
        }

        match result {
            Ok(receipt) => {
                let receiver_name = receipt
                    .details
                    .as_ref()
                    .and_then(|details| details.name.as_deref())
                    .and_then(|name| name.split_whitespace().next())
                    .map(str::to_string);
                inner.verified_name = receiver_name.clone();
                inner.state = FlowState::Completed;
                Self::stop_timers(&mut inner);

                let redirect_url = if receipt.verified {
                    receipt.redirect_url.clone()
                } else {
                    None
                };
                match redirect_url {
                    Some(url) => {
                        self.schedule_redirect(
                            &mut inner,
                            url.clone(),
                            Duration::from_millis(self.config.success_redirect_delay_ms),
                        );
                        drop(inner);
                        tracing::info!(
                            event = "checkout_verified",
                            redirect = true,
                            "Verification succeeded"
                        );
                        self.notifier.notify(FlowNotice::VerificationSucceeded {
                            name: receiver_name.clone(),
                        });
                        Ok(SubmitOutcome::Completed {
                            redirect_url: Some(url),
                            receiver_name,
                        })
                    }
                    None => {
                        drop(inner);
                        tracing::info!(
                            event = "checkout_verified",
                            redirect = false,
                            "Verification succeeded"
                        );
                        Ok(SubmitOutcome::Completed {
                            redirect_url: None,
                            receiver_name,
                        })
                    }
                }
            }
            Err(ApiError::Http {
                message, failure, ..
            }) => {
                let failure = failure.unwrap_or_default();
                if failure.locked {
                    if let Some(challenge) = inner.challenge.as_mut() {
                        challenge.lock();
                    }
                    inner.state = FlowState::Locked;
                    inner.lockout = Some(LockoutInfo {
                        message: message.clone(),
                        redirect_url: failure.redirect_url.clone(),
                    });
                    Self::stop_timers(&mut inner);
                    if let Some(url) = failure.redirect_url.clone() {
                        self.schedule_redirect(
                            &mut inner,
                            url,
                            Duration::from_millis(self.config.lockout_redirect_delay_ms),
                        );
                    }
                    drop(inner);
                    tracing::warn!(
                        event = "otp_locked",
                        "Attempt budget exhausted; session locked"
                    );
                    self.notifier.notify(FlowNotice::LockedOut {
                        message: message.clone(),
                    });
                    Err(FlowError::Locked {
                        message,
                        redirect_url: failure.redirect_url,
                    })
                } else {
                    let failed_attempts = failure.failed_attempts.unwrap_or(0);
                    let remaining_tries = failure.remaining_tries.unwrap_or(0);
                    if let Some(challenge) = inner.challenge.as_mut() {
                        challenge.record_failure(failed_attempts, remaining_tries);
                    }
                    drop(inner);
                    tracing::info!(
                        remaining_tries = remaining_tries,
                        event = "otp_verify_failed",
                        "Code rejected"
                    );
                    self.notifier.notify(FlowNotice::VerificationFailed {
                        message: message.clone(),
                        remaining_tries,
                    });
                    Err(FlowError::VerificationFailed {
                        message,
                        remaining_tries,
                        failed_attempts,
                    })
                }
            }
            Err(ApiError::Transport { .. }) => {
                drop(inner);
                let message = "Failed to verify OTP".to_string();
                tracing::warn!(
                    event = "otp_verify_transport_failed",
                    "Verification request never reached the server"
                );
                self.notifier.notify(FlowNotice::TransportFailure {
                    message: message.clone(),
                });
                Err(FlowError::Transport { message })
            }
        }
    }

    /// Return to contact entry, discarding the active challenge.
    ///
    /// Only available in the standard flow; direct checkouts have their
    /// contact fixed by the merchant. The previous contact is kept for
    /// prefilling the entry form, and any response still in flight for
    /// the old challenge is superseded.
    pub fn change_contact(&self) -> FlowResult<()> {
        let mut inner = self.inner();
        if inner.session.is_none() {
            return Err(FlowError::InvalidState {
                operation: "change_contact".to_string(),
            });
        }
        if inner.mode == FlowMode::Direct {
            return Err(FlowError::ContactLocked);
        }
        if inner.state != FlowState::AwaitingCode {
            return Err(FlowError::InvalidState {
                operation: "change_contact".to_string(),
            });
        }
        self.bump_seq();
        inner.challenge = None;
        inner.state = FlowState::CollectingContact;
        Self::stop_timers(&mut inner);
        drop(inner);
        tracing::debug!(event = "contact_change", "Returning to contact entry");
        Ok(())
    }

    /// Store a digit in the code entry slot at `index`.
    ///
    /// Non-digit characters and out-of-range indexes are dropped, the
    /// way the entry boxes filter keystrokes.
    pub fn set_digit(&self, index: usize, digit: char) -> FlowResult<()> {
        let mut inner = self.inner();
        let challenge = Self::active_challenge(&mut inner)?;
        challenge.digits.set(index, digit);
        Ok(())
    }

    /// Clear the code entry slot at `index`.
    pub fn erase_digit(&self, index: usize) -> FlowResult<()> {
        let mut inner = self.inner();
        let challenge = Self::active_challenge(&mut inner)?;
        challenge.digits.erase(index);
        Ok(())
    }

    /// Spread pasted text across the entry slots starting at `start`.
    ///
    /// # Returns
    /// * `usize` - how many digits were written
    pub fn input_digits(&self, start: usize, text: &str) -> FlowResult<usize> {
        let mut inner = self.inner();
        let challenge = Self::active_challenge(&mut inner)?;
        Ok(challenge.digits.paste(start, text))
    }

    /// Read-only view of the flow for rendering.
    pub fn snapshot(&self) -> FlowSnapshot {
        let inner = self.inner();
        let (slots, filled_slots, remaining_tries, failed_attempts) =
            match inner.challenge.as_ref() {
                Some(challenge) => (
                    challenge.digits.slots().to_vec(),
                    challenge.digits.filled_count(),
                    Some(challenge.remaining_tries),
                    Some(challenge.failed_attempts),
                ),
                None => (Vec::new(), 0, None, None),
            };
        let (expiry_display, expiry_seconds_left) = match inner.expiry.as_ref() {
            Some(expiry) => {
                let tick = expiry.snapshot();
                (Some(tick.display), Some(tick.seconds_left))
            }
            None => (None, None),
        };
        FlowSnapshot {
            state: inner.state,
            mode: inner.mode,
            project_name: inner
                .session
                .as_ref()
                .map(|session| session.project_name.clone()),
            contact: inner.contact.clone(),
            slots,
            filled_slots,
            remaining_tries,
            failed_attempts,
            cooldown_seconds: inner
                .cooldown
                .as_ref()
                .map(|cooldown| cooldown.seconds_left())
                .unwrap_or(0),
            expiry_display,
            expiry_seconds_left,
            verified_name: inner.verified_name.clone(),
            generating: inner.generating,
            verifying: inner.verifying,
        }
    }

    /// Current flow state.
    pub fn state(&self) -> FlowState {
        self.inner().state
    }

    /// Receiver for the expiry countdown of the active challenge.
    pub fn expiry_ticks(&self) -> Option<watch::Receiver<ExpiryTick>> {
        self.inner().expiry.as_ref().map(|expiry| expiry.subscribe())
    }

    /// Receiver for the resend cooldown of the active challenge.
    pub fn cooldown_ticks(&self) -> Option<watch::Receiver<u64>> {
        self.inner()
            .cooldown
            .as_ref()
            .map(|cooldown| cooldown.subscribe())
    }

    fn inner(&self) -> MutexGuard<'_, FlowInner> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn bump_seq(&self) -> u64 {
        self.dispatch_seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn current_seq(&self) -> u64 {
        self.dispatch_seq.load(Ordering::SeqCst)
    }

    /// Install a fresh challenge and start its timers.
    fn apply_issued(&self, inner: &mut FlowInner, contact: ContactMethod, issued: OtpIssued) {
        let OtpIssued {
            reference,
            expires_at,
        } = issued;
        Self::stop_timers(inner);
        inner.challenge = Some(OtpChallenge::new(
            reference,
            expires_at,
            self.config.code_length,
            self.config.initial_remaining_tries,
        ));
        inner.contact = Some(contact);
        inner.state = FlowState::AwaitingCode;
        inner.expiry = Some(ExpiryCountdown::start(
            expires_at,
            Arc::clone(&self.clock),
            Arc::clone(&self.notifier),
        ));
        inner.cooldown = Some(ResendCooldown::start(self.config.resend_cooldown_seconds));
    }

    fn stop_timers(inner: &mut FlowInner) {
        if let Some(expiry) = inner.expiry.take() {
            expiry.stop();
        }
        if let Some(cooldown) = inner.cooldown.take() {
            cooldown.stop();
        }
    }

    fn reset(inner: &mut FlowInner) {
        Self::stop_timers(inner);
        if let Some(redirect) = inner.redirect.take() {
            redirect.abort();
        }
        inner.session = None;
        inner.contact = None;
        inner.challenge = None;
        inner.verified_name = None;
        inner.lockout = None;
        inner.mode = FlowMode::Standard;
        inner.state = FlowState::CollectingContact;
    }

    fn active_challenge<'a>(inner: &'a mut FlowInner) -> FlowResult<&'a mut OtpChallenge> {
        if inner.state != FlowState::AwaitingCode {
            return Err(FlowError::InvalidState {
                operation: "code entry".to_string(),
            });
        }
        match inner.challenge.as_mut() {
            Some(challenge) => Ok(challenge),
            None => Err(FlowError::InvalidState {
                operation: "code entry".to_string(),
            }),
        }
    }

    /// Replace any pending navigation and schedule a new one.
    fn schedule_redirect(&self, inner: &mut FlowInner, url: String, delay: Duration) {
        if let Some(previous) = inner.redirect.take() {
            previous.abort();
        }
        let navigator = Arc::clone(&self.navigator);
        tracing::info!(
            delay_ms = delay.as_millis() as u64,
            event = "redirect_scheduled",
            "Navigation scheduled"
        );
        inner.redirect = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            tracing::info!(url = %url, event = "redirect", "Navigating to redirect URL");
            navigator.navigate(&url);
        }));
    }

    fn map_generation_error(err: ApiError, transport_fallback: &str) -> FlowError {
        match err {
            ApiError::Http { status: 429, .. } => FlowError::Throttled,
            ApiError::Http { status: 402, .. } => FlowError::QuotaExhausted,
            ApiError::Http { message, .. } => FlowError::GenerationFailed { message },
            ApiError::Transport { .. } => FlowError::Transport {
                message: transport_fallback.to_string(),
            },
        }
    }

    fn notify_generation_failure(&self, err: &FlowError) {
        match err {
            FlowError::Transport { message } => {
                self.notifier.notify(FlowNotice::TransportFailure {
                    message: message.clone(),
                });
            }
            other => {
                self.notifier.notify(FlowNotice::GenerationFailed {
                    message: other.to_string(),
                });
            }
        }
    }
}

impl<A, N, V, C> Drop for CheckoutFlow<A, N, V, C>
where
    A: CheckoutApi,
    N: FlowNotifier + 'static,
    V: Navigator + 'static,
    C: Clock + 'static,
{
    fn drop(&mut self) {
        let mut inner = self.inner();
        if let Some(redirect) = inner.redirect.take() {
            redirect.abort();
        }
    }
}
