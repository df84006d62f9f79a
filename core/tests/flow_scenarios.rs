//! Integration tests for the checkout flow controller

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone, Utc};

    use gk_core::domain::entities::{CheckoutSession, ContactMethod, SessionStatus};
    use gk_core::errors::{ApiError, ApiFailure, FlowError};
    use gk_core::services::checkout::{
        BootstrapOutcome, CheckoutApi, CheckoutFlow, CheckoutFlowConfig, FlowMode, FlowNotice,
        FlowNotifier, FlowState, MockClock, Navigator, OtpIssued, ReceiverDetails, VerifyReceipt,
    };

    const MAX_TRIES: u32 = 3;

    // Fake verification service with attempt tracking
    struct FakeVerificationService {
        session: CheckoutSession,
        accepted_code: String,
        code_expires_at: DateTime<Utc>,
        redirect_url: Option<String>,
        receiver_name: Option<String>,
        issued: AtomicUsize,
        attempts: tokio::sync::RwLock<AttemptState>,
    }

    struct AttemptState {
        failed_attempts: u32,
        locked: bool,
    }

    impl FakeVerificationService {
        fn new(session: CheckoutSession, accepted_code: &str) -> Self {
            let code_expires_at = session.expires_at;
            Self {
                session,
                accepted_code: accepted_code.to_string(),
                code_expires_at,
                redirect_url: None,
                receiver_name: None,
                issued: AtomicUsize::new(0),
                attempts: tokio::sync::RwLock::new(AttemptState {
                    failed_attempts: 0,
                    locked: false,
                }),
            }
        }

        fn with_redirect(mut self, url: &str) -> Self {
            self.redirect_url = Some(url.to_string());
            self
        }

        fn with_receiver_name(mut self, name: &str) -> Self {
            self.receiver_name = Some(name.to_string());
            self
        }

        fn issued_count(&self) -> usize {
            self.issued.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CheckoutApi for FakeVerificationService {
        async fn fetch_session(&self, session_token: &str) -> Result<CheckoutSession, ApiError> {
            if session_token == self.session.session_token {
                Ok(self.session.clone())
            } else {
                Err(ApiError::Http {
                    status: 404,
                    message: "Session not found".to_string(),
                    failure: None,
                })
            }
        }

        async fn generate_code(
            &self,
            _session_token: &str,
            _contact: &ContactMethod,
            _code_length: usize,
        ) -> Result<OtpIssued, ApiError> {
            let issue = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(OtpIssued {
                reference: format!("otp_ref_{}", issue),
                expires_at: self.code_expires_at,
            })
        }

        async fn verify_code(
            &self,
            _session_token: &str,
            _reference: &str,
            code: &str,
        ) -> Result<VerifyReceipt, ApiError> {
            let mut attempts = self.attempts.write().await;

            if attempts.locked {
                return Err(ApiError::Http {
                    status: 403,
                    message: "Too many failed attempts. Session locked.".to_string(),
                    failure: Some(ApiFailure {
                        locked: true,
                        failed_attempts: Some(attempts.failed_attempts),
                        remaining_tries: Some(0),
                        redirect_url: None,
                    }),
                });
            }

            if code == self.accepted_code {
                return Ok(VerifyReceipt {
                    verified: true,
                    redirect_url: self.redirect_url.clone(),
                    details: self.receiver_name.as_ref().map(|name| ReceiverDetails {
                        receiver: "0244123456".to_string(),
                        name: Some(name.clone()),
                        email: None,
                        kind: "sms".to_string(),
                        reference: "otp_ref_1".to_string(),
                    }),
                });
            }

            attempts.failed_attempts += 1;
            if attempts.failed_attempts >= MAX_TRIES {
                attempts.locked = true;
                Err(ApiError::Http {
                    status: 403,
                    message: "Too many failed attempts. Session locked.".to_string(),
                    failure: Some(ApiFailure {
                        locked: true,
                        failed_attempts: Some(attempts.failed_attempts),
                        remaining_tries: Some(0),
                        redirect_url: None,
                    }),
                })
            } else {
                Err(ApiError::Http {
                    status: 400,
                    message: "Invalid OTP".to_string(),
                    failure: Some(ApiFailure {
                        locked: false,
                        failed_attempts: Some(attempts.failed_attempts),
                        remaining_tries: Some(MAX_TRIES - attempts.failed_attempts),
                        redirect_url: None,
                    }),
                })
            }
        }
    }

    // Collects rendered notices
    struct RecordingNotifier {
        messages: Mutex<Vec<String>>,
    }

    impl RecordingNotifier {
        fn new() -> Self {
            Self {
                messages: Mutex::new(Vec::new()),
            }
        }

        fn messages(&self) -> Vec<String> {
            self.messages.lock().unwrap().clone()
        }
    }

    impl FlowNotifier for RecordingNotifier {
        fn notify(&self, notice: FlowNotice) {
            self.messages.lock().unwrap().push(notice.to_string());
        }
    }

    // Records redirect destinations
    struct RecordingNavigator {
        visits: Mutex<Vec<String>>,
    }

    impl RecordingNavigator {
        fn new() -> Self {
            Self {
                visits: Mutex::new(Vec::new()),
            }
        }

        fn visits(&self) -> Vec<String> {
            self.visits.lock().unwrap().clone()
        }
    }

    impl Navigator for RecordingNavigator {
        fn navigate(&self, url: &str) {
            self.visits.lock().unwrap().push(url.to_string());
        }
    }

    fn start_instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 9, 30, 0).unwrap()
    }

    fn live_session(token: &str) -> CheckoutSession {
        CheckoutSession {
            session_token: token.to_string(),
            project_name: "Kente Collective".to_string(),
            status: SessionStatus::Pending,
            phone_number: None,
            email: None,
            expires_at: start_instant() + chrono::Duration::minutes(5),
            metadata: None,
        }
    }

    async fn advance_ms(clock: &MockClock, ms: u64) {
        tokio::task::yield_now().await;
        clock.advance(chrono::Duration::milliseconds(ms as i64));
        tokio::time::advance(Duration::from_millis(ms)).await;
        tokio::task::yield_now().await;
        tokio::task::yield_now().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_standard_checkout_end_to_end() {
        let api = Arc::new(
            FakeVerificationService::new(live_session("cs_live_888"), "482913")
                .with_redirect("https://kente.example/receipt")
                .with_receiver_name("Akosua Boateng"),
        );
        let notifier = Arc::new(RecordingNotifier::new());
        let navigator = Arc::new(RecordingNavigator::new());
        let clock = MockClock::new(start_instant());

        let flow = CheckoutFlow::new(
            Arc::clone(&api),
            Arc::clone(&notifier),
            Arc::clone(&navigator),
            Arc::new(clock.clone()),
            CheckoutFlowConfig::default(),
        );

        // Step 1: Resolve the session; the payer supplies the contact
        let outcome = flow.bootstrap("cs_live_888").await.unwrap();
        assert_eq!(
            outcome,
            BootstrapOutcome::Ready {
                mode: FlowMode::Standard,
                state: FlowState::CollectingContact,
            }
        );

        // Step 2: Request a code for a valid Ghana number
        flow.request_code(ContactMethod::Phone("0244123456".to_string()))
            .await
            .unwrap();
        assert_eq!(flow.state(), FlowState::AwaitingCode);
        assert_eq!(api.issued_count(), 1);
        assert!(notifier
            .messages()
            .contains(&"OTP sent successfully!".to_string()));

        // Step 3: A wrong code consumes one attempt and clears the digits
        flow.input_digits(0, "000000").unwrap();
        let err = flow.submit_code().await.unwrap_err();
        assert_eq!(
            err,
            FlowError::VerificationFailed {
                message: "Invalid OTP".to_string(),
                remaining_tries: 2,
                failed_attempts: 1,
            }
        );
        let snapshot = flow.snapshot();
        assert_eq!(snapshot.remaining_tries, Some(2));
        assert_eq!(snapshot.filled_slots, 0);
        assert!(notifier
            .messages()
            .contains(&"Invalid OTP (2 tries left)".to_string()));

        // Step 4: The correct code completes the checkout
        flow.input_digits(0, "482913").unwrap();
        flow.submit_code().await.unwrap();
        assert_eq!(flow.state(), FlowState::Completed);
        assert_eq!(flow.snapshot().verified_name.as_deref(), Some("Akosua"));
        assert!(notifier
            .messages()
            .contains(&"Welcome Akosua! Redirecting...".to_string()));

        // Step 5: Navigation fires after the success delay
        assert!(navigator.visits().is_empty());
        advance_ms(&clock, 1500).await;
        assert_eq!(
            navigator.visits(),
            vec!["https://kente.example/receipt".to_string()]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_direct_checkout_verifies_preset_contact() {
        let mut session = live_session("cs_live_889");
        session.phone_number = Some("0244123456".to_string());
        let api = Arc::new(
            FakeVerificationService::new(session, "482913").with_receiver_name("Akosua Boateng"),
        );
        let notifier = Arc::new(RecordingNotifier::new());
        let navigator = Arc::new(RecordingNavigator::new());
        let clock = MockClock::new(start_instant());

        let flow = CheckoutFlow::new(
            Arc::clone(&api),
            Arc::clone(&notifier),
            Arc::clone(&navigator),
            Arc::new(clock.clone()),
            CheckoutFlowConfig::default(),
        );

        // The preset contact skips straight to code entry
        let outcome = flow.bootstrap("cs_live_889").await.unwrap();
        assert_eq!(
            outcome,
            BootstrapOutcome::Ready {
                mode: FlowMode::Direct,
                state: FlowState::AwaitingCode,
            }
        );
        assert_eq!(api.issued_count(), 1);
        assert!(notifier
            .messages()
            .contains(&"OTP sent to 0244123456".to_string()));

        // The merchant fixed the contact; the payer cannot change it
        let err = flow.change_contact().unwrap_err();
        assert_eq!(err, FlowError::ContactLocked);

        flow.input_digits(0, "482913").unwrap();
        flow.submit_code().await.unwrap();
        assert_eq!(flow.state(), FlowState::Completed);

        // No redirect was configured, so the flow stays on the success view
        advance_ms(&clock, 5000).await;
        assert!(navigator.visits().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_lockout_after_three_wrong_codes() {
        let api = Arc::new(FakeVerificationService::new(
            live_session("cs_live_890"),
            "482913",
        ));
        let notifier = Arc::new(RecordingNotifier::new());
        let navigator = Arc::new(RecordingNavigator::new());
        let clock = MockClock::new(start_instant());

        let flow = CheckoutFlow::new(
            Arc::clone(&api),
            Arc::clone(&notifier),
            Arc::clone(&navigator),
            Arc::new(clock.clone()),
            CheckoutFlowConfig::default(),
        );

        flow.bootstrap("cs_live_890").await.unwrap();
        flow.request_code(ContactMethod::Phone("0244123456".to_string()))
            .await
            .unwrap();

        // Two wrong codes leave attempts on the budget
        for expected_remaining in [2u32, 1] {
            flow.input_digits(0, "111111").unwrap();
            let err = flow.submit_code().await.unwrap_err();
            assert_eq!(
                err,
                FlowError::VerificationFailed {
                    message: "Invalid OTP".to_string(),
                    remaining_tries: expected_remaining,
                    failed_attempts: MAX_TRIES - expected_remaining,
                }
            );
        }

        // The third wrong code locks the session
        flow.input_digits(0, "111111").unwrap();
        let err = flow.submit_code().await.unwrap_err();
        assert_eq!(
            err,
            FlowError::Locked {
                message: "Too many failed attempts. Session locked.".to_string(),
                redirect_url: None,
            }
        );
        assert_eq!(flow.state(), FlowState::Locked);
        assert_eq!(flow.snapshot().remaining_tries, Some(0));

        // The locked flow refuses further submits without calling out
        let err = flow.submit_code().await.unwrap_err();
        assert!(matches!(err, FlowError::Locked { .. }));
        let err = flow.set_digit(0, '4').unwrap_err();
        assert!(matches!(err, FlowError::InvalidState { .. }));
    }
}
