//! # Register Session Controller
//!
//! Async driver around the pure [`RegisterDialog`]: it performs the fetches
//! and open/close calls the dialog asks for and feeds the results back.
//!
//! ## Call Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  open(pre)                                                              │
//! │   ├── GET registers ───────── fails ──► empty list + warning notice     │
//! │   │                  └─ reopened meanwhile ──► response dropped         │
//! │   └── selected register OPEN?                                           │
//! │        ├── GET expected-balances ── fails ──► warning notice            │
//! │        └── GET payment-summary ──── logged only                         │
//! │                                                                         │
//! │  submit()                                                               │
//! │   ├── validation fails ─────────────► Err(VALIDATION_ERROR), no I/O     │
//! │   ├── closing & SHORTED ────────────► ShortageConfirmationRequired      │
//! │   ├── opening ── POST sessions/open ──► Opened, dialog closed           │
//! │   └── closing ── POST sessions/{id}/close ──► Closed, await ack         │
//! │        (any POST failure ──► Err(notice), dialog back to READY)         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The dialog lock is never held across an `.await`; a response for a
//! register that is no longer selected is dropped by the dialog itself.

use kaha_core::denomination::Denomination;
use kaha_core::reconcile::ShortageNotice;
use kaha_core::register::{BalanceFetch, DialogOutcome, RegisterDialog, SubmitStep};
use kaha_core::{ClosingCase, Money, Operator, SessionRecord};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

use crate::api::Backend;
use crate::config::ClientConfig;
use crate::error::{NoticeCode, UserNotice};

/// Result of a submit or a shortage confirmation.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Nothing was sent; the operator must confirm or cancel.
    ShortageConfirmationRequired(ShortageNotice),
    /// The session is open and the dialog has closed.
    Opened(SessionRecord),
    /// The session is closed; call `acknowledge_close()` once shown.
    Closed(SessionRecord),
}

/// Drives one register dialog against a backend.
pub struct RegisterSessionController<B> {
    backend: Arc<B>,
    branch_id: Option<i64>,
    dialog: Mutex<RegisterDialog>,
}

impl<B: Backend> RegisterSessionController<B> {
    pub fn new(backend: Arc<B>, operator: Operator, config: &ClientConfig) -> Self {
        RegisterSessionController {
            backend,
            branch_id: config.tenant.branch_id,
            dialog: Mutex::new(RegisterDialog::new(operator, config.override_policy())),
        }
    }

    fn dialog(&self) -> MutexGuard<'_, RegisterDialog> {
        self.dialog.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Read access to the dialog for rendering.
    pub fn with_dialog<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&RegisterDialog) -> R,
    {
        f(&self.dialog())
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Opens the dialog and loads registers.
    ///
    /// Returns a warning notice when a read-only fetch failed; the dialog is
    /// still usable (with an empty list if the registers did not load).
    pub async fn open(&self, preselected: Option<i64>) -> Result<Option<UserNotice>, UserNotice> {
        let load = self.dialog().open()?;
        info!(branch_id = ?self.branch_id, ?preselected, "Opening register dialog");

        let (registers, mut warning) = match self.backend.list_registers(self.branch_id).await {
            Ok(registers) => (registers, None),
            Err(e) => {
                warn!(error = %e, "Failed to load cash registers");
                (Vec::new(), Some(degraded("Could not load cash registers", e.into())))
            }
        };

        let fetch = {
            let mut dialog = self.dialog();
            if !dialog.is_current_load(&load) {
                debug!("Dropping registers fetched for an earlier opening");
                return Ok(None);
            }
            dialog.registers_loaded(&load, registers, preselected)?
        };

        if let Some(fetch) = fetch {
            warning = warning.or(self.load_expected(fetch).await);
        }
        Ok(warning)
    }

    /// Switches register; fetches expected balances when it has an open session.
    pub async fn select_register(&self, register_id: i64) -> Result<Option<UserNotice>, UserNotice> {
        let fetch = self.dialog().select_register(register_id)?;
        debug!(register_id, "Register selected");
        match fetch {
            Some(fetch) => Ok(self.load_expected(fetch).await),
            None => Ok(None),
        }
    }

    async fn load_expected(&self, fetch: BalanceFetch) -> Option<UserNotice> {
        let session_id = fetch.session_id;
        let (balances, summary) = tokio::join!(
            self.backend.expected_balances(session_id),
            self.backend.payment_summary(session_id)
        );

        match summary {
            Ok(summary) => debug!(session_id, %summary, "Payment summary"),
            Err(e) => debug!(session_id, error = %e, "Payment summary unavailable"),
        }

        match balances {
            Ok(balances) => {
                if !self.dialog().apply_expected_balances(&fetch, balances) {
                    debug!(
                        register_id = fetch.register_id,
                        session_id, "Discarding expected balances for a deselected register"
                    );
                }
                None
            }
            Err(e) => {
                warn!(session_id, error = %e, "Failed to load expected balances");
                Some(degraded("Could not load expected balances", e.into()))
            }
        }
    }

    /// Closes the dialog, discarding all input.
    pub fn close(&self) -> Result<(), UserNotice> {
        self.dialog().close()?;
        Ok(())
    }

    // =========================================================================
    // Input
    // =========================================================================

    pub fn update_denomination(&self, denomination: Denomination, count: i64) -> Result<(), UserNotice> {
        Ok(self.dialog().update_denomination(denomination, count)?)
    }

    pub fn increment_denomination(&self, denomination: Denomination) -> Result<(), UserNotice> {
        Ok(self.dialog().increment_denomination(denomination)?)
    }

    pub fn decrement_denomination(&self, denomination: Denomination) -> Result<(), UserNotice> {
        Ok(self.dialog().decrement_denomination(denomination)?)
    }

    pub fn update_online_amount(&self, method_id: i64, raw: impl Into<String>) -> Result<(), UserNotice> {
        Ok(self.dialog().update_online_amount(method_id, raw)?)
    }

    pub fn set_override_code(&self, code: impl Into<String>) -> Result<(), UserNotice> {
        Ok(self.dialog().set_override_code(code)?)
    }

    pub fn clear(&self) -> Result<(), UserNotice> {
        Ok(self.dialog().clear()?)
    }

    pub fn display_balance(&self) -> Money {
        self.dialog().display_balance()
    }

    pub fn closing_case(&self) -> Option<ClosingCase> {
        self.dialog().closing_case()
    }

    // =========================================================================
    // Submission
    // =========================================================================

    pub async fn submit(&self) -> Result<SubmitOutcome, UserNotice> {
        let step = self.dialog().submit()?;
        self.execute(step).await
    }

    /// Proceeds with a close despite the shortage.
    pub async fn confirm_shortage(&self) -> Result<SubmitOutcome, UserNotice> {
        let step = self.dialog().confirm_shortage()?;
        info!("Shortage confirmed by operator");
        self.execute(step).await
    }

    pub fn cancel_shortage(&self) -> Result<(), UserNotice> {
        self.dialog().cancel_shortage()?;
        debug!("Shortage confirmation cancelled");
        Ok(())
    }

    /// Dismisses the close acknowledgement and closes the dialog.
    pub fn acknowledge_close(&self) -> Result<SessionRecord, UserNotice> {
        Ok(self.dialog().acknowledge_close()?)
    }

    async fn execute(&self, step: SubmitStep) -> Result<SubmitOutcome, UserNotice> {
        let result = match step {
            SubmitStep::ConfirmShortage(notice) => {
                info!(
                    expected = %notice.expected_cash,
                    counted = %notice.counted_cash,
                    shortfall = %notice.shortfall,
                    "Closing count is short; awaiting confirmation"
                );
                return Ok(SubmitOutcome::ShortageConfirmationRequired(notice));
            }
            SubmitStep::Open(request) => {
                info!(
                    register_id = request.cash_register_id,
                    opening_balance = %request.opening_balance,
                    "Opening register session"
                );
                self.backend.open_session(&request).await
            }
            SubmitStep::Close {
                session_id,
                request,
            } => {
                info!(
                    session_id,
                    counted = %request.counted_closing_balance,
                    "Closing register session"
                );
                self.backend.close_session(session_id, &request).await
            }
        };

        match result {
            Ok(session) => {
                let outcome = self.dialog().submission_succeeded(session)?;
                Ok(match outcome {
                    DialogOutcome::Opened(session) => {
                        info!(session_id = session.id, "Register session opened");
                        SubmitOutcome::Opened(session)
                    }
                    DialogOutcome::Closed(session) => {
                        info!(session_id = session.id, case = ?session.case, "Register session closed");
                        SubmitOutcome::Closed(session)
                    }
                })
            }
            Err(e) => {
                let notice = UserNotice::from(e);
                self.dialog().submission_failed(notice.message.clone())?;
                Err(notice)
            }
        }
    }
}

/// A read-only fetch failed; the caller keeps going with what it has.
fn degraded(context: &str, cause: UserNotice) -> UserNotice {
    let code = match cause.code {
        NoticeCode::NetworkError => NoticeCode::NetworkError,
        _ => NoticeCode::ServerError,
    };
    UserNotice::new(code, format!("{context}: {}", cause.message))
}
