//! # Register Dialog
//!
//! The open/close cash register dialog as a pure state machine. It holds the
//! operator's counts, derives totals and the closing case, and decides which
//! request (if any) should go to the backend. It never performs I/O: the
//! caller executes the returned [`SubmitStep`] and reports the result back.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   IDLE ──open()──► LOADING ──registers_loaded()──► READY ◄──────────┐   │
//! │    ▲                                                 │  ▲          │   │
//! │    │                                          submit()  │cancel    │   │
//! │    │                          ┌──────────────────────┤  │          │   │
//! │    │                 case == SHORTED                 │  │          │   │
//! │    │                          ▼                      │  │          │   │
//! │    │                  SHORTAGE_CONFIRM ──────────────┼──┘          │   │
//! │    │                          │ confirm_shortage()   │             │   │
//! │    │                          ▼                      ▼             │   │
//! │    │                        SUBMITTING ◄─────────────┘             │   │
//! │    │                       │         │                             │   │
//! │    │       open succeeded  │         │ close succeeded    failed ──┘   │
//! │    ├───────────────────────┘         ▼                                 │
//! │    └──acknowledge_close()────── SUCCESS                                │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Counts survive register switches; they are only reset when the dialog
//! opens, closes, or `clear()` is called.

use serde::{Deserialize, Serialize};

use crate::access::{requires_override, validate_override_code, OverridePolicy, SessionAction};
use crate::denomination::{Denomination, DenominationCount};
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::online::OnlinePaymentEntries;
use crate::reconcile::{classify_against, ShortageNotice};
use crate::types::{
    CashRegister, CloseSessionRequest, ClosingCase, ExpectedBalances, OpenSessionRequest,
    Operator, RegisterStatus, SessionRecord,
};
use crate::validation::{validate_cash_counted, validate_register_selected};

// =============================================================================
// Phases & Steps
// =============================================================================

/// Where the dialog is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum DialogPhase {
    Idle,
    Loading,
    Ready,
    ShortageConfirm { notice: ShortageNotice },
    Submitting { action: SessionAction },
    Success { session: SessionRecord },
}

impl DialogPhase {
    pub fn name(&self) -> &'static str {
        match self {
            DialogPhase::Idle => "closed",
            DialogPhase::Loading => "loading",
            DialogPhase::Ready => "ready",
            DialogPhase::ShortageConfirm { .. } => "awaiting shortage confirmation",
            DialogPhase::Submitting { .. } => "submitting",
            DialogPhase::Success { .. } => "showing the close acknowledgement",
        }
    }
}

/// Marks one `open()` of the dialog.
///
/// Hand it back to [`RegisterDialog::registers_loaded`]; a register list
/// fetched for an earlier opening is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterLoad {
    ticket: u64,
}

/// A request for the selected register's expected balances.
///
/// Hand it back to [`RegisterDialog::apply_expected_balances`] with the
/// response; it is ignored if the selection moved on in the meantime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceFetch {
    pub register_id: i64,
    pub session_id: i64,
    ticket: u64,
}

/// What `submit()` wants the caller to do next.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitStep {
    /// Send `POST sessions/open`.
    Open(OpenSessionRequest),
    /// Send `POST sessions/{session_id}/close`.
    Close {
        session_id: i64,
        request: CloseSessionRequest,
    },
    /// Ask the operator to confirm a short drawer. No request yet.
    ConfirmShortage(ShortageNotice),
}

/// Result of a successful submission.
#[derive(Debug, Clone, PartialEq)]
pub enum DialogOutcome {
    /// Session opened; the dialog is already closed.
    Opened(SessionRecord),
    /// Session closed; the dialog waits for `acknowledge_close()`.
    Closed(SessionRecord),
}

// =============================================================================
// RegisterDialog
// =============================================================================

/// State owned by one open/close dialog instance.
#[derive(Debug, Clone)]
pub struct RegisterDialog {
    operator: Operator,
    policy: OverridePolicy,
    phase: DialogPhase,
    registers: Vec<CashRegister>,
    selected: Option<i64>,
    expected: Option<ExpectedBalances>,
    load_ticket: u64,
    balance_ticket: u64,
    counts: DenominationCount,
    online: OnlinePaymentEntries,
    override_code: String,
    last_error: Option<String>,
}

impl RegisterDialog {
    pub fn new(operator: Operator, policy: OverridePolicy) -> Self {
        RegisterDialog {
            operator,
            policy,
            phase: DialogPhase::Idle,
            registers: Vec::new(),
            selected: None,
            expected: None,
            load_ticket: 0,
            balance_ticket: 0,
            counts: DenominationCount::new(),
            online: OnlinePaymentEntries::new(),
            override_code: String::new(),
            last_error: None,
        }
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// IDLE → LOADING. Starts from a blank slate.
    pub fn open(&mut self) -> CoreResult<RegisterLoad> {
        self.require_phase(&DialogPhase::Idle, "open the register dialog")?;
        self.discard_inputs();
        self.load_ticket = self.load_ticket.wrapping_add(1);
        self.phase = DialogPhase::Loading;
        Ok(RegisterLoad {
            ticket: self.load_ticket,
        })
    }

    /// True while `load` belongs to the current opening and is unanswered.
    pub fn is_current_load(&self, load: &RegisterLoad) -> bool {
        self.phase == DialogPhase::Loading && load.ticket == self.load_ticket
    }

    /// LOADING → READY with the fetched register list.
    ///
    /// Selects `preselected` when it is in the list, otherwise the first
    /// register with an open session. Returns the balance fetch to run when
    /// the selection is open. An empty list (failed fetch) still lands in READY.
    /// A list for an earlier opening leaves the dialog untouched.
    pub fn registers_loaded(
        &mut self,
        load: &RegisterLoad,
        registers: Vec<CashRegister>,
        preselected: Option<i64>,
    ) -> CoreResult<Option<BalanceFetch>> {
        self.require_phase(&DialogPhase::Loading, "load registers")?;
        if load.ticket != self.load_ticket {
            return Ok(None);
        }
        self.registers = registers;
        self.phase = DialogPhase::Ready;

        let selection = preselected
            .filter(|id| self.registers.iter().any(|r| r.id == *id))
            .or_else(|| {
                self.registers
                    .iter()
                    .find(|r| r.status() == RegisterStatus::Open)
                    .map(|r| r.id)
            });

        Ok(selection.and_then(|id| self.select_unchecked(id)))
    }

    /// Switches the active register. Counts are kept.
    pub fn select_register(&mut self, register_id: i64) -> CoreResult<Option<BalanceFetch>> {
        self.ensure_editable("select a register")?;
        if !self.registers.iter().any(|r| r.id == register_id) {
            return Err(CoreError::RegisterNotFound(register_id));
        }
        Ok(self.select_unchecked(register_id))
    }

    fn select_unchecked(&mut self, register_id: i64) -> Option<BalanceFetch> {
        self.selected = Some(register_id);
        self.expected = None;
        self.balance_ticket = self.balance_ticket.wrapping_add(1);

        let session_id = self.selected_register()?.open_session_id()?;
        Some(BalanceFetch {
            register_id,
            session_id,
            ticket: self.balance_ticket,
        })
    }

    /// Stores expected balances if `fetch` is still the current one.
    ///
    /// Online amounts are prefilled from the per-method expectations.
    /// Returns false when the response was stale and dropped.
    pub fn apply_expected_balances(
        &mut self,
        fetch: &BalanceFetch,
        balances: ExpectedBalances,
    ) -> bool {
        if fetch.ticket != self.balance_ticket || self.selected != Some(fetch.register_id) {
            return false;
        }
        if !balances.expected_balances_by_method.is_empty() {
            self.online.prefill(&balances.expected_balances_by_method);
        }
        self.expected = Some(balances);
        true
    }

    /// Closes the dialog from any phase except SUBMITTING, discarding input.
    pub fn close(&mut self) -> CoreResult<()> {
        if matches!(self.phase, DialogPhase::Submitting { .. }) {
            return Err(self.invalid("close the register dialog"));
        }
        self.discard_inputs();
        self.registers.clear();
        self.phase = DialogPhase::Idle;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Input
    // -------------------------------------------------------------------------

    /// Direct entry; negative counts clamp to zero.
    pub fn update_denomination(&mut self, denomination: Denomination, count: i64) -> CoreResult<()> {
        self.ensure_editable("change a count")?;
        self.counts.set(denomination, count)?;
        Ok(())
    }

    pub fn increment_denomination(&mut self, denomination: Denomination) -> CoreResult<()> {
        self.ensure_editable("change a count")?;
        self.counts.increment(denomination);
        Ok(())
    }

    pub fn decrement_denomination(&mut self, denomination: Denomination) -> CoreResult<()> {
        self.ensure_editable("change a count")?;
        self.counts.decrement(denomination);
        Ok(())
    }

    /// Raw text for a payment method; negative amounts are rejected.
    pub fn update_online_amount(&mut self, method_id: i64, raw: impl Into<String>) -> CoreResult<()> {
        self.ensure_editable("change an online amount")?;
        self.online.set(method_id, raw)?;
        Ok(())
    }

    pub fn set_override_code(&mut self, code: impl Into<String>) -> CoreResult<()> {
        self.ensure_editable("enter an override code")?;
        self.override_code = code.into();
        Ok(())
    }

    /// Zeroes every denomination. Online amounts are emptied only in the
    /// opening flow; a closing drawer keeps them.
    pub fn clear(&mut self) -> CoreResult<()> {
        self.ensure_editable("clear the counts")?;
        self.counts.reset();
        if self.status() != Some(RegisterStatus::Open) {
            self.online.clear();
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Derived values
    // -------------------------------------------------------------------------

    pub fn cash_total(&self) -> Money {
        self.counts.total()
    }

    pub fn online_total(&self) -> Money {
        self.online.total()
    }

    /// Cash plus online. Always recomputed.
    pub fn display_balance(&self) -> Money {
        self.cash_total() + self.online_total()
    }

    /// The refined case for a closing drawer.
    ///
    /// `None` in the opening flow or before expected balances arrived.
    pub fn closing_case(&self) -> Option<ClosingCase> {
        if self.status() != Some(RegisterStatus::Open) {
            return None;
        }
        self.expected
            .as_ref()
            .map(|e| classify_against(e, self.cash_total(), self.online_total()))
    }

    /// Whether submitting right now would demand an override code.
    pub fn requires_override(&self) -> bool {
        let action = match self.status() {
            Some(RegisterStatus::Open) => SessionAction::Close,
            _ => SessionAction::Open,
        };
        self.selected_register()
            .is_some_and(|r| requires_override(&self.operator, r, action, &self.policy))
    }

    // -------------------------------------------------------------------------
    // Submission
    // -------------------------------------------------------------------------

    /// Validates the input and decides the next step.
    ///
    /// ## Order of checks
    /// 1. a register is selected
    /// 2. bills/coins counted > 0 (online amounts do not count here)
    /// 3. opening a register that needs it: override code of sufficient length
    /// 4. opening ─► `SubmitStep::Open`
    /// 5. closing short with expectations known ─► `SubmitStep::ConfirmShortage`
    ///    otherwise ─► `SubmitStep::Close`
    pub fn submit(&mut self) -> CoreResult<SubmitStep> {
        self.ensure_editable("submit")?;
        self.last_error = None;

        let register_id = validate_register_selected(self.selected)?;
        let register = self
            .selected_register()
            .ok_or(CoreError::RegisterNotFound(register_id))?;
        let cash_total = self.cash_total();
        validate_cash_counted(cash_total)?;

        match register.open_session_id() {
            None => {
                let override_code = if self.requires_override() {
                    Some(validate_override_code(&self.override_code, &self.policy)?)
                } else {
                    self.entered_code()
                };
                let request = OpenSessionRequest {
                    cash_register_id: register_id,
                    opening_balance: self.display_balance(),
                    opening_cash_balance: cash_total,
                    opening_bills: self.counts.nonzero(),
                    opening_online_payments: self.online.nonzero(),
                    override_code,
                };
                self.phase = DialogPhase::Submitting {
                    action: SessionAction::Open,
                };
                Ok(SubmitStep::Open(request))
            }
            Some(session_id) => {
                if let (Some(ClosingCase::Shorted), Some(expected)) =
                    (self.closing_case(), self.expected.as_ref())
                {
                    let notice = ShortageNotice::new(expected.expected_cash_balance, cash_total);
                    self.phase = DialogPhase::ShortageConfirm { notice };
                    return Ok(SubmitStep::ConfirmShortage(notice));
                }
                Ok(self.begin_close(session_id))
            }
        }
    }

    /// SHORTAGE_CONFIRM → SUBMITTING: proceed despite the shortage.
    pub fn confirm_shortage(&mut self) -> CoreResult<SubmitStep> {
        if !matches!(self.phase, DialogPhase::ShortageConfirm { .. }) {
            return Err(self.invalid("confirm a shortage"));
        }
        let session_id = self
            .selected_register()
            .and_then(CashRegister::open_session_id)
            .ok_or(CoreError::RegisterNotFound(self.selected.unwrap_or_default()))?;
        Ok(self.begin_close(session_id))
    }

    /// SHORTAGE_CONFIRM → READY with counts intact.
    pub fn cancel_shortage(&mut self) -> CoreResult<()> {
        if !matches!(self.phase, DialogPhase::ShortageConfirm { .. }) {
            return Err(self.invalid("cancel a shortage confirmation"));
        }
        self.phase = DialogPhase::Ready;
        Ok(())
    }

    fn begin_close(&mut self, session_id: i64) -> SubmitStep {
        let request = CloseSessionRequest {
            counted_closing_balance: self.cash_total(),
            code: self.entered_code(),
            closing_bills: self.counts.nonzero(),
            closing_online_payments: self.online.nonzero(),
        };
        self.phase = DialogPhase::Submitting {
            action: SessionAction::Close,
        };
        SubmitStep::Close {
            session_id,
            request,
        }
    }

    /// Records a successful open/close response.
    pub fn submission_succeeded(&mut self, session: SessionRecord) -> CoreResult<DialogOutcome> {
        let DialogPhase::Submitting { action } = self.phase else {
            return Err(self.invalid("finish a submission"));
        };
        match action {
            SessionAction::Open => {
                self.discard_inputs();
                self.registers.clear();
                self.phase = DialogPhase::Idle;
                Ok(DialogOutcome::Opened(session))
            }
            SessionAction::Close => {
                self.phase = DialogPhase::Success {
                    session: session.clone(),
                };
                Ok(DialogOutcome::Closed(session))
            }
        }
    }

    /// Records a failed open/close; back to READY with input intact.
    pub fn submission_failed(&mut self, message: impl Into<String>) -> CoreResult<()> {
        if !matches!(self.phase, DialogPhase::Submitting { .. }) {
            return Err(self.invalid("fail a submission"));
        }
        self.last_error = Some(message.into());
        self.phase = DialogPhase::Ready;
        Ok(())
    }

    /// SUCCESS → IDLE once the operator dismisses the close notice.
    pub fn acknowledge_close(&mut self) -> CoreResult<SessionRecord> {
        let DialogPhase::Success { session } = &self.phase else {
            return Err(self.invalid("acknowledge a closed session"));
        };
        let session = session.clone();
        self.discard_inputs();
        self.registers.clear();
        self.phase = DialogPhase::Idle;
        Ok(session)
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn phase(&self) -> &DialogPhase {
        &self.phase
    }

    /// Inputs are disabled while this is true.
    pub fn is_submitting(&self) -> bool {
        matches!(self.phase, DialogPhase::Submitting { .. })
    }

    pub fn registers(&self) -> &[CashRegister] {
        &self.registers
    }

    pub fn selected_register(&self) -> Option<&CashRegister> {
        let id = self.selected?;
        self.registers.iter().find(|r| r.id == id)
    }

    /// Status of the selected register.
    pub fn status(&self) -> Option<RegisterStatus> {
        self.selected_register().map(CashRegister::status)
    }

    pub fn expected_balances(&self) -> Option<&ExpectedBalances> {
        self.expected.as_ref()
    }

    pub fn counts(&self) -> &DenominationCount {
        &self.counts
    }

    pub fn online_entries(&self) -> &OnlinePaymentEntries {
        &self.online
    }

    pub fn operator(&self) -> &Operator {
        &self.operator
    }

    /// Message of the last failed submission, cleared on the next submit.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    // -------------------------------------------------------------------------
    // Helpers
    // -------------------------------------------------------------------------

    fn entered_code(&self) -> Option<String> {
        let code = self.override_code.trim();
        (!code.is_empty()).then(|| code.to_string())
    }

    fn discard_inputs(&mut self) {
        self.selected = None;
        self.expected = None;
        self.balance_ticket = self.balance_ticket.wrapping_add(1);
        self.counts.reset();
        self.online.clear();
        self.override_code.clear();
        self.last_error = None;
    }

    fn ensure_editable(&self, operation: &'static str) -> CoreResult<()> {
        self.require_phase(&DialogPhase::Ready, operation)
    }

    fn require_phase(&self, expected: &DialogPhase, operation: &'static str) -> CoreResult<()> {
        if std::mem::discriminant(&self.phase) == std::mem::discriminant(expected) {
            Ok(())
        } else {
            Err(self.invalid(operation))
        }
    }

    fn invalid(&self, operation: &'static str) -> CoreError {
        CoreError::InvalidDialogState {
            operation,
            state: self.phase.name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::types::{ExpectedMethodBalance, OpenSession, RoleTier};
    use serde_json::json;

    const CASHIER: i64 = 7;

    fn operator(role: RoleTier) -> Operator {
        Operator {
            id: CASHIER,
            name: "Ana".to_string(),
            role,
        }
    }

    fn closed_register(id: i64, assigned: Option<i64>) -> CashRegister {
        CashRegister {
            id,
            name: format!("Register {id}"),
            branch_id: Some(1),
            assigned_user_id: assigned,
            open_session: None,
        }
    }

    fn open_register(id: i64, session_id: i64) -> CashRegister {
        CashRegister {
            open_session: Some(OpenSession {
                id: session_id,
                status: RegisterStatus::Open,
                user_id: Some(CASHIER),
                opening_online_payments: Vec::new(),
            }),
            ..closed_register(id, Some(CASHIER))
        }
    }

    fn expected(total_cents: i64) -> ExpectedBalances {
        ExpectedBalances {
            expected_cash_balance: Money::from_cents(total_cents),
            expected_online_balance: Money::zero(),
            expected_total_balance: Some(Money::from_cents(total_cents)),
            case: ClosingCase::Sale,
            expected_balances_by_method: Vec::new(),
        }
    }

    fn record(id: i64) -> SessionRecord {
        SessionRecord {
            id,
            cash_register_id: Some(1),
            status: RegisterStatus::Open,
            case: None,
            variance: None,
        }
    }

    fn ready_dialog(registers: Vec<CashRegister>, pre: Option<i64>) -> (RegisterDialog, Option<BalanceFetch>) {
        let mut dialog = RegisterDialog::new(operator(RoleTier::Cashier), OverridePolicy::default());
        let load = dialog.open().unwrap();
        let fetch = dialog.registers_loaded(&load, registers, pre).unwrap();
        (dialog, fetch)
    }

    #[test]
    fn test_opening_request_shape() {
        let (mut dialog, fetch) = ready_dialog(vec![closed_register(1, Some(CASHIER))], Some(1));
        assert!(fetch.is_none());

        dialog.update_denomination(Denomination::Bill500, 2).unwrap();
        dialog.update_denomination(Denomination::Bill100, 3).unwrap();
        assert_eq!(dialog.cash_total().cents(), 130_000);

        let SubmitStep::Open(request) = dialog.submit().unwrap() else {
            panic!("expected an open request");
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "cash_register_id": 1,
                "opening_balance": 1300.0,
                "opening_cash_balance": 1300.0,
                "opening_bills": {"bill_500": 2, "bill_100": 3}
            })
        );
        assert!(dialog.is_submitting());

        let outcome = dialog.submission_succeeded(record(10)).unwrap();
        assert!(matches!(outcome, DialogOutcome::Opened(_)));
        assert_eq!(dialog.phase(), &DialogPhase::Idle);
        assert_eq!(dialog.cash_total(), Money::zero());
    }

    #[test]
    fn test_online_only_fails_cash_check() {
        let (mut dialog, _) = ready_dialog(vec![closed_register(1, None)], Some(1));
        dialog.update_online_amount(3, "50").unwrap();
        assert_eq!(dialog.display_balance().cents(), 5_000);

        let err = dialog.submit().unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::MustBePositive { .. })
        ));
        assert_eq!(dialog.phase(), &DialogPhase::Ready);
    }

    #[test]
    fn test_register_required() {
        let (mut dialog, _) = ready_dialog(vec![closed_register(1, None)], None);
        dialog.update_denomination(Denomination::Bill20, 1).unwrap();
        let err = dialog.submit().unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::Required { .. })
        ));
    }

    #[test]
    fn test_override_code_needed_for_foreign_register() {
        let mut dialog = RegisterDialog::new(operator(RoleTier::Manager), OverridePolicy::default());
        let load = dialog.open().unwrap();
        dialog
            .registers_loaded(&load, vec![closed_register(1, Some(99))], Some(1))
            .unwrap();
        dialog.update_denomination(Denomination::Bill100, 1).unwrap();
        assert!(dialog.requires_override());

        assert!(matches!(
            dialog.submit().unwrap_err(),
            CoreError::Validation(ValidationError::Required { .. })
        ));
        dialog.set_override_code("12").unwrap();
        assert!(matches!(
            dialog.submit().unwrap_err(),
            CoreError::Validation(ValidationError::TooShort { .. })
        ));

        dialog.set_override_code("4321").unwrap();
        let SubmitStep::Open(request) = dialog.submit().unwrap() else {
            panic!("expected an open request");
        };
        assert_eq!(request.override_code.as_deref(), Some("4321"));
    }

    #[test]
    fn test_preselect_open_register_requests_balances() {
        let (dialog, fetch) = ready_dialog(vec![closed_register(1, None), open_register(2, 20)], None);
        let fetch = fetch.expect("open register should be auto-selected");
        assert_eq!(fetch.register_id, 2);
        assert_eq!(fetch.session_id, 20);
        assert_eq!(dialog.status(), Some(RegisterStatus::Open));
    }

    #[test]
    fn test_closing_without_shortage() {
        let (mut dialog, fetch) = ready_dialog(vec![open_register(1, 11)], Some(1));
        assert!(dialog.apply_expected_balances(&fetch.unwrap(), expected(130_000)));

        dialog.update_denomination(Denomination::Bill1000, 1).unwrap();
        dialog.update_denomination(Denomination::Bill100, 3).unwrap();
        assert_eq!(dialog.closing_case(), Some(ClosingCase::Sale));

        let step = dialog.submit().unwrap();
        let SubmitStep::Close { session_id, request } = step else {
            panic!("expected a close request");
        };
        assert_eq!(session_id, 11);
        assert_eq!(request.counted_closing_balance.cents(), 130_000);

        let outcome = dialog.submission_succeeded(record(11)).unwrap();
        assert!(matches!(outcome, DialogOutcome::Closed(_)));
        assert!(matches!(dialog.phase(), DialogPhase::Success { .. }));
        assert_eq!(dialog.acknowledge_close().unwrap().id, 11);
        assert_eq!(dialog.phase(), &DialogPhase::Idle);
    }

    #[test]
    fn test_shortage_confirm_then_cancel() {
        let (mut dialog, fetch) = ready_dialog(vec![open_register(1, 11)], Some(1));
        dialog.apply_expected_balances(&fetch.unwrap(), expected(130_000));
        dialog.update_denomination(Denomination::Bill1000, 1).unwrap();
        dialog.update_denomination(Denomination::Bill100, 2).unwrap();
        assert_eq!(dialog.closing_case(), Some(ClosingCase::Shorted));

        let SubmitStep::ConfirmShortage(notice) = dialog.submit().unwrap() else {
            panic!("expected a shortage prompt");
        };
        assert_eq!(notice.shortfall.cents(), 10_000);
        assert_eq!(notice.counted_cash.cents(), 120_000);

        assert!(dialog.update_denomination(Denomination::Coin1, 1).is_err());
        dialog.cancel_shortage().unwrap();
        assert_eq!(dialog.phase(), &DialogPhase::Ready);
        assert_eq!(dialog.cash_total().cents(), 120_000);
    }

    #[test]
    fn test_shortage_confirm_then_proceed() {
        let (mut dialog, fetch) = ready_dialog(vec![open_register(1, 11)], Some(1));
        dialog.apply_expected_balances(&fetch.unwrap(), expected(130_000));
        dialog.update_denomination(Denomination::Bill500, 1).unwrap();

        assert!(matches!(dialog.submit().unwrap(), SubmitStep::ConfirmShortage(_)));
        let step = dialog.confirm_shortage().unwrap();
        assert!(matches!(step, SubmitStep::Close { session_id: 11, .. }));
        assert!(dialog.is_submitting());

        dialog.submission_failed("Session already closed").unwrap();
        assert_eq!(dialog.phase(), &DialogPhase::Ready);
        assert_eq!(dialog.last_error(), Some("Session already closed"));
        assert_eq!(dialog.cash_total().cents(), 50_000);
    }

    #[test]
    fn test_closing_without_expected_data_skips_confirmation() {
        let (mut dialog, _) = ready_dialog(vec![open_register(1, 11)], Some(1));
        dialog.update_denomination(Denomination::Coin1, 1).unwrap();
        assert_eq!(dialog.closing_case(), None);
        assert!(matches!(dialog.submit().unwrap(), SubmitStep::Close { .. }));
    }

    #[test]
    fn test_stale_balances_are_dropped() {
        let (mut dialog, fetch) =
            ready_dialog(vec![open_register(1, 11), open_register(2, 22)], Some(1));
        let first = fetch.unwrap();
        let second = dialog.select_register(2).unwrap().unwrap();

        assert!(!dialog.apply_expected_balances(&first, expected(1)));
        assert!(dialog.expected_balances().is_none());
        assert!(dialog.apply_expected_balances(&second, expected(2)));
    }

    #[test]
    fn test_counts_survive_register_switch() {
        let (mut dialog, _) =
            ready_dialog(vec![closed_register(1, None), closed_register(2, None)], Some(1));
        dialog.update_denomination(Denomination::Bill50, 4).unwrap();
        dialog.select_register(2).unwrap();
        assert_eq!(dialog.counts().get(Denomination::Bill50), 4);
        assert!(matches!(
            dialog.select_register(5),
            Err(CoreError::RegisterNotFound(5))
        ));
    }

    #[test]
    fn test_expected_balances_prefill_online() {
        let (mut dialog, fetch) = ready_dialog(vec![open_register(1, 11)], Some(1));
        let mut balances = expected(50_000);
        balances.expected_balances_by_method = vec![ExpectedMethodBalance {
            payment_method_id: 4,
            payment_method_name: Some("GCash".to_string()),
            opening_balance: Money::zero(),
            sales_amount: Money::from_cents(20_000),
            expected_balance: Money::from_cents(20_000),
        }];
        dialog.apply_expected_balances(&fetch.unwrap(), balances);
        assert_eq!(dialog.online_entries().raw(4), Some("200.00"));
        assert_eq!(dialog.online_total().cents(), 20_000);
    }

    #[test]
    fn test_clear_asymmetry() {
        let (mut opening, _) = ready_dialog(vec![closed_register(1, None)], Some(1));
        opening.update_denomination(Denomination::Bill100, 1).unwrap();
        opening.update_online_amount(2, "10").unwrap();
        opening.clear().unwrap();
        assert_eq!(opening.cash_total(), Money::zero());
        assert!(opening.online_entries().is_empty());

        let (mut closing, _) = ready_dialog(vec![open_register(1, 11)], Some(1));
        closing.update_denomination(Denomination::Bill100, 1).unwrap();
        closing.update_online_amount(2, "10").unwrap();
        closing.clear().unwrap();
        assert_eq!(closing.cash_total(), Money::zero());
        assert_eq!(closing.online_total().cents(), 1_000);
    }

    #[test]
    fn test_register_list_from_earlier_opening_is_ignored() {
        let mut dialog = RegisterDialog::new(operator(RoleTier::Cashier), OverridePolicy::default());
        let first = dialog.open().unwrap();
        dialog.close().unwrap();
        let second = dialog.open().unwrap();
        assert!(!dialog.is_current_load(&first));
        assert!(dialog.is_current_load(&second));

        let fetch = dialog
            .registers_loaded(&first, vec![open_register(1, 40)], None)
            .unwrap();
        assert!(fetch.is_none());
        assert_eq!(dialog.phase(), &DialogPhase::Loading);
        assert!(dialog.registers().is_empty());

        let fetch = dialog
            .registers_loaded(&second, vec![closed_register(2, None)], Some(2))
            .unwrap();
        assert!(fetch.is_none());
        assert_eq!(dialog.phase(), &DialogPhase::Ready);
        assert_eq!(dialog.selected_register().map(|r| r.id), Some(2));
        assert!(!dialog.is_current_load(&second));
    }

    #[test]
    fn test_phase_guards() {
        let mut dialog = RegisterDialog::new(operator(RoleTier::Cashier), OverridePolicy::default());
        assert!(dialog.submit().is_err());
        assert!(dialog.confirm_shortage().is_err());
        assert!(dialog.acknowledge_close().is_err());
        dialog.open().unwrap();
        assert!(dialog.open().is_err());
        assert!(dialog.update_denomination(Denomination::Bill20, 1).is_err());
        dialog.close().unwrap();
        assert_eq!(dialog.phase(), &DialogPhase::Idle);
    }
}
