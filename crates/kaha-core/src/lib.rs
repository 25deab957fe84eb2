//! # kaha-core: Pure Register & Cache Logic for Kaha ERP
//!
//! Everything the ERP front-end decides without talking to the backend:
//! counting a cash drawer, classifying a closing, gating register access,
//! and tracking which cached resource lists are still usable.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Kaha ERP Front-End                               │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    UI (screens, dialogs)                        │   │
//! │  │   Supplier picker ──► Tax list ──► Register open/close dialog  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    kaha-client (I/O layer)                      │   │
//! │  │   ResourceStore, RegisterSessionController, HttpBackend        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ kaha-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌────────────┐  ┌───────────┐  ┌───────────┐ │   │
//! │  │   │   money   │  │denomination│  │ reconcile │  │  register │ │   │
//! │  │   │   Money   │  │  Bill500…  │  │  variance │  │  dialog   │ │   │
//! │  │   └───────────┘  └────────────┘  └───────────┘  └───────────┘ │   │
//! │  │   ┌───────────┐  ┌────────────┐  ┌───────────┐  ┌───────────┐ │   │
//! │  │   │   cache   │  │   access   │  │  online   │  │ validation│ │   │
//! │  │   │ TTL slots │  │  override  │  │  entries  │  │   rules   │ │   │
//! │  │   └───────────┘  └────────────┘  └───────────┘  └───────────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO NETWORK • NO FILES • CLOCK IS INJECTED                    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Integer centavo amounts and the major-unit wire codec
//! - [`denomination`] - Peso bills/coins and drawer counts
//! - [`online`] - Per-payment-method electronic amounts
//! - [`reconcile`] - Variance and closing-case classification
//! - [`access`] - Override-code rule for opening registers
//! - [`register`] - The open/close dialog state machine
//! - [`cache`] - Scoped TTL caches and the [`cache::Clock`] seam
//! - [`types`] - Wire types for registers, sessions and resources
//! - [`validation`] - Pre-network submission checks
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use kaha_core::denomination::{Denomination, DenominationCount};
//! use kaha_core::reconcile::classify_closing_case;
//! use kaha_core::{ClosingCase, Money};
//!
//! let mut drawer = DenominationCount::new();
//! drawer.set(Denomination::Bill500, 2).unwrap();
//! drawer.set(Denomination::Bill100, 3).unwrap();
//! assert_eq!(drawer.total(), Money::from_major(1300));
//!
//! let case = classify_closing_case(
//!     ClosingCase::Sale,
//!     drawer.total(),
//!     Money::zero(),
//!     Money::from_major(1400),
//! );
//! assert_eq!(case, ClosingCase::Shorted);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod access;
pub mod cache;
pub mod denomination;
pub mod error;
pub mod money;
pub mod online;
pub mod reconcile;
pub mod register;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError, ValidationResult};
pub use money::Money;
pub use register::{
    BalanceFetch, DialogOutcome, DialogPhase, RegisterDialog, RegisterLoad, SubmitStep,
};
pub use types::*;
