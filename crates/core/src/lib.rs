// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod apply;
mod collaborators;
mod command;
mod error;
mod state;

#[cfg(test)]
mod tests;

// Re-export public types and functions
pub use apply::apply;
pub use collaborators::{
    Clock, CreditLedger, DispatchError, FixedClock, LedgerError, Notification,
    NotificationDispatcher, NotificationKind, NotificationPayload, SystemClock,
};
pub use command::{Command, Requester};
pub use error::CoreError;
pub use state::{
    ClassState, EngineContext, LedgerCall, Mutation, Outcome, Promotion, PromotionReport,
    SkippedEntry, TransitionResult,
};
