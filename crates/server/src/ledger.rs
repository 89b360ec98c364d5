// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Credit ledger used when no external billing system is attached.

use studio_booking::{CreditLedger, LedgerError};
use tracing::info;

/// Accepts every ledger call and records it in the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingCreditLedger;

impl CreditLedger for TracingCreditLedger {
    fn debit_credit(&self, user_id: i64, class_id: i64) -> Result<(), LedgerError> {
        info!(user_id, class_id, "Ledger debit");
        Ok(())
    }

    fn refund_credit(&self, user_id: i64, class_id: i64) -> Result<(), LedgerError> {
        info!(user_id, class_id, "Ledger refund");
        Ok(())
    }
}
