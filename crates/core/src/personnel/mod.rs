//! Personnel, salary, advance and payable records.
//!
//! These correlate to ledger transactions; they never hold money.

pub mod reconciliation;
pub mod types;

pub use reconciliation::{AdvanceReport, AdvanceReportEntry, ReconciliationStatus, reconcile_advances};
pub use types::{
    AdvanceRecord, CreatePayableInput, CreatePersonnelInput, PayAdvanceInput, PayPayableInput,
    PaySalaryInput, Payable, PayableStatus, PayableView, Personnel, RecordAdvanceInput, SalaryRecord,
    validate_period,
};
