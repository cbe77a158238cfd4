pub mod ledger_operations;
pub mod visit_tracking;
