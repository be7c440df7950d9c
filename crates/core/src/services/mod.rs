pub mod advisor_service;
pub mod analytics_service;
pub mod announcement_service;
pub mod calculator;
pub mod ledger_service;
pub mod payout_schedule;
pub mod projection_service;
pub mod removal_guard;
