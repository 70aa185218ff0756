//! Complaint desk core for a food delivery service.
//!
//! Accounts, orders, and complaints live in SQLite behind [`store::DeskStore`].
//! Submitted complaints are categorized by a [`classifier::Classifier`] and
//! read back through [`complaint_reports::ComplaintReports`], which is where
//! role gating happens.

pub mod account_service;
pub mod classifier;
pub mod complaint_reports;
pub mod complaint_service;
pub mod config;
pub mod error;
pub mod order_service;
pub mod store;
pub mod types;
