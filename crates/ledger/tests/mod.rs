//! Ledger C# Compatibility Test Suite
//!
//! This module contains comprehensive tests that ensure full compatibility
//! with the C# Neo.Ledger implementation.

mod blockchain_tests;
mod integration_tests;
mod mempool_comprehensive_tests;
mod mempool_tests;
