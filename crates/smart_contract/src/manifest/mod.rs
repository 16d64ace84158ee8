//! Contract manifest module for Neo smart contracts.
//!
//! This module provides types for contract manifests, which describe
//! the features, permissions, and interface of smart contracts.

pub mod contract_abi;
pub mod contract_group;
pub mod contract_manifest;
pub mod contract_permission;
pub mod wildcard_container;

pub use contract_abi::{ContractAbi, ContractEvent, ContractMethod, ContractParameter};
pub use contract_group::ContractGroup;
pub use contract_manifest::ContractManifest;
pub use contract_permission::{ContractPermission, ContractPermissionDescriptor};
pub use wildcard_container::WildcardContainer;
