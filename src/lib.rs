// Copyright 2026 Goatherd Contributors
// SPDX-License-Identifier: Apache-2.0

//! Goatherd library — browser-driven fetch of goatbots.com price data.
//!
//! This library crate exposes the core modules for integration testing.

#![allow(dead_code, unused_imports)]

pub mod browser;
pub mod cli;
pub mod config;
pub mod downloads;
pub mod error;
pub mod fetch;
pub mod page;
