// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Live-cluster system tests, run with `cargo test --test system -- --ignored`

mod system_tests;
