// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! ArtemisCloud custom resources driven by the tests.

pub mod address;
pub mod broker;
pub mod security;

pub use address::{ActiveMQArtemisAddress, ActiveMQArtemisAddressSpec};
pub use broker::{
    Acceptor, ActiveMQArtemis, ActiveMQArtemisSpec, ActiveMQArtemisStatus, Console,
    DeploymentPlan, Upgrades,
};
pub use security::{ActiveMQArtemisSecurity, ActiveMQArtemisSecuritySpec};
