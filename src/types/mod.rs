// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Chaos CRD catalog and typed resources.

pub mod kinds;
pub mod pod_chaos;

pub use kinds::ChaosKind;
pub use pod_chaos::PodChaos;
