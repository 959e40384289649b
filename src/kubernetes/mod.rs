// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes client creation and resource lifecycle operations.

pub mod client;
pub mod resource;

pub use client::create_client;
pub use resource::{parse_import_id, Applied, ResourceHandler};
