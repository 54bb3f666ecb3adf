// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - typed access to portal resources.

pub mod resources;

pub use resources::Resource;
