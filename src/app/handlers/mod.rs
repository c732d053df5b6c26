// SPDX-License-Identifier: GPL-3.0-only

//! Message handlers, split by concern
//!
//! Each submodule adds `handle_*` methods to
//! [`SessionController`](crate::app::SessionController).

mod camera;
mod capture;
mod permissions;
