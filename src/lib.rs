// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod cli;
pub mod config;
pub mod logging;
pub mod models;
pub mod utils;
pub mod store;
pub mod extractor;
pub mod report;
pub mod commands;
