// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod analytics;
pub mod categories;
pub mod dashboard;
pub mod fx;
pub mod ledgers;
pub mod seed;
pub mod transactions;
pub mod users;
