// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

use crate::civil::TimeError;
use crate::config::ConfigError;
use crate::store::StoreError;

/// Any error surfaced by this crate.
///
/// Oracle failures are not errors: a search that hits one completes with
/// [`Outcome::Failed`](crate::search::Outcome::Failed).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Time(#[from] TimeError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, Error>;
