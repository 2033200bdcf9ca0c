// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Search configuration.
//!
//! Everything a run needs to know about its surroundings is captured in one
//! [`SearchConfig`] before the run starts; the engine never consults ambient
//! settings while stepping. A config comes from a TOML file:
//!
//! ```toml
//! utc-offset-minutes = 60
//! ephemeris-path = "/usr/share/ephe"
//!
//! [location]
//! longitude = 2.17
//! latitude = 41.39
//! elevation = 12.0
//! ```
//!
//! or from the location record kept in the result store.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::oracle::ObserverLocation;
use crate::store::LocationRecord;

/// Errors loading or validating a [`SearchConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid location: {0}")]
    InvalidLocation(String),
}

/// Explicit inputs for one search or snapshot run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SearchConfig {
    pub location: ObserverLocation,
    /// Offset of the display zone east of UTC.
    #[serde(default)]
    pub utc_offset_minutes: f64,
    /// Data directory handed to oracles backed by ephemeris files.
    #[serde(default)]
    pub ephemeris_path: Option<PathBuf>,
}

impl SearchConfig {
    pub fn new(location: ObserverLocation, utc_offset_minutes: f64) -> Self {
        Self {
            location,
            utc_offset_minutes,
            ephemeris_path: None,
        }
    }

    pub fn with_ephemeris_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.ephemeris_path = Some(path.into());
        self
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Build from the stored location record.
    pub fn from_record(record: &LocationRecord) -> Result<Self, ConfigError> {
        if record.is_unset() {
            return Err(ConfigError::InvalidLocation(
                "no location has been set".into(),
            ));
        }
        let config = Self::new(
            ObserverLocation::new(record.longitude, record.latitude, record.elevation)
                .with_atmosphere(record.pressure, record.temperature),
            record.utc_offset_minutes,
        );
        config.validate()?;
        Ok(config)
    }

    /// The record to store for this config.
    pub fn to_record(&self, name: Option<String>) -> LocationRecord {
        LocationRecord {
            latitude: self.location.latitude,
            longitude: self.location.longitude,
            elevation: self.location.elevation,
            pressure: self.location.pressure,
            temperature: self.location.temperature,
            utc_offset_minutes: self.utc_offset_minutes,
            name,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let loc = &self.location;
        let fields = [
            ("longitude", loc.longitude),
            ("latitude", loc.latitude),
            ("elevation", loc.elevation),
            ("pressure", loc.pressure),
            ("temperature", loc.temperature),
            ("utc-offset-minutes", self.utc_offset_minutes),
        ];
        if let Some((name, value)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ConfigError::InvalidLocation(format!("{name} is {value}")));
        }
        if !(-90.0..=90.0).contains(&loc.latitude) {
            return Err(ConfigError::InvalidLocation(format!(
                "latitude {} outside [-90, 90]",
                loc.latitude
            )));
        }
        if !(-180.0..=180.0).contains(&loc.longitude) {
            return Err(ConfigError::InvalidLocation(format!(
                "longitude {} outside [-180, 180]",
                loc.longitude
            )));
        }
        Ok(())
    }
}
