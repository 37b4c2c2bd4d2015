//! Subcommand implementations.

pub mod config;
pub mod query;
pub mod schedule;

use divert_core::{
    DivertError, DivertResult, Instant, StoredInstant, Zone, parse_civil_datetime, to_instant,
};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::output::Renderer;

/// Everything a command needs besides its own arguments.
#[derive(Debug, Clone)]
pub struct Context {
    pub config: ClientConfig,
    pub zone: Zone,
    pub json: bool,
}

impl Context {
    /// Resolves the zone (`zone_override` wins over the config).
    pub fn new(
        config: ClientConfig,
        zone_override: Option<&str>,
        json: bool,
    ) -> ClientResult<Self> {
        let zone = match zone_override {
            Some(id) => Zone::parse(id)?,
            None => config.zone().map_err(ClientError::Config)?,
        };
        Ok(Self { config, zone, json })
    }

    /// Returns a renderer using the configured display settings.
    pub fn renderer(&self) -> Renderer {
        Renderer::new(self.zone, &self.config.display, self.json)
    }
}

/// Parses an instant given as epoch milliseconds, RFC 3339 text, or
/// `YYYY-MM-DD HH:MM` civil time in `zone`.
pub fn parse_instant(text: &str, zone: &Zone) -> DivertResult<Instant> {
    let text = text.trim();
    if let Ok(ms) = text.parse::<i64>() {
        return StoredInstant::Millis(ms).to_instant();
    }
    if let Ok(instant) = StoredInstant::Text(text.to_string()).to_instant() {
        return Ok(instant);
    }
    match parse_civil_datetime(text) {
        Ok((date, time)) => Ok(to_instant(date, time, zone)),
        Err(DivertError::InvalidCivilField { field: "datetime", .. }) => {
            Err(DivertError::InvalidTimestamp(text.to_string()))
        }
        Err(err) => Err(err),
    }
}
