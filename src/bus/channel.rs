//! Channel catalogue and subscription selectors.
//!
//! The set of channels is closed: every queue the bus owns corresponds to one
//! variant of [`Channel`], and nothing can publish to or subscribe to a name
//! outside of it.

use std::fmt;
use std::str::FromStr;

use super::error::BusError;

/// Query value that subscribes a stream session to every channel.
pub const ALL_CHANNELS: &str = "all";

/// Named logical category of events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Channel {
    #[default]
    NewIncident,
    IncidentUpdate,
    ResourceAllocation,
    StatusChange,
}

impl Channel {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Channel::NewIncident => "new-incident",
            Channel::IncidentUpdate => "incident-update",
            Channel::ResourceAllocation => "resource-allocation",
            Channel::StatusChange => "status-change",
        }
    }

    /// Every channel, in the order `all` sessions sweep them.
    pub const fn all() -> &'static [Channel] {
        &[
            Channel::NewIncident,
            Channel::IncidentUpdate,
            Channel::ResourceAllocation,
            Channel::StatusChange,
        ]
    }

    /// Position of this channel's queue inside the bus.
    pub(crate) const fn index(&self) -> usize {
        match self {
            Channel::NewIncident => 0,
            Channel::IncidentUpdate => 1,
            Channel::ResourceAllocation => 2,
            Channel::StatusChange => 3,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = BusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Channel::all()
            .iter()
            .copied()
            .find(|channel| channel.as_str() == s)
            .ok_or_else(|| BusError::UnknownChannel(s.to_string()))
    }
}

impl serde::Serialize for Channel {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> serde::Deserialize<'de> for Channel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Channel::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// What a stream session asked to watch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelSelector {
    #[default]
    All,
    One(Channel),
}

impl ChannelSelector {
    pub fn parse(raw: &str) -> Result<Self, BusError> {
        if raw == ALL_CHANNELS {
            return Ok(ChannelSelector::All);
        }
        Channel::from_str(raw).map(ChannelSelector::One)
    }

    /// Resolve the selector to the concrete list of queues to sweep.
    pub fn channels(&self) -> Vec<Channel> {
        match self {
            ChannelSelector::All => Channel::all().to_vec(),
            ChannelSelector::One(channel) => vec![*channel],
        }
    }
}

impl fmt::Display for ChannelSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelSelector::All => f.write_str(ALL_CHANNELS),
            ChannelSelector::One(channel) => channel.fmt(f),
        }
    }
}
