//! The fixed set of backend capabilities.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A named backend role. Each capability is served by one backend library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Dialer,
    Messages,
    Contacts,
    Calls,
    Phonelog,
    Notification,
    IdleScreen,
    Settings,
}

impl Capability {
    /// Every capability, in load order.
    pub const ALL: [Capability; 8] = [
        Capability::Dialer,
        Capability::Messages,
        Capability::Contacts,
        Capability::Calls,
        Capability::Phonelog,
        Capability::Notification,
        Capability::IdleScreen,
        Capability::Settings,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Dialer => "dialer",
            Capability::Messages => "messages",
            Capability::Contacts => "contacts",
            Capability::Calls => "calls",
            Capability::Phonelog => "phonelog",
            Capability::Notification => "notification",
            Capability::IdleScreen => "idle_screen",
            Capability::Settings => "settings",
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Capability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Capability::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown capability '{s}'"))
    }
}
