use serde::{Deserialize, Serialize};
use std::fmt;

/// Default maximum number of reservations a single flight may hold
pub const DEFAULT_CAPACITY_LIMIT: u32 = 3;

/// Transaction isolation requested when a booking transaction begins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IsolationLevel {
    ReadCommitted,
    RepeatableRead,
    #[default]
    Serializable,
}

impl IsolationLevel {
    pub fn as_sql(&self) -> &'static str {
        match self {
            IsolationLevel::ReadCommitted => "READ COMMITTED",
            IsolationLevel::RepeatableRead => "REPEATABLE READ",
            IsolationLevel::Serializable => "SERIALIZABLE",
        }
    }
}

impl fmt::Display for IsolationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingConfig {
    #[serde(default = "default_capacity_limit")]
    pub capacity_limit: u32,
    #[serde(default)]
    pub isolation: IsolationLevel,
}

fn default_capacity_limit() -> u32 { DEFAULT_CAPACITY_LIMIT }

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            capacity_limit: DEFAULT_CAPACITY_LIMIT,
            isolation: IsolationLevel::Serializable,
        }
    }
}

impl BookingConfig {
    pub fn with_capacity_limit(mut self, capacity_limit: u32) -> Self {
        self.capacity_limit = capacity_limit;
        self
    }
}
