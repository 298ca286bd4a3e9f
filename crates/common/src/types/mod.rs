use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug)]
pub struct Health {
    pub status: &'static str,
}

/// Body returned by bulk admin actions.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Affected {
    pub updated: u64,
}
