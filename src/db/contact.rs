use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    pub name: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Contact {
    pub fn new(name: String, address: String, chain: Option<String>, note: Option<String>) -> Self {
        Self {
            name,
            address,
            chain: chain.filter(|c| !c.is_empty()),
            note: note.filter(|n| !n.is_empty()),
        }
    }
}
