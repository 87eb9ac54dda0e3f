//! Extensions document returned inside the model's free-text answer

use serde::{Deserialize, Serialize};

/// `{"extensions": [".php", ".bak"]}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtensionsResponse {
    pub extensions: Vec<String>,
}
