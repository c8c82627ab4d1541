use serde::{Deserialize, Serialize};
use validator::Validate;

/// Input for creating or updating a bug bounty / pentest program.
///
/// Optional fields follow the partial-update convention: `None` leaves the
/// stored value untouched, `Some("")` clears it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ProgramInput {
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    #[validate(length(max = 50))]
    pub platform: Option<String>,

    #[validate(length(max = 2048))]
    pub url: Option<String>,

    pub scope: Option<String>,

    pub description: Option<String>,
}
