use serde::{Deserialize, Serialize};

use super::{Individual, Story};

/// Join row between a story and an individual, with both sides expanded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndividualStory {
    pub id: i64,
    pub individual: Individual,
    pub story: Story,
}
