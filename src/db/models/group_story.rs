use serde::{Deserialize, Serialize};

use super::{Group, Story};

/// Join row between a story and a group, with both sides expanded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupStory {
    pub id: i64,
    pub group: Group,
    pub story: Story,
}
