pub mod group;
pub mod group_story;
pub mod individual;
pub mod individual_story;
pub mod links;
pub mod story;
pub mod user;

pub use group::GroupRepository;
pub use group_story::GroupStoryRepository;
pub use individual::IndividualRepository;
pub use individual_story::IndividualStoryRepository;
pub use links::{JoinTable, LinkRepository, LinkSide, GROUP_STORIES, INDIVIDUAL_STORIES};
pub use story::StoryRepository;
pub use user::UserRepository;
