//! Database models, one file per table.
//! Everything is re-exported so callers can `use crate::db::models::*;`.

pub mod group;
pub mod group_story;
pub mod individual;
pub mod individual_story;
pub mod story;
pub mod user;

pub use self::group::*;
pub use self::group_story::*;
pub use self::individual::*;
pub use self::individual_story::*;
pub use self::story::*;
pub use self::user::*;
