//! Shared fixtures for unit and router tests.

use std::str::FromStr;
use std::sync::Arc;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::db::*;
use crate::services::init;
use crate::AppState;

/// A fresh, migrated in-memory database. Each call gets its own database.
pub async fn pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .unwrap();

    init::run_migrations(&pool).await.unwrap();
    pool
}

pub fn state(pool: SqlitePool) -> Arc<AppState> {
    Arc::new(AppState { db: pool })
}

/// One owner, one story, two groups and two individuals; nothing linked.
pub struct Fixture {
    pub owner: User,
    pub story: Story,
    pub groups: Vec<Group>,
    pub individuals: Vec<Individual>,
}

impl Fixture {
    pub async fn seed(pool: &SqlitePool) -> Self {
        let owner = UserRepository::create(
            pool,
            CreateUser {
                name: "Ada".to_string(),
                uid: "firebase-ada".to_string(),
                bio: "Writes things down".to_string(),
            },
        )
        .await
        .unwrap();

        let story = StoryRepository::create(
            pool,
            CreateStory {
                name: "The Long Winter".to_string(),
                owner_id: owner.id,
                description: "Snowed in for a season".to_string(),
                story_type: "memoir".to_string(),
            },
        )
        .await
        .unwrap();

        let mut groups = Vec::new();
        for name in ["Family", "Book club"] {
            groups.push(
                GroupRepository::create(
                    pool,
                    CreateGroup {
                        name: name.to_string(),
                        owner_id: owner.id,
                        description: format!("{} members", name),
                        status: "active".to_string(),
                    },
                )
                .await
                .unwrap(),
            );
        }

        let mut individuals = Vec::new();
        for name in ["Grandma Rose", "Uncle Tom"] {
            individuals.push(
                IndividualRepository::create(
                    pool,
                    CreateIndividual {
                        name: name.to_string(),
                        owner_id: owner.id,
                        description: "relative".to_string(),
                        status: "living".to_string(),
                    },
                )
                .await
                .unwrap(),
            );
        }

        Fixture {
            owner,
            story,
            groups,
            individuals,
        }
    }
}
