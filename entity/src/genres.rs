use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Ordered genre tags, stored as a JSON array so names may contain commas
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct Genres(pub Vec<String>);

impl From<Vec<String>> for Genres {
    fn from(value: Vec<String>) -> Self {
        Self(value)
    }
}
