use serde::{de, Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Todo status. Stored as INTEGER; the ordinals are part of the schema.
/// Serialized by name, deserialized from either the name or the ordinal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[repr(i32)]
pub enum TodoStatus {
    #[default]
    Pending = 0,
    InProgress = 1,
    Done = 2,
}

const STATUS_NAMES: &[&str] = &["pending", "in_progress", "done"];

impl TodoStatus {
    pub fn from_ordinal(n: i64) -> Option<Self> {
        match n {
            0 => Some(Self::Pending),
            1 => Some(Self::InProgress),
            2 => Some(Self::Done),
            _ => None,
        }
    }

    fn from_name(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "in_progress" => Some(Self::InProgress),
            "done" => Some(Self::Done),
            _ => s.parse().ok().and_then(Self::from_ordinal),
        }
    }
}

impl<'de> Deserialize<'de> for TodoStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Query strings deliver ordinals as text, so names may also be digits.
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Ordinal(i64),
            Name(String),
        }

        match Wire::deserialize(deserializer)? {
            Wire::Ordinal(n) => Self::from_ordinal(n).ok_or_else(|| {
                de::Error::invalid_value(de::Unexpected::Signed(n), &"a status ordinal 0, 1 or 2")
            }),
            Wire::Name(s) => {
                Self::from_name(&s).ok_or_else(|| de::Error::unknown_variant(&s, STATUS_NAMES))
            }
        }
    }
}

/// Todo record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct TodoItem {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: TodoStatus,
    pub due_date: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewTodo {
    pub owner_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
}

/// Partial update; `None` leaves the stored value alone.
#[derive(Debug, Clone, Default)]
pub struct TodoChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TodoStatus>,
    pub due_date: Option<OffsetDateTime>,
}

/// One page of an owner's todos plus the size of the whole filtered set.
#[derive(Debug, Clone)]
pub struct TodoSlice {
    pub items: Vec<TodoItem>,
    pub total: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub pending: i64,
    pub in_progress: i64,
    pub done: i64,
}

impl StatusCounts {
    pub fn from_groups(groups: impl IntoIterator<Item = (TodoStatus, i64)>) -> Self {
        let mut counts = Self::default();
        for (status, n) in groups {
            match status {
                TodoStatus::Pending => counts.pending += n,
                TodoStatus::InProgress => counts.in_progress += n,
                TodoStatus::Done => counts.done += n,
            }
        }
        counts
    }

    pub fn total(&self) -> i64 {
        self.pending + self.in_progress + self.done
    }
}
