use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::ToSchema;

/// A catalog record. `deleted_at` never crosses the wire; soft-deleted rows
/// are filtered out at the query level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Book {
    /// Assigned by the database on insert, never reused.
    pub id: i64,
    pub title: String,
    pub author: String,
    pub rating: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Create/update payload. Fields missing from the body fall back to their
/// zero value, and an update overwrites all three fields unconditionally;
/// there are no partial-patch semantics.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct BookInput {
    pub title: String,
    pub author: String,
    pub rating: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_input_fields_default_to_zero_values() {
        let input: BookInput = serde_json::from_str(r#"{"title":"Dune"}"#).unwrap();
        assert_eq!(input.title, "Dune");
        assert_eq!(input.author, "");
        assert_eq!(input.rating, 0);
    }

    #[test]
    fn book_serializes_rfc3339_timestamps() {
        let now = OffsetDateTime::UNIX_EPOCH;
        let book = Book {
            id: 1,
            title: "Dune".to_string(),
            author: "Herbert".to_string(),
            rating: 5,
            created_at: now,
            updated_at: now,
        };

        let value = serde_json::to_value(&book).unwrap();
        assert_eq!(value["id"], 1);
        assert_eq!(value["created_at"], "1970-01-01T00:00:00Z");
        assert!(value.get("deleted_at").is_none());
    }
}
