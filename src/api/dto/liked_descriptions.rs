/*
 * Responsibility
 * - Liked description request/response DTOs
 * - validate(): every field present and non-blank
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::repos::liked_description_repo::NewLikedDescription;

pub const MISSING_FIELDS: &str = "Bad Request: Missing required fields";

/// Body of `POST /like-description`. Fields are optional here so a missing one is a
/// 400 with our own message rather than a deserialization error.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveLikedDescriptionRequest {
    pub description_type: Option<String>,
    pub description_text: Option<String>,
    pub description_origin: Option<String>,
    pub subjects: Option<String>,
    pub target_audience: Option<String>,
}

fn required(field: Option<String>) -> Result<String, &'static str> {
    field
        .filter(|v| !v.trim().is_empty())
        .ok_or(MISSING_FIELDS)
}

impl SaveLikedDescriptionRequest {
    pub fn into_new(self, user_id: Uuid) -> Result<NewLikedDescription, &'static str> {
        Ok(NewLikedDescription {
            user_id,
            description_type: required(self.description_type)?,
            description_text: required(self.description_text)?,
            description_origin: required(self.description_origin)?,
            subjects: required(self.subjects)?,
            target_audience: required(self.target_audience)?,
        })
    }
}

/// `id` is the public (sqids) id, never the database sequence value.
#[derive(Debug, Serialize)]
pub struct LikedDescriptionResponse {
    pub id: String,
    pub user_id: Uuid,
    pub description_type: String,
    pub description_text: String,
    pub description_origin: String,
    pub subjects: String,
    pub target_audience: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct SavedLikedDescriptionResponse {
    pub message: &'static str,
    pub data: LikedDescriptionResponse,
}

#[derive(Debug, Serialize)]
pub struct LikedDescriptionListResponse {
    pub data: Vec<LikedDescriptionResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full() -> SaveLikedDescriptionRequest {
        SaveLikedDescriptionRequest {
            description_type: Some("simple".into()),
            description_text: Some("A dancer leaps".into()),
            description_origin: Some("vision output".into()),
            subjects: Some("Odette".into()),
            target_audience: Some("children".into()),
        }
    }

    #[test]
    fn complete_request_becomes_a_record() {
        let user_id = Uuid::new_v4();
        let record = full().into_new(user_id).unwrap();
        assert_eq!(record.user_id, user_id);
        assert_eq!(record.description_type, "simple");
        assert_eq!(record.target_audience, "children");
    }

    #[test]
    fn missing_or_blank_fields_are_rejected() {
        let missing = SaveLikedDescriptionRequest {
            subjects: None,
            ..full()
        };
        assert_eq!(missing.into_new(Uuid::new_v4()).unwrap_err(), MISSING_FIELDS);

        let blank = SaveLikedDescriptionRequest {
            description_text: Some("   ".into()),
            ..full()
        };
        assert_eq!(blank.into_new(Uuid::new_v4()).unwrap_err(), MISSING_FIELDS);
    }
}
