use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::cheeses::repo::CheeseListing;
use crate::cheeses::text::{created_at_ago, nl2br, short_description};
use crate::error::Violation;
use crate::users::repo::User;

pub const TITLE_MIN_CHARS: usize = 2;
pub const TITLE_MAX_CHARS: usize = 50;

/// Writable fields of a listing (`cheese_listing:write`). The description
/// arrives as raw text and is normalized before storage; anything else in
/// the payload is ignored.
#[derive(Debug, Default, Deserialize)]
pub struct CheeseWrite {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub owner: Option<Uuid>,
}

/// A fully validated creation payload, description already normalized.
#[derive(Debug)]
pub struct NewCheese {
    pub title: String,
    pub description: String,
    pub price: i64,
    pub owner: Uuid,
}

fn title_violation(title: &str) -> Option<Violation> {
    let chars = title.chars().count();
    if chars < TITLE_MIN_CHARS {
        Some(Violation::new(
            "title",
            "title must be at least 2 characters",
        ))
    } else if chars > TITLE_MAX_CHARS {
        Some(Violation::new(
            "title",
            "describe your cheese in 50 characters or less",
        ))
    } else {
        None
    }
}

pub fn owner_violation() -> Violation {
    Violation::new("owner", "owner must reference an existing user")
}

/// Check every constraint on a creation payload at once and, if all hold,
/// produce the typed record to insert. `owner_exists` is resolved against
/// the store by the caller; it is only consulted when an owner was supplied.
pub fn build_new_cheese(
    write: CheeseWrite,
    owner_exists: bool,
) -> Result<NewCheese, Vec<Violation>> {
    let mut violations = Vec::new();

    let title = match write.title {
        None => {
            violations.push(Violation::new("title", "title is required"));
            None
        }
        Some(title) => match title_violation(&title) {
            Some(v) => {
                violations.push(v);
                None
            }
            None => Some(title),
        },
    };

    let description = match write.description {
        None => {
            violations.push(Violation::new("description", "description is required"));
            None
        }
        Some(raw) => Some(nl2br(&raw)),
    };

    let price = match write.price {
        None => {
            violations.push(Violation::new("price", "price is required"));
            None
        }
        Some(price) => Some(price),
    };

    let owner = match write.owner {
        None => {
            violations.push(Violation::new("owner", "owner is required"));
            None
        }
        Some(_) if !owner_exists => {
            violations.push(owner_violation());
            None
        }
        Some(id) => Some(id),
    };

    match (title, description, price, owner) {
        (Some(title), Some(description), Some(price), Some(owner))
            if violations.is_empty() =>
        {
            Ok(NewCheese {
                title,
                description,
                price,
                owner,
            })
        }
        _ => Err(violations),
    }
}

/// Constraint checks for an update applied to the merged state, where every
/// field already holds a value.
pub fn update_violations(title: &str) -> Vec<Violation> {
    title_violation(title).into_iter().collect()
}

/// Collection view (`cheese_listing:read`).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheeseCollectionItem {
    pub id: Uuid,
    pub title: String,
    pub short_description: String,
    pub price: i64,
    pub created_at_ago: String,
}

impl CheeseCollectionItem {
    pub fn from_row(row: &CheeseListing, now: OffsetDateTime) -> Self {
        Self {
            id: row.id,
            title: row.title.clone(),
            short_description: short_description(&row.description),
            price: row.price,
            created_at_ago: created_at_ago(row.created_at, now),
        }
    }
}

/// Embedded owner on item reads.
#[derive(Debug, Serialize)]
pub struct OwnerView {
    pub id: Uuid,
    pub email: String,
}

/// Item view (`cheese_listing:item:get`): the collection fields plus the
/// full description and the owner. `isPublished` appears only in
/// admin-visible contexts.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheeseItem {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub short_description: String,
    pub price: i64,
    pub created_at_ago: String,
    pub owner: OwnerView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_published: Option<bool>,
}

impl CheeseItem {
    pub fn from_row(row: &CheeseListing, owner: &User, now: OffsetDateTime, admin: bool) -> Self {
        Self {
            id: row.id,
            title: row.title.clone(),
            description: row.description.clone(),
            short_description: short_description(&row.description),
            price: row.price,
            created_at_ago: created_at_ago(row.created_at, now),
            owner: OwnerView {
                id: owner.id,
                email: owner.email.clone(),
            },
            is_published: admin.then_some(row.is_published),
        }
    }
}

/// Apply the `properties[]` field selection to a serialized view, keeping
/// only the requested keys. An empty selection keeps everything.
pub fn select_properties(value: serde_json::Value, properties: &[String]) -> serde_json::Value {
    if properties.is_empty() {
        return value;
    }
    match value {
        serde_json::Value::Object(map) => serde_json::Value::Object(
            map.into_iter()
                .filter(|(key, _)| properties.iter().any(|p| p == key))
                .collect(),
        ),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(title: Option<&str>) -> CheeseWrite {
        CheeseWrite {
            title: title.map(str::to_owned),
            description: Some("a creamy blue".into()),
            price: Some(1000),
            owner: Some(Uuid::new_v4()),
        }
    }

    #[test]
    fn title_boundaries() {
        assert!(build_new_cheese(write(Some("ab")), true).is_ok());
        assert!(build_new_cheese(write(Some(&"x".repeat(50))), true).is_ok());

        let too_short = build_new_cheese(write(Some("a")), true).unwrap_err();
        assert_eq!(too_short.len(), 1);
        assert!(too_short[0].message.contains("at least 2"));

        let too_long = build_new_cheese(write(Some(&"x".repeat(51))), true).unwrap_err();
        assert_eq!(too_long.len(), 1);
        assert!(too_long[0].message.contains("50 characters or less"));
    }

    #[test]
    fn every_missing_field_is_reported_at_once() {
        let violations = build_new_cheese(CheeseWrite::default(), true).unwrap_err();
        let fields: Vec<&str> = violations.iter().map(|v| v.field).collect();
        assert_eq!(fields, vec!["title", "description", "price", "owner"]);
    }

    #[test]
    fn unknown_owner_is_a_violation() {
        let violations = build_new_cheese(write(Some("Comté")), false).unwrap_err();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "owner");
    }

    #[test]
    fn description_is_normalized_on_the_way_in() {
        let payload = CheeseWrite {
            description: Some("line one\nline two".into()),
            ..write(Some("Raclette"))
        };
        let new = build_new_cheese(payload, true).unwrap();
        assert_eq!(new.description, "line one<br />\nline two");
    }

    #[test]
    fn views_serialize_with_camel_case_names() {
        let row = CheeseListing {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            title: "Stilton".into(),
            description: "d".repeat(45),
            price: 2500,
            is_published: false,
            created_at: OffsetDateTime::UNIX_EPOCH,
        };
        let now = OffsetDateTime::UNIX_EPOCH + time::Duration::hours(2);
        let json = serde_json::to_value(CheeseCollectionItem::from_row(&row, now)).unwrap();
        assert!(json.get("shortDescription").is_some());
        assert_eq!(json["createdAtAgo"], "2 hours ago");
        assert!(json.get("description").is_none());
        assert!(json.get("isPublished").is_none());
    }

    #[test]
    fn item_view_shows_is_published_only_to_admins() {
        let owner = User {
            id: Uuid::new_v4(),
            email: "owner@example.com".into(),
            password_hash: "hash".into(),
            roles: vec!["ROLE_USER".into()],
            created_at: OffsetDateTime::UNIX_EPOCH,
        };
        let row = CheeseListing {
            id: Uuid::new_v4(),
            owner_id: owner.id,
            title: "Brie".into(),
            description: "soft".into(),
            price: 900,
            is_published: true,
            created_at: OffsetDateTime::UNIX_EPOCH,
        };
        let now = OffsetDateTime::UNIX_EPOCH;

        let public = serde_json::to_value(CheeseItem::from_row(&row, &owner, now, false)).unwrap();
        assert!(public.get("isPublished").is_none());
        assert_eq!(public["owner"]["email"], "owner@example.com");

        let admin = serde_json::to_value(CheeseItem::from_row(&row, &owner, now, true)).unwrap();
        assert_eq!(admin["isPublished"], true);
    }

    #[test]
    fn property_selection_keeps_only_requested_fields() {
        let value = serde_json::json!({"id": 1, "title": "Gouda", "price": 5});
        let selected = select_properties(value, &["title".into(), "price".into()]);
        assert_eq!(selected, serde_json::json!({"title": "Gouda", "price": 5}));

        let value = serde_json::json!({"id": 1, "title": "Gouda"});
        let untouched = select_properties(value.clone(), &[]);
        assert_eq!(untouched, value);
    }
}
