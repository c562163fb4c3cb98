//! Client record and the request-body allow-list.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row of the clients table.
#[derive(Clone, Debug, PartialEq, Serialize, sqlx::FromRow)]
pub struct Client {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Writable fields accepted from request bodies. Any other key is rejected at decode time.
/// `null` and absent both mean "not supplied".
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientFields {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

impl ClientFields {
    /// Supplied fields as (column, value) pairs.
    pub fn supplied(&self) -> Vec<(&'static str, &str)> {
        [
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("email", &self.email),
            ("phone", &self.phone),
            ("company", &self.company),
            ("address", &self.address),
            ("city", &self.city),
            ("postal_code", &self.postal_code),
            ("country", &self.country),
        ]
        .into_iter()
        .filter_map(|(name, v)| v.as_deref().map(|v| (name, v)))
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.supplied().is_empty()
    }
}

/// Fields for an insert, with the required columns present.
#[derive(Clone, Debug, PartialEq)]
pub struct NewClient {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rejects_unknown_fields() {
        let err = serde_json::from_value::<ClientFields>(json!({
            "first_name": "A",
            "id": 7
        }))
        .unwrap_err();
        assert!(err.to_string().contains("unknown field `id`"));
    }

    #[test]
    fn rejects_timestamps() {
        let res = serde_json::from_value::<ClientFields>(json!({ "created_at": "2020-01-01T00:00:00Z" }));
        assert!(res.is_err());
    }

    #[test]
    fn null_is_not_supplied() {
        let fields: ClientFields = serde_json::from_value(json!({
            "city": null,
            "country": "NL"
        }))
        .unwrap();
        assert_eq!(fields.supplied(), vec![("country", "NL")]);
    }

    #[test]
    fn empty_body() {
        let fields: ClientFields = serde_json::from_value(json!({})).unwrap();
        assert!(fields.is_empty());
    }

    #[test]
    fn client_serializes_snake_case() {
        let now = Utc::now();
        let client = Client {
            id: 1,
            first_name: "A".into(),
            last_name: "B".into(),
            email: "a@b.com".into(),
            phone: None,
            company: None,
            address: None,
            city: None,
            postal_code: Some("1234".into()),
            country: None,
            created_at: now,
            updated_at: now,
        };
        let v = serde_json::to_value(&client).unwrap();
        assert_eq!(v["postal_code"], "1234");
        assert_eq!(v["email"], "a@b.com");
        assert!(v["phone"].is_null());
        assert!(v["created_at"].is_string());
    }
}
