//! Request payload and movement records

use crate::error::{CoreError, CoreResult};
use finreport_utils::decimal_or_zero;
use rust_decimal::Decimal;
use serde::{de, Deserialize, Deserializer};
use serde_json::Value;

/// Movement type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MovementKind {
    /// Money coming in ("ingreso")
    Income,
    /// Money spent ("gasto")
    Expense,
    /// Money set aside ("ahorro")
    Saving,
    /// Any other label; listed but never totaled
    Other(String),
}

impl MovementKind {
    /// Wire label of this kind
    pub fn as_str(&self) -> &str {
        match self {
            MovementKind::Income => "ingreso",
            MovementKind::Expense => "gasto",
            MovementKind::Saving => "ahorro",
            MovementKind::Other(label) => label,
        }
    }

    /// Expenses and savings reduce the balance and are listed as negatives
    pub fn is_deduction(&self) -> bool {
        matches!(self, MovementKind::Expense | MovementKind::Saving)
    }
}

impl From<&str> for MovementKind {
    fn from(label: &str) -> Self {
        match label {
            "ingreso" | "income" => MovementKind::Income,
            "gasto" | "expense" => MovementKind::Expense,
            "ahorro" | "saving" => MovementKind::Saving,
            other => MovementKind::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for MovementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Optional movement keys present in the request, even when sent as `null`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SentKeys {
    pub kind: bool,
    pub created_at: bool,
    pub description_user: bool,
    pub category: bool,
}

/// One financial movement as sent by the dashboard
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "WireMovement")]
pub struct Movement {
    pub kind: Option<MovementKind>,
    /// Unsigned amount; non-numeric values are coerced to zero
    pub amount: Decimal,
    pub created_at: Option<String>,
    pub description_user: Option<String>,
    pub category: Option<String>,
    pub sent: SentKeys,
}

impl Movement {
    pub fn new(kind: MovementKind, amount: Decimal) -> Self {
        Self {
            kind: Some(kind),
            amount,
            sent: SentKeys {
                kind: true,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn with_created_at(mut self, created_at: &str) -> Self {
        self.created_at = Some(created_at.to_string());
        self.sent.created_at = true;
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description_user = Some(description.to_string());
        self.sent.description_user = true;
        self
    }

    pub fn with_category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self.sent.category = true;
        self
    }

    /// Amount as listed in reports: negated for expenses and savings
    pub fn display_amount(&self) -> Decimal {
        match &self.kind {
            Some(kind) if kind.is_deduction() => negate(self.amount),
            _ => self.amount,
        }
    }
}

/// Negate without producing a signed zero
pub fn negate(amount: Decimal) -> Decimal {
    if amount.is_zero() {
        Decimal::ZERO
    } else {
        -amount
    }
}

/// Movement as it appears on the wire. The outer `Option` of each text
/// field records whether the key was present at all.
#[derive(Deserialize)]
struct WireMovement {
    #[serde(rename = "type", default, deserialize_with = "sent_text")]
    kind: Option<Option<String>>,
    #[serde(default, deserialize_with = "coerced_amount")]
    amount: Decimal,
    #[serde(default, deserialize_with = "sent_text")]
    created_at: Option<Option<String>>,
    #[serde(default, deserialize_with = "sent_text")]
    description_user: Option<Option<String>>,
    #[serde(default, deserialize_with = "sent_text")]
    category: Option<Option<String>>,
}

impl From<WireMovement> for Movement {
    fn from(wire: WireMovement) -> Self {
        Self {
            sent: SentKeys {
                kind: wire.kind.is_some(),
                created_at: wire.created_at.is_some(),
                description_user: wire.description_user.is_some(),
                category: wire.category.is_some(),
            },
            kind: wire
                .kind
                .flatten()
                .map(|label| MovementKind::from(label.as_str())),
            amount: wire.amount,
            created_at: wire.created_at.flatten(),
            description_user: wire.description_user.flatten(),
            category: wire.category.flatten(),
        }
    }
}

fn coerced_amount<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    decimal_or_zero(&value).map_err(de::Error::custom)
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    })
}

fn sent_text<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    lenient_text(deserializer).map(Some)
}

/// Raw request body of both export routes
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportPayload {
    #[serde(rename = "movimientos", default)]
    pub movements: Option<Vec<Movement>>,
    #[serde(rename = "titulo", default, deserialize_with = "lenient_text")]
    pub title: Option<String>,
}

impl ReportPayload {
    /// Parse a request body. An empty body yields an empty payload.
    pub fn from_slice(body: &[u8]) -> CoreResult<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body)
            .map_err(|e| CoreError::InvalidPayload { message: e.to_string() })
    }

    /// Resolve into a report request, substituting the default title.
    ///
    /// With `require_movements` a payload without a movement list is rejected.
    pub fn into_request(self, default_title: &str, require_movements: bool) -> CoreResult<ReportRequest> {
        let movements = match self.movements {
            Some(movements) => movements,
            None if require_movements => return Err(CoreError::MissingMovements),
            None => Vec::new(),
        };
        let title = self
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| default_title.to_string());
        Ok(ReportRequest { title, movements })
    }
}

/// Validated input of the report builders
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRequest {
    pub title: String,
    pub movements: Vec<Movement>,
}

impl ReportRequest {
    pub fn new(title: impl Into<String>, movements: Vec<Movement>) -> Self {
        Self {
            title: title.into(),
            movements,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_labels() {
        assert_eq!(MovementKind::from("ingreso"), MovementKind::Income);
        assert_eq!(MovementKind::from("expense"), MovementKind::Expense);
        assert_eq!(MovementKind::from("ahorro"), MovementKind::Saving);
        assert_eq!(MovementKind::from("Gasto"), MovementKind::Other("Gasto".to_string()));
        assert_eq!(MovementKind::Saving.to_string(), "ahorro");
    }

    #[test]
    fn test_movement_deserialize_full() {
        let movement: Movement = serde_json::from_str(
            r#"{"type": "gasto", "amount": "300.50", "created_at": "2024-05-01T10:30:00Z",
                "description_user": "Mercado", "category": "Comida"}"#,
        ).unwrap();

        assert_eq!(movement.kind, Some(MovementKind::Expense));
        assert_eq!(movement.amount, Decimal::new(30050, 2));
        assert_eq!(movement.created_at.as_deref(), Some("2024-05-01T10:30:00Z"));
        assert_eq!(movement.description_user.as_deref(), Some("Mercado"));
        assert_eq!(movement.category.as_deref(), Some("Comida"));
    }

    #[test]
    fn test_movement_deserialize_lenient() {
        let movement: Movement = serde_json::from_str(
            r#"{"amount": "abc", "category": 42, "description_user": null}"#,
        ).unwrap();

        assert_eq!(movement.kind, None);
        assert_eq!(movement.amount, Decimal::ZERO);
        assert_eq!(movement.category.as_deref(), Some("42"));
        assert_eq!(movement.description_user, None);

        let movement: Movement = serde_json::from_str("{}").unwrap();
        assert_eq!(movement.amount, Decimal::ZERO);
    }

    #[test]
    fn test_movement_records_sent_keys() {
        let movement: Movement = serde_json::from_str(
            r#"{"type": null, "amount": 1, "created_at": null, "category": "Hogar"}"#,
        ).unwrap();

        assert_eq!(movement.kind, None);
        assert_eq!(movement.created_at, None);
        assert_eq!(
            movement.sent,
            SentKeys {
                kind: true,
                created_at: true,
                description_user: false,
                category: true,
            }
        );
    }

    #[test]
    fn test_amount_out_of_range_is_invalid_payload() {
        let error = ReportPayload::from_slice(
            br#"{"movimientos": [{"type": "ingreso", "amount": 1e30}]}"#,
        ).unwrap_err();
        assert!(matches!(error, CoreError::InvalidPayload { ref message } if message.contains("1e30")));
        assert!(error.is_validation());
    }

    #[test]
    fn test_display_amount_sign() {
        let amount = Decimal::new(300, 0);
        assert_eq!(Movement::new(MovementKind::Income, amount).display_amount(), amount);
        assert_eq!(Movement::new(MovementKind::Expense, amount).display_amount(), -amount);
        assert_eq!(Movement::new(MovementKind::Saving, amount).display_amount(), -amount);
        assert_eq!(
            Movement::new(MovementKind::Other("prestamo".to_string()), amount).display_amount(),
            amount
        );
        let untyped = Movement { amount, ..Default::default() };
        assert_eq!(untyped.display_amount(), amount);
    }

    #[test]
    fn test_negate_zero_is_unsigned() {
        assert!(!negate(Decimal::ZERO).is_sign_negative());
        assert_eq!(negate(Decimal::new(5, 0)), Decimal::new(-5, 0));
    }

    #[test]
    fn test_payload_defaults_title() {
        let payload = ReportPayload::from_slice(br#"{"movimientos": []}"#).unwrap();
        let request = payload.into_request("REPORTE DE MOVIMIENTOS", true).unwrap();
        assert_eq!(request.title, "REPORTE DE MOVIMIENTOS");
        assert!(request.movements.is_empty());

        let payload = ReportPayload::from_slice(br#"{"movimientos": [], "titulo": "Ciclo Mayo"}"#).unwrap();
        let request = payload.into_request("REPORTE DE MOVIMIENTOS", true).unwrap();
        assert_eq!(request.title, "Ciclo Mayo");
    }

    #[test]
    fn test_payload_missing_movements() {
        let payload = ReportPayload::from_slice(br#"{"titulo": "X"}"#).unwrap();
        let error = payload.clone().into_request("T", true).unwrap_err();
        assert!(matches!(error, CoreError::MissingMovements));

        let request = payload.into_request("T", false).unwrap();
        assert!(request.movements.is_empty());

        let payload = ReportPayload::from_slice(br#"{"movimientos": null}"#).unwrap();
        assert!(payload.into_request("T", true).is_err());
    }

    #[test]
    fn test_payload_empty_body() {
        let payload = ReportPayload::from_slice(b"  ").unwrap();
        assert!(payload.movements.is_none());
        assert!(matches!(payload.into_request("T", true), Err(CoreError::MissingMovements)));
    }

    #[test]
    fn test_payload_invalid_json() {
        let error = ReportPayload::from_slice(b"{not json").unwrap_err();
        assert!(error.is_validation());
        assert!(matches!(error, CoreError::InvalidPayload { .. }));
    }
}
