//! Account entity and its queryable fields.

use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sigma_core::{AppError, AppResult};

/// Numeric row identifier of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(u64);

impl AccountId {
    /// Creates an identifier from a positive row number.
    pub fn new(value: u64) -> AppResult<Self> {
        if value == 0 {
            return Err(AppError::Validation(
                "account id must be a positive integer".to_owned(),
            ));
        }

        Ok(Self(value))
    }

    /// Returns the underlying row number.
    #[must_use]
    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// Parses an identifier received on the transport, e.g. a path segment.
    pub fn from_transport(value: &str) -> AppResult<Self> {
        Self::from_str(value)
    }
}

impl Display for AccountId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl FromStr for AccountId {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let parsed = value.trim().parse::<u64>().map_err(|error| {
            AppError::Validation(format!("invalid account id '{value}': {error}"))
        })?;

        Self::new(parsed)
    }
}

/// Account record managed through the API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Server-assigned identifier, absent before creation.
    #[serde(default)]
    pub id: Option<AccountId>,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Registered legal name.
    #[serde(default)]
    pub legal_name: String,
    /// Address of the server hosting the account.
    #[serde(default)]
    pub server_address: String,
    /// Date the subscription expires.
    #[serde(default)]
    pub expiration: Option<NaiveDate>,
    /// Subscription plan label.
    #[serde(default)]
    pub plan: String,
    /// Free-form notes.
    #[serde(default)]
    pub detail: String,
    /// Contact phone.
    #[serde(default)]
    pub phone: String,
    /// Contact email.
    #[serde(default)]
    pub email: String,
    /// Public website.
    #[serde(default)]
    pub website: String,
    /// Account classification.
    #[serde(rename = "type", default)]
    pub account_type: String,
    /// Tenant-unique short code.
    #[serde(default)]
    pub code: String,
    /// Creation timestamp set by storage.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Last update timestamp set by storage.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Account {
    /// Creates an unsaved account with only a name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Returns the typed value stored under one queryable field.
    #[must_use]
    pub fn value_of(&self, field: AccountField) -> FieldValue {
        let text = |value: &str| FieldValue::Text(value.to_owned());
        match field {
            AccountField::Id => self
                .id
                .map(|id| FieldValue::Integer(id.as_u64()))
                .unwrap_or(FieldValue::Null),
            AccountField::Name => text(&self.name),
            AccountField::LegalName => text(&self.legal_name),
            AccountField::ServerAddress => text(&self.server_address),
            AccountField::Expiration => self
                .expiration
                .map(FieldValue::Date)
                .unwrap_or(FieldValue::Null),
            AccountField::Plan => text(&self.plan),
            AccountField::Detail => text(&self.detail),
            AccountField::Phone => text(&self.phone),
            AccountField::Email => text(&self.email),
            AccountField::Website => text(&self.website),
            AccountField::Type => text(&self.account_type),
            AccountField::Code => text(&self.code),
            AccountField::CreatedAt => self
                .created_at
                .map(FieldValue::Timestamp)
                .unwrap_or(FieldValue::Null),
            AccountField::UpdatedAt => self
                .updated_at
                .map(FieldValue::Timestamp)
                .unwrap_or(FieldValue::Null),
        }
    }
}

/// Storage kind of a queryable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Unsigned integer column.
    Integer,
    /// Text column.
    Text,
    /// Calendar date column.
    Date,
    /// UTC timestamp column.
    Timestamp,
}

/// Fields of [`Account`] that can be filtered and sorted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountField {
    /// `id`
    Id,
    /// `name`
    Name,
    /// `legal_name`
    LegalName,
    /// `server_address`
    ServerAddress,
    /// `expiration`
    Expiration,
    /// `plan`
    Plan,
    /// `detail`
    Detail,
    /// `phone`
    Phone,
    /// `email`
    Email,
    /// `website`
    Website,
    /// `type`
    Type,
    /// `code`
    Code,
    /// `created_at`
    CreatedAt,
    /// `updated_at`
    UpdatedAt,
}

impl AccountField {
    /// Returns all queryable fields in declaration order.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[AccountField] = &[
            AccountField::Id,
            AccountField::Name,
            AccountField::LegalName,
            AccountField::ServerAddress,
            AccountField::Expiration,
            AccountField::Plan,
            AccountField::Detail,
            AccountField::Phone,
            AccountField::Email,
            AccountField::Website,
            AccountField::Type,
            AccountField::Code,
            AccountField::CreatedAt,
            AccountField::UpdatedAt,
        ];

        ALL
    }

    /// Returns the transport name, identical to the serialized field name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::LegalName => "legal_name",
            Self::ServerAddress => "server_address",
            Self::Expiration => "expiration",
            Self::Plan => "plan",
            Self::Detail => "detail",
            Self::Phone => "phone",
            Self::Email => "email",
            Self::Website => "website",
            Self::Type => "type",
            Self::Code => "code",
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
        }
    }

    /// Returns the storage kind of the field.
    #[must_use]
    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Id => FieldKind::Integer,
            Self::Expiration => FieldKind::Date,
            Self::CreatedAt | Self::UpdatedAt => FieldKind::Timestamp,
            _ => FieldKind::Text,
        }
    }

    /// Returns whether free-text search covers this field.
    #[must_use]
    pub fn is_searchable(&self) -> bool {
        matches!(
            self,
            Self::Name | Self::LegalName | Self::Code | Self::Email | Self::Phone
        )
    }

    /// Returns the transport names of all queryable fields.
    #[must_use]
    pub fn names() -> Vec<&'static str> {
        Self::all().iter().map(Self::as_str).collect()
    }
}

impl FromStr for AccountField {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|field| field.as_str() == value)
            .ok_or_else(|| AppError::Validation(format!("unknown account field '{value}'")))
    }
}

/// Typed field value used for in-process filtering and ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Missing value.
    Null,
    /// Integer value.
    Integer(u64),
    /// Text value.
    Text(String),
    /// Date value.
    Date(NaiveDate),
    /// Timestamp value.
    Timestamp(DateTime<Utc>),
}

impl FieldValue {
    /// Parses a transport literal into a value of the given kind.
    pub fn parse(kind: FieldKind, raw: &str) -> AppResult<Self> {
        let raw = raw.trim();
        match kind {
            FieldKind::Integer => raw.parse::<u64>().map(Self::Integer).map_err(|error| {
                AppError::Validation(format!("'{raw}' is not an integer: {error}"))
            }),
            FieldKind::Text => Ok(Self::Text(raw.to_owned())),
            FieldKind::Date => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map(Self::Date)
                .map_err(|error| AppError::Validation(format!("'{raw}' is not a date: {error}"))),
            FieldKind::Timestamp => DateTime::parse_from_rfc3339(raw)
                .map(|value| Self::Timestamp(value.with_timezone(&Utc)))
                .map_err(|error| {
                    AppError::Validation(format!("'{raw}' is not an RFC3339 timestamp: {error}"))
                }),
        }
    }

    /// Returns a lowercase textual rendering used for `like` matching.
    #[must_use]
    pub fn to_search_text(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Integer(value) => value.to_string(),
            Self::Text(value) => value.to_lowercase(),
            Self::Date(value) => value.format("%Y-%m-%d").to_string(),
            Self::Timestamp(value) => value.to_rfc3339(),
        }
    }
}

impl PartialOrd for FieldValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Null, Self::Null) => Some(Ordering::Equal),
            (Self::Null, _) => Some(Ordering::Less),
            (_, Self::Null) => Some(Ordering::Greater),
            (Self::Integer(left), Self::Integer(right)) => left.partial_cmp(right),
            (Self::Text(left), Self::Text(right)) => left.partial_cmp(right),
            (Self::Date(left), Self::Date(right)) => left.partial_cmp(right),
            (Self::Timestamp(left), Self::Timestamp(right)) => left.partial_cmp(right),
            _ => None,
        }
    }
}
