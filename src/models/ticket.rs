//! Support ticket model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::entity::{Entity, EntityKind, FieldDef, FieldType};
use super::ids::{ClientId, TicketId, UserId};

pub const TICKET_SCHEMA: &[FieldDef] = &[
    FieldDef::new("id", FieldType::Id),
    FieldDef::new("client_id", FieldType::Reference),
    FieldDef::new("subject", FieldType::Text),
    FieldDef::new("body", FieldType::Text),
    FieldDef::new("status", FieldType::Enum),
    FieldDef::new("priority", FieldType::Enum),
    FieldDef::new("replies", FieldType::Integer),
    FieldDef::new("created_by", FieldType::Reference),
    FieldDef::new("updated_by", FieldType::Reference),
    FieldDef::new("created_at", FieldType::Timestamp),
    FieldDef::new("updated_at", FieldType::Timestamp),
    FieldDef::new("deleted_at", FieldType::Timestamp),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    #[default]
    Open,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TicketPriority {
    Low,
    #[default]
    Normal,
    High,
}

impl TicketPriority {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Some(Self::Low),
            "normal" => Some(Self::Normal),
            "high" | "urgent" => Some(Self::High),
            _ => None,
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

impl fmt::Display for TicketPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Normal => write!(f, "normal"),
            Self::High => write!(f, "high"),
        }
    }
}

/// A support ticket opened for a client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: TicketId,
    pub client_id: ClientId,
    pub subject: String,
    #[serde(default)]
    pub body: String,
    pub status: TicketStatus,
    pub priority: TicketPriority,
    /// Number of staff replies
    #[serde(default)]
    pub replies: u32,
    #[serde(default)]
    pub created_by: Option<UserId>,
    #[serde(default)]
    pub updated_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Ticket {
    pub fn new(client_id: ClientId, subject: impl Into<String>, created_by: Option<UserId>) -> Self {
        let now = Utc::now();
        Self {
            id: TicketId::new(),
            client_id,
            subject: subject.into(),
            body: String::new(),
            status: TicketStatus::Open,
            priority: TicketPriority::Normal,
            replies: 0,
            created_by,
            updated_by: created_by,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == TicketStatus::Open
    }
}

impl Entity for Ticket {
    const KIND: EntityKind = EntityKind::Ticket;
    type Id = TicketId;

    fn id(&self) -> TicketId {
        self.id
    }

    fn key(&self) -> Uuid {
        *self.id.as_uuid()
    }

    fn label(&self) -> String {
        self.subject.clone()
    }

    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    fn set_deleted_at(&mut self, at: Option<DateTime<Utc>>) {
        self.deleted_at = at;
    }

    fn touch(&mut self, at: DateTime<Utc>, by: Option<UserId>) {
        self.updated_at = at;
        if by.is_some() {
            self.updated_by = by;
        }
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} ({})", self.priority, self.subject, self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_keys_match_schema() {
        let ticket = Ticket::new(ClientId::new(), "Printer on fire", None);
        let value = serde_json::to_value(&ticket).unwrap();
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        let schema: Vec<_> = TICKET_SCHEMA.iter().map(|f| f.name.to_string()).collect();
        assert_eq!(keys, schema);
    }

    #[test]
    fn test_new_ticket_is_open() {
        let ticket = Ticket::new(ClientId::new(), "Login broken", None);
        assert!(ticket.is_open());
        assert_eq!(ticket.priority, TicketPriority::Normal);
    }
}
