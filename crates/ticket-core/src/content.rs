//! # The ticket data model
//!
//! A [TicketContent] is the input of one render pass. It is normally built
//! by the surrounding request layer; the structure deserializes from RON
//! so the CLI can stand in for that layer.

use std::borrow::Cow;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::due::DueMode;

/// The urgency of a ticket
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    /// No urgency
    None,
    /// Can wait
    Low,
    /// The default
    #[default]
    Normal,
    /// Should be next
    High,
    /// Drop everything
    Critical,
}

impl Urgency {
    /// The ordinal level in `[0, 3]` backing the bolt row
    ///
    /// `critical` shares the top level with `high`; the `+` flag is the
    /// extra step above that.
    pub fn level(self) -> u8 {
        match self {
            Urgency::None => 0,
            Urgency::Low => 1,
            Urgency::Normal => 2,
            Urgency::High | Urgency::Critical => 3,
        }
    }
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// All content of a single ticket
#[derive(Debug, Clone, Deserialize)]
pub struct TicketContent {
    /// Ticket identifier; the caller fills one in when empty
    #[serde(default)]
    pub id: String,
    /// Short title, may be empty (see [TicketContent::effective_title])
    #[serde(default)]
    pub title: String,
    /// Free text; lines starting with `- ` render as checkboxes
    #[serde(default)]
    pub body: String,
    /// Urgency level for the bolt row
    #[serde(default)]
    pub urgency: Urgency,
    /// Adds the filled `+` badge after the bolts
    #[serde(default)]
    pub urgency_plus: bool,
    /// Short label for the footer, right side
    #[serde(default)]
    pub tag: Option<String>,
    /// Short label for the footer, left side
    #[serde(default)]
    pub author: Option<String>,
    /// The due-date quick-select
    #[serde(default)]
    pub due: DueMode,
    /// Creation date, drives due-window resolution and the header stamp
    #[serde(default = "today")]
    pub created: NaiveDate,
}

impl TicketContent {
    /// The identifier as printed on the ticket pill (first 8 chars)
    pub fn short_id(&self) -> &str {
        let end = self
            .id
            .char_indices()
            .nth(8)
            .map(|(i, _)| i)
            .unwrap_or(self.id.len());
        &self.id[..end]
    }

    /// The title that actually renders
    ///
    /// An empty title falls back to the first body line (at most 50 chars),
    /// then to a fixed placeholder.
    pub fn effective_title(&self) -> Cow<'_, str> {
        if !self.title.trim().is_empty() {
            return Cow::Borrowed(self.title.trim());
        }
        if let Some(line) = self.body.lines().find(|l| !l.trim().is_empty()) {
            let line = line.trim();
            let end = line
                .char_indices()
                .nth(50)
                .map(|(i, _)| i)
                .unwrap_or(line.len());
            return Cow::Owned(line[..end].to_string());
        }
        Cow::Borrowed("Untitled Ticket")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticket() -> TicketContent {
        TicketContent {
            id: "a1b2c3d4e5f6".to_string(),
            title: String::new(),
            body: String::new(),
            urgency: Urgency::Normal,
            urgency_plus: false,
            tag: None,
            author: None,
            due: DueMode::None,
            created: NaiveDate::from_ymd_opt(2025, 10, 7).unwrap(),
        }
    }

    #[test]
    fn test_urgency_levels() {
        assert_eq!(0, Urgency::None.level());
        assert_eq!(2, Urgency::Normal.level());
        assert_eq!(3, Urgency::High.level());
        assert_eq!(3, Urgency::Critical.level());
    }

    #[test]
    fn test_short_id() {
        assert_eq!("a1b2c3d4", ticket().short_id());
        let mut t = ticket();
        t.id = "ab".to_string();
        assert_eq!("ab", t.short_id());
    }

    #[test]
    fn test_effective_title_fallbacks() {
        let mut t = ticket();
        assert_eq!("Untitled Ticket", t.effective_title());
        t.body = "\n- first real line\nsecond".to_string();
        assert_eq!("- first real line", t.effective_title());
        t.title = "  Pay rent  ".to_string();
        assert_eq!("Pay rent", t.effective_title());
    }

    #[test]
    fn test_ron_round_trip() {
        let t: TicketContent = ron::from_str(
            r#"(
                id: "feed1234",
                title: "Water plants",
                body: "- balcony\n- kitchen",
                urgency: high,
                urgency_plus: true,
                tag: Some("home"),
                due: ThisWeek,
                created: "2025-10-07",
            )"#,
        )
        .unwrap();
        assert_eq!(3, t.urgency.level());
        assert!(t.urgency_plus);
        assert_eq!(DueMode::ThisWeek, t.due);
        assert_eq!(NaiveDate::from_ymd_opt(2025, 10, 7).unwrap(), t.created);
    }

    #[test]
    fn test_unknown_due_mode_is_rejected() {
        let res: Result<TicketContent, _> = ron::from_str(r#"(due: Tomorrow)"#);
        assert!(res.is_err());
    }
}
