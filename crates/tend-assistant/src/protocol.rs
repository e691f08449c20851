//! The structured exchange with the model: prompt assembly on the way out,
//! tolerant JSON extraction on the way back.

use chrono::NaiveDate;
use serde::Deserialize;

use tend_types::domain::RecurrencePattern;

/// Minimal context forwarded with every chat turn.
pub struct ChatContext {
    pub username: String,
    pub today: NaiveDate,
    /// "name (frequency)" lines for the user's active habits.
    pub habits: Vec<String>,
    /// Task descriptions of pending commitments.
    pub pending_commitments: Vec<String>,
}

#[derive(Debug, Deserialize, Default, PartialEq)]
pub struct StructuredReply {
    pub reply: String,
    #[serde(default)]
    pub commitments: Vec<ProposedCommitment>,
}

/// A commitment the assistant extracted from the conversation. Validated by
/// the same rules as user-created commitments before anything is stored.
#[derive(Debug, Deserialize, PartialEq)]
pub struct ProposedCommitment {
    pub task_description: String,
    #[serde(default)]
    pub deadline: Option<NaiveDate>,
    #[serde(default)]
    pub is_recurring: bool,
    #[serde(default)]
    pub recurrence_pattern: Option<RecurrencePattern>,
}

pub fn system_prompt(ctx: &ChatContext) -> String {
    let habits = if ctx.habits.is_empty() {
        "(none yet)".to_string()
    } else {
        ctx.habits
            .iter()
            .map(|h| format!("- {h}"))
            .collect::<Vec<_>>()
            .join("\n")
    };
    let commitments = if ctx.pending_commitments.is_empty() {
        "(none)".to_string()
    } else {
        ctx.pending_commitments
            .iter()
            .map(|c| format!("- {c}"))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "You are a friendly personal assistant helping {username} manage their \
         habits, commitments, and well-being. Today's date is {today}.\n\n\
         Their current habits:\n{habits}\n\n\
         Their pending commitments:\n{commitments}\n\n\
         Respond with a single JSON object and nothing else:\n\
         {{\"reply\": \"your conversational response\", \
         \"commitments\": [{{\"task_description\": \"...\", \
         \"deadline\": \"YYYY-MM-DD or null\", \"is_recurring\": false, \
         \"recurrence_pattern\": \"daily|weekly|monthly|custom or null\"}}]}}\n\n\
         Extract a commitment whenever the user promises to do something \
         concrete. Leave the commitments array empty otherwise. Be \
         encouraging and keep replies concise.",
        username = ctx.username,
        today = ctx.today,
        habits = habits,
        commitments = commitments,
    )
}

/// Canned response used when no provider key is configured, so the rest of
/// the system stays exercisable offline.
pub fn local_reply(message: &str) -> StructuredReply {
    StructuredReply {
        reply: format!("I understand you're asking about: {message}. Let me help you with that!"),
        commitments: vec![],
    }
}

/// Tolerant parse: output that is not the requested JSON degrades to a
/// plain-text reply with no side effects.
pub fn parse_structured(text: &str) -> StructuredReply {
    if let Ok(reply) = serde_json::from_str::<StructuredReply>(text) {
        return with_fallback_reply(reply, text);
    }

    // Models sometimes wrap the object in prose or a code fence — try the
    // outermost braces before giving up.
    if let Some(candidate) = outermost_object(text) {
        if let Ok(reply) = serde_json::from_str::<StructuredReply>(candidate) {
            return with_fallback_reply(reply, text);
        }
    }

    StructuredReply {
        reply: text.to_string(),
        commitments: vec![],
    }
}

fn with_fallback_reply(mut reply: StructuredReply, raw: &str) -> StructuredReply {
    if reply.reply.trim().is_empty() {
        reply.reply = raw.to_string();
    }
    reply
}

fn outermost_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_formed_json_yields_commitments() {
        let text = r#"{"reply": "Noted!", "commitments": [
            {"task_description": "call the dentist", "deadline": "2025-06-02"}
        ]}"#;
        let parsed = parse_structured(text);
        assert_eq!(parsed.reply, "Noted!");
        assert_eq!(parsed.commitments.len(), 1);
        assert_eq!(parsed.commitments[0].task_description, "call the dentist");
        assert_eq!(
            parsed.commitments[0].deadline,
            Some("2025-06-02".parse().expect("date"))
        );
        assert!(!parsed.commitments[0].is_recurring);
    }

    #[test]
    fn fenced_json_is_still_found() {
        let text = "Here you go:\n```json\n{\"reply\": \"Done\", \"commitments\": []}\n```";
        let parsed = parse_structured(text);
        assert_eq!(parsed.reply, "Done");
        assert!(parsed.commitments.is_empty());
    }

    #[test]
    fn prose_degrades_to_plain_reply_with_no_side_effects() {
        let text = "Sounds great, keep it up!";
        let parsed = parse_structured(text);
        assert_eq!(parsed.reply, text);
        assert!(parsed.commitments.is_empty());
    }

    #[test]
    fn empty_parsed_reply_falls_back_to_raw_text() {
        let text = r#"{"reply": "", "commitments": []}"#;
        let parsed = parse_structured(text);
        assert_eq!(parsed.reply, text);
    }

    #[test]
    fn prompt_mentions_habits_and_pending_commitments() {
        let ctx = ChatContext {
            username: "ada".to_string(),
            today: "2025-06-01".parse().expect("date"),
            habits: vec!["meditate (daily)".to_string()],
            pending_commitments: vec!["file taxes".to_string()],
        };
        let prompt = system_prompt(&ctx);
        assert!(prompt.contains("meditate (daily)"));
        assert!(prompt.contains("file taxes"));
        assert!(prompt.contains("2025-06-01"));
    }
}
