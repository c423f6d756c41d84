use chrono::{Duration, Local};

use crate::types::{ChatLine, TeamChat};

pub const CHAT_PARTICIPANTS: [&str; 3] = [
    "Alex Rivera (Sales Rep)",
    "Jordan Lee (Account Manager)",
    "Sam Chen (Solution Architect)",
];

const ALEX: usize = 0;
const JORDAN: usize = 1;
const SAM: usize = 2;

/// (speaker, minutes before now, content). `{company}` is substituted.
const SCRIPT: [(usize, i64, &str); 12] = [
    (ALEX, 6 * 1440 + 120, "Hey team, I just got off a call with the decision makers at {company}. They're really interested in upgrading their CRM."),
    (JORDAN, 6 * 1440 + 105, "That's great news! What are their main pain points?"),
    (ALEX, 6 * 1440 + 90, "They mentioned three big issues:\n1. Data silos between departments\n2. Current system is way too slow\n3. No AI capabilities - they're falling behind competitors"),
    (SAM, 6 * 1440 + 75, "Those are exactly the problems NexusCRM solves. Did they mention budget?"),
    (ALEX, 6 * 1440 + 60, "Yes! They have around $50k/year allocated. Their CFO already got approval from leadership."),
    (JORDAN, 6 * 1440 + 45, "Perfect, that fits our Enterprise tier. What's their timeline?"),
    (ALEX, 6 * 1440 + 30, "They want to implement in Q1. It's tied to their fiscal year planning."),
    (SAM, 6 * 1440 + 20, "Q1 is doable. I'll need to understand their current tech stack. Do they have any integration requirements?"),
    (ALEX, 6 * 1440 + 10, "Their IT Director mentioned they need to integrate with Salesforce, Teams, Outlook, and their custom billing system. Mobile support is also critical for their field sales team."),
    (JORDAN, 6 * 1440 + 5, "All standard integrations for us. I'll start drafting the proposal. Can you send over any notes from the call?"),
    (ALEX, 6 * 1440, "Will do. I also have email threads with their Sales Director and VP of Marketing that provide more context on their pain points."),
    (SAM, 6 * 1440 - 5, "Great work Alex! {company} sounds like an ideal fit for NexusCRM. Let's make sure we highlight our AI features and data unification capabilities in the proposal."),
];

/// The internal deal-room chat about the prospect, oldest message first.
pub fn generate_team_chat(company_name: &str) -> TeamChat {
    let now = Local::now();
    let messages = SCRIPT
        .iter()
        .map(|(speaker, minutes_ago, content)| ChatLine {
            sender: CHAT_PARTICIPANTS[*speaker].to_string(),
            timestamp: now - Duration::minutes(*minutes_ago),
            content: content.replace("{company}", company_name),
        })
        .collect();

    TeamChat {
        title: format!("💼 {} - CRM Opportunity", company_name),
        participants: CHAT_PARTICIPANTS.iter().map(|p| p.to_string()).collect(),
        messages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_shape() {
        let chat = generate_team_chat("Tesla");
        assert_eq!(chat.title, "💼 Tesla - CRM Opportunity");
        assert_eq!(chat.participants.len(), 3);
        assert_eq!(chat.messages.len(), 12);
        assert!(chat.messages[0].content.contains("decision makers at Tesla"));
        assert!(chat.messages[11].content.contains("Tesla sounds like an ideal fit"));
    }

    #[test]
    fn test_messages_are_chronological_within_last_week() {
        let now = Local::now();
        let chat = generate_team_chat("Acme");
        for pair in chat.messages.windows(2) {
            assert!(pair[0].timestamp < pair[1].timestamp);
        }
        assert!(now - chat.messages[0].timestamp <= Duration::days(7));
    }

    #[test]
    fn test_every_sender_is_a_participant() {
        let chat = generate_team_chat("Acme");
        assert!(chat
            .messages
            .iter()
            .all(|m| chat.participants.contains(&m.sender)));
    }
}
