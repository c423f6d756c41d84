//! Recipient discovery from prospect emails and team chat participants.

use std::collections::HashSet;

use crate::types::{Contact, ContactSource, EmailRecord, TeamChat};
use crate::util::{name_from_email, synthetic_email};

/// Name part of a `"Name (Role)"` participant label.
fn participant_name(participant: &str) -> &str {
    participant
        .split_once('(')
        .map_or(participant, |(name, _)| name)
        .trim()
}

/// Deduplicated contacts, email senders first, then chat participants.
///
/// Emails compare case-insensitively; the first occurrence is kept as
/// written. Senders without an `@` and blank participant names are skipped.
pub fn extract_contacts(emails: &[EmailRecord], chats: &[TeamChat], company_name: &str) -> Vec<Contact> {
    let from_emails = emails
        .iter()
        .filter(|e| e.sender.contains('@'))
        .map(|e| Contact {
            email: e.sender.clone(),
            display_name: name_from_email(&e.sender),
            source: ContactSource::Email,
        });

    let from_chats = chats
        .iter()
        .flat_map(|chat| chat.participants.iter())
        .map(|p| participant_name(p))
        .filter(|name| !name.is_empty())
        .map(|name| Contact {
            email: synthetic_email(name, company_name),
            display_name: name.to_string(),
            source: ContactSource::ChatParticipant,
        });

    let mut seen = HashSet::new();
    from_emails
        .chain(from_chats)
        .filter(|c| seen.insert(c.email.to_lowercase()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;

    fn email(sender: &str) -> EmailRecord {
        EmailRecord {
            sender: sender.to_string(),
            subject: "s".to_string(),
            date: Local::now(),
            body: String::new(),
        }
    }

    fn chat(participants: &[&str]) -> TeamChat {
        TeamChat {
            title: "t".to_string(),
            participants: participants.iter().map(|p| p.to_string()).collect(),
            messages: Vec::new(),
        }
    }

    #[test]
    fn test_acme_scenario() {
        let contacts = extract_contacts(
            &[email("john.smith@acme.com")],
            &[chat(&["Jordan Lee (Account Manager)"])],
            "Acme",
        );
        assert_eq!(
            contacts,
            vec![
                Contact {
                    email: "john.smith@acme.com".to_string(),
                    display_name: "John Smith".to_string(),
                    source: ContactSource::Email,
                },
                Contact {
                    email: "jordan.lee@acme.com".to_string(),
                    display_name: "Jordan Lee".to_string(),
                    source: ContactSource::ChatParticipant,
                },
            ]
        );
    }

    #[test]
    fn test_duplicates_keep_first_occurrence() {
        let contacts = extract_contacts(
            &[email("jordan.lee@acme.com"), email("Jordan.Lee@Acme.com")],
            &[chat(&["Jordan Lee (Account Manager)"]), chat(&["Jordan Lee"])],
            "Acme",
        );
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].email, "jordan.lee@acme.com");
        assert_eq!(contacts[0].source, ContactSource::Email);
    }

    #[test]
    fn test_skips_invalid_senders_and_blank_participants() {
        let contacts = extract_contacts(
            &[email("no-at-sign"), email("a@b.com")],
            &[chat(&["   (Observer)", "Sam Chen (Solution Architect)", "Solo"])],
            "Big Co, Inc",
        );
        let emails: Vec<&str> = contacts.iter().map(|c| c.email.as_str()).collect();
        assert_eq!(emails, vec!["a@b.com", "sam.chen@bigcoinc.com", "solo@bigcoinc.com"]);
    }

    #[test]
    fn test_length_bound_and_uniqueness_with_mock_data() {
        let emails = crate::mock::generate_emails("Tesla");
        let chats = vec![crate::mock::generate_team_chat("Tesla")];
        let contacts = extract_contacts(&emails, &chats, "Tesla");

        assert_eq!(contacts.len(), 8);
        let unique: HashSet<String> = contacts.iter().map(|c| c.email.to_lowercase()).collect();
        assert_eq!(unique.len(), contacts.len());
        assert!(contacts[..5].iter().all(|c| c.source == ContactSource::Email));
        assert!(contacts[5..].iter().all(|c| c.source == ContactSource::ChatParticipant));
    }

    #[test]
    fn test_empty_inputs() {
        assert!(extract_contacts(&[], &[], "Acme").is_empty());
    }
}
