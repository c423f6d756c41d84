use chrono::{Duration, Local};

use crate::types::EmailRecord;
use crate::util::company_domain;

struct EmailTemplate {
    local_part: &'static str,
    subject: &'static str,
    /// `{company}` is replaced with the display company name.
    body: &'static str,
}

const TEMPLATES: [EmailTemplate; 5] = [
    EmailTemplate {
        local_part: "john.smith",
        subject: "Re: CRM System Performance Issues",
        body: "Hi Team,

I wanted to follow up on our discussion about the current CRM system at {company}. We're experiencing significant performance issues that are impacting our sales team's productivity.

Key pain points:
- System takes 5-10 seconds to load customer records
- Frequent timeouts during peak hours
- Data sync issues between departments

Our team is spending more time waiting for the system than actually engaging with customers. We need to explore alternatives that can handle our growing data volume.

Can we schedule a call to discuss potential solutions?

Best regards,
John Smith
Sales Director, {company}",
    },
    EmailTemplate {
        local_part: "sarah.johnson",
        subject: "Data Silos - Urgent Discussion Needed",
        body: "Team,

I'm reaching out because we have a critical issue with data silos across {company}. Marketing, Sales, and Customer Success are all working with different versions of customer data.

This is causing:
- Duplicate outreach to the same customers
- Inconsistent messaging
- Lost opportunities due to lack of visibility

We need a unified CRM solution that can break down these silos and give everyone a single source of truth. This is becoming a major blocker for our Q1 initiatives.

Let's prioritize finding a solution ASAP.

Sarah Johnson
VP of Marketing, {company}",
    },
    EmailTemplate {
        local_part: "michael.chen",
        subject: "Budget Approval for CRM Upgrade",
        body: "Hi Leadership Team,

Following our strategic planning session, I've been reviewing options for upgrading our CRM infrastructure at {company}.

Budget considerations:
- Current system costs: $35k/year
- Proposed budget for new solution: $50k/year
- Expected ROI: 25% increase in sales productivity

The investment is justified given our growth trajectory and the limitations of our current system. I've identified a few vendors that could meet our needs within this budget range.

Timeline: We should aim for Q1 implementation to align with our fiscal year planning.

Looking forward to your feedback.

Michael Chen
CFO, {company}",
    },
    EmailTemplate {
        local_part: "emily.rodriguez",
        subject: "AI Features - Competitive Necessity",
        body: "Hello,

I wanted to share some competitive intelligence regarding CRM capabilities at {company}.

Our main competitors are leveraging AI-powered CRM features:
- Predictive lead scoring
- Automated task prioritization
- Intelligent customer insights
- Sentiment analysis

We're falling behind in this area. Our current CRM lacks any AI capabilities, which is putting us at a disadvantage in terms of sales efficiency and customer engagement.

I strongly recommend we prioritize AI features in our CRM evaluation criteria.

Emily Rodriguez
Head of Sales Operations, {company}",
    },
    EmailTemplate {
        local_part: "david.park",
        subject: "Integration Requirements for New CRM",
        body: "Team,

As we evaluate CRM solutions for {company}, I want to outline our technical integration requirements:

Must integrate with:
- Salesforce (current data source)
- Microsoft Teams (communication)
- Outlook (email tracking)
- Our custom billing system
- Marketing automation platform

The new CRM needs to have robust APIs and pre-built connectors. We can't afford another system that operates in isolation.

Also, we need strong mobile support - our field sales team is constantly on the go.

Let me know if you need any technical specifications.

David Park
IT Director, {company}",
    },
];

/// Five prospect emails about CRM pain points, newest first.
///
/// Each is dated 1 to 21 days before now.
pub fn generate_emails(company_name: &str) -> Vec<EmailRecord> {
    let now = Local::now();
    let domain = company_domain(company_name);

    let mut emails: Vec<EmailRecord> = TEMPLATES
        .iter()
        .map(|t| {
            let days_ago: i64 = rand::random_range(1..=21);
            EmailRecord {
                sender: format!("{}@{}.com", t.local_part, domain),
                subject: t.subject.to_string(),
                date: now - Duration::days(days_ago),
                body: t.body.replace("{company}", company_name),
            }
        })
        .collect();

    emails.sort_by(|a, b| b.date.cmp(&a.date));
    emails
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_five_emails_from_company_domain() {
        let emails = generate_emails("Acme Corp, Inc");
        assert_eq!(emails.len(), 5);
        assert_eq!(
            emails.iter().filter(|e| e.sender.ends_with("@acmecorpinc.com")).count(),
            5
        );
        assert!(emails.iter().any(|e| e.sender == "john.smith@acmecorpinc.com"));
        assert!(emails.iter().all(|e| e.body.contains("Acme Corp, Inc")));
        assert!(emails.iter().all(|e| !e.body.contains("{company}")));
    }

    #[test]
    fn test_dates_within_three_weeks_newest_first() {
        let now = Local::now();
        let emails = generate_emails("Tesla");
        for pair in emails.windows(2) {
            assert!(pair[0].date >= pair[1].date);
        }
        for email in &emails {
            let age = now - email.date;
            assert!(age >= Duration::days(1) - Duration::seconds(5));
            assert!(age <= Duration::days(21) + Duration::seconds(5));
        }
    }
}
