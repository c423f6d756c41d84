//! Per-session proposal workflow.
//!
//! Every handler takes the session explicitly and runs to completion
//! before returning; provider calls are awaited one after another. The
//! document is rebuilt from the edited draft and current theme each time
//! it is asked for.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;

use crate::chat::{parse_command, MessageKind, Role, GENERATING_MESSAGE, HELP_MESSAGE};
use crate::contacts::extract_contacts;
use crate::error::{CopilotError, UiError};
use crate::mock::{generate_emails, generate_team_chat};
use crate::proposal::prompts::{build_research_prompt, parse_draft_response, research_query};
use crate::proposal::{build_document, resolve_theme, Artifact, Document, DraftSections, Theme};
use crate::providers::{
    CompletionService, GeminiClient, SearchService, TavilyClient, Unconfigured,
};
use crate::state::SessionState;
use crate::types::{Config, Contact, EmailRecord, SendRecord, TeamChat};

pub struct ProposalOrchestrator {
    completion: Arc<dyn CompletionService>,
    search: Arc<dyn SearchService>,
    search_depth: String,
    max_search_results: u32,
    output_dir: Option<PathBuf>,
}

impl ProposalOrchestrator {
    pub fn new(
        completion: Arc<dyn CompletionService>,
        search: Arc<dyn SearchService>,
        config: &Config,
    ) -> Self {
        Self {
            completion,
            search,
            search_depth: config.search_depth.clone(),
            max_search_results: config.max_search_results,
            output_dir: config.output_dir.as_ref().map(PathBuf::from),
        }
    }

    /// Gemini + Tavily. A missing key does not fail here; research will
    /// fail instead and the draft carries the error.
    pub fn from_config(config: &Config) -> Result<Self, CopilotError> {
        let completion: Arc<dyn CompletionService> = match GeminiClient::from_config(config) {
            Ok(client) => Arc::new(client),
            Err(CopilotError::MissingApiKey(service)) => {
                log::warn!("{} API key not configured; drafting will fail", service);
                Arc::new(Unconfigured(service))
            }
            Err(e) => return Err(e),
        };
        let search: Arc<dyn SearchService> = match TavilyClient::from_config(config) {
            Ok(client) => Arc::new(client),
            Err(CopilotError::MissingApiKey(service)) => {
                log::warn!("{} API key not configured; research will fail", service);
                Arc::new(Unconfigured(service))
            }
            Err(e) => return Err(e),
        };
        Ok(Self::new(completion, search, config))
    }

    /// Search the web, then ask the model for the three sections.
    pub async fn research(
        &self,
        company_name: &str,
        emails: &[EmailRecord],
        chats: &[TeamChat],
    ) -> Result<DraftSections, CopilotError> {
        let query = research_query(company_name);
        let hits = self
            .search
            .search(&query, &self.search_depth, self.max_search_results)
            .await?;
        log::info!("Research for {}: {} search results", company_name, hits.len());

        let prompt = build_research_prompt(company_name, &hits, emails, chats)?;
        let response = self.completion.complete(&prompt).await?;
        log::debug!("Raw draft response: {}", response);
        parse_draft_response(&response)
    }

    /// Handle one chat message; returns the id of the assistant reply.
    pub async fn handle_message(&self, session: &mut SessionState, text: &str) -> usize {
        session.push_message(Role::User, text, MessageKind::Plain);

        let Some(company_name) = parse_command(text) else {
            return session.push_message(Role::Assistant, HELP_MESSAGE, MessageKind::Plain);
        };

        log::info!("Starting proposal for {}", company_name);
        session.company.name = company_name.clone();
        session.emails = generate_emails(&company_name);
        session.chats = vec![generate_team_chat(&company_name)];

        let sections = match self
            .research(&company_name, &session.emails, &session.chats)
            .await
        {
            Ok(sections) => sections,
            Err(e) => {
                log::error!("Research for {} failed: {}", company_name, e);
                let ui = UiError::from(&e);
                session.push_message(
                    Role::Assistant,
                    format!("⚠️ Error during research: {}\n{}", ui.message, ui.recovery_suggestion),
                    MessageKind::Error,
                );
                DraftSections::from_error(&e)
            }
        };

        let draft = sections.to_draft();
        session.company.full_draft = draft.clone();
        session.company.edited_full_draft = draft;

        session.push_message(
            Role::Assistant,
            format!(
                "I've gathered insights on **{}** from web research, your email/Teams history, and {} knowledge base file(s). Here's a draft proposal - please review and edit:",
                company_name,
                session.knowledge_files.len()
            ),
            MessageKind::DraftEditor,
        )
    }

    pub fn edit_draft(&self, session: &mut SessionState, text: &str) {
        session.company.edited_full_draft = text.to_string();
    }

    /// Accept the edited draft. Returns the Download message id and the deck.
    pub fn confirm_draft(&self, session: &mut SessionState) -> (usize, Document) {
        let id = session.push_message(Role::Assistant, GENERATING_MESSAGE, MessageKind::Download);
        (id, self.document(session))
    }

    /// Apply a free-text theme suggestion. Blank suggestions change nothing.
    pub async fn regenerate_theme(&self, session: &mut SessionState, suggestion: &str) -> Theme {
        if suggestion.trim().is_empty() {
            return session.company.theme;
        }
        let theme = resolve_theme(self.completion.as_ref(), suggestion, &session.company.theme).await;
        session.company.theme = theme;
        theme
    }

    pub fn document(&self, session: &SessionState) -> Document {
        build_document(
            &session.company.name,
            &session.company.edited_full_draft,
            &session.company.theme,
        )
    }

    pub fn render_artifact(&self, session: &SessionState) -> Result<Artifact, CopilotError> {
        Artifact::from_document(&self.document(session))
    }

    /// Render and write the deck to the output dir, or a temp file.
    pub fn save_artifact(&self, session: &SessionState) -> Result<PathBuf, CopilotError> {
        let artifact = self.render_artifact(session)?;
        let path = match &self.output_dir {
            Some(dir) => artifact.write_to_dir(dir)?,
            None => artifact.persist_temp()?,
        };
        log::info!("Wrote {}", path.display());
        Ok(path)
    }

    pub fn contacts(&self, session: &SessionState) -> Vec<Contact> {
        extract_contacts(&session.emails, &session.chats, &session.company.name)
    }

    /// Replace the recipient selection for a Download message.
    pub fn select_recipients(
        &self,
        session: &mut SessionState,
        message_id: usize,
        emails: &[String],
    ) -> Result<(), CopilotError> {
        if session.message(message_id).is_none() {
            return Err(CopilotError::UnknownMessage(message_id));
        }

        let contacts = self.contacts(session);
        let mut selected: Vec<String> = Vec::with_capacity(emails.len());
        for email in emails {
            let contact = contacts
                .iter()
                .find(|c| c.email.eq_ignore_ascii_case(email.trim()))
                .ok_or_else(|| CopilotError::UnknownRecipient(email.clone()))?;
            if !selected.contains(&contact.email) {
                selected.push(contact.email.clone());
            }
        }

        session.pending_recipients.insert(message_id, selected);
        Ok(())
    }

    /// Record a send for the pending selection. Nothing is delivered.
    pub fn send(&self, session: &mut SessionState, message_id: usize) -> Option<SendRecord> {
        let recipients = session
            .pending_recipients
            .remove(&message_id)
            .filter(|r| !r.is_empty())?;

        let record = SendRecord {
            message_id,
            recipient_emails: recipients,
            sent_at: Utc::now(),
        };
        log::info!(
            "Proposal for {} marked sent to {} recipient(s)",
            session.company.name,
            record.recipient_emails.len()
        );
        session.push_message(
            Role::Assistant,
            format!(
                "✅ Proposal sent to {}",
                record.recipient_emails.join(", ")
            ),
            MessageKind::Plain,
        );
        session.last_send = Some(record.clone());
        Some(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proposal::document::TITLE_SUBTITLE;
    use crate::proposal::sections::SECTION_FALLBACK;
    use crate::proposal::Rgb;
    use crate::providers::test_utils::{sample_hit, FakeCompletion, FakeSearch};

    const DRAFT_REPLY: &str = r#"```json
{"executive_summary":"We help with silos.","solution":"AI CRM.","pricing":"$50k/yr, Q1."}
```"#;

    fn orchestrator(
        completion: Arc<FakeCompletion>,
        search: Arc<FakeSearch>,
    ) -> ProposalOrchestrator {
        ProposalOrchestrator::new(completion, search, &Config::default())
    }

    async fn session_for(company: &str) -> (ProposalOrchestrator, SessionState) {
        let completion = Arc::new(FakeCompletion::with_replies([Ok(DRAFT_REPLY.to_string())]));
        let search = Arc::new(FakeSearch::with_hits(vec![sample_hit()]));
        let orch = orchestrator(completion, search);
        let mut session = SessionState::new(&Config::default());
        orch.handle_message(&mut session, &format!("@SPG create proposal for {}", company))
            .await;
        (orch, session)
    }

    #[tokio::test]
    async fn test_non_command_gets_help() {
        let completion = Arc::new(FakeCompletion::default());
        let search = Arc::new(FakeSearch::with_hits(vec![]));
        let orch = orchestrator(completion.clone(), search.clone());
        let mut session = SessionState::default();

        let id = orch.handle_message(&mut session, "hello there").await;
        assert_eq!(id, 1);
        assert_eq!(session.messages[1].content, HELP_MESSAGE);
        assert_eq!(session.messages[0].role, Role::User);
        assert!(completion.prompts().is_empty());
        assert!(search.queries().is_empty());
    }

    #[tokio::test]
    async fn test_command_drafts_proposal() {
        let completion = Arc::new(FakeCompletion::with_replies([Ok(DRAFT_REPLY.to_string())]));
        let search = Arc::new(FakeSearch::with_hits(vec![sample_hit()]));
        let orch = orchestrator(completion.clone(), search.clone());
        let mut session = SessionState::new(&Config::default());

        let id = orch
            .handle_message(&mut session, "@SPG create proposal for Acme")
            .await;

        assert_eq!(session.messages[id].kind, MessageKind::DraftEditor);
        assert!(session.messages[id].content.contains("**Acme**"));
        assert_eq!(session.company.name, "Acme");
        assert_eq!(
            session.company.full_draft,
            "## Executive Summary\nWe help with silos.\n\n## Solution\nAI CRM.\n\n## Investment\n$50k/yr, Q1."
        );
        assert_eq!(session.company.edited_full_draft, session.company.full_draft);
        assert_eq!(session.emails.len(), 5);
        assert_eq!(session.chats.len(), 1);

        assert_eq!(
            search.queries(),
            vec!["Acme strategic goals 2025 financial challenges recent news"]
        );
        let prompts = completion.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Acme plans a 2025 digital push."));
        assert!(prompts[0].contains("john.smith@acme.com"));
    }

    #[tokio::test]
    async fn test_research_failure_uses_placeholder_draft() {
        let completion = Arc::new(FakeCompletion::default());
        let search = Arc::new(FakeSearch::failing());
        let orch = orchestrator(completion.clone(), search);
        let mut session = SessionState::default();

        let id = orch
            .handle_message(&mut session, "@SPG create proposal for Tesla")
            .await;

        assert_eq!(session.messages[id - 1].kind, MessageKind::Error);
        assert_eq!(session.messages[id].kind, MessageKind::DraftEditor);
        assert!(session
            .company
            .full_draft
            .starts_with("## Executive Summary\nResearch/AI Error: Tavily API error 503"));
        assert!(session.company.full_draft.ends_with("## Investment\nInternal Error."));
        // Search failed, so the model was never asked.
        assert!(completion.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_draft_reply_is_research_failure() {
        let completion = Arc::new(FakeCompletion::with_replies([Ok(
            r#"{"executive_summary":"only one"}"#.to_string(),
        )]));
        let search = Arc::new(FakeSearch::with_hits(vec![]));
        let orch = orchestrator(completion, search);
        let mut session = SessionState::default();
        orch.handle_message(&mut session, "@SPG proposal for Globex").await;

        assert!(session
            .company
            .edited_full_draft
            .contains("Research/AI Error: Malformed model response"));
    }

    #[tokio::test]
    async fn test_missing_keys_degrade_to_placeholder() {
        let orch = ProposalOrchestrator::from_config(&Config::default()).unwrap();
        let mut session = SessionState::default();
        orch.handle_message(&mut session, "@SPG create proposal for Acme").await;
        assert!(session
            .company
            .full_draft
            .contains("Research/AI Error: No API key configured for Tavily"));
    }

    #[tokio::test]
    async fn test_document_reflects_latest_edit_and_theme() {
        let (orch, mut session) = session_for("Acme").await;

        let (download_id, doc) = orch.confirm_draft(&mut session);
        assert_eq!(session.messages[download_id].kind, MessageKind::Download);
        assert_eq!(session.messages[download_id].content, GENERATING_MESSAGE);
        assert_eq!(doc.slides[0].content.title, "NexusCRM → Acme");
        assert_eq!(doc.slides[0].content.body, TITLE_SUBTITLE);
        assert!(doc.slides[1].content.body.contains("We help with silos."));
        assert!(doc.slides[2].content.body.contains("AI CRM."));
        assert!(doc.slides[3].content.body.contains("$50k/yr, Q1."));

        orch.edit_draft(&mut session, "## Pricing\n$40k");
        let doc = orch.document(&session);
        assert_eq!(doc.slides[1].content.body, SECTION_FALLBACK);
        assert_eq!(doc.slides[3].content.body, "$40k\n");
        // Generated draft is kept as-is.
        assert!(session.company.full_draft.contains("AI CRM."));
    }

    #[tokio::test]
    async fn test_regenerate_theme() {
        let completion = Arc::new(FakeCompletion::with_replies([
            Ok(r#"{"bg_color":[0,0,0],"title_color":[255,215,0],"body_color":[255,255,255],"accent_color":[255,215,0]}"#.to_string()),
            Ok("{ broken".to_string()),
        ]));
        let search = Arc::new(FakeSearch::with_hits(vec![]));
        let orch = orchestrator(completion.clone(), search);
        let mut session = SessionState::default();
        session.company.edited_full_draft = "## Solution\nAI CRM.".to_string();

        let theme = orch.regenerate_theme(&mut session, "Dark mode with gold").await;
        assert_eq!(theme.bg_color, Rgb(0, 0, 0));
        assert_eq!(session.company.theme, theme);
        let doc = orch.document(&session);
        assert!(doc.slides.iter().all(|s| s.background == Rgb(0, 0, 0)));

        // Malformed reply keeps the previous theme and document colors.
        let kept = orch.regenerate_theme(&mut session, "neon").await;
        assert_eq!(kept, theme);
        assert_eq!(orch.document(&session), doc);

        // Blank suggestion makes no call.
        orch.regenerate_theme(&mut session, "   ").await;
        assert_eq!(completion.prompts().len(), 2);
    }

    #[tokio::test]
    async fn test_contacts_from_session() {
        let (orch, session) = session_for("Acme").await;
        let contacts = orch.contacts(&session);
        assert_eq!(contacts.len(), 8);
        assert!(contacts.iter().any(|c| c.email == "jordan.lee@acme.com"));
        assert!(contacts.iter().any(|c| c.email == "david.park@acme.com"));
    }

    #[tokio::test]
    async fn test_select_and_send() {
        let (orch, mut session) = session_for("Acme").await;
        let (id, _) = orch.confirm_draft(&mut session);

        orch.select_recipients(
            &mut session,
            id,
            &["JOHN.SMITH@acme.com".to_string(), "jordan.lee@acme.com".to_string()],
        )
        .unwrap();
        let record = orch.send(&mut session, id).unwrap();
        assert_eq!(record.message_id, id);
        assert_eq!(
            record.recipient_emails,
            vec!["john.smith@acme.com", "jordan.lee@acme.com"]
        );
        assert_eq!(session.last_send.as_ref(), Some(&record));
        assert!(session
            .messages
            .last()
            .unwrap()
            .content
            .contains("john.smith@acme.com, jordan.lee@acme.com"));

        // Selection is consumed by the send.
        assert!(orch.send(&mut session, id).is_none());
        assert_eq!(session.last_send.as_ref(), Some(&record));
    }

    #[tokio::test]
    async fn test_selection_is_replaced_not_merged() {
        let (orch, mut session) = session_for("Acme").await;
        let (id, _) = orch.confirm_draft(&mut session);

        orch.select_recipients(&mut session, id, &["john.smith@acme.com".to_string()])
            .unwrap();
        orch.select_recipients(&mut session, id, &["sam.chen@acme.com".to_string()])
            .unwrap();
        assert_eq!(
            session.pending_recipients.get(&id),
            Some(&vec!["sam.chen@acme.com".to_string()])
        );

        let record = orch.send(&mut session, id).unwrap();
        assert_eq!(record.recipient_emails, vec!["sam.chen@acme.com"]);
    }

    #[tokio::test]
    async fn test_empty_selection_send_is_noop() {
        let (orch, mut session) = session_for("Acme").await;
        let (id, _) = orch.confirm_draft(&mut session);
        let before = session.messages.len();

        assert!(orch.send(&mut session, id).is_none());
        orch.select_recipients(&mut session, id, &[]).unwrap();
        assert!(orch.send(&mut session, id).is_none());
        assert!(session.last_send.is_none());
        assert_eq!(session.messages.len(), before);
    }

    #[tokio::test]
    async fn test_selection_validation() {
        let (orch, mut session) = session_for("Acme").await;
        let (id, _) = orch.confirm_draft(&mut session);

        let err = orch
            .select_recipients(&mut session, id, &["stranger@evil.com".to_string()])
            .unwrap_err();
        assert!(matches!(err, CopilotError::UnknownRecipient(_)));

        let err = orch
            .select_recipients(&mut session, 999, &["john.smith@acme.com".to_string()])
            .unwrap_err();
        assert!(matches!(err, CopilotError::UnknownMessage(999)));
        assert!(session.pending_recipients.is_empty());
    }

    #[tokio::test]
    async fn test_save_artifact_to_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            output_dir: Some(dir.path().to_string_lossy().to_string()),
            ..Config::default()
        };
        let orch = ProposalOrchestrator::new(
            Arc::new(FakeCompletion::with_replies([Ok(DRAFT_REPLY.to_string())])),
            Arc::new(FakeSearch::with_hits(vec![])),
            &config,
        );
        let mut session = SessionState::default();
        orch.handle_message(&mut session, "@SPG create proposal for Acme").await;

        let path = orch.save_artifact(&session).unwrap();
        assert_eq!(path, dir.path().join("NexusCRM_Proposal_Acme.pptx"));
        let slides = crate::proposal::extract_slides(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(slides.len(), 4);
        assert_eq!(slides[2].paragraphs, vec!["AI CRM.", ""]);
    }
}
