//! Memory hooks: customer context for the retention conversation.
//!
//! Two hooks around each agent turn:
//!   1. before: pull memories for the customer from every namespace and
//!      prefix them onto the latest user message
//!   2. after:  store the latest user query and agent reply as one event
//!
//! Memory is a convenience. Both hooks log failures and carry on; a
//! broken memory backend never fails the conversation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_CUSTOMER_ID: &str = "default-customer";
pub const CONTEXT_TOP_K: usize = 3;
pub const PROFILE_TOP_K: usize = 5;
pub const PROFILE_QUERY: &str = "customer preferences and retention history";

const ACTOR_PLACEHOLDER: &str = "{actorId}";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MessageContent {
    Text { text: String },
    ToolResult { tool_use_id: String, output: serde_json::Value },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role:    Role,
    pub content: MessageContent,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self { role: Role::User, content: MessageContent::Text { text: text.into() } }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: MessageContent::Text { text: text.into() } }
    }

    /// Text of a plain (non tool-result) message.
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            MessageContent::Text { text } => Some(text),
            MessageContent::ToolResult { .. } => None,
        }
    }
}

/// One retrieval strategy configured on the memory resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryStrategy {
    pub strategy_type: String,
    pub namespaces:    Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecord {
    pub text:      String,
    #[serde(default)]
    pub relevance: f64,
}

/// The managed memory service, seen from this crate.
pub trait MemoryClient {
    fn memory_strategies(&self, memory_id: &str) -> anyhow::Result<Vec<MemoryStrategy>>;

    fn retrieve_memories(
        &self,
        memory_id: &str,
        namespace: &str,
        query: &str,
        top_k: usize,
    ) -> anyhow::Result<Vec<MemoryRecord>>;

    fn create_event(
        &self,
        memory_id: &str,
        actor_id: &str,
        session_id: &str,
        messages: &[(String, Role)],
    ) -> anyhow::Result<()>;
}

pub struct RetentionMemory<C: MemoryClient> {
    client:      C,
    memory_id:   String,
    customer_id: String,
    session_id:  String,
    /// (strategy type, namespace template) in strategy order.
    namespaces:  Vec<(String, String)>,
}

impl<C: MemoryClient> RetentionMemory<C> {
    pub fn new(
        client: C,
        memory_id: impl Into<String>,
        customer_id: Option<String>,
        session_id: Option<String>,
    ) -> Self {
        let memory_id = memory_id.into();
        let namespaces = match client.memory_strategies(&memory_id) {
            Ok(strategies) => strategies
                .into_iter()
                .filter_map(|s| s.namespaces.into_iter().next().map(|ns| (s.strategy_type, ns)))
                .collect(),
            Err(e) => {
                log::error!("memory: cannot load strategies for {memory_id}: {e}");
                default_namespaces()
            }
        };
        log::info!(
            "memory: namespaces loaded: {:?}",
            namespaces.iter().map(|(t, _)| t.as_str()).collect::<Vec<_>>()
        );

        Self {
            client,
            memory_id,
            customer_id: customer_id.unwrap_or_else(|| DEFAULT_CUSTOMER_ID.to_string()),
            session_id: session_id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            namespaces,
        }
    }

    pub fn customer_id(&self) -> &str { &self.customer_id }
    pub fn session_id(&self) -> &str { &self.session_id }

    pub fn namespaces(&self) -> &[(String, String)] {
        &self.namespaces
    }

    /// Before-turn hook. Rewrites the last message in place when it is
    /// a user text turn and any memories match it. Returns the number
    /// of context lines injected.
    pub fn inject_customer_context(&self, messages: &mut [ChatMessage]) -> usize {
        let Some(last) = messages.last_mut() else { return 0 };
        if last.role != Role::User {
            return 0;
        }
        let MessageContent::Text { text } = &mut last.content else { return 0 };

        let context = match self.collect_context(text, CONTEXT_TOP_K) {
            Ok(lines) => lines,
            Err(e) => {
                log::error!("memory: failed to retrieve customer context: {e}");
                return 0;
            }
        };
        if context.is_empty() {
            return 0;
        }

        *text = format!("Customer Context:\n{}\n\n{text}", context.join("\n"));
        log::info!("memory: retrieved {} customer context items", context.len());
        context.len()
    }

    /// After-turn hook. Stores the last user query and the agent reply
    /// that answers it. Returns whether an event was written.
    pub fn save_interaction(&self, messages: &[ChatMessage]) -> bool {
        if messages.len() < 2 || messages.last().map(|m| m.role) != Some(Role::Assistant) {
            return false;
        }

        let mut response: Option<&str> = None;
        let mut query: Option<&str> = None;
        for msg in messages.iter().rev() {
            match (msg.role, msg.text()) {
                (Role::Assistant, Some(text)) if response.is_none() => response = Some(text),
                (Role::User, Some(text)) => {
                    query = Some(text);
                    break;
                }
                _ => {}
            }
        }

        let (Some(query), Some(response)) = (query, response) else { return false };
        let event = [
            (query.to_string(), Role::User),
            (response.to_string(), Role::Assistant),
        ];
        match self.client.create_event(&self.memory_id, &self.customer_id, &self.session_id, &event) {
            Ok(()) => {
                log::info!("memory: saved retention interaction for {}", self.customer_id);
                true
            }
            Err(e) => {
                log::error!("memory: failed to save retention interaction: {e}");
                false
            }
        }
    }

    /// Standing context for the customer, independent of any turn.
    pub fn customer_context(&self) -> Vec<String> {
        self.collect_context(PROFILE_QUERY, PROFILE_TOP_K).unwrap_or_else(|e| {
            log::error!("memory: error getting customer context: {e}");
            Vec::new()
        })
    }

    fn collect_context(&self, query: &str, top_k: usize) -> anyhow::Result<Vec<String>> {
        let mut lines = Vec::new();
        for (context_type, template) in &self.namespaces {
            let namespace = template.replace(ACTOR_PLACEHOLDER, &self.customer_id);
            let memories = self.client.retrieve_memories(&self.memory_id, &namespace, query, top_k)?;
            lines.extend(
                memories
                    .iter()
                    .map(|m| m.text.trim())
                    .filter(|t| !t.is_empty())
                    .map(|t| format!("[{}] {t}", context_type.to_uppercase())),
            );
        }
        Ok(lines)
    }
}

/// Used when the memory resource cannot describe its own strategies.
pub fn default_namespaces() -> Vec<(String, String)> {
    vec![
        ("USER_PREFERENCE".into(), "retention/customer/{actorId}/preferences".into()),
        ("SEMANTIC".into(), "retention/customer/{actorId}/semantic".into()),
    ]
}
