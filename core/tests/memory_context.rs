use retention_core::memory::{
    ChatMessage, MemoryClient, MemoryRecord, MemoryStrategy, MessageContent, RetentionMemory, Role,
    DEFAULT_CUSTOMER_ID,
};
use std::cell::RefCell;
use std::collections::HashMap;

// ── Test helpers ────────────────────────────────────────────────────────────

/// In-process stand-in for the managed memory service.
#[derive(Default)]
struct FakeMemory {
    strategies:     Option<Vec<MemoryStrategy>>,
    by_namespace:   HashMap<String, Vec<MemoryRecord>>,
    fail_retrieval: bool,
    queries:        RefCell<Vec<(String, String, usize)>>,
    events:         RefCell<Vec<(String, String, Vec<(String, Role)>)>>,
}

impl MemoryClient for &FakeMemory {
    fn memory_strategies(&self, _memory_id: &str) -> anyhow::Result<Vec<MemoryStrategy>> {
        self.strategies
            .clone()
            .ok_or_else(|| anyhow::anyhow!("strategies unavailable"))
    }

    fn retrieve_memories(
        &self,
        _memory_id: &str,
        namespace: &str,
        query: &str,
        top_k: usize,
    ) -> anyhow::Result<Vec<MemoryRecord>> {
        if self.fail_retrieval {
            anyhow::bail!("retrieval timed out");
        }
        self.queries
            .borrow_mut()
            .push((namespace.to_string(), query.to_string(), top_k));
        Ok(self.by_namespace.get(namespace).cloned().unwrap_or_default())
    }

    fn create_event(
        &self,
        _memory_id: &str,
        actor_id: &str,
        session_id: &str,
        messages: &[(String, Role)],
    ) -> anyhow::Result<()> {
        self.events
            .borrow_mut()
            .push((actor_id.to_string(), session_id.to_string(), messages.to_vec()));
        Ok(())
    }
}

fn memory_text(text: &str) -> MemoryRecord {
    MemoryRecord { text: text.into(), relevance: 0.9 }
}

fn fake_with_memories() -> FakeMemory {
    let mut fake = FakeMemory {
        strategies: Some(vec![
            MemoryStrategy {
                strategy_type: "user_preference".into(),
                namespaces:    vec!["retention/customer/{actorId}/preferences".into()],
            },
            MemoryStrategy {
                strategy_type: "semantic".into(),
                namespaces:    vec!["retention/customer/{actorId}/semantic".into()],
            },
        ]),
        ..Default::default()
    };
    fake.by_namespace.insert(
        "retention/customer/CUST-7/preferences".into(),
        vec![memory_text("Prefers email contact"), memory_text("   ")],
    );
    fake.by_namespace.insert(
        "retention/customer/CUST-7/semantic".into(),
        vec![memory_text("Complained about fiber outages in March")],
    );
    fake
}

fn tool_result() -> ChatMessage {
    ChatMessage {
        role:    Role::User,
        content: MessageContent::ToolResult {
            tool_use_id: "t-1".into(),
            output:      serde_json::json!({ "offers": [] }),
        },
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn context_is_prefixed_onto_last_user_turn() {
    let fake = fake_with_memories();
    let memory = RetentionMemory::new(&fake, "mem-1", Some("CUST-7".into()), Some("sess-1".into()));

    let mut messages = vec![ChatMessage::user("I want to cancel my plan")];
    let injected = memory.inject_customer_context(&mut messages);

    assert_eq!(injected, 2, "blank memories must be skipped");
    assert_eq!(
        messages[0].text().unwrap(),
        "Customer Context:\n\
         [USER_PREFERENCE] Prefers email contact\n\
         [SEMANTIC] Complained about fiber outages in March\n\n\
         I want to cancel my plan"
    );

    let queries = fake.queries.borrow();
    assert_eq!(queries.len(), 2);
    assert!(queries.iter().all(|(_, q, k)| q == "I want to cancel my plan" && *k == 3));
}

#[test]
fn tool_results_and_assistant_turns_are_left_alone() {
    let fake = fake_with_memories();
    let memory = RetentionMemory::new(&fake, "mem-1", Some("CUST-7".into()), None);

    let mut messages = vec![ChatMessage::user("hello"), tool_result()];
    assert_eq!(memory.inject_customer_context(&mut messages), 0);

    let mut messages = vec![ChatMessage::assistant("hi there")];
    assert_eq!(memory.inject_customer_context(&mut messages), 0);
    assert_eq!(messages[0].text(), Some("hi there"));

    assert!(fake.queries.borrow().is_empty(), "no retrieval should have happened");
}

#[test]
fn retrieval_failure_leaves_message_untouched() {
    let mut fake = fake_with_memories();
    fake.fail_retrieval = true;
    let memory = RetentionMemory::new(&fake, "mem-1", Some("CUST-7".into()), None);

    let mut messages = vec![ChatMessage::user("what offers do I have?")];
    assert_eq!(memory.inject_customer_context(&mut messages), 0);
    assert_eq!(messages[0].text(), Some("what offers do I have?"));
    assert!(memory.customer_context().is_empty());
}

#[test]
fn falls_back_to_default_namespaces() {
    let fake = FakeMemory::default();
    let memory = RetentionMemory::new(&fake, "mem-1", None, None);

    assert_eq!(memory.customer_id(), DEFAULT_CUSTOMER_ID);
    assert!(!memory.session_id().is_empty());
    let types: Vec<_> = memory.namespaces().iter().map(|(t, _)| t.as_str()).collect();
    assert_eq!(types, vec!["USER_PREFERENCE", "SEMANTIC"]);
}

#[test]
fn interaction_pairs_last_query_with_reply() {
    let fake = fake_with_memories();
    let memory = RetentionMemory::new(&fake, "mem-1", Some("CUST-7".into()), Some("sess-9".into()));

    let messages = vec![
        ChatMessage::user("earlier question"),
        ChatMessage::assistant("earlier answer"),
        ChatMessage::user("Can I get a discount?"),
        tool_result(),
        ChatMessage::assistant("Yes: 25% off for three months."),
    ];
    assert!(memory.save_interaction(&messages));

    let events = fake.events.borrow();
    assert_eq!(events.len(), 1);
    let (actor, session, pair) = &events[0];
    assert_eq!(actor, "CUST-7");
    assert_eq!(session, "sess-9");
    assert_eq!(
        pair,
        &vec![
            ("Can I get a discount?".to_string(), Role::User),
            ("Yes: 25% off for three months.".to_string(), Role::Assistant),
        ]
    );
}

#[test]
fn nothing_saved_without_assistant_reply() {
    let fake = fake_with_memories();
    let memory = RetentionMemory::new(&fake, "mem-1", Some("CUST-7".into()), None);

    assert!(!memory.save_interaction(&[ChatMessage::assistant("only me")]));
    assert!(!memory.save_interaction(&[ChatMessage::assistant("hi"), ChatMessage::user("bye")]));
    assert!(fake.events.borrow().is_empty());
}

#[test]
fn standing_context_uses_profile_query() {
    let fake = fake_with_memories();
    let memory = RetentionMemory::new(&fake, "mem-1", Some("CUST-7".into()), None);

    let context = memory.customer_context();
    assert_eq!(context.len(), 2);
    assert!(fake
        .queries
        .borrow()
        .iter()
        .all(|(_, q, k)| q == "customer preferences and retention history" && *k == 5));
}
