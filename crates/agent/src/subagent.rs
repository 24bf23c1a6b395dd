//! Directory of helper conversations the main agent can delegate to
//!
//! Each sub-agent is an independent conversation with its own message history,
//! addressed by an integer key. Keys come from a monotonic counter and are never
//! reused, even after deletion.

use autopilot_provider::{ChatParams, Message, Provider, ProviderError};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum SubAgentError {
    #[error("Invalid key, must be an integer.")]
    NonIntegerKey,

    #[error("Invalid key, agent {0} does not exist.")]
    UnknownKey(i64),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

pub type Result<T> = std::result::Result<T, SubAgentError>;

/// One helper conversation
#[derive(Debug, Clone)]
pub struct SubAgentRecord {
    pub key: u64,
    pub task: String,
    pub model: String,
    pub conversation: Vec<Message>,
}

pub struct SubAgentDirectory {
    provider: Arc<dyn Provider>,
    agents: BTreeMap<u64, SubAgentRecord>,
    next_key: u64,
    max_tokens: u32,
    temperature: f32,
}

impl SubAgentDirectory {
    pub fn new(provider: Arc<dyn Provider>, max_tokens: u32, temperature: f32) -> Self {
        Self {
            provider,
            agents: BTreeMap::new(),
            next_key: 0,
            max_tokens,
            temperature,
        }
    }

    async fn complete(&self, model: &str, conversation: &[Message]) -> Result<String> {
        let params = ChatParams {
            model: model.to_string(),
            messages: conversation.to_vec(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };
        Ok(self.provider.chat(params).await?.into_text())
    }

    /// Start a conversation with `first_message`. Nothing is registered and no
    /// key is consumed when the model call fails.
    pub async fn create(
        &mut self,
        task: &str,
        first_message: &str,
        model: &str,
    ) -> Result<(u64, String)> {
        self.open(task, &[first_message], model).await
    }

    /// Start a conversation by sending each of `messages` in turn and return
    /// the reply to the last one. The record is registered only once every
    /// exchange has succeeded.
    pub async fn open(
        &mut self,
        task: &str,
        messages: &[&str],
        model: &str,
    ) -> Result<(u64, String)> {
        let mut conversation = Vec::with_capacity(messages.len() * 2);
        let mut reply = String::new();
        for text in messages {
            conversation.push(Message::user(*text));
            reply = self.complete(model, &conversation).await?;
            conversation.push(Message::assistant(reply.clone()));
        }

        let key = self.next_key;
        self.next_key += 1;
        self.agents.insert(
            key,
            SubAgentRecord {
                key,
                task: task.to_string(),
                model: model.to_string(),
                conversation,
            },
        );
        info!("◆ Sub-agent {} created for: {}", key, task);
        Ok((key, reply))
    }

    /// Send `text` to the agent with the given key. The key arrives as the
    /// model wrote it and must parse as an integer.
    pub async fn message(&mut self, key: &str, text: &str) -> Result<String> {
        let key = lookup_key(key)?;
        let record = self
            .agents
            .get(&key)
            .ok_or(SubAgentError::UnknownKey(key as i64))?;

        let mut conversation = record.conversation.clone();
        conversation.push(Message::user(text));
        let reply = self.complete(&record.model, &conversation).await?;
        conversation.push(Message::assistant(reply.clone()));

        if let Some(record) = self.agents.get_mut(&key) {
            record.conversation = conversation;
        }
        debug!("◆ Sub-agent {} replied ({} chars)", key, reply.len());
        Ok(reply)
    }

    /// `(key, task)` ordered by key
    pub fn list(&self) -> Vec<(u64, String)> {
        self.agents
            .values()
            .map(|r| (r.key, r.task.clone()))
            .collect()
    }

    pub fn get(&self, key: u64) -> Option<&SubAgentRecord> {
        self.agents.get(&key)
    }

    /// False for unknown or non-integer keys
    pub fn delete(&mut self, key: &str) -> bool {
        match lookup_key(key) {
            Ok(key) => {
                let removed = self.agents.remove(&key).is_some();
                if removed {
                    info!("◆ Sub-agent {} deleted", key);
                }
                removed
            }
            Err(_) => false,
        }
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

/// Any integer is a well-formed key; negative ones name no agent
fn lookup_key(key: &str) -> Result<u64> {
    let key: i64 = key
        .trim()
        .parse()
        .map_err(|_| SubAgentError::NonIntegerKey)?;
    u64::try_from(key).map_err(|_| SubAgentError::UnknownKey(key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use autopilot_provider::ChatResponse;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Replies "reply N" and fails on the calls listed in `fail_on`
    struct Counting {
        calls: AtomicUsize,
        fail_on: Vec<usize>,
    }

    impl Counting {
        fn new(fail_on: Vec<usize>) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                fail_on,
            })
        }
    }

    #[async_trait]
    impl Provider for Counting {
        async fn chat(&self, _params: ChatParams) -> autopilot_provider::Result<ChatResponse> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_on.contains(&n) {
                return Err(ProviderError::Api("overloaded".to_string()));
            }
            Ok(ChatResponse::text(format!("reply {}", n)))
        }

        fn default_model(&self) -> String {
            "test-model".to_string()
        }

        fn is_configured(&self) -> bool {
            true
        }
    }

    #[tokio::test]
    async fn test_keys_are_monotonic_and_never_reused() {
        let mut dir = SubAgentDirectory::new(Counting::new(vec![]), 256, 0.0);
        let mut keys = Vec::new();
        for task in ["a", "b", "c"] {
            keys.push(dir.create(task, "hi", "m").await.unwrap().0);
        }
        assert_eq!(keys, vec![0, 1, 2]);

        assert!(dir.delete("1"));
        let (k3, _) = dir.create("d", "hi", "m").await.unwrap();
        assert_eq!(k3, 3);
        assert_eq!(
            dir.list(),
            vec![
                (0, "a".to_string()),
                (2, "c".to_string()),
                (3, "d".to_string())
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_create_registers_nothing() {
        let mut dir = SubAgentDirectory::new(Counting::new(vec![0]), 256, 0.0);
        assert!(dir.create("a", "hi", "m").await.is_err());
        assert!(dir.is_empty());

        let (key, reply) = dir.create("a", "hi", "m").await.unwrap();
        assert_eq!(key, 0);
        assert_eq!(reply, "reply 1");
    }

    #[tokio::test]
    async fn test_open_registers_only_after_every_exchange() {
        let mut dir = SubAgentDirectory::new(Counting::new(vec![1]), 256, 0.0);
        assert!(dir.open("a", &["hi", "intro", "task"], "m").await.is_err());
        assert!(dir.is_empty());

        let (key, reply) = dir.open("a", &["hi", "intro", "task"], "m").await.unwrap();
        assert_eq!(key, 0);
        assert_eq!(reply, "reply 4");
        assert_eq!(dir.get(key).unwrap().conversation.len(), 6);
    }

    #[tokio::test]
    async fn test_message_appends_history() {
        let mut dir = SubAgentDirectory::new(Counting::new(vec![]), 256, 0.0);
        let (key, _) = dir.create("a", "hi", "m").await.unwrap();
        let reply = dir.message(&key.to_string(), "next").await.unwrap();
        assert_eq!(reply, "reply 1");

        let record = dir.get(key).unwrap();
        assert_eq!(record.conversation.len(), 4);
        assert_eq!(record.conversation[2].content, "next");
        assert_eq!(record.conversation[3].role, "assistant");
    }

    #[tokio::test]
    async fn test_failed_message_leaves_history() {
        let mut dir = SubAgentDirectory::new(Counting::new(vec![1]), 256, 0.0);
        let (key, _) = dir.create("a", "hi", "m").await.unwrap();
        assert!(dir.message("0", "next").await.is_err());
        assert_eq!(dir.get(key).unwrap().conversation.len(), 2);
    }

    #[tokio::test]
    async fn test_bad_keys() {
        let mut dir = SubAgentDirectory::new(Counting::new(vec![]), 256, 0.0);
        assert_eq!(
            dir.message("abc", "hi").await.unwrap_err().to_string(),
            "Invalid key, must be an integer."
        );
        assert_eq!(
            dir.message("5", "hi").await.unwrap_err().to_string(),
            "Invalid key, agent 5 does not exist."
        );
        assert_eq!(
            dir.message("-1", "hi").await.unwrap_err().to_string(),
            "Invalid key, agent -1 does not exist."
        );
        assert!(!dir.delete("5"));
        assert!(!dir.delete("abc"));
        assert!(!dir.delete("-1"));
    }
}
