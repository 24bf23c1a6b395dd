//! generate_image, read_audio_from_file, send_tweet

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use super::{Arguments, Command, CommandOutput, Result};
use crate::services::MediaOps;
use crate::workspace::{PathGuard, WorkspaceError};

pub struct GenerateImageCommand {
    media: Arc<dyn MediaOps>,
    guard: PathGuard,
}

impl GenerateImageCommand {
    pub fn new(media: Arc<dyn MediaOps>, workspace: impl Into<PathBuf>) -> Self {
        Self {
            media,
            guard: PathGuard::new(workspace),
        }
    }
}

#[async_trait]
impl Command for GenerateImageCommand {
    fn name(&self) -> &str {
        "generate_image"
    }

    async fn execute(&self, args: &Arguments) -> Result<CommandOutput> {
        let prompt = args.require_str("prompt")?;
        let image = self.media.generate_image(&prompt).await?;

        let filename = format!("image_{}.png", chrono::Local::now().format("%Y%m%d_%H%M%S_%3f"));
        let path = self.guard.resolve(&filename).await.map_err(WorkspaceError::from)?;
        tokio::fs::create_dir_all(self.guard.root())
            .await
            .map_err(WorkspaceError::from)?;
        tokio::fs::write(&path, image).await.map_err(WorkspaceError::from)?;
        info!("◆ Image saved to {:?}", path);

        Ok(CommandOutput::Reply(format!("Saved to disk:{}", filename)))
    }
}

pub struct ReadAudioCommand {
    media: Arc<dyn MediaOps>,
    guard: PathGuard,
}

impl ReadAudioCommand {
    pub fn new(media: Arc<dyn MediaOps>, workspace: impl Into<PathBuf>) -> Self {
        Self {
            media,
            guard: PathGuard::new(workspace),
        }
    }
}

#[async_trait]
impl Command for ReadAudioCommand {
    fn name(&self) -> &str {
        "read_audio_from_file"
    }

    async fn execute(&self, args: &Arguments) -> Result<CommandOutput> {
        let file = args.require_str("file")?;
        let path = self.guard.resolve(&file).await.map_err(WorkspaceError::from)?;
        let audio = tokio::fs::read(&path)
            .await
            .map_err(|_| WorkspaceError::NotFound(file.clone()))?;

        let text = self.media.transcribe_audio(audio).await?;
        Ok(CommandOutput::Reply(format!("The audio says: {}", text)))
    }
}

pub struct SendTweetCommand {
    media: Arc<dyn MediaOps>,
}

impl SendTweetCommand {
    pub fn new(media: Arc<dyn MediaOps>) -> Self {
        Self { media }
    }
}

#[async_trait]
impl Command for SendTweetCommand {
    fn name(&self) -> &str {
        "send_tweet"
    }

    async fn execute(&self, args: &Arguments) -> Result<CommandOutput> {
        let text = args.require_str("text")?;
        let id = self.media.post_tweet(&text).await?;
        Ok(CommandOutput::Reply(format!(
            "Tweet sent successfully! Tweet ID: {}",
            id
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ServiceError;
    use serde_json::json;

    struct FakeMedia;

    #[async_trait]
    impl MediaOps for FakeMedia {
        async fn generate_image(&self, _prompt: &str) -> std::result::Result<Vec<u8>, ServiceError> {
            Ok(vec![0x89, b'P', b'N', b'G'])
        }

        async fn transcribe_audio(&self, audio: Vec<u8>) -> std::result::Result<String, ServiceError> {
            Ok(format!("{} bytes of speech", audio.len()))
        }

        async fn post_tweet(&self, _text: &str) -> std::result::Result<String, ServiceError> {
            Ok("1234".to_string())
        }
    }

    #[tokio::test]
    async fn test_generate_image_saves_png() {
        let dir = tempfile::tempdir().unwrap();
        let command = GenerateImageCommand::new(Arc::new(FakeMedia), dir.path());
        let args = Arguments::from_value(json!({"prompt": "a lighthouse"}));

        let CommandOutput::Reply(reply) = command.execute(&args).await.unwrap() else {
            panic!("expected a reply");
        };
        let filename = reply.strip_prefix("Saved to disk:").unwrap();
        assert!(filename.starts_with("image_") && filename.ends_with(".png"));
        assert_eq!(std::fs::read(dir.path().join(filename)).unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_read_audio() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("speech.mp3"), [1u8, 2, 3]).unwrap();
        let command = ReadAudioCommand::new(Arc::new(FakeMedia), dir.path());

        let reply = command
            .execute(&Arguments::from_value(json!({"file": "speech.mp3"})))
            .await
            .unwrap();
        assert_eq!(reply, CommandOutput::reply("The audio says: 3 bytes of speech"));

        let err = command
            .execute(&Arguments::from_value(json!({"file": "missing.mp3"})))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "File missing.mp3 not found.");
    }

    #[tokio::test]
    async fn test_send_tweet() {
        let reply = SendTweetCommand::new(Arc::new(FakeMedia))
            .execute(&Arguments::from_value(json!({"text": "hello"})))
            .await
            .unwrap();
        assert_eq!(reply, CommandOutput::reply("Tweet sent successfully! Tweet ID: 1234"));
    }
}
