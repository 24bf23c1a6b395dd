//! Workspace file commands, all backed by one `FileOps`

use async_trait::async_trait;
use std::sync::Arc;

use super::{Arguments, Command, CommandOutput, Result};
use crate::dispatcher::Dispatcher;
use crate::workspace::FileOps;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileAction {
    Read,
    Write,
    Append,
    Delete,
    Copy,
    Move,
    Rename,
    Search,
    CreateDirectory,
    ListResources,
    EvaluateResources,
    FilesystemRepresentation,
}

impl FileAction {
    pub const ALL: [FileAction; 12] = [
        FileAction::Read,
        FileAction::Write,
        FileAction::Append,
        FileAction::Delete,
        FileAction::Copy,
        FileAction::Move,
        FileAction::Rename,
        FileAction::Search,
        FileAction::CreateDirectory,
        FileAction::ListResources,
        FileAction::EvaluateResources,
        FileAction::FilesystemRepresentation,
    ];

    pub fn command_name(self) -> &'static str {
        match self {
            FileAction::Read => "read_file",
            FileAction::Write => "write_to_file",
            FileAction::Append => "append_to_file",
            FileAction::Delete => "delete_file",
            FileAction::Copy => "copy_file",
            FileAction::Move => "move_file",
            FileAction::Rename => "rename_file",
            FileAction::Search => "search_files",
            FileAction::CreateDirectory => "create_directory",
            FileAction::ListResources => "list_resources",
            FileAction::EvaluateResources => "evaluate_resources",
            FileAction::FilesystemRepresentation => "get_filesystem_representation",
        }
    }
}

pub struct FileCommand {
    action: FileAction,
    files: Arc<dyn FileOps>,
}

impl FileCommand {
    pub fn new(action: FileAction, files: Arc<dyn FileOps>) -> Self {
        Self { action, files }
    }
}

#[async_trait]
impl Command for FileCommand {
    fn name(&self) -> &str {
        self.action.command_name()
    }

    async fn execute(&self, args: &Arguments) -> Result<CommandOutput> {
        let files = self.files.as_ref();
        let reply = match self.action {
            FileAction::Read => files.read(&args.require_str("file")?).await?,
            FileAction::Write => {
                files
                    .write(&args.require_str("file")?, &args.require_str("text")?)
                    .await?
            }
            FileAction::Append => {
                files
                    .append(&args.require_str("file")?, &args.require_str("text")?)
                    .await?
            }
            FileAction::Delete => files.delete(&args.require_str_list("file")?).await?,
            FileAction::Copy => {
                files
                    .copy(
                        &args.require_str_list("source")?,
                        &args.require_str("destination")?,
                    )
                    .await?
            }
            FileAction::Move => {
                files
                    .move_files(
                        &args.require_str_list("source")?,
                        &args.require_str("destination")?,
                    )
                    .await?
            }
            FileAction::Rename => {
                files
                    .rename(&args.require_str("source")?, &args.require_str("destination")?)
                    .await?
            }
            FileAction::Search => {
                let directory = args.require_str("directory")?;
                let phrase = args.optional_str("phrase");
                format!("{:?}", files.search(&directory, phrase.as_deref()).await?)
            }
            FileAction::CreateDirectory => {
                files.create_directory(&args.require_str("directory")?).await?
            }
            FileAction::ListResources => format!("{:?}", files.list_resources().await?),
            FileAction::EvaluateResources => format!(
                "What follows is a summary of all files and folders in the working directory:\n\n{}",
                files.summarize_resources().await?
            ),
            FileAction::FilesystemRepresentation => files.filesystem_tree().await?,
        };
        Ok(CommandOutput::Reply(reply))
    }
}

pub fn register(dispatcher: &mut Dispatcher, files: Arc<dyn FileOps>) {
    for action in FileAction::ALL {
        dispatcher.register(FileCommand::new(action, files.clone()));
    }
}
