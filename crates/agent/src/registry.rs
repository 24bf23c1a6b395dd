//! Static command table: labels, argument schema, help pages, synonyms

/// Returned by `help_text` for names without a help page
pub const NO_HELP: &str = "Invalid command or no help available.";

/// One argument in a command's schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArgSpec {
    pub name: &'static str,
    pub placeholder: &'static str,
    pub optional: bool,
}

const fn arg(name: &'static str, placeholder: &'static str) -> ArgSpec {
    ArgSpec {
        name,
        placeholder,
        optional: false,
    }
}

const fn optional(name: &'static str, placeholder: &'static str) -> ArgSpec {
    ArgSpec {
        name,
        placeholder,
        optional: true,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSpec {
    pub label: &'static str,
    pub name: &'static str,
    pub args: &'static [ArgSpec],
    pub help: Option<&'static str>,
}

impl CommandSpec {
    /// `Label: "name", args: "k": "<v>", ...`
    pub fn prompt_line(&self) -> String {
        let args = self
            .args
            .iter()
            .map(|a| format!("\"{}\": \"{}\"", a.name, a.placeholder))
            .collect::<Vec<_>>()
            .join(", ");
        format!("{}: \"{}\", args: {}", self.label, self.name, args)
    }

    pub fn required_args(&self) -> impl Iterator<Item = &'static str> {
        self.args.iter().filter(|a| !a.optional).map(|a| a.name)
    }
}

const ADVERTISED: &[CommandSpec] = &[
    CommandSpec {
        label: "Google Search",
        name: "google",
        args: &[arg("input", "<search>")],
        help: Some("COMMAND: Google Search\nDESCRIPTION: Search Google for an input string\nARGUMENTS:\nInput (str): The phrase to search Google for\nEXAMPLE: {'name': 'google', 'args': {'input': 'AI research breakthroughs'}}"),
    },
    CommandSpec {
        label: "Browse Website",
        name: "browse_website",
        args: &[arg("url", "<url>"), arg("question", "<what_you_want_to_find_on_website>")],
        help: Some("COMMAND: Browse Website\nDESCRIPTION: Browse a website and find specific information based on the question provided\nARGUMENTS:\nURL (str): The URL of the website to browse\nQuestion (str): The question describing the information you want to find on the website\nEXAMPLE: {'name': 'browse_website', 'args': {'url': 'https://example.com/history', 'question': 'What is the history of Example Inc.?'}}"),
    },
    CommandSpec {
        label: "Start GPT Agent",
        name: "start_agent",
        args: &[arg("name", "<name>"), arg("task", "<short_task_desc>"), arg("prompt", "<prompt>")],
        help: Some("COMMAND: Start GPT Agent\nDESCRIPTION: Start a GPT agent with a specified name, task, and prompt\nARGUMENTS:\nName (str): The name of the GPT agent\nTask (str): A short description of the task for the GPT agent\nPrompt (str): The initial prompt for the GPT agent\nEXAMPLE: {'name': 'start_agent', 'args': {'name': 'Agent1', 'task': 'Research AI', 'prompt': 'Tell me about the history of artificial intelligence'}}"),
    },
    CommandSpec {
        label: "Message GPT Agent",
        name: "message_agent",
        args: &[arg("key", "<key>"), arg("message", "<message>")],
        help: Some("COMMAND: Message GPT Agent\nDESCRIPTION: Send a message to a specific GPT agent based on the agent's key\nARGUMENTS:\nKey (int): The key of the GPT agent to send the message to\nMessage (str): The message to send to the GPT agent\nEXAMPLE: {'name': 'message_agent', 'args': {'key': 1, 'message': 'What are the applications of machine learning in healthcare?'}}"),
    },
    CommandSpec {
        label: "List GPT Agents",
        name: "list_agents",
        args: &[],
        help: Some("COMMAND: List GPT Agents\nDESCRIPTION: List all the active GPT agents\nARGUMENTS: None\nEXAMPLE: {'name': 'list_agents', 'args': {}}"),
    },
    CommandSpec {
        label: "Delete GPT Agent",
        name: "delete_agent",
        args: &[arg("key", "<key>")],
        help: Some("COMMAND: Delete GPT Agent\nDESCRIPTION: Delete a specific GPT agent based on the agent's key\nARGUMENTS:\nKey (int): The key of the GPT agent to delete\nEXAMPLE: {'name': 'delete_agent', 'args': {'key': 1}}"),
    },
    CommandSpec {
        label: "Clone Repository",
        name: "clone_repository",
        args: &[arg("repository_url", "<url>"), arg("clone_path", "<directory>")],
        help: Some("COMMAND: Clone Repository\nDESCRIPTION: Clone a git repository to a specified directory\nARGUMENTS:\nRepository URL (str): The URL of the git repository to clone\nClone Path (str): The directory to clone the repository into\nEXAMPLE: {'name': 'clone_repository', 'args': {'repository_url': 'https://github.com/example/example.git', 'clone_path': 'example'}}"),
    },
    CommandSpec {
        label: "Write to file",
        name: "write_to_file",
        args: &[arg("file", "<file>"), arg("text", "<text>")],
        help: Some("COMMAND: Write to File\nDESCRIPTION: Write text to a specified file, overwriting any existing content\nARGUMENTS:\nFile (str): The path to the file to write to\nText (str): The text to write to the file\nEXAMPLE: {'name': 'write_to_file', 'args': {'file': 'notes/file.txt', 'text': 'Hello, World!'}}"),
    },
    CommandSpec {
        label: "Read file",
        name: "read_file",
        args: &[arg("file", "<file>")],
        help: Some("COMMAND: Read File\nDESCRIPTION: Read the content of a specified text file\nARGUMENTS:\nFile (str): The path to the file to read\nEXAMPLE: {'name': 'read_file', 'args': {'file': 'notes/file.txt'}}"),
    },
    CommandSpec {
        label: "Append to file",
        name: "append_to_file",
        args: &[arg("file", "<file>"), arg("text", "<text>")],
        help: Some("COMMAND: Append to File\nDESCRIPTION: Append text to a specified file\nARGUMENTS:\nFile (str): The path to the file to append to\nText (str): The text to append to the file\nEXAMPLE: {'name': 'append_to_file', 'args': {'file': 'notes/file.txt', 'text': '\\nNew line of text'}}"),
    },
    CommandSpec {
        label: "Delete file",
        name: "delete_file",
        args: &[arg("file", "<file>")],
        help: Some("COMMAND: Delete File\nDESCRIPTION: Delete a specified file, a list of files, or a wildcard pattern such as '*.txt'\nARGUMENTS:\nFile (str): The path to the file to delete\nEXAMPLE: {'name': 'delete_file', 'args': {'file': 'notes/file.txt'}}"),
    },
    CommandSpec {
        label: "Copy File",
        name: "copy_file",
        args: &[arg("source", "<source>"), arg("destination", "<destination>")],
        help: Some("COMMAND: Copy File\nDESCRIPTION: Copy a file, a list of files, or a wildcard pattern into a destination directory\nARGUMENTS:\nSource (str): The path to the source file\nDestination (str): The destination directory\nEXAMPLE: {'name': 'copy_file', 'args': {'source': 'source.txt', 'destination': 'backup'}}"),
    },
    CommandSpec {
        label: "Move File",
        name: "move_file",
        args: &[arg("source", "<source>"), arg("destination", "<destination>")],
        help: Some("COMMAND: Move File\nDESCRIPTION: Move a file, a list of files, or a wildcard pattern into a destination directory\nARGUMENTS:\nSource (str): The path to the source file\nDestination (str): The destination directory\nEXAMPLE: {'name': 'move_file', 'args': {'source': 'source.txt', 'destination': 'archive'}}"),
    },
    CommandSpec {
        label: "Rename File",
        name: "rename_file",
        args: &[arg("source", "<source>"), arg("destination", "<destination>")],
        help: Some("COMMAND: Rename File\nDESCRIPTION: Rename a file\nARGUMENTS:\nSource (str): The path to the source file\nDestination (str): The path to the renamed file\nEXAMPLE: {'name': 'rename_file', 'args': {'source': 'old_name.txt', 'destination': 'new_name.txt'}}"),
    },
    CommandSpec {
        label: "Search Files",
        name: "search_files",
        args: &[arg("directory", "<directory>")],
        help: Some("COMMAND: Search Files\nDESCRIPTION: Search for files in a specified directory, optionally only those containing a phrase\nARGUMENTS:\nDirectory (str): The path to the directory to search\nPhrase (str, optional): Text the files must contain\nEXAMPLE: {'name': 'search_files', 'args': {'directory': 'notes'}}"),
    },
    CommandSpec {
        label: "Create Directory",
        name: "create_directory",
        args: &[arg("directory", "<directory>")],
        help: Some("COMMAND: Create Directory\nDESCRIPTION: Create a new directory at a specified path\nARGUMENTS:\nDirectory (str): The path to the directory to create\nEXAMPLE: {'name': 'create_directory', 'args': {'directory': 'new_directory'}}"),
    },
    CommandSpec {
        label: "Evaluate Resources",
        name: "evaluate_resources",
        args: &[],
        help: Some("COMMAND: Evaluate Resources\nDESCRIPTION: Returns the number of files, the total size of all the files, how many files there are of each extension, top 10 keywords and their frequency across all the files, and a list of current files and folders\nARGUMENTS: None\nEXAMPLE: {'name': 'evaluate_resources', 'args': {}}"),
    },
    CommandSpec {
        label: "List Directories",
        name: "list_resources",
        args: &[],
        help: Some("COMMAND: List Resources\nDESCRIPTION: Lists the current files and folders\nARGUMENTS: None\nEXAMPLE: {'name': 'list_resources', 'args': {}}"),
    },
    CommandSpec {
        label: "Generate Image",
        name: "generate_image",
        args: &[arg("prompt", "<prompt>")],
        help: Some("COMMAND: Generate Image\nDESCRIPTION: Generate an image based on a specified prompt\nARGUMENTS:\nPrompt (str): The prompt for generating the image\nEXAMPLE: {'name': 'generate_image', 'args': {'prompt': 'A beautiful sunset over the ocean'}}"),
    },
    CommandSpec {
        label: "Get Filesystem Representation",
        name: "get_filesystem_representation",
        args: &[],
        help: Some("COMMAND: Get Filesystem Representation\nDESCRIPTION: Returns a directory tree of the whole filesystem\nARGUMENTS: None\nEXAMPLE: {'name': 'get_filesystem_representation', 'args': {}}"),
    },
    CommandSpec {
        label: "Evaluate Code",
        name: "evaluate_code",
        args: &[arg("code", "<full_code_string>")],
        help: Some("COMMAND: Evaluate Code\nDESCRIPTION: Analyzes the provided Python code for errors and potential improvements without executing it\nARGUMENTS:\nCode (str): The full code string to evaluate\nEXAMPLE: {'name': 'evaluate_code', 'args': {'code': 'def hello_world():\\n    print(\"Hello, World!\")'}}"),
    },
    CommandSpec {
        label: "Get Improved Code",
        name: "improve_code",
        args: &[arg("suggestions", "<list_of_suggestions>"), arg("code", "<full_code_string>")],
        help: Some("COMMAND: Improve Code\nDESCRIPTION: Suggest improvements for the provided Python code\nARGUMENTS:\nSuggestions (List): A list of suggestions to consider\nCode (str): The full code string to improve\nEXAMPLE: {'name': 'improve_code', 'args': {'suggestions': ['optimization', 'readability'], 'code': 'def hello_world():\\n    print(\"Hello, World!\")'}}"),
    },
    CommandSpec {
        label: "Write Tests",
        name: "write_tests",
        args: &[arg("code", "<full_code_string>"), optional("focus", "<list_of_focus_areas>")],
        help: Some("COMMAND: Write Tests\nDESCRIPTION: Write tests for the provided Python code, focusing on specified areas\nARGUMENTS:\nCode (str): The full code string to write tests for\nFocus (str): A list of focus areas for the tests\nEXAMPLE: {'name': 'write_tests', 'args': {'code': 'def hello_world():\\n    print(\"Hello, World!\")', 'focus': 'functionality, edge_cases'}}"),
    },
    CommandSpec {
        label: "Execute Python File",
        name: "execute_python_file",
        args: &[arg("file", "<file>")],
        help: Some("COMMAND: Execute Python File\nDESCRIPTION: Execute a specified Python file\nARGUMENTS:\nFile (str): The path to the Python file to execute\nEXAMPLE: {'name': 'execute_python_file', 'args': {'file': 'script.py'}}"),
    },
    CommandSpec {
        label: "Command Help",
        name: "help",
        args: &[arg("command", "<command>")],
        help: Some("COMMAND: Help\nDESCRIPTION: Get help with a command\nARGUMENTS:\nCommand (str): The command to get help with\nEXAMPLE: {'name': 'help', 'args': {'command': 'read_file'}}"),
    },
    CommandSpec {
        label: "List Commands",
        name: "list_commands",
        args: &[],
        help: Some("COMMAND: List Commands\nDESCRIPTION: List all available commands\nARGUMENTS: None\nEXAMPLE: {'name': 'list_commands', 'args': {}}"),
    },
    CommandSpec {
        label: "Convert Audio to text",
        name: "read_audio_from_file",
        args: &[arg("file", "<file>")],
        help: Some("COMMAND: Convert Audio to Text \nDESCRIPTION: Transcribe voice to text from an audio file\nARGUMENTS:\nFile (str): The path to the audio file to transcribe\nEXAMPLE: {'name': 'read_audio_from_file', 'args': {'file': 'speech.mp4'}}"),
    },
    CommandSpec {
        label: "Send Tweet",
        name: "send_tweet",
        args: &[arg("text", "<text>")],
        help: Some("COMMAND: Send Tweet\nDESCRIPTION: Send a Tweet\nARGUMENTS:\nText (str): The text of the tweet\nEXAMPLE: {'name': 'send_tweet', 'args': {'text': 'Hello humans!'}}"),
    },
];

const EXECUTE_SHELL: CommandSpec = CommandSpec {
    label: "Execute Shell Command, non-interactive commands only",
    name: "execute_shell",
    args: &[arg("command_line", "<command_line>")],
    help: Some("COMMAND: Execute Shell Command\nDESCRIPTION: Execute a non-interactive shell command\nARGUMENTS:\nCommand Line (str): The shell command to execute\nEXAMPLE: {'name': 'execute_shell', 'args': {'command_line': 'ls -la'}}"),
};

const TASK_COMPLETE: CommandSpec = CommandSpec {
    label: "Task Complete (Shutdown)",
    name: "task_complete",
    args: &[arg("reason", "<reason>")],
    help: Some("COMMAND: Task Complete (Shutdown)\nDESCRIPTION: Shutdown command that quits the program\nARGUMENTS:\nReason (str): The reason for shutting down the program\nEXAMPLE: {'name': 'task_complete', 'args': {'reason': 'All tasks completed'}}"),
};

/// Dispatchable but never listed to the model
const UNADVERTISED: &[CommandSpec] = &[
    CommandSpec {
        label: "Do Nothing",
        name: "do_nothing",
        args: &[],
        help: Some("COMMAND: Do Nothing\nDESCRIPTION: A command that does nothing\nARGUMENTS: None\nEXAMPLE: {'name': 'do_nothing', 'args': {}}"),
    },
    CommandSpec {
        label: "Get Text Summary",
        name: "get_text_summary",
        args: &[arg("url", "<url>"), arg("question", "<question>")],
        help: None,
    },
    CommandSpec {
        label: "Get Hyperlinks",
        name: "get_hyperlinks",
        args: &[arg("url", "<url>")],
        help: None,
    },
];

const SYNONYMS: &[(&str, &str)] = &[
    ("write_file", "write_to_file"),
    ("create_file", "write_to_file"),
    ("search", "google"),
];

/// Correct commonly hallucinated command names. Exact and case-sensitive.
pub fn map_command_synonyms(name: &str) -> &str {
    SYNONYMS
        .iter()
        .find(|(seen, _)| *seen == name)
        .map(|(_, actual)| *actual)
        .unwrap_or(name)
}

/// The command table for one run, fixed at construction
#[derive(Debug, Clone)]
pub struct CommandRegistry {
    commands: Vec<CommandSpec>,
}

impl CommandRegistry {
    /// `execute_shell` is advertised only when local commands are allowed
    pub fn new(execute_local_commands: bool) -> Self {
        let mut commands = ADVERTISED.to_vec();
        if execute_local_commands {
            commands.push(EXECUTE_SHELL);
        }
        commands.push(TASK_COMPLETE);
        Self { commands }
    }

    /// Advertised commands in prompt order
    pub fn all_commands(&self) -> &[CommandSpec] {
        &self.commands
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.commands.iter().map(|c| c.name).collect()
    }

    pub fn lookup(&self, name: &str) -> Option<&CommandSpec> {
        self.commands
            .iter()
            .chain(UNADVERTISED.iter())
            .find(|c| c.name == name)
    }

    pub fn help_text(&self, name: &str) -> String {
        self.lookup(name)
            .and_then(|c| c.help)
            .unwrap_or(NO_HELP)
            .to_string()
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new(false)
    }
}
