/// One parsed command line: program words plus the trailing redirections and
/// background marker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandDescriptor {
    pub args: Vec<String>,
    pub input: Option<String>,
    pub output: Option<String>,
    pub background: bool,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Noop,
    Cd(Option<String>),
    Status,
    Exit,
    External(CommandDescriptor),
}

impl CommandDescriptor {
    /// Builds a descriptor from a raw line. Never fails; malformed trailing
    /// tokens are taken as-is by the positional redirection rule.
    pub fn parse(line: &str, max_args: usize) -> Self {
        let line = line.strip_suffix('\n').unwrap_or(line);
        let line = line.strip_suffix('\r').unwrap_or(line);

        let mut args: Vec<String> = line
            .split(' ')
            .filter(|word| !word.is_empty())
            .take(max_args)
            .map(str::to_string)
            .collect();

        let mut desc = CommandDescriptor::default();

        if args.last().map(String::as_str) == Some("&") {
            desc.background = true;
            args.pop();
        }

        let input_offset = redirect_offset(&args, "<");
        let output_offset = redirect_offset(&args, ">");

        if let Some(offset) = input_offset {
            desc.input = Some(args[args.len() - offset].clone());
        }
        if let Some(offset) = output_offset {
            desc.output = Some(args[args.len() - offset].clone());
        }

        // drop the operator and path, plus anything after the farther one
        let strip = input_offset.max(output_offset).map_or(0, |o| o + 1);
        args.truncate(args.len() - strip);

        desc.args = args;
        desc
    }

    pub fn program(&self) -> Option<&str> {
        self.args.first().map(String::as_str)
    }

    pub fn is_noop(&self) -> bool {
        match self.program() {
            None => true,
            Some(word) => word.starts_with('#'),
        }
    }
}

/// Only the fourth-from-last and second-from-last words are checked.
fn redirect_offset(args: &[String], op: &str) -> Option<usize> {
    let len = args.len();
    if len > 4 && args[len - 4] == op {
        Some(3)
    } else if len > 2 && args[len - 2] == op {
        Some(1)
    } else {
        None
    }
}

impl Command {
    pub fn parse(line: &str, max_args: usize) -> Self {
        Self::from(CommandDescriptor::parse(line, max_args))
    }
}

impl From<CommandDescriptor> for Command {
    fn from(desc: CommandDescriptor) -> Self {
        if desc.is_noop() {
            return Command::Noop;
        }

        match desc.args[0].as_str() {
            "cd" => Command::Cd(desc.args.get(1).cloned()),
            "status" => Command::Status,
            "exit" => Command::Exit,
            _ => Command::External(desc),
        }
    }
}
