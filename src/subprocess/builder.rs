use crate::subprocess::ProcessCommand;

pub struct ProcessCommandBuilder {
    command: ProcessCommand,
}

impl ProcessCommandBuilder {
    pub fn new(program: &str) -> Self {
        Self {
            command: ProcessCommand {
                program: program.to_string(),
                args: Vec::new(),
                inherit_stdio: false,
            },
        }
    }

    pub fn arg(mut self, arg: &str) -> Self {
        self.command.args.push(arg.to_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.command
            .args
            .extend(args.into_iter().map(|s| s.as_ref().to_string()));
        self
    }

    /// Append `flag value` once per value, e.g. repeated `--filter` or `-v`
    pub fn repeated<I, S>(mut self, flag: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for value in values {
            self.command.args.push(flag.to_string());
            self.command.args.push(value.as_ref().to_string());
        }
        self
    }

    /// Attach the child to this process's terminal instead of capturing output
    pub fn inherit_stdio(mut self) -> Self {
        self.command.inherit_stdio = true;
        self
    }

    pub fn build(self) -> ProcessCommand {
        self.command
    }
}
