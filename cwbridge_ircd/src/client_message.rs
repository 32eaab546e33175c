use crate::errors::ParseError;

use std::fmt;

/// Lines are split into at most this many space-separated tokens; the last
/// token keeps the remainder of the line as-is.
const MAX_TOKENS: usize = 15;

/// A single line of the client protocol, tokenised into its parts
#[derive(Debug,Clone,PartialEq,Eq)]
pub struct ProtocolMessage
{
    /// The sender prefix, without its leading `:`
    pub prefix: Option<String>,
    /// The command or numeric
    pub command: String,
    /// The list of arguments. Only the last one may contain spaces.
    pub args: Vec<String>,
}

impl ProtocolMessage
{
    /// Create a message with no prefix and no arguments
    pub fn new(command: impl ToString) -> Self
    {
        Self {
            prefix: None,
            command: command.to_string(),
            args: Vec::new(),
        }
    }

    /// Set the sender prefix
    pub fn with_prefix(mut self, prefix: impl ToString) -> Self
    {
        self.prefix = Some(prefix.to_string());
        self
    }

    /// Append an argument
    pub fn with_arg(mut self, arg: impl ToString) -> Self
    {
        self.args.push(arg.to_string());
        self
    }

    /// The argument at `index`, if present
    pub fn arg(&self, index: usize) -> Option<&str>
    {
        self.args.get(index).map(String::as_str)
    }

    /// Tokenise a line received from a client
    pub fn parse(raw: &str) -> Result<Self, ParseError>
    {
        if raw.is_empty() {
            return Err(ParseError::Empty);
        }

        let mut tokens = raw.splitn(MAX_TOKENS, ' ');
        let first = tokens.next().ok_or(ParseError::Empty)?;

        let (prefix, command) = match first.strip_prefix(':') {
            Some(prefix) => {
                let command = tokens.next().ok_or_else(|| ParseError::MissingCommand(raw.to_string()))?;
                (Some(prefix.to_string()), command)
            }
            None => (None, first),
        };

        if command.is_empty() {
            return Err(ParseError::MissingCommand(raw.to_string()));
        }

        let rest: Vec<&str> = tokens.collect();
        let mut args = Vec::new();

        for (i, token) in rest.iter().enumerate() {
            if token.starts_with(':') {
                // Everything from here on is a single argument. Joining on ' '
                // reproduces the original text since we split on single spaces.
                let trailing = rest[i..].join(" ");
                args.push(trailing[1..].to_string());
                break;
            }
            args.push(token.to_string());
        }

        Ok(Self {
            prefix,
            command: command.to_string(),
            args,
        })
    }
}

/// Formats the message as a protocol line, without the line terminator.
///
/// The final argument is always written in trailing form, so it may contain
/// spaces; all others must be single non-empty tokens not starting with `:`.
impl fmt::Display for ProtocolMessage
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        if let Some(prefix) = &self.prefix {
            write!(f, ":{} ", prefix)?;
        }

        f.write_str(&self.command)?;

        if let Some((last, middle)) = self.args.split_last() {
            for arg in middle {
                write!(f, " {}", arg)?;
            }
            write!(f, " :{}", last)?;
        }

        Ok(())
    }
}
