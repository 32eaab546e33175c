use crate::ProtocolMessage;

/// Start a numeric reply addressed to `nick`, or to `*` if no nickname has
/// been set yet
fn numeric(server_name: &str, code: &str, nick: &str) -> ProtocolMessage
{
    let target = if nick.is_empty() { "*" } else { nick };
    ProtocolMessage::new(code).with_prefix(server_name).with_arg(target)
}

// 001
pub fn welcome(server_name: &str, nick: &str) -> ProtocolMessage
{
    numeric(server_name, "001", nick).with_arg("Welcome to the Internet Relay Network")
}

// 376
pub fn end_of_motd(server_name: &str, nick: &str) -> ProtocolMessage
{
    numeric(server_name, "376", nick).with_arg("End of MOTD")
}

// 331
pub fn no_topic(server_name: &str, nick: &str, channel: &str) -> ProtocolMessage
{
    numeric(server_name, "331", nick).with_arg(channel).with_arg("No topic is set")
}

// 353
pub fn names_reply(server_name: &str, nick: &str, channel: &str, names: &str) -> ProtocolMessage
{
    numeric(server_name, "353", nick).with_arg("=").with_arg(channel).with_arg(names)
}

// 366
pub fn end_of_names(server_name: &str, nick: &str, channel: &str) -> ProtocolMessage
{
    numeric(server_name, "366", nick).with_arg(channel).with_arg("End of NAMES list")
}

// 451
pub fn not_registered(server_name: &str, nick: &str) -> ProtocolMessage
{
    numeric(server_name, "451", nick).with_arg("You have not registered")
}

// 461
pub fn not_enough_parameters(server_name: &str, nick: &str, command: &str) -> ProtocolMessage
{
    numeric(server_name, "461", nick).with_arg(command).with_arg("Not enough parameters")
}

// 462
pub fn already_registered(server_name: &str, nick: &str) -> ProtocolMessage
{
    numeric(server_name, "462", nick).with_arg("You may not reregister")
}
