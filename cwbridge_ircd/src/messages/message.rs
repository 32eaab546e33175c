use crate::ProtocolMessage;

pub fn join(nick: &str, channel: &str) -> ProtocolMessage
{
    ProtocolMessage::new("JOIN").with_prefix(nick).with_arg(channel)
}

pub fn privmsg(source: &str, target: &str, text: &str) -> ProtocolMessage
{
    ProtocolMessage::new("PRIVMSG").with_prefix(source).with_arg(target).with_arg(text)
}

pub fn pong(server_name: &str, cookie: &str) -> ProtocolMessage
{
    ProtocolMessage::new("PONG").with_prefix(server_name).with_arg(server_name).with_arg(cookie)
}

pub fn error(text: &str) -> ProtocolMessage
{
    ProtocolMessage::new("ERROR").with_arg(text)
}
