//! Global (non-battle) messages needed to log in and discover battle rooms

use crate::ParseError;
use anyhow::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomType {
    Chat,
    Battle,
}

/// Messages outside battle rooms that the client reacts to
#[derive(Debug, Clone, PartialEq)]
pub enum GlobalMessage {
    Challstr(String),
    UpdateUser {
        username: String,
        named: bool,
        avatar: String,
    },
    NameTaken {
        username: String,
        message: String,
    },
    Popup(String),
    Init(RoomType),
    DeInit,
    Raw(String),
}

/// Parse a single non-battle line into a GlobalMessage
pub fn parse_global_message(line: &str) -> Result<GlobalMessage> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.is_empty() {
        return Err(ParseError::EmptyMessage.into());
    }

    if !line.starts_with('|') {
        return Ok(GlobalMessage::Raw(line.to_string()));
    }

    let parts: Vec<&str> = line.split('|').collect();

    match parts.get(1).copied().unwrap_or("") {
        "challstr" => parse_challstr(&parts),
        "updateuser" => parse_updateuser(&parts),
        "nametaken" => parse_nametaken(&parts),
        "popup" => parse_popup(&parts),
        "init" => parse_init(&parts),
        "deinit" => Ok(GlobalMessage::DeInit),
        _ => Ok(GlobalMessage::Raw(line.to_string())),
    }
}

fn parse_challstr(parts: &[&str]) -> Result<GlobalMessage> {
    if parts.len() < 3 {
        return Err(ParseError::MissingField("challstr value".to_string()).into());
    }

    // CHALLSTR can contain | characters, so join everything after parts[1]
    let challstr = parts[2..].join("|");
    if challstr.is_empty() {
        return Err(ParseError::InvalidFormat("challstr cannot be empty".to_string()).into());
    }

    Ok(GlobalMessage::Challstr(challstr))
}

fn parse_updateuser(parts: &[&str]) -> Result<GlobalMessage> {
    if parts.len() < 4 {
        return Err(ParseError::MissingField("updateuser fields".to_string()).into());
    }

    // The username carries its rank symbol (" " for regular users) as a prefix
    let username = parts[2]
        .trim_start_matches(|c: char| !c.is_alphanumeric())
        .to_string();
    let named = parts[3] == "1";
    let avatar = parts.get(4).unwrap_or(&"").to_string();

    Ok(GlobalMessage::UpdateUser {
        username,
        named,
        avatar,
    })
}

fn parse_nametaken(parts: &[&str]) -> Result<GlobalMessage> {
    if parts.len() < 4 {
        return Err(ParseError::MissingField("nametaken fields".to_string()).into());
    }

    Ok(GlobalMessage::NameTaken {
        username: parts[2].to_string(),
        message: parts[3..].join("|"),
    })
}

fn parse_popup(parts: &[&str]) -> Result<GlobalMessage> {
    if parts.len() < 3 {
        return Err(ParseError::MissingField("popup message".to_string()).into());
    }

    // MESSAGE can contain | characters
    Ok(GlobalMessage::Popup(parts[2..].join("|")))
}

fn parse_init(parts: &[&str]) -> Result<GlobalMessage> {
    if parts.len() < 3 {
        return Err(ParseError::MissingField("init fields".to_string()).into());
    }

    let room_type = match parts[2] {
        "chat" => RoomType::Chat,
        "battle" => RoomType::Battle,
        _ => return Err(ParseError::InvalidFormat(format!("unknown room type: {}", parts[2])).into()),
    };

    Ok(GlobalMessage::Init(room_type))
}
