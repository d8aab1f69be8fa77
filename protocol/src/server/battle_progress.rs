//! Messages that move the battle along: requests, turns and the result

use super::BattleMessage;
use super::fields::Fields;
use super::request::BattleRequest;
use crate::ParseError;

/// |request|JSON
///
/// An empty body is a valid "nothing to decide" request.
pub fn parse_request(fields: Fields) -> Result<BattleMessage, ParseError> {
    let json = fields.rest(2);
    if json.trim().is_empty() {
        return Ok(BattleMessage::Request(Box::default()));
    }

    let request: BattleRequest = serde_json::from_str(&json)
        .map_err(|e| ParseError::InvalidFormat(format!("invalid request json: {}", e)))?;
    Ok(BattleMessage::Request(Box::new(request)))
}

pub fn parse_turn(fields: Fields) -> Result<BattleMessage, ParseError> {
    Ok(BattleMessage::Turn(fields.number(2, "turn number")?))
}

/// |win|USER
pub fn parse_win(fields: Fields) -> Result<BattleMessage, ParseError> {
    Ok(BattleMessage::Win(fields.text(2)))
}

/// |error|MESSAGE, where MESSAGE may itself contain pipes
pub fn parse_error(fields: Fields) -> Result<BattleMessage, ParseError> {
    Ok(BattleMessage::Error(fields.rest(2)))
}

/// |pm|SENDER|RECIPIENT|MESSAGE
pub fn parse_pm(fields: Fields) -> Result<BattleMessage, ParseError> {
    Ok(BattleMessage::Pm {
        sender: fields.text(2).trim().to_string(),
        recipient: fields.text(3).trim().to_string(),
        message: fields.rest(4),
    })
}
