use anyhow::{Context, Result};
use pivot_protocol::{ClientCommand, ClientMessage, GlobalMessage, parse_global_message};

use crate::config::LOGIN_URL;
use crate::connection::Connection;

/// Log in with a registered account.
///
/// Waits for the server's challenge string, trades it for an assertion at the
/// login server, sends `/trn` and waits for the server to confirm the name.
/// Returns the confirmed username.
pub async fn login(connection: &mut Connection, username: &str, password: &str) -> Result<String> {
    let challstr = wait_for_challstr(connection).await?;

    let assertion = authenticate(username, password, &challstr).await?;

    let login_message = ClientMessage {
        room_id: None,
        command: ClientCommand::TrustedLogin {
            username: username.to_string(),
            assertion,
        },
    };
    connection.send(login_message).await?;

    let confirmed = wait_for_login_confirmation(connection).await?;
    tracing::info!(username = %confirmed, "Logged in");
    Ok(confirmed)
}

/// Every global message in the next frame
async fn next_global_messages(connection: &mut Connection, waiting_for: &str) -> Result<Vec<GlobalMessage>> {
    let frame = connection
        .next_frame()
        .await?
        .with_context(|| format!("Connection closed while waiting for {}", waiting_for))?;

    Ok(frame
        .lines
        .iter()
        .filter_map(|line| parse_global_message(line).ok())
        .collect())
}

/// Wait for the challstr message from the server
async fn wait_for_challstr(connection: &mut Connection) -> Result<String> {
    loop {
        for message in next_global_messages(connection, "challstr").await? {
            if let GlobalMessage::Challstr(challstr) = message {
                return Ok(challstr);
            }
        }
    }
}

/// Wait for a named updateuser after login
async fn wait_for_login_confirmation(connection: &mut Connection) -> Result<String> {
    loop {
        for message in next_global_messages(connection, "login confirmation").await? {
            match message {
                GlobalMessage::UpdateUser {
                    username,
                    named: true,
                    ..
                } => return Ok(username),
                GlobalMessage::NameTaken { message, .. } => {
                    anyhow::bail!("Login failed: {}", message)
                }
                GlobalMessage::Popup(message) => {
                    tracing::warn!(%message, "Server popup during login");
                }
                _ => {}
            }
        }
    }
}

/// Authenticate with the Pokemon Showdown login server
async fn authenticate(username: &str, password: &str, challstr: &str) -> Result<String> {
    let client = reqwest::Client::new();

    let response = client
        .post(LOGIN_URL)
        .form(&[("name", username), ("pass", password), ("challstr", challstr)])
        .send()
        .await
        .context("Failed to send login request")?;

    let body = response.text().await.context("Failed to read login response")?;
    parse_login_response(&body)
}

/// Extract the assertion from a login server reply of the form `]{json}`
fn parse_login_response(body: &str) -> Result<String> {
    let json_str = body
        .strip_prefix(']')
        .context("Invalid login response format")?;

    let json: serde_json::Value =
        serde_json::from_str(json_str).context("Failed to parse login response")?;

    let assertion = json
        .get("assertion")
        .and_then(|v| v.as_str())
        .context("No assertion in login response")?;

    if json.get("actionsuccess").and_then(|v| v.as_bool()) != Some(true) {
        anyhow::bail!("Login failed: {}", assertion.trim_start_matches(";;"));
    }
    if let Some(error) = assertion.strip_prefix(";;") {
        anyhow::bail!("Login failed: {}", error);
    }

    Ok(assertion.to_string())
}
