//! Voting mode chat lines: which entry is shown and how to move between
//! entries.

use limbo_proto::{Component, Uuid};
use serde_json::json;
use tracing::warn;

/// `Entry #i/n`, 1-based.
pub fn entry_line(index: usize, total: usize) -> Component {
    Component(json!({
        "text": format!("Entry #{}/{}", index + 1, total),
        "color": "yellow",
        "bold": true,
    }))
}

/// Fill `{uuid}` and `{token}` in the voting link template.
pub fn voting_link(template: &str, secret: &[u8], uuid: Uuid) -> Option<String> {
    match limbo_crypto::voting_token(secret, &uuid.as_bytes()) {
        Ok(token) => Some(
            template
                .replace("{uuid}", &uuid.simple())
                .replace("{token}", &token),
        ),
        Err(e) => {
            warn!("Cannot sign voting link: {e}");
            None
        }
    }
}

/// `[Previous] [Vote] [Next]`, each clickable. The vote button is left out
/// when there is no link.
pub fn navigation_line(link: Option<&str>) -> Component {
    let mut extra = vec![
        json!({
            "text": "[Previous]",
            "color": "gold",
            "clickEvent": { "action": "run_command", "value": "/prev" },
        }),
        json!({ "text": " " }),
    ];
    if let Some(link) = link {
        extra.push(json!({
            "text": "[Vote]",
            "color": "green",
            "bold": true,
            "clickEvent": { "action": "open_url", "value": link },
        }));
        extra.push(json!({ "text": " " }));
    }
    extra.push(json!({
        "text": "[Next]",
        "color": "gold",
        "clickEvent": { "action": "run_command", "value": "/next" },
    }));
    Component(json!({ "text": "", "extra": extra }))
}
