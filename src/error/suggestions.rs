//! Context-aware error suggestions.
//!
//! Complements the static suggestions in [`ErrorCode::suggestion`] with text
//! that names the nodes involved.

use serde_json::Value;

use super::codes::ErrorCode;

/// Generate a suggestion for an error, using its JSON context when present.
pub fn suggest_for_error(code: ErrorCode, context: Option<&Value>) -> String {
    let field = |key: &str| {
        context
            .and_then(|c| c.get(key))
            .and_then(Value::as_str)
            .map(str::to_string)
    };

    match code {
        ErrorCode::NodeNotFound => match field("node_id") {
            Some(id) => format!(
                "Node '{id}' is not in this scope. Run `st node list` or check --scope"
            ),
            None => code.suggestion().to_string(),
        },
        ErrorCode::NotAvailable => match field("node_id") {
            Some(id) => format!(
                "Node '{id}' is locked. Run `st node show {id}` to see which prerequisites are unmet"
            ),
            None => code.suggestion().to_string(),
        },
        ErrorCode::WouldInvalidateChild => match field("child_id") {
            Some(child) => format!(
                "Node '{child}' depends on these points. Refund '{child}' first: `st refund {child}`"
            ),
            None => code.suggestion().to_string(),
        },
        ErrorCode::GraphCycle => suggest_cycle(context),
        _ => code.suggestion().to_string(),
    }
}

fn suggest_cycle(context: Option<&Value>) -> String {
    let cycle: Option<Vec<&str>> = context
        .and_then(|c| c.get("path"))
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_str).collect());

    match cycle {
        Some(path) if path.len() >= 2 => format!(
            "Prerequisites loop: {}\nUnlink one edge, e.g. `st edge unlink {} {}`",
            path.join(" -> "),
            path[0],
            path[1]
        ),
        _ => ErrorCode::GraphCycle.suggestion().to_string(),
    }
}
