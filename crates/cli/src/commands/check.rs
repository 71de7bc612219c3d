//! `warden check`: evaluate the policy for one tool call.

use std::path::Path;
use warden_core::{CallOrigin, ToolCallRequest};
use warden_policy::{PolicyEngineConfig, PolicyVerdict, evaluate};

use super::load_config;

pub async fn run(
    explicit: Option<&Path>,
    tool: String,
    args: Option<String>,
    non_interactive: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(explicit).map_err(|e| format!("Failed to load config: {e}"))?;

    let mut policy = PolicyEngineConfig::from_settings(&config.policy)?;
    if non_interactive {
        policy = policy.non_interactive(true);
    }

    let request = build_request(tool, args.as_deref())?;
    let verdict = evaluate(&request, &policy);
    println!("{}", render(&request, &verdict));
    Ok(())
}

fn build_request(tool: String, args: Option<&str>) -> Result<ToolCallRequest, String> {
    let arguments = match args {
        Some(raw) => {
            serde_json::from_str(raw).map_err(|e| format!("Invalid arguments JSON: {e}"))?
        }
        None => serde_json::json!({}),
    };
    Ok(ToolCallRequest::new("cli-check", tool, arguments).with_origin(CallOrigin::Client))
}

fn render(request: &ToolCallRequest, verdict: &PolicyVerdict) -> String {
    let mut out = String::new();
    out.push_str(&format!("Tool:      {}\n", request.name));
    out.push_str(&format!("Arguments: {}\n", request.arguments));
    out.push_str(&format!("Decision:  {}\n", verdict.decision));
    out.push_str(&format!(
        "Rule:      {}\n",
        verdict.rule.as_deref().unwrap_or("(default)")
    ));
    out.push_str(&format!("Reason:    {}", verdict.message));
    if verdict.coerced {
        out.push_str("\nNote:      ask_user became deny (non-interactive)");
    }
    out
}
