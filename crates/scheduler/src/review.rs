//! When does a call have to wait for a human?

use warden_config::ApprovalMode;
use warden_core::{PolicyDecision, Tool, ToolKind};

/// Whether a call with this policy decision must be reviewed before it runs.
///
/// `AskUser` always waits. An allowed call waits only when the tool asks
/// for review, the approval mode does not waive it and the reviewer has not
/// already allowed the tool for the session. Non-interactive sessions never
/// wait: nobody is there to answer.
pub(crate) fn requires_approval(
    decision: PolicyDecision,
    tool: &dyn Tool,
    mode: ApprovalMode,
    non_interactive: bool,
    always_allowed: bool,
) -> bool {
    match decision {
        PolicyDecision::AskUser => !non_interactive,
        PolicyDecision::Deny => false,
        PolicyDecision::Allow => {
            if non_interactive || always_allowed || !tool.requires_review() {
                return false;
            }
            match mode {
                ApprovalMode::Default => true,
                ApprovalMode::AutoEdit => tool.kind() != ToolKind::Edit,
                ApprovalMode::Yolo => false,
            }
        }
    }
}
