//! Turning suspension records into decisions.

use tracing::{debug, warn};

use crate::catalog::AuthorizationWaiter;
use crate::interrupt::{AuthorizationHandle, Decision, Suspension};
use crate::ui::input::{parse_confirmation, LineSource};
use crate::ui::render::RenderSink;

pub const APPROVAL_PROMPT: &str = "Do you approve this tool call? [y/n] ";

/// Resolves suspensions by waiting on consent flows or asking the user.
///
/// Resolution never fails: anything that goes wrong becomes a denial.
pub struct DecisionChannel<'a> {
    waiter: &'a dyn AuthorizationWaiter,
    sink: &'a dyn RenderSink,
    input: &'a mut dyn LineSource,
}

impl<'a> DecisionChannel<'a> {
    pub fn new(
        waiter: &'a dyn AuthorizationWaiter,
        sink: &'a dyn RenderSink,
        input: &'a mut dyn LineSource,
    ) -> Self {
        Self {
            waiter,
            sink,
            input,
        }
    }

    pub async fn resolve(&mut self, suspension: &Suspension) -> Decision {
        let decision = match suspension {
            Suspension::AuthorizationRequired {
                tool_name,
                authorization,
            } => self.await_authorization(tool_name, authorization).await,
            Suspension::HumanApprovalRequired { tool_name, input } => {
                self.ask_approval(tool_name, input).await
            }
            Suspension::Unrecognized => Decision::denied(),
        };
        debug!(
            cause = suspension.cause(),
            authorized = decision.authorized,
            "suspension resolved"
        );
        decision
    }

    /// Resolve each record in order, one wait at a time.
    pub async fn resolve_all(&mut self, suspensions: &[Suspension]) -> Vec<Decision> {
        let mut decisions = Vec::with_capacity(suspensions.len());
        for suspension in suspensions {
            decisions.push(self.resolve(suspension).await);
        }
        decisions
    }

    async fn await_authorization(
        &mut self,
        tool_name: &str,
        handle: &AuthorizationHandle,
    ) -> Decision {
        self.sink
            .activity(&format!("authorization required for tool call {tool_name}"));
        self.sink.detail(&handle.url);
        self.sink.activity("waiting for you to complete authorization…");

        match self.waiter.wait_for_completion(handle).await {
            Ok(()) => {
                self.sink.activity("authorization granted, resuming");
                Decision::granted()
            }
            Err(e) => {
                warn!(tool = tool_name, error = %e, "authorization did not complete");
                self.sink
                    .error(&format!("authorization for {tool_name} failed: {e}"));
                Decision::denied()
            }
        }
    }

    async fn ask_approval(&mut self, tool_name: &str, input: &serde_json::Value) -> Decision {
        self.sink
            .activity(&format!("approval required for tool call {tool_name}"));
        let pretty = serde_json::to_string_pretty(input).unwrap_or_else(|_| input.to_string());
        self.sink.approval_block(&pretty);

        match self.input.read_line(APPROVAL_PROMPT).await {
            Ok(Some(answer)) if parse_confirmation(&answer) => Decision::granted(),
            Ok(_) => Decision::denied(),
            Err(e) => {
                warn!(tool = tool_name, error = %e, "failed to read approval answer");
                self.sink.warn("could not read an answer; treating it as no");
                Decision::denied()
            }
        }
    }
}
