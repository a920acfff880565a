//! The Covey workflow core — history reduction, delegation routing, and the
//! supervisor loop.
//!
//! One run follows a **delegate → bubble → report** cycle:
//!
//! 1. The supervisor model sees its scoped view of the shared log and either
//!    delegates via a `delegate_to_<agent>` tool call or terminates via
//!    `provide_final_answer`.
//! 2. A delegation opens an isolated bubble: the named sub-agent runs its
//!    own think-act-observe loop on a fresh log it alone can see.
//! 3. The bubble reports back as exactly one Tool message paired with the
//!    originating call id, and control returns to the supervisor.
//!
//! The loop ends when a final answer appears or the step budget runs out.

pub mod answer;
pub mod bubble;
pub mod history;
pub mod react;
pub mod registry;
pub mod router;
pub mod supervisor;

#[cfg(test)]
pub mod test_helpers;

pub use bubble::{BubbleReport, format_task};
pub use history::{ReducedView, reduce};
pub use react::{SubAgentOutcome, SubAgentRunner};
pub use registry::{AgentRegistry, AgentSpec, default_agent_prompt, default_supervisor_prompt};
pub use router::{
    DELEGATE_PREFIX, Delegation, FINAL_ANSWER_TOOL, RouteDecision, RouteError, normalize, route,
};
pub use supervisor::{ORCHESTRATOR, RunOutcome, RunReport, Supervisor};
