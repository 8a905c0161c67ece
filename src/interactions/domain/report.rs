//! Post-execution notifications.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::{CommandInfo, InteractionContext, InteractionResult};

/// Emitted once for every dispatch that reached a command, whatever the
/// run mode.
#[derive(Debug, Clone)]
pub struct ExecutionReport {
    /// The command that was dispatched.
    pub command: Arc<CommandInfo>,
    /// The originating context.
    pub context: InteractionContext,
    /// The real outcome.
    pub result: InteractionResult,
    /// When dispatch reached the command.
    pub started_at: DateTime<Utc>,
    /// When the outcome was known.
    pub completed_at: DateTime<Utc>,
}
