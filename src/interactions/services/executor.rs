//! Command execution engine.
//!
//! Binding and precondition evaluation always run on the caller's task, so
//! their failures reach the caller in either run mode. What follows is the
//! unit of work: module construction, the before hook, the handler body,
//! the after hook and disposal of the module instance. In sync mode the
//! caller awaits it; in async mode it is spawned and only the execution
//! report observes its result.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures_util::FutureExt;
use mockable::Clock;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, trace, warn};

use crate::interactions::domain::{
    Arguments, CommandInfo, ErrorKind, ExecutionReport, HandlerError, HandlerInvocation,
    InteractionContext, InteractionError, InteractionResult, RunMode,
};
use crate::interactions::ports::ServiceResolver;

use super::binding::{BindingInputs, bind_arguments};
use super::preconditions::check_preconditions;

/// Errors returned by dispatch entry points.
#[derive(Debug, Clone, Error)]
pub enum DispatchError {
    /// A hook or handler faulted during an inline dispatch and the service
    /// is configured to propagate faults.
    #[error("command '{command}' faulted: {cause}")]
    Fault {
        /// Display path of the faulted command.
        command: String,
        /// Message of the innermost error behind the fault.
        cause: String,
        /// The fault as raised; [`HandlerError::root_cause`] reaches the
        /// innermost error for downcasting.
        fault: HandlerError,
    },
}

impl DispatchError {
    /// Wraps a fault raised by `command`, unwrapped to its root cause.
    pub(crate) fn fault(command: String, fault: HandlerError) -> Self {
        Self::Fault {
            command,
            cause: fault.root_cause().to_string(),
            fault,
        }
    }
}

/// Result type for dispatch operations.
pub type DispatchResult = Result<InteractionResult, DispatchError>;

/// Publishes execution reports stamped by the injected clock.
pub(crate) struct Reporter<C> {
    clock: Arc<C>,
    sender: broadcast::Sender<ExecutionReport>,
}

impl<C> Clone for Reporter<C> {
    fn clone(&self) -> Self {
        Self {
            clock: Arc::clone(&self.clock),
            sender: self.sender.clone(),
        }
    }
}

impl<C: Clock + Send + Sync> Reporter<C> {
    pub(crate) const fn new(clock: Arc<C>, sender: broadcast::Sender<ExecutionReport>) -> Self {
        Self { clock, sender }
    }

    pub(crate) fn now(&self) -> DateTime<Utc> {
        self.clock.utc()
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<ExecutionReport> {
        self.sender.subscribe()
    }

    fn publish(
        &self,
        command: Arc<CommandInfo>,
        context: InteractionContext,
        result: InteractionResult,
        started_at: DateTime<Utc>,
    ) {
        let report = ExecutionReport {
            command,
            context,
            result,
            started_at,
            completed_at: self.clock.utc(),
        };
        if self.sender.send(report).is_err() {
            trace!("execution report dropped without subscribers");
        }
    }
}

/// Runs routed commands under the configured run mode.
pub(crate) struct CommandExecutor<C> {
    reporter: Reporter<C>,
    default_run_mode: RunMode,
    throw_on_error: bool,
}

impl<C> CommandExecutor<C>
where
    C: Clock + Send + Sync + 'static,
{
    pub(crate) const fn new(
        reporter: Reporter<C>,
        default_run_mode: RunMode,
        throw_on_error: bool,
    ) -> Self {
        Self {
            reporter,
            default_run_mode,
            throw_on_error,
        }
    }

    pub(crate) const fn reporter(&self) -> &Reporter<C> {
        &self.reporter
    }

    /// Binds, checks and runs `command` for `context`.
    pub(crate) async fn execute(
        &self,
        command: Arc<CommandInfo>,
        context: InteractionContext,
        inputs: BindingInputs,
        services: Arc<dyn ServiceResolver>,
    ) -> DispatchResult {
        let started_at = self.reporter.now();

        if !command.kind().accepts(context.interaction()) {
            let result = InteractionResult::error(
                ErrorKind::ParseFailed,
                format!(
                    "{} command '{}' cannot handle a {} interaction",
                    command.kind(),
                    command.display_path(),
                    context.kind()
                ),
            );
            debug!(command = %command.display_path(), "interaction kind mismatch");
            self.reporter
                .publish(command, context, result.clone(), started_at);
            return Ok(result);
        }

        let prepared = match bind_arguments(&command, &context, inputs).await {
            Ok(arguments) => check_preconditions(&command, &context, &arguments, services.as_ref())
                .await
                .map(|()| arguments),
            Err(result) => Err(result),
        };
        let arguments = match prepared {
            Ok(arguments) => arguments,
            Err(result) => {
                self.reporter
                    .publish(command, context, result.clone(), started_at);
                return Ok(result);
            }
        };

        match command.run_mode().unwrap_or(self.default_run_mode) {
            RunMode::Sync => {
                let result = run_unit(&command, &context, arguments, services).await;
                let propagated = result
                    .as_error()
                    .and_then(InteractionError::fault)
                    .cloned();
                let display = command.display_path();
                self.reporter
                    .publish(command, context, result.clone(), started_at);
                match propagated {
                    Some(fault) if self.throw_on_error => Err(DispatchError::fault(display, fault)),
                    _ => Ok(result),
                }
            }
            RunMode::Async => {
                let reporter = self.reporter.clone();
                tokio::spawn(async move {
                    let result = run_unit(&command, &context, arguments, services).await;
                    reporter.publish(command, context, result, started_at);
                });
                Ok(InteractionResult::Success)
            }
        }
    }
}

/// Constructs the module, runs the hooks around the handler body and drops
/// the instance.
async fn run_unit(
    command: &CommandInfo,
    context: &InteractionContext,
    arguments: Arguments,
    services: Arc<dyn ServiceResolver>,
) -> InteractionResult {
    let constructed = guarded(async { (command.factory())(services.as_ref()) }).await;
    let module = match constructed {
        Ok(module) => module,
        Err(fault) => return fault_result(command, fault),
    };

    let result = match guarded(module.run_before(context, command)).await {
        Err(fault) => fault_result(command, fault),
        Ok(()) => {
            let invocation = HandlerInvocation {
                module: Arc::clone(&module),
                context: context.clone(),
                arguments,
                services,
            };
            match guarded((command.handler())(invocation)).await {
                Ok(outcome) => outcome.into_result(),
                Err(fault) => fault_result(command, fault),
            }
        }
    };

    let after = guarded(module.run_after(context, command, &result)).await;
    drop(module);

    match after {
        Err(fault) if !carries_fault(&result) => fault_result(command, fault),
        _ => result,
    }
}

/// Awaits `future`, turning a panic into a fault.
pub(crate) async fn guarded<T, F>(future: F) -> Result<T, HandlerError>
where
    F: Future<Output = Result<T, HandlerError>>,
{
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .unwrap_or_else(|payload| Err(HandlerError::from_panic(payload.as_ref())))
}

fn fault_result(command: &CommandInfo, fault: HandlerError) -> InteractionResult {
    warn!(
        command = %command.display_path(),
        method = command.method_name(),
        error = %fault,
        panicked = fault.is_panic(),
        "command faulted"
    );
    InteractionResult::from_fault(fault)
}

fn carries_fault(result: &InteractionResult) -> bool {
    result
        .as_error()
        .is_some_and(|error| error.fault().is_some())
}
