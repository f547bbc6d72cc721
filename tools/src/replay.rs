//! Drive a `LifecycleHandler` through a script on its logical clock.

use crate::recorder::{Observation, RecordingController};
use crate::script::{Script, Step};
use imegate_core::{HandlerConfig, LifecycleHandler};
use serde::Serialize;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;
use tracing::debug;

/// A downstream call tagged with the step that caused it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceLine {
    pub step: usize,
    pub op: &'static str,
    /// Logical time after the step completed.
    pub at_ms: u64,
    pub observation: Observation,
}

impl fmt::Display for TraceLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:>6}ms] #{} {}: {}",
            self.at_ms, self.step, self.op, self.observation
        )
    }
}

/// Replay `script` against a fresh recording controller.
///
/// Work posted with zero delay runs at the end of the step that posted it,
/// as it would once control returns to the host's event loop.
pub fn replay(script: &Script, config: HandlerConfig) -> Vec<TraceLine> {
    let controller = Rc::new(RefCell::new(RecordingController::new()));
    let mut handler = LifecycleHandler::new(&controller, config);
    let mut trace = Vec::new();

    for (index, step) in script.steps.iter().enumerate() {
        apply(&mut handler, step);
        handler.run_pending();

        let at_ms = u64::try_from(handler.now().as_millis()).unwrap_or(u64::MAX);
        let observations = controller.borrow().drain();
        debug!(
            "step {} ({}) produced {} call(s)",
            index,
            step.op(),
            observations.len()
        );
        trace.extend(observations.into_iter().map(|observation| TraceLine {
            step: index,
            op: step.op(),
            at_ms,
            observation,
        }));
    }
    trace
}

fn apply(handler: &mut LifecycleHandler<RecordingController>, step: &Step) {
    match step {
        Step::BeginReconfiguration => handler.begin_reconfiguration(),
        Step::Start {
            context,
            restarting,
        } => handler.on_session_start(context, *restarting),
        Step::StartView {
            context,
            restarting,
        } => handler.on_session_start_view(context, *restarting),
        Step::FinishView { finishing_session } => handler.on_finish_view(*finishing_session),
        Step::Finish => handler.on_finish_session(),
        Step::Advance { ms } => {
            handler.advance_by(Duration::from_millis(*ms));
        }
        Step::Post { event, delay_ms } => {
            handler.post(event.clone(), Duration::from_millis(*delay_ms));
        }
        Step::Cancel { kind } => handler.cancel(*kind),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ops_and_calls(trace: &[TraceLine]) -> Vec<String> {
        trace
            .iter()
            .map(|line| format!("{} {}", line.op, line.observation))
            .collect()
    }

    #[test]
    fn orientation_change_script_collapses_to_one_transition() {
        let script = Script::from_toml_str(
            r#"
            [[step]]
            op = "begin_reconfiguration"

            [[step]]
            op = "finish_view"
            finishing_session = true

            [[step]]
            op = "finish"

            [[step]]
            op = "start"
            restarting = true
            context = { package_name = "com.example.notes" }

            [[step]]
            op = "start_view"
            restarting = true
            context = { package_name = "com.example.notes" }

            [[step]]
            op = "start"
            context = { package_name = "com.example.notes" }

            [[step]]
            op = "start_view"
            context = { package_name = "com.example.notes" }
            "#,
        )
        .unwrap();

        let trace = replay(&script, HandlerConfig::default());
        assert_eq!(
            ops_and_calls(&trace),
            vec![
                "finish_view finish_view finishing_session=true",
                "finish finish_session",
                "start start_session package=com.example.notes restarting=true",
                "start_view start_view package=com.example.notes restarting=true",
            ]
        );
    }

    #[test]
    fn advance_fires_idle_release_with_its_time() {
        let script = Script::from_toml_str(
            r#"
            [[step]]
            op = "start_view"
            context = { package_name = "com.example.notes" }

            [[step]]
            op = "finish_view"

            [[step]]
            op = "advance"
            ms = 10000
            "#,
        )
        .unwrap();

        let trace = replay(&script, HandlerConfig::default());
        let last = trace.last().unwrap();
        assert_eq!(last.step, 2);
        assert_eq!(last.at_ms, 10_000);
        assert_eq!(last.observation, Observation::DeallocateMemory);
    }

    #[test]
    fn posted_events_run_through_the_controller() {
        let script = Script::from_toml_str(
            r#"
            [[step]]
            op = "post"
            event = { kind = "reopen_dictionaries" }

            [[step]]
            op = "post"
            delay_ms = 50
            event = { kind = "update_suggestion_strip", input_style = "typing" }

            [[step]]
            op = "cancel"
            kind = "update_suggestion_strip"

            [[step]]
            op = "advance"
            ms = 5000
            "#,
        )
        .unwrap();

        let trace = replay(&script, HandlerConfig::default());
        assert_eq!(trace.len(), 1);
        assert_eq!(trace[0].observation, Observation::ResetDictionaries);
        assert_eq!(trace[0].step, 0);
    }

    #[test]
    fn trace_serializes_with_tagged_calls() {
        let line = TraceLine {
            step: 3,
            op: "finish",
            at_ms: 0,
            observation: Observation::FinishSession,
        };
        let json = serde_json::to_value(&line).unwrap();
        assert_eq!(json["observation"]["call"], "finish_session");
        assert_eq!(json["step"], 3);
    }
}
