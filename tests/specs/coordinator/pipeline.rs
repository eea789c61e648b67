//! Instruction folding and response-override behavior.

use crate::prelude::*;
use gp_core::{EventType, ToolResult};
use serde_json::Value;
use std::sync::Arc;

#[tokio::test]
async fn instruction_folding_attaches_one_instruction() {
    let (manager, _clock) = manager_with_clock();
    let probe =
        Probe::new("reader", Reply::Ignored).with_instruction(&manager, "READ X");
    manager
        .subscribe(probe, EventType::FS_CWD, None)
        .unwrap();

    // A task that returns false may still queue an instruction
    manager.dispatch_event(EventType::FS_CWD, &cwd_event()).await;
    assert_eq!(manager.pending_instruction_count(), 1);

    let result = manager.process_result(ok_result("done"), None).await;
    assert_eq!(result.value, Some(Value::String("done".to_string())));
    assert_eq!(
        result.additional_agent_instructions,
        Some("READ X".to_string())
    );
    assert_eq!(manager.pending_instruction_count(), 0);
}

#[tokio::test]
async fn duplicate_instructions_collapse() {
    let (manager, _clock) = manager_with_clock();
    manager.queue_instruction("READ X");
    manager.queue_instruction("READ X");

    let first = manager.process_result(ok_result("one"), None).await;
    assert_eq!(
        first.additional_agent_instructions,
        Some("READ X".to_string())
    );
    let second = manager.process_result(ok_result("two"), None).await;
    assert_eq!(second.additional_agent_instructions, None);
}

#[tokio::test]
async fn workflow_change_content_replaces_the_response_value() {
    let (manager, _clock) = manager_with_clock();
    manager.with_blackboard(|bb| {
        bb.workflow_change_content = Some("PHASE CHANGED".to_string());
    });

    let result = manager.process_result(ok_result("done"), None).await;

    assert_eq!(
        result.value,
        Some(Value::String("PHASE CHANGED".to_string()))
    );
    assert_eq!(result.additional_agent_instructions, None);
    assert!(manager.with_blackboard(|bb| bb.workflow_change_content.is_none()));
}

#[tokio::test]
async fn override_takes_precedence_over_instructions() {
    let (manager, _clock) = manager_with_clock();
    manager.queue_instruction("pending");
    manager.with_blackboard(|bb| {
        bb.workflow_change_content = Some("override".to_string());
    });

    let result = manager.process_result(ok_result("done"), None).await;
    assert_eq!(result.value, Some(Value::String("override".to_string())));
    assert_eq!(result.additional_agent_instructions, None);

    // The instruction survives for the following response
    let next = manager.process_result(ok_result("next"), None).await;
    assert_eq!(
        next.additional_agent_instructions,
        Some("pending".to_string())
    );
}

#[tokio::test]
async fn pipeline_is_identity_without_pending_state() {
    let (manager, _clock) = manager_with_clock();
    let original = ok_result("untouched");
    let processed = manager.process_result(original.clone(), None).await;
    assert_eq!(processed, original);
}

#[tokio::test]
async fn dispatching_event_during_process_result_feeds_subscribers() {
    let (manager, _clock) = manager_with_clock();
    let probe = Probe::new("observer", Reply::Handled);
    manager
        .subscribe(probe.clone(), EventType::FS_CWD, None)
        .unwrap();

    let result = manager
        .process_result(
            ToolResult::ok("ack"),
            Some((EventType::FS_CWD, cwd_event())),
        )
        .await;

    assert!(result.success);
    assert_eq!(probe.event_count(), 1);
}

#[tokio::test]
async fn on_tool_runs_before_everything_else() {
    struct OnToolProbe {
        calls: std::sync::atomic::AtomicUsize,
    }

    #[async_trait::async_trait]
    impl gp_core::Task for OnToolProbe {
        fn name(&self) -> &str {
            "on-tool-probe"
        }

        async fn on_tool(&self) -> Result<(), gp_core::TaskError> {
            self.calls
                .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok(())
        }

        async fn handle_event(
            &self,
            _event_type: EventType,
            _data: &gp_core::EventData,
        ) -> Result<gp_core::Handled, gp_core::TaskError> {
            Ok(gp_core::Handled::No)
        }
    }

    let (manager, _clock) = manager_with_clock();
    let probe = Arc::new(OnToolProbe {
        calls: std::sync::atomic::AtomicUsize::new(0),
    });
    manager
        .subscribe(probe.clone(), EventType::FS_CWD, None)
        .unwrap();

    manager.clone().on_tool().await;
    manager.clone().on_tool().await;
    assert_eq!(probe.calls.load(std::sync::atomic::Ordering::SeqCst), 2);
}
