use std::sync::{Arc, Mutex};

use op_core::{AgentId, TimeMs};

use crate::queue::TaskQueue;
use crate::task::{NewTaskBatch, TaskKind, TaskSpec};

fn spec(kind: TaskKind, agent: Option<AgentId>, priority: i32) -> TaskSpec {
    TaskSpec {
        kind,
        agent,
        priority,
        action: Box::new(|_| true),
    }
}

fn recording_spec(kind: TaskKind, priority: i32, trace: Arc<Mutex<Vec<i32>>>, tag: i32) -> TaskSpec {
    TaskSpec {
        kind,
        agent: None,
        priority,
        action: Box::new(move |_| {
            trace.lock().unwrap().push(tag);
            true
        }),
    }
}

mod common_tasks {
    use super::*;

    #[test]
    fn due_tasks_come_back_priority_desc_then_insertion_asc() {
        let mut q = TaskQueue::new(100);
        let low = q.schedule_new_recurring_tasks(spec(TaskKind::PreAgent, None, 1), TimeMs::ZERO, 0, 100);
        let high = q.schedule_new_recurring_tasks(spec(TaskKind::Synchronize, None, 5), TimeMs::ZERO, 0, 100);
        let mid_first = q.schedule_new_recurring_tasks(spec(TaskKind::PreAgent, None, 3), TimeMs::ZERO, 0, 100);
        let mid_second = q.schedule_new_recurring_tasks(spec(TaskKind::PreAgent, None, 3), TimeMs::ZERO, 0, 100);

        let due = q.get_common_tasks(TimeMs::ZERO);
        assert_eq!(due, vec![high, mid_first, mid_second, low]);
    }

    #[test]
    fn rescheduled_after_consumption() {
        let mut q = TaskQueue::new(100);
        let id = q.schedule_new_recurring_tasks(spec(TaskKind::Synchronize, None, 0), TimeMs::ZERO, 0, 100);

        assert_eq!(q.get_common_tasks(TimeMs::ZERO), vec![id]);
        assert!(q.get_common_tasks(TimeMs::ZERO).is_empty());
        assert_eq!(q.get_common_tasks(TimeMs(100)), vec![id]);
    }

    #[test]
    fn recurring_agent_tasks_are_not_returned_by_get_common_tasks() {
        let mut q = TaskQueue::new(100);
        let agent_task = q.schedule_new_recurring_tasks(
            spec(TaskKind::RecurringAgent, Some(AgentId(0)), 0),
            TimeMs::ZERO,
            0,
            50,
        );
        assert!(q.get_common_tasks(TimeMs::ZERO).is_empty());
        assert_eq!(q.get_recurring_agent_tasks(TimeMs::ZERO), vec![agent_task]);
    }
}

mod non_recurring {
    use super::*;

    #[test]
    fn consumes_overdue_and_due_tasks_once() {
        let mut q = TaskQueue::new(100);
        let early = q.schedule_new_non_recurring_tasks(
            spec(TaskKind::NonRecurringAgent, Some(AgentId(0)), 0),
            TimeMs::ZERO,
            10,
        );
        let late = q.schedule_new_non_recurring_tasks(
            spec(TaskKind::NonRecurringAgent, Some(AgentId(1)), 0),
            TimeMs::ZERO,
            40,
        );
        let not_yet = q.schedule_new_non_recurring_tasks(
            spec(TaskKind::NonRecurringAgent, Some(AgentId(2)), 0),
            TimeMs::ZERO,
            90,
        );

        let consumed = q.consume_non_recurring_tasks(TimeMs(40));
        assert_eq!(consumed, vec![early, late]);
        assert!(q.consume_non_recurring_tasks(TimeMs(40)).is_empty());
        assert_eq!(q.consume_non_recurring_tasks(TimeMs(90)), vec![not_yet]);
    }

    #[test]
    fn leaves_recurring_tasks_due_at_the_same_time_alone() {
        let mut q = TaskQueue::new(100);
        let recurring = q.schedule_new_recurring_tasks(
            spec(TaskKind::RecurringAgent, Some(AgentId(0)), 0),
            TimeMs::ZERO,
            0,
            50,
        );
        let once = q.schedule_new_non_recurring_tasks(
            spec(TaskKind::NonRecurringAgent, Some(AgentId(0)), 0),
            TimeMs::ZERO,
            0,
        );

        let consumed = q.consume_non_recurring_tasks(TimeMs::ZERO);
        assert_eq!(consumed, vec![once]);
        assert_eq!(q.task_kind(recurring), Some(TaskKind::RecurringAgent));
    }
}

mod timestamps {
    use super::*;

    #[test]
    fn next_timestamp_is_min_strictly_greater_than_now() {
        let mut q = TaskQueue::new(20);
        q.schedule_new_recurring_tasks(spec(TaskKind::Synchronize, None, 0), TimeMs::ZERO, 0, 100);
        q.schedule_new_recurring_tasks(spec(TaskKind::Synchronize, None, 0), TimeMs::ZERO, 50, 100);
        q.schedule_new_recurring_tasks(spec(TaskKind::Synchronize, None, 0), TimeMs::ZERO, 100, 100);

        assert_eq!(q.get_next_timestamp(TimeMs::ZERO), TimeMs(50));
        assert_eq!(q.get_next_timestamp(TimeMs(50)), TimeMs(100));
    }

    #[test]
    fn falls_back_to_framework_rate_successor_when_queue_is_empty() {
        let q = TaskQueue::new(20);
        assert_eq!(q.get_next_timestamp(TimeMs(500)), TimeMs(520));
    }
}

mod deletion {
    use super::*;

    #[test]
    fn delete_agent_tasks_removes_only_that_agents_pending_work() {
        let mut q = TaskQueue::new(100);
        let a0_recurring = q.schedule_new_recurring_tasks(
            spec(TaskKind::RecurringAgent, Some(AgentId(0)), 0),
            TimeMs::ZERO,
            0,
            50,
        );
        let a0_once = q.schedule_new_non_recurring_tasks(
            spec(TaskKind::NonRecurringAgent, Some(AgentId(0)), 0),
            TimeMs::ZERO,
            10,
        );
        let a1_recurring = q.schedule_new_recurring_tasks(
            spec(TaskKind::RecurringAgent, Some(AgentId(1)), 0),
            TimeMs::ZERO,
            0,
            50,
        );

        q.delete_agent_tasks(&[AgentId(0)]);

        assert_eq!(q.task_kind(a0_recurring), None);
        assert_eq!(q.task_kind(a0_once), None);
        assert_eq!(q.task_kind(a1_recurring), Some(TaskKind::RecurringAgent));
        assert_eq!(q.pending_count(), 1);
    }
}

mod run_loop {
    use super::*;

    #[test]
    fn executes_common_then_update_then_recurring_agent_tasks_per_tick() {
        let mut q = TaskQueue::new(100);
        let trace = Arc::new(Mutex::new(Vec::new()));
        q.schedule_new_recurring_tasks(
            recording_spec(TaskKind::Synchronize, 0, trace.clone(), 1),
            TimeMs::ZERO,
            0,
            100,
        );
        q.schedule_new_recurring_tasks(
            recording_spec(TaskKind::RecurringAgent, 0, trace.clone(), 3),
            TimeMs::ZERO,
            0,
            100,
        );

        let update_trace = trace.clone();
        q.run_invocation(
            TimeMs::ZERO,
            TimeMs(100),
            move |_| {
                update_trace.lock().unwrap().push(2);
                NewTaskBatch::default()
            },
            |time| time > TimeMs(100),
            || {},
        )
        .unwrap();

        let observed = trace.lock().unwrap().clone();
        assert_eq!(observed, vec![1, 2, 3, 1, 2, 3]);
    }

    #[test]
    fn a_failing_task_aborts_the_invocation() {
        let mut q = TaskQueue::new(100);
        q.schedule_new_recurring_tasks(
            TaskSpec {
                kind: TaskKind::PreAgent,
                agent: None,
                priority: 0,
                action: Box::new(|_| false),
            },
            TimeMs::ZERO,
            0,
            100,
        );

        let result = q.run_invocation(TimeMs::ZERO, TimeMs(200), |_| NewTaskBatch::default(), |_| false, || {});
        assert!(result.is_err());
    }

    #[test]
    fn bootstrap_and_finalize_run_exactly_once_around_the_loop() {
        let mut q = TaskQueue::new(100);
        let trace = Arc::new(Mutex::new(Vec::new()));
        q.add_bootstrap(recording_spec(TaskKind::Bootstrap, 0, trace.clone(), -1));
        q.add_finalize(recording_spec(TaskKind::Finalize, 0, trace.clone(), -2));

        q.run_invocation(TimeMs::ZERO, TimeMs::ZERO, |_| NewTaskBatch::default(), |time| time > TimeMs::ZERO, || {})
            .unwrap();

        assert_eq!(trace.lock().unwrap().clone(), vec![-1, -2]);
    }
}
