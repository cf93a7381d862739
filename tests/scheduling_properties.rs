use std::collections::BTreeMap;

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;

use focus_schedule::ga::{GaConfig, TaskOrderingProblem, break_multiplier_bounds};
use focus_schedule::models::{ScheduledTask, TaskRecord, schedule_ids};
use focus_schedule::scheduler::{SchedulerConfig, TaskScheduler, optimize};
use focus_schedule::weights::{AnalyticsSnapshot, FitnessWeights};
use focus_schedule::SchedulingError;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 4, 8, 30, 0).unwrap()
}

fn quick_ga(seed: u64) -> GaConfig {
    GaConfig::default()
        .with_population_size(10)
        .with_generations(6)
        .with_seed(seed)
        .with_reference_time(t0())
}

type RawTask = (u32, u8, Option<i64>, Option<i64>, i32);

fn raw_tasks() -> impl Strategy<Value = Vec<RawTask>> {
    prop::collection::vec(
        (
            1u32..120,
            1u8..=5,
            prop::option::of(0i64..3),
            prop::option::of(-60i64..600),
            0i32..50,
        ),
        0..12,
    )
}

fn build(raw: &[RawTask]) -> Vec<TaskRecord> {
    raw.iter()
        .enumerate()
        .map(|(i, &(minutes, load, session, due, order))| {
            let mut task = TaskRecord::new(i as i64 + 1, minutes).with_cognitive_load(load);
            if let Some(session) = session {
                task = task.with_session(session, order);
            } else {
                task.intra_session_order = order;
            }
            if let Some(due) = due {
                task = task.with_due_date(t0() + Duration::minutes(due));
            }
            task
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn output_is_a_permutation(raw in raw_tasks(), seed in any::<u64>()) {
        let tasks = build(&raw);
        let result = optimize(&tasks, FitnessWeights::default(), &quick_ga(seed)).unwrap();

        let mut got = schedule_ids(&result.ordered);
        got.sort_unstable();
        let mut expected: Vec<i64> = tasks.iter().map(|t| t.id).collect();
        expected.sort_unstable();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn sessions_keep_their_internal_order(raw in raw_tasks(), seed in any::<u64>()) {
        let tasks = build(&raw);
        let result = optimize(&tasks, FitnessWeights::default(), &quick_ga(seed)).unwrap();

        let mut last: BTreeMap<Option<i64>, (i32, i64)> = BTreeMap::new();
        for scheduled in &result.ordered {
            let task = &scheduled.task;
            let key = (task.intra_session_order, task.id);
            if let Some(previous) = last.insert(task.session_id, key) {
                prop_assert!(
                    previous <= key,
                    "session {:?}: {:?} after {:?}",
                    task.session_id,
                    key,
                    previous
                );
            }
        }
    }

    #[test]
    fn same_seed_same_schedule(raw in raw_tasks(), seed in any::<u64>()) {
        let tasks = build(&raw);
        let a = optimize(&tasks, FitnessWeights::default(), &quick_ga(seed)).unwrap();
        let sequential = quick_ga(seed).with_parallel(false);
        let b = optimize(&tasks, FitnessWeights::default(), &sequential).unwrap();
        prop_assert_eq!(&a.ordered, &b.ordered);
        prop_assert_eq!(a.fitness, b.fitness);
    }

    #[test]
    fn breaks_stay_within_load_bounds(raw in raw_tasks(), seed in any::<u64>()) {
        let tasks = build(&raw);
        let result = optimize(&tasks, FitnessWeights::default(), &quick_ga(seed)).unwrap();
        for scheduled in &result.ordered {
            let (low, high) = break_multiplier_bounds(scheduled.task.cognitive_load);
            let minutes = f64::from(scheduled.suggested_break_minutes);
            prop_assert!(minutes >= (5.0 * low).round() && minutes <= (5.0 * high).round());
        }
    }
}

#[test]
fn ascending_durations_score_at_least_descending() {
    let tasks: Vec<TaskRecord> = [25, 35, 45, 55]
        .iter()
        .enumerate()
        .map(|(i, &d)| TaskRecord::new(i as i64 + 1, d))
        .collect();
    let problem = TaskOrderingProblem::new(&tasks, FitnessWeights::uniform(), t0());

    let ascending: Vec<ScheduledTask> =
        tasks.iter().cloned().map(ScheduledTask::without_break).collect();
    let descending: Vec<ScheduledTask> = ascending.iter().rev().cloned().collect();

    let asc = problem.score_schedule(&ascending);
    let desc = problem.score_schedule(&descending);
    assert!(asc.momentum > desc.momentum);
    assert!(asc.total >= desc.total);
}

#[test]
fn near_due_task_goes_first() {
    let tasks = vec![
        TaskRecord::new(1, 30).with_due_date(t0() + Duration::hours(2)),
        TaskRecord::new(2, 30).with_due_date(t0() + Duration::minutes(10)),
    ];
    let problem = TaskOrderingProblem::new(&tasks, FitnessWeights::new(1.0, 0.0, 0.0), t0());
    let near_first = vec![
        ScheduledTask::with_break(tasks[1].clone(), 5),
        ScheduledTask::with_break(tasks[0].clone(), 5),
    ];
    let far_first = vec![
        ScheduledTask::with_break(tasks[0].clone(), 5),
        ScheduledTask::with_break(tasks[1].clone(), 5),
    ];
    let near = problem.score_schedule(&near_first);
    let far = problem.score_schedule(&far_first);
    assert!(near.urgency > far.urgency);
}

#[test]
fn single_session_follows_intra_session_order() {
    let tasks = vec![
        TaskRecord::new(10, 60).with_session(3, 2),
        TaskRecord::new(11, 5).with_session(3, 0),
        TaskRecord::new(12, 30).with_session(3, 1),
    ];
    let result = optimize(&tasks, FitnessWeights::default(), &quick_ga(9)).unwrap();
    assert_eq!(schedule_ids(&result.ordered), vec![11, 12, 10]);
}

#[test]
fn struggling_user_gets_momentum_weight() {
    let scheduler = TaskScheduler::new(SchedulerConfig::default().with_ga(quick_ga(5)));
    let tasks = vec![TaskRecord::new(1, 40), TaskRecord::new(2, 10)];
    let outcome = scheduler
        .schedule(&tasks, Some(&AnalyticsSnapshot::new(0.1, 4.0)))
        .unwrap();
    assert!((outcome.weights.momentum - 0.9).abs() < 1e-12);
    assert!((outcome.weights.variety - 0.25).abs() < 1e-12);
}

#[test]
fn zero_timeout_on_long_search_times_out() {
    let tasks: Vec<TaskRecord> = (1..=60)
        .map(|i| TaskRecord::new(i, 5 + (i as u32 * 7) % 90).with_session(i % 6, i as i32))
        .collect();
    let ga = GaConfig::default()
        .with_population_size(200)
        .with_generations(5_000)
        .with_seed(1)
        .with_parallel(false);
    let scheduler = TaskScheduler::new(SchedulerConfig::default().with_ga(ga));

    let err = scheduler
        .schedule_with_timeout(&tasks, None, std::time::Duration::ZERO)
        .unwrap_err();
    assert!(matches!(err, SchedulingError::Timeout(_)));
}

#[test]
fn outcome_serializes() {
    let scheduler = TaskScheduler::new(SchedulerConfig::default().with_ga(quick_ga(3)));
    let outcome = scheduler
        .schedule(&[TaskRecord::new(1, 25).with_name("write report")], None)
        .unwrap();
    let json = serde_json::to_string(&outcome).unwrap();
    assert!(json.contains("write report"));
    assert!(json.contains("suggested_break_minutes"));
}
