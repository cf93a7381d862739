use chrono::{DateTime, Duration, TimeZone, Utc};

use focus_schedule::dispatching::Baseline;
use focus_schedule::evaluation::{ComparisonReport, EvaluationConfig, evaluate};
use focus_schedule::ga::GaConfig;
use focus_schedule::metrics::Metric;
use focus_schedule::models::TaskRecord;
use focus_schedule::scheduler::SchedulerConfig;
use focus_schedule::weights::AnalyticsSnapshot;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 7, 13, 9, 0, 0).unwrap()
}

fn deadline_heavy_set(offset: i64) -> Vec<TaskRecord> {
    (0..6)
        .map(|i| {
            TaskRecord::new(offset + i, 15 + 10 * (5 - i) as u32)
                .with_cognitive_load((i % 5 + 1) as u8)
                .with_session(offset + i % 2, i as i32)
                .with_due_date(t0() + Duration::minutes(40 + 30 * i))
        })
        .collect()
}

fn config(runs: usize) -> EvaluationConfig {
    EvaluationConfig::default()
        .with_runs(runs)
        .with_base_seed(7)
        .with_start_time(t0())
        .with_analytics(AnalyticsSnapshot::new(0.6, 3.5))
        .with_scheduler(
            SchedulerConfig::default().with_ga(
                GaConfig::default()
                    .with_population_size(24)
                    .with_generations(20),
            ),
        )
}

#[test]
fn report_covers_every_baseline_and_metric() {
    let sets = vec![deadline_heavy_set(0), deadline_heavy_set(100), deadline_heavy_set(200)];
    let report = evaluate(&sets, &config(5)).unwrap();

    assert_eq!(report.task_sets, 3);
    assert!(report.skipped_sets.is_empty());
    assert_eq!(report.algorithm("GA").unwrap().samples, 15);
    assert_eq!(report.algorithm("RND").unwrap().samples, 15);
    for baseline in Baseline::ALL {
        let comparison = report.comparison(baseline.name()).unwrap();
        for metric in Metric::ALL {
            let m = comparison.metric(metric).unwrap();
            assert!(m.p_value > 0.0 && m.p_value <= 1.0);
            assert!((-1.0..=1.0).contains(&m.cliffs_delta));
        }
    }
}

#[test]
fn urgency_only_ga_beats_random_on_tardiness() {
    // One session per task leaves the order fully free; equal loads make
    // weighted tardiness plain tardiness.
    let set: Vec<TaskRecord> = (0..6)
        .map(|i| {
            TaskRecord::new(i, 20 + 5 * i as u32)
                .with_session(i, 0)
                .with_due_date(t0() + Duration::minutes(150 - 25 * i))
        })
        .collect();
    let cfg = config(6)
        .with_analytics(AnalyticsSnapshot::new(1.0, 5.0))
        .with_baselines([Baseline::Random]);
    let report = evaluate(&[set], &cfg).unwrap();
    let ga = report.algorithm("GA").unwrap().metric(Metric::TotalWeightedTardiness);
    let rnd = report.algorithm("RND").unwrap().metric(Metric::TotalWeightedTardiness);
    assert!(ga.mean < rnd.mean, "GA {} vs RND {}", ga.mean, rnd.mean);
}

#[test]
fn baseline_subset_and_json_round_trip() {
    let cfg = config(2).with_baselines([Baseline::Spt, Baseline::Edd]);
    let report = evaluate(&[deadline_heavy_set(0)], &cfg).unwrap();
    let names: Vec<_> = report.algorithms.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["GA", "SPT", "EDD"]);

    let json = serde_json::to_string(&report).unwrap();
    let back: ComparisonReport = serde_json::from_str(&json).unwrap();
    assert_eq!(back.algorithms.len(), 3);
    assert_eq!(back.comparisons.len(), 2);
}

#[test]
fn config_loads_from_partial_json() {
    let cfg: EvaluationConfig = serde_json::from_str(
        r#"{"runs": 4, "baselines": ["Spt", "Random"], "scheduler": {"ga": {"generations": 10}}}"#,
    )
    .unwrap();
    assert_eq!(cfg.runs, 4);
    assert_eq!(cfg.min_tasks, 3);
    assert_eq!(cfg.baselines, vec![Baseline::Spt, Baseline::Random]);
    assert_eq!(cfg.scheduler.ga.generations, 10);
    assert_eq!(cfg.scheduler.ga.population_size, 80);
}

#[test]
fn empty_input_gives_empty_report() {
    let report = evaluate(&[], &config(3)).unwrap();
    assert_eq!(report.task_sets, 0);
    assert!(report.comparisons.is_empty());
    assert!(report.convergence.is_none());
}
