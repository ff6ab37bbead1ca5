//! Property-based tests for timer arithmetic and report formatting.
//!
//! Uses proptest to verify:
//! 1. `format_duration` always renders `HH:MM:SS` that parses back to the input.
//! 2. k ticks on a running task add exactly k to `current_time` only.
//! 3. Stopping folds `current_time` into `total_time` and never loses time.
//! 4. Any start/stop/tick sequence keeps the board total equal to the ticks
//!    spent running.
//! 5. CSV summary rows always add up.

use proptest::prelude::*;
use tasktimer::export::csv::to_csv;
use tasktimer::export::format_duration;
use tasktimer::tasks::TaskBoard;
use tasktimer_proto::{Category, Task, TaskId, TaskPatch};

fn arb_category() -> impl Strategy<Value = Category> {
    prop_oneof![Just(Category::Criacao), Just(Category::Ajustes)]
}

fn board_with_one(total: u64) -> (TaskBoard, TaskId) {
    let id = TaskId::from("t");
    let mut task = Task::new(id.clone(), "task", Category::Criacao, None).unwrap();
    task.total_time = total;
    let mut board = TaskBoard::new();
    board.load(vec![task]);
    (board, id)
}

#[derive(Debug, Clone)]
enum Step {
    Toggle(usize),
    Tick,
}

fn arb_step() -> impl Strategy<Value = Step> {
    prop_oneof![(0usize..4).prop_map(Step::Toggle), Just(Step::Tick)]
}

proptest! {
    #[test]
    fn duration_format_parses_back(seconds in 0u64..10_000_000) {
        let text = format_duration(seconds);
        let parts: Vec<&str> = text.split(':').collect();
        prop_assert_eq!(parts.len(), 3);
        prop_assert!(parts.iter().all(|p| p.len() >= 2));
        let h: u64 = parts[0].parse().unwrap();
        let m: u64 = parts[1].parse().unwrap();
        let s: u64 = parts[2].parse().unwrap();
        prop_assert!(m < 60 && s < 60);
        prop_assert_eq!(h * 3600 + m * 60 + s, seconds);
    }

    #[test]
    fn ticks_only_advance_current_time(total in 0u64..1_000_000, k in 0usize..500) {
        let (mut board, id) = board_with_one(total);
        board.toggle(&id).unwrap();
        for _ in 0..k {
            board.tick();
        }
        let task = &board.get(&id).unwrap().task;
        prop_assert_eq!(task.current_time, k as u64);
        prop_assert_eq!(task.total_time, total);
    }

    #[test]
    fn stop_folds_without_loss(total in 0u64..1_000_000, k in 0usize..500) {
        let (mut board, id) = board_with_one(total);
        board.toggle(&id).unwrap();
        for _ in 0..k {
            board.tick();
        }
        let patch = board.toggle(&id).unwrap();
        let expected = total + k as u64;
        prop_assert_eq!(patch, TaskPatch::stop(expected));
        let task = &board.get(&id).unwrap().task;
        prop_assert_eq!(task.total_time, expected);
        prop_assert_eq!(task.current_time, 0);
        prop_assert!(!board.is_running(&id));
    }

    #[test]
    fn grand_total_equals_running_ticks(steps in prop::collection::vec(arb_step(), 0..200)) {
        let ids: Vec<TaskId> = (0..4).map(|i| TaskId::from(format!("t{i}").as_str())).collect();
        let tasks = ids
            .iter()
            .map(|id| Task::new(id.clone(), "task", Category::Ajustes, None).unwrap())
            .collect();
        let mut board = TaskBoard::new();
        board.load(tasks);

        let mut expected = 0u64;
        for step in steps {
            match step {
                Step::Toggle(i) => {
                    board.toggle(&ids[i]).unwrap();
                }
                Step::Tick => {
                    expected += board.tick() as u64;
                }
            }
        }
        prop_assert_eq!(board.grand_total(), expected);

        let stops = board.stop_all();
        prop_assert_eq!(board.grand_total(), expected);
        let flushed: u64 = stops.iter().filter_map(|(_, p)| p.total_time).sum();
        let still_counted: u64 = stops
            .iter()
            .map(|(id, _)| board.elapsed(id).unwrap())
            .sum();
        prop_assert_eq!(flushed, still_counted);
    }

    #[test]
    fn csv_summary_adds_up(
        entries in prop::collection::vec((arb_category(), 0u64..100_000), 0..20)
    ) {
        let tasks: Vec<Task> = entries
            .iter()
            .map(|(category, total)| {
                let mut task = Task::new(TaskId::new(), "task", *category, None).unwrap();
                task.total_time = *total;
                task
            })
            .collect();
        let criacao: u64 = entries.iter().filter(|(c, _)| *c == Category::Criacao).map(|(_, t)| t).sum();
        let ajustes: u64 = entries.iter().filter(|(c, _)| *c == Category::Ajustes).map(|(_, t)| t).sum();

        let csv = to_csv(&tasks);
        let criacao_row = format!("Total Criação,,{criacao},\"{}\",", format_duration(criacao));
        let ajustes_row = format!("Total Ajustes,,{ajustes},\"{}\",", format_duration(ajustes));
        let total_row = format!(
            "TEMPO TOTAL GERAL,,{},\"{}\",",
            criacao + ajustes,
            format_duration(criacao + ajustes)
        );
        prop_assert!(csv.contains(&criacao_row));
        prop_assert!(csv.contains(&ajustes_row));
        prop_assert!(csv.contains(&total_row));
        prop_assert_eq!(csv.lines().count(), tasks.len() + 6);
    }
}
