//! Integration tests for report export.
//!
//! Builds reports from a board snapshot and writes them to a temp export
//! directory the way the TUI does on `e` / `p`.

use chrono::NaiveDate;
use lopdf::Document;
use tasktimer::app::App;
use tasktimer::export::{ExportFormat, ReportSettings, save_report};
use tasktimer::tasks::SyncEvent;
use tasktimer_proto::{Category, Task, TaskId};

fn stored(id: &str, name: &str, category: Category, total: u64) -> Task {
    let mut task = Task::new(TaskId::from(id), name, category, None).unwrap();
    task.total_time = total;
    task
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 31).unwrap()
}

fn settings(dir: &tempfile::TempDir) -> ReportSettings {
    ReportSettings {
        directory: dir.path().to_path_buf(),
        file_prefix: "relatorio".to_string(),
        title: "RELATÓRIO DE TAREFAS".to_string(),
    }
}

#[test]
fn csv_report_lists_running_state_from_board() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = App::new();
    app.apply_sync_event(SyncEvent::Loaded(vec![
        stored("a", "Draft banner", Category::Criacao, 60),
        stored("b", "Fix \"logo\"", Category::Ajustes, 3600),
    ]));
    app.toggle_selected();
    app.tick();

    let path = save_report(
        &app.board.snapshot(),
        ExportFormat::Csv,
        &settings(&dir),
        date(),
    )
    .unwrap();
    assert_eq!(path, dir.path().join("relatorio_31-01-2025.csv"));

    let csv = std::fs::read_to_string(path).unwrap();
    let expected = "\
Nome da Tarefa,Categoria,Tempo Total (segundos),Tempo Formatado,Status
\"Draft banner\",Criação,61,\"00:01:01\",Em execução
\"Fix \"\"logo\"\"\",Ajustes,3600,\"01:00:00\",Parado

RESUMO GERAL,,,
Total Criação,,61,\"00:01:01\",
Total Ajustes,,3600,\"01:00:00\",
TEMPO TOTAL GERAL,,3661,\"01:01:01\",
";
    assert_eq!(csv, expected);
}

#[test]
fn pdf_report_is_a_readable_document() {
    let dir = tempfile::tempdir().unwrap();
    let tasks = vec![
        stored("a", "Criação de peça", Category::Criacao, 125),
        stored("b", "Ajuste final", Category::Ajustes, 30),
    ];
    let path = save_report(&tasks, ExportFormat::Pdf, &settings(&dir), date()).unwrap();
    assert_eq!(path, dir.path().join("relatorio_31-01-2025.pdf"));

    let bytes = std::fs::read(&path).unwrap();
    assert!(bytes.starts_with(b"%PDF-"));
    let doc = Document::load_mem(&bytes).unwrap();
    assert_eq!(doc.get_pages().len(), 1);
}

#[test]
fn pdf_report_paginates_both_sections() {
    let dir = tempfile::tempdir().unwrap();
    let mut tasks: Vec<Task> = (0..30)
        .map(|i| stored(&format!("c{i}"), &format!("criação {i}"), Category::Criacao, i))
        .collect();
    tasks.extend(
        (0..30).map(|i| stored(&format!("a{i}"), &format!("ajuste {i}"), Category::Ajustes, i)),
    );
    let path = save_report(&tasks, ExportFormat::Pdf, &settings(&dir), date()).unwrap();
    let doc = Document::load_mem(&std::fs::read(path).unwrap()).unwrap();
    assert!(doc.get_pages().len() >= 3);
}

#[test]
fn export_into_unwritable_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("plain-file");
    std::fs::write(&file, "x").unwrap();
    let settings = ReportSettings {
        directory: file.join("nested"),
        ..ReportSettings::default()
    };
    assert!(save_report(&[], ExportFormat::Pdf, &settings, date()).is_err());
}
