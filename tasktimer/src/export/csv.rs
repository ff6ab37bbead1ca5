//! CSV report.

use std::fmt::Write as _;

use tasktimer_proto::{Category, Task};

use super::{format_duration, total_seconds};

const HEADER: &str = "Nome da Tarefa,Categoria,Tempo Total (segundos),Tempo Formatado,Status";

/// Renders the task list followed by per-category and overall totals.
///
/// Rows use each task's effective elapsed time. Names are always quoted and
/// embedded quotes are doubled.
#[must_use]
pub fn to_csv(tasks: &[Task]) -> String {
    let mut out = String::with_capacity(128 + tasks.len() * 64);
    out.push_str(HEADER);
    out.push('\n');

    for task in tasks {
        let seconds = task.elapsed();
        let status = if task.is_running {
            "Em execução"
        } else {
            "Parado"
        };
        let _ = writeln!(
            out,
            "{},{},{seconds},\"{}\",{status}",
            quote(&task.name),
            task.category.label(),
            format_duration(seconds),
        );
    }

    out.push('\n');
    out.push_str("RESUMO GERAL,,,\n");
    summary_row(&mut out, "Total Criação", total_seconds(tasks, Some(Category::Criacao)));
    summary_row(&mut out, "Total Ajustes", total_seconds(tasks, Some(Category::Ajustes)));
    summary_row(&mut out, "TEMPO TOTAL GERAL", total_seconds(tasks, None));
    out
}

fn summary_row(out: &mut String, label: &str, seconds: u64) {
    let _ = writeln!(out, "{label},,{seconds},\"{}\",", format_duration(seconds));
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}
