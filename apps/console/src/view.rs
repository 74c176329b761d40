//! Plain-text rendering of a [`RenderState`]. Formatting only.

use std::fmt::Write as _;

use shared::protocol::RenderState;

pub fn render(state: &RenderState) -> String {
    let mut out = String::new();

    if state.todos.is_empty() {
        out.push_str("  (no todos)\n");
    } else {
        let width = state
            .todos
            .iter()
            .map(|todo| todo.task.chars().count())
            .max()
            .unwrap_or(0)
            .max("task".len());
        let _ = writeln!(out, "     #  {:<width$}  status", "task");
        for (row, todo) in state.todos.iter().enumerate() {
            let marker = match &state.selected {
                Some(selected) if selected.id == todo.id => '>',
                _ => ' ',
            };
            let _ = writeln!(
                out,
                "  {marker} {:>2}  {:<width$}  {}",
                row + 1,
                todo.task,
                todo.status
            );
        }
    }

    if state.is_selected_visible {
        if let Some(selected) = &state.selected {
            let _ = writeln!(out, "  -- editing {} --", selected.id);
            let _ = writeln!(out, "  task:   {}", selected.task);
            let _ = writeln!(out, "  status: {}", selected.status);
        }
    }

    if let Some(err) = &state.last_error {
        let _ = writeln!(out, "  ! {}", err.message);
    }

    out
}

pub const HELP: &str = "\
commands:
  add <text>                 create a todo
  select <row> | select none select a row or clear the selection
  update <task> [| <status>] edit the selected todo
  delete                     delete the selected todo
  list                       reload and show the list
  help                       show this help
  quit                       leave
";

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{domain::Todo, error::ApiError};

    fn state(selected: Option<Todo>) -> RenderState {
        RenderState::new(
            vec![Todo::new("1", "A", "open"), Todo::new("2", "Longer task", "done")],
            selected,
            String::new(),
        )
    }

    #[test]
    fn renders_rows_in_order_with_row_numbers() {
        let out = render(&state(None));
        let a = out.find(" 1  A").expect("row 1");
        let b = out.find(" 2  Longer task").expect("row 2");
        assert!(a < b);
        assert!(!out.contains("editing"));
    }

    #[test]
    fn edit_panel_only_appears_with_a_selection() {
        let out = render(&state(Some(Todo::new("2", "Longer task", "done"))));
        assert!(out.contains("> "));
        assert!(out.contains("-- editing 2 --"));
        assert!(out.contains("status: done"));
    }

    #[test]
    fn renders_empty_list_and_error_line() {
        let mut empty = RenderState::default();
        empty.last_error = Some(ApiError::validation("task must not be empty"));
        let out = render(&empty);
        assert!(out.contains("(no todos)"));
        assert!(out.contains("! task must not be empty"));
    }
}
