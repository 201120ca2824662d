use anyhow::Result;
use chrono::NaiveDate;
use maud::{html, Markup, PreEscaped, DOCTYPE};
use std::fs;
use std::path::Path;

use crate::board::{Board, BoardItem};
use crate::types::Priority;

/// Write a static snapshot of the board. Its forms only work when served.
pub fn generate_html(board: &Board<'_>, today: NaiveDate, path: &Path) -> Result<()> {
    let html = render_page(board, today);
    fs::write(path, html.into_string())?;
    Ok(())
}

pub fn render_page(board: &Board<'_>, today: NaiveDate) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { "Scadenzario" }
                style { (PreEscaped(CSS)) }
            }
            body {
                div.container {
                    h1 { "Scadenzario" }
                    div.stats {
                        span #"total-count" { (board.total()) }
                        " assignments · "
                        span #"today" { (format_date(today)) }
                    }
                    div.reminder #"reminder" { (board.summary) }
                    (render_form())
                    @if board.is_empty() {
                        div.empty-state {
                            h2 { "No assignments yet" }
                            p { "Use \"Add Assignment\" to start tracking your homework." }
                        }
                    }
                    @if !board.pending.is_empty() {
                        section.pending #"pending" {
                            h2 { "Pending Assignments" }
                            @for item in &board.pending {
                                (render_item(item))
                            }
                        }
                    }
                    @if !board.completed.is_empty() {
                        section.completed #"completed" {
                            h2 { "Completed Assignments" }
                            @for item in &board.completed {
                                (render_item(item))
                            }
                        }
                    }
                }
            }
        }
    }
}

fn render_form() -> Markup {
    html! {
        details.add-form {
            summary { "+ Add Assignment" }
            form method="post" action="/assignments" {
                input type="text" name="title" placeholder="Assignment Title *" required;
                input type="text" name="subject" placeholder="Subject";
                input type="date" name="dueDate" required;
                select name="priority" {
                    option value="low" { "Low Priority" }
                    option value="medium" selected { "Medium Priority" }
                    option value="high" { "High Priority" }
                }
                textarea name="notes" rows="2" placeholder="Notes (optional)" {}
                button type="submit" { "Add" }
            }
        }
    }
}

fn render_item(item: &BoardItem<'_>) -> Markup {
    let a = item.assignment;
    let due_prefix = if a.completed { "Was due" } else { "Due" };
    let mut class = format!("assignment {}", priority_class(a.priority));
    if a.completed {
        class.push_str(" done");
    }

    html! {
        div class=(class) data-id=(a.id) {
            form.toggle method="post" action={ "/assignments/" (a.id) "/toggle" } {
                button.checkbox type="submit" title="Toggle complete" {
                    @if a.completed { "☑" } @else { "☐" }
                }
            }
            div.assignment-content {
                div.assignment-title { (a.title) }
                @if !a.subject.is_empty() {
                    div.assignment-subject { "📖 " (a.subject) }
                }
                div.assignment-meta {
                    span.due { "📅 " (due_prefix) ": " (format_date(a.due_date)) }
                    @if !a.completed {
                        span class={ "urgency " (item.urgency.tier.css_class()) }
                            data-severity=(item.urgency.tier.severity()) {
                            (item.urgency.tier.icon()) " " (item.urgency.label)
                        }
                    }
                }
                @if let Some(notes) = &a.notes {
                    div.assignment-notes { "💬 " (notes) }
                }
            }
            form.delete method="post" action={ "/assignments/" (a.id) "/delete" } {
                button type="submit" title="Delete" { "🗑" }
            }
        }
    }
}

/// Human date like "Jan 05, 2025"
pub fn format_date(date: NaiveDate) -> String {
    date.format("%b %d, %Y").to_string()
}

fn priority_class(priority: Priority) -> &'static str {
    match priority {
        Priority::High => "priority-high",
        Priority::Medium => "priority-medium",
        Priority::Low => "priority-low",
    }
}

const CSS: &str = r#"
@import url('https://fonts.googleapis.com/css2?family=Inter:wght@400;700;900&display=swap');

* {
    margin: 0;
    padding: 0;
    box-sizing: border-box;
}

body {
    font-family: 'Inter', -apple-system, BlinkMacSystemFont, sans-serif;
    background: #0a0a0a;
    color: #fff;
    min-height: 100vh;
    line-height: 1.4;
}

.container {
    max-width: 900px;
    margin: 0 auto;
    padding: 40px 24px 60px;
}

h1 {
    font-weight: 900;
    font-size: 3.5em;
    letter-spacing: -0.03em;
    text-transform: uppercase;
    text-shadow: 4px 4px 0 #ff0096, -2px -2px 0 #00ffff;
}

h2 {
    font-size: 1.1em;
    text-transform: uppercase;
    letter-spacing: 0.15em;
    margin: 36px 0 16px;
}

.stats {
    color: #888;
    font-size: 0.85em;
    font-weight: 700;
    margin: 8px 0 28px;
    text-transform: uppercase;
    letter-spacing: 0.1em;
}

.reminder {
    padding: 18px 20px;
    background: linear-gradient(135deg, rgba(255,0,150,0.25), rgba(0,255,255,0.2));
    border: 1px solid rgba(255,255,255,0.2);
    font-weight: 700;
    margin-bottom: 24px;
}

.add-form summary {
    cursor: pointer;
    font-weight: 700;
    text-transform: uppercase;
    letter-spacing: 0.1em;
    color: #00ffff;
}

.add-form form {
    display: grid;
    grid-template-columns: 1fr 1fr;
    gap: 12px;
    margin-top: 16px;
}

.add-form input, .add-form select, .add-form textarea {
    padding: 10px;
    background: rgba(255,255,255,0.05);
    border: 1px solid rgba(255,255,255,0.2);
    color: #fff;
    font: inherit;
}

.add-form textarea, .add-form button {
    grid-column: span 2;
}

button {
    cursor: pointer;
    background: none;
    border: 1px solid rgba(255,255,255,0.2);
    color: #fff;
    padding: 8px 12px;
    font: inherit;
}

.assignment {
    display: flex;
    align-items: flex-start;
    gap: 16px;
    padding: 16px;
    margin-bottom: 12px;
    background: rgba(255,255,255,0.03);
    border: 1px solid rgba(255,255,255,0.1);
    border-left-width: 4px;
}

.assignment.priority-high { border-left-color: #ff3b5c; }
.assignment.priority-medium { border-left-color: #ffd23b; }
.assignment.priority-low { border-left-color: #3bff8a; }

.assignment.done {
    opacity: 0.4;
}

.assignment.done .assignment-title {
    text-decoration: line-through;
}

.assignment-content {
    flex: 1;
}

.assignment-title {
    font-weight: 700;
    font-size: 1.1em;
    margin-bottom: 6px;
}

.assignment-subject, .assignment-notes {
    color: #ccc;
    font-size: 0.9em;
    margin-bottom: 4px;
}

.assignment-meta {
    display: flex;
    gap: 16px;
    font-size: 0.85em;
    color: #aaa;
}

.urgency { font-weight: 700; }
.urgency-overdue { color: #ff3b5c; }
.urgency-today { color: #ff6b6b; }
.urgency-tomorrow { color: #ff9f43; }
.urgency-soon { color: #ffb86b; }
.urgency-week { color: #ffd23b; }
.urgency-later { color: #999; }

.empty-state {
    padding: 60px 20px;
    text-align: center;
    color: #666;
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Assignment;
    use tempfile::TempDir;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn make(title: &str, due: &str, priority: Priority) -> Assignment {
        Assignment::new(title.to_string(), "HISTORY".to_string(), day(due), priority)
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(day("2025-01-05")), "Jan 05, 2025");
        assert_eq!(format_date(day("2025-12-31")), "Dec 31, 2025");
    }

    #[test]
    fn test_render_empty_state() {
        let board = Board::build(&[], day("2025-01-10"));
        let page = render_page(&board, day("2025-01-10")).into_string();

        assert!(page.contains("No assignments yet"));
        assert!(page.contains("Great job!"));
        assert!(!page.contains("Pending Assignments"));
        assert!(!page.contains("Completed Assignments"));
    }

    #[test]
    fn test_render_pending_and_completed() {
        let mut done = make("Old essay", "2025-01-02", Priority::Low);
        done.completed = true;
        let list = vec![make("Chapter 4", "2025-01-11", Priority::High), done];
        let board = Board::build(&list, day("2025-01-10"));
        let page = render_page(&board, day("2025-01-10")).into_string();

        assert!(page.contains("Pending Assignments"));
        assert!(page.contains("Completed Assignments"));
        assert!(page.contains("Due Tomorrow"));
        assert!(page.contains("priority-high"));
        assert!(page.contains("Was due: Jan 02, 2025"));
        assert!(page.contains("1 assignment is due tomorrow."));
        assert!(!page.contains("No assignments yet"));
    }

    #[test]
    fn test_render_item_forms_target_id() {
        let list = vec![make("Map quiz", "2025-01-20", Priority::Medium)];
        let id = list[0].id.clone();
        let board = Board::build(&list, day("2025-01-10"));
        let page = render_page(&board, day("2025-01-10")).into_string();

        assert!(page.contains(&format!("/assignments/{id}/toggle")));
        assert!(page.contains(&format!("/assignments/{id}/delete")));
        assert!(page.contains("10 days left"));
    }

    #[test]
    fn test_render_escapes_user_text() {
        let mut a = make("<script>alert(1)</script>", "2025-01-20", Priority::Low);
        a.notes = Some("a & b".to_string());
        let list = vec![a];
        let board = Board::build(&list, day("2025-01-10"));
        let page = render_page(&board, day("2025-01-10")).into_string();

        assert!(!page.contains("<script>alert(1)</script>"));
        assert!(page.contains("&lt;script&gt;"));
        assert!(page.contains("a &amp; b"));
    }

    #[test]
    fn test_generate_html_writes_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("index.html");
        let board = Board::build(&[], day("2025-01-10"));

        generate_html(&board, day("2025-01-10"), &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("<!DOCTYPE html>"));
    }
}
