//! HTML task card rendered into notification messages.

use crate::task::domain::{Comment, CommentKind, Task};

/// How many audit entries the card aims to show.
///
/// The scan keeps going past the limit until at least one free-text comment
/// is included, so a burst of bookkeeping never hides the conversation.
const CARD_COMMENT_LIMIT: usize = 5;

/// Renders the full task card with an optional event header line.
#[must_use]
pub fn task_card(task: &Task, event: &str) -> String {
    let mut text = card_header(task);
    if !event.is_empty() {
        text = format!("<b>{event}</b>\n\n{text}");
    }
    let entries = recent_entries(task.comments());
    if !entries.is_empty() {
        text.push_str("\n\n<b>Последние комментарии</b>\n\n");
        text.push_str(&entries.join("\n\n"));
    }
    text
}

fn card_header(task: &Task) -> String {
    let importance = if task.important() {
        " ❗️<b>важная</b>"
    } else {
        ""
    };
    format!(
        "<b>№ п/п:</b> {id}{importance}\n\
         <b>Создано:</b> {created}\n\
         <b>Обновлено:</b> {updated}\n\
         <b>Объект:</b> {object}\n\
         <b>Тип:</b> {task_type}\n\
         <b>Срок:</b> {deadline}\n\
         <b>Статус:</b> {status}\n\
         <b>Описание:</b>\n {description}\n\
         \n\
         <b>Постановщик:</b> {supplier}\n\
         <b>Руководитель:</b> {supervisor}\n\
         <b>Исполнитель:</b> {executor}",
        id = task.id(),
        created = task.created_at().format("%d.%m.%Y"),
        updated = task.updated_at().format("%d.%m.%Y"),
        object = task.object(),
        task_type = task.task_type(),
        deadline = task.formatted_plan_date(),
        status = task.status().label(),
        description = task.description(),
        supplier = task.supplier().full_name(),
        supervisor = task.supervisor().full_name(),
        executor = task.executor().full_name(),
    )
}

/// Newest-first audit entries for the card, skipping notification markers.
fn recent_entries(comments: &[Comment]) -> Vec<String> {
    let mut entries = Vec::new();
    let mut has_note = false;
    for comment in comments.iter().rev() {
        if matches!(comment.kind(), CommentKind::Notified) {
            continue;
        }
        has_note = has_note || comment.is_note();
        entries.push(comment_line(comment));
        if entries.len() >= CARD_COMMENT_LIMIT && has_note {
            break;
        }
    }
    entries
}

fn comment_line(comment: &Comment) -> String {
    let mut parts = vec![format!(
        "<b>{}</b>",
        comment.created_at().format("%d.%m.%y %H:%M")
    )];
    if let Some(author) = comment.author() {
        parts.push(format!("<b>{}</b>", author.short_name));
    }
    if !comment.author_roles().is_empty() {
        let initials = comment
            .author_roles()
            .iter()
            .map(|role| role.initial())
            .collect::<Vec<_>>()
            .join(", ");
        parts.push(format!("({initials})"));
    }
    let mut line = parts.join(" ");
    line.push_str(&comment_body(comment.kind()));
    line
}

fn comment_body(kind: &CommentKind) -> String {
    match kind {
        CommentKind::StatusChange { from, to, reason } => {
            let mut body = format!("\n🔁 Статус \"{}\" → \"{}\"", from.label(), to.label());
            append_reason(&mut body, reason.as_deref());
            body
        }
        CommentKind::DateChange { from, to, reason } => {
            let mut body = format!(
                "\n🗓 Срок до \"{}\" → \"{}\" ({} дн.)",
                from.format("%d.%m.%Y"),
                to.format("%d.%m.%Y"),
                signed_days(*to - *from),
            );
            append_reason(&mut body, reason.as_deref());
            body
        }
        CommentKind::Reassignment {
            slot,
            old_user,
            new_user,
        } => format!(
            "\n💁‍♂️ {} \"{}\" → \"{}\"",
            slot.label(),
            old_user.name,
            new_user.name
        ),
        CommentKind::Error { text } => format!("\n⚠️ <i>{}</i>", text.trim()),
        CommentKind::Note { text } => format!("\n💬 {}", text.trim()),
        CommentKind::Notified => String::new(),
    }
}

fn append_reason(body: &mut String, reason: Option<&str>) {
    if let Some(text) = reason.map(str::trim).filter(|text| !text.is_empty()) {
        body.push('\n');
        body.push_str(text);
    }
}

fn signed_days(delta: chrono::Duration) -> String {
    let days = delta.num_days();
    if days > 0 {
        format!("+{days}")
    } else {
        days.to_string()
    }
}
