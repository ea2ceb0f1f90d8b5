use comfy_table::{Cell, Color};
use tokio::io::{AsyncBufReadExt, BufReader};
use yansi::Paint;

use crate::api::{images, instances};
use crate::forms::{validate_launch, FormErrors};
use crate::models::{Instance, InstanceAction, StatusGroup};
use crate::reconcile::{FollowUp, InstanceBoard, InstanceListController};
use crate::utils::{new_table, or_dash};

use super::{spinner, success, warn, CliContext, CliError};

fn status_color(group: StatusGroup) -> Color {
    match group {
        StatusGroup::Running => Color::Green,
        StatusGroup::Stopped => Color::Grey,
        StatusGroup::Error => Color::Red,
        StatusGroup::Pending => Color::Yellow,
        StatusGroup::Unknown => Color::DarkGrey,
    }
}

pub fn instances_table(board: &InstanceBoard) -> comfy_table::Table {
    let mut table = new_table(&["ID", "Image", "Server", "Status", "Created", "SSH", "Action"]);
    for inst in board.rows() {
        let action = if board.is_in_flight(&inst.instance_id) {
            "...".to_string()
        } else {
            inst.status
                .available_action()
                .map(|a| a.as_str().to_string())
                .unwrap_or_else(|| "-".to_string())
        };
        table.add_row(vec![
            Cell::new(inst.short_id()),
            Cell::new(or_dash(inst.image_name.as_deref())),
            Cell::new(or_dash(inst.server_hostname.as_deref())),
            Cell::new(inst.status.badge_label()).fg(status_color(inst.status.group())),
            Cell::new(inst.created_date()),
            Cell::new(inst.ssh_command().unwrap_or_else(|| "-".to_string())),
            Cell::new(action),
        ]);
    }
    table
}

fn print_board(board: &InstanceBoard) {
    if let Some(err) = board.error() {
        eprintln!("{}", err.red());
    }
    if board.rows().is_empty() {
        println!("No instances found.");
    } else {
        println!("{}", instances_table(board));
    }
}

pub async fn list(ctx: &CliContext) -> Result<(), CliError> {
    let result = instances::list_instances(&ctx.api).await;
    let rows = ctx.observe(result)?;
    let mut board = InstanceBoard::new();
    board.apply_snapshot(rows);
    print_board(&board);
    Ok(())
}

/// Resolve an id prefix against the current list; must match exactly one row.
pub fn resolve_instance<'a>(board: &'a InstanceBoard, prefix: &str) -> Result<&'a Instance, CliError> {
    let matches = board.find_by_prefix(prefix);
    match matches.as_slice() {
        [one] => Ok(one),
        [] => Err(CliError::Usage(format!("No instance matches '{}'.", prefix))),
        many => Err(CliError::Usage(format!(
            "'{}' is ambiguous ({} instances match).",
            prefix,
            many.len()
        ))),
    }
}

/// Start or stop one instance and report the reconciled status.
pub async fn run_action(ctx: &CliContext, prefix: &str, action: InstanceAction) -> Result<(), CliError> {
    let result = instances::list_instances(&ctx.api).await;
    let mut board = InstanceBoard::new();
    board.apply_snapshot(ctx.observe(result)?);

    let instance_id = resolve_instance(&board, prefix)?.instance_id.clone();
    let ticket = board
        .begin_action(&instance_id, action)
        .map_err(|r| CliError::Usage(r.to_string()))?;
    println!(
        "{} {} -> {}",
        action.label().bold(),
        instance_id,
        board.row(&instance_id).map(|r| r.status.badge_label()).unwrap_or_default()
    );

    let outcome = instances::instance_action(&ctx.api, &instance_id, action).await;
    if matches!(&outcome, Err(e) if e.is_unauthorized()) {
        return ctx.observe(outcome).map(|_| ());
    }
    let follow_up = board.complete_action(ticket, outcome, ctx.settings.settle_delay);
    if let Some(notice) = board.take_notice() {
        success(notice);
    }
    if let FollowUp::RefetchAfter(delay) = follow_up {
        let pb = spinner("Waiting for the backend to settle...");
        tokio::time::sleep(delay).await;
        pb.finish_and_clear();
    }
    board.apply_fetch(instances::list_instances(&ctx.api).await);
    match board.row(&instance_id) {
        Some(row) => println!("{} is now {}", instance_id, row.status.badge_label()),
        None => warn(format!("{} is no longer listed", instance_id)),
    }
    match board.error() {
        Some(err) => Err(CliError::Form(err.to_string())),
        None => Ok(()),
    }
}

pub async fn launch(ctx: &CliContext, image: &str, gpus: &str) -> Result<(), CliError> {
    let result = images::list_images(&ctx.api).await;
    let available: Vec<_> = ctx.observe(result)?.into_iter().filter(|i| i.is_available).collect();
    if available.is_empty() {
        return Err(CliError::Usage("No available images found. Cannot launch.".to_string()));
    }
    let image_id = available
        .iter()
        .find(|i| i.id == image || i.name == image || i.tag == image)
        .map(|i| i.id.clone())
        .unwrap_or_default();
    if image_id.is_empty() && !image.trim().is_empty() {
        let names: Vec<_> = available.iter().map(|i| i.picker_label()).collect();
        return Err(CliError::Usage(format!(
            "No available image matches '{}'. Available: {}",
            image,
            names.join(", ")
        )));
    }
    let req = validate_launch(&image_id, gpus).map_err(|e| CliError::from_form(&e))?;

    let pb = spinner("Launching instance...");
    let result = instances::launch_instance(&ctx.api, &req).await;
    pb.finish_and_clear();
    let resp = match result {
        Err(e) if !e.is_unauthorized() => return Err(CliError::from_form(&FormErrors::from_api_error(&e))),
        other => ctx.observe(other)?,
    };
    success(format!(
        "Instance launch initiated successfully (ID: {}). Check dashboard for status.",
        resp.instance_id.as_deref().unwrap_or("N/A")
    ));
    Ok(())
}

const WATCH_HELP: &str = "Commands: start <id>, stop <id>, r (refresh), q (quit)";

async fn watch_action(ctrl: &InstanceListController<crate::api::ApiClient>, action: InstanceAction, prefix: &str) {
    let resolved = ctrl.with_board(|b| resolve_instance(b, prefix).map(|i| i.instance_id.clone()));
    let instance_id = match resolved {
        Ok(id) => id,
        Err(e) => return warn(e),
    };
    match ctrl.trigger(&instance_id, action).await {
        Ok(FollowUp::RefetchAfter(delay)) => {
            if let Some(notice) = ctrl.with_board(|b| b.take_notice()) {
                success(format!("{} (refreshing in {}s)", notice, delay.as_secs()));
            }
        }
        Ok(FollowUp::RefetchNow) => {}
        Err(rejection) => warn(rejection),
    }
}

/// Live view: polls on the configured interval and accepts start/stop
/// commands on stdin with optimistic status updates.
pub async fn watch(ctx: &CliContext) -> Result<(), CliError> {
    ctx.require_login().await?;
    let mut ctrl = InstanceListController::new(ctx.api.clone(), ctx.settings.settle_delay);
    ctrl.start_polling(ctx.settings.poll_interval);
    let changed = ctrl.changed();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("{}", WATCH_HELP.dim());

    loop {
        tokio::select! {
            _ = changed.notified() => print_board(&ctrl.snapshot()),
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let mut parts = line.split_whitespace();
                match (parts.next(), parts.next()) {
                    (None, _) => {}
                    (Some("q" | "quit"), _) => break,
                    (Some("r"), _) => ctrl.refresh().await,
                    (Some(cmd), Some(prefix)) => match InstanceAction::parse(cmd) {
                        Some(action) => watch_action(&ctrl, action, prefix).await,
                        None => println!("{}", WATCH_HELP.dim()),
                    },
                    _ => println!("{}", WATCH_HELP.dim()),
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    ctrl.shutdown();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn board(ids: &[&str]) -> InstanceBoard {
        let mut b = InstanceBoard::new();
        b.apply_snapshot(
            ids.iter()
                .map(|id| serde_json::from_value(json!({"instance_id": id, "status": "running"})).unwrap())
                .collect(),
        );
        b
    }

    #[test]
    fn prefixes_must_be_unique() {
        let b = board(&["abc111", "abd222"]);
        assert_eq!(resolve_instance(&b, "abc").unwrap().instance_id, "abc111");
        assert!(matches!(resolve_instance(&b, "ab"), Err(CliError::Usage(m)) if m.contains("ambiguous")));
        assert!(matches!(resolve_instance(&b, "zz"), Err(CliError::Usage(_))));
    }

    #[test]
    fn table_marks_in_flight_rows() {
        let mut b = board(&["abc111"]);
        b.begin_action("abc111", InstanceAction::Stop).unwrap();
        let rendered = instances_table(&b).to_string();
        assert!(rendered.contains("STOPPING"));
        assert!(rendered.contains("..."));
    }
}
