use crate::cli::{ScheduleArgs, ScheduleCommands};
use crate::support::{
    Context, exit_with_error, load_store_or_exit, mutate_salon_or_exit, print_json_or_exit,
    to_value_or_exit,
};
use chrono::Weekday;
use serde_json::json;
use stylehub_kernel::{Salon, SchedulePatch, SchedulePolicy};

pub fn run(command: ScheduleCommands, ctx: &Context) {
    match command {
        ScheduleCommands::Configure { fields } => run_configure(ctx, patch_from(fields)),
        ScheduleCommands::Update { fields } => run_update(ctx, patch_from(fields)),
        ScheduleCommands::Show => run_show(ctx),
        ScheduleCommands::Delete => {
            mutate_salon_or_exit(ctx, |salon| salon.delete_schedule());
        }
    }
}

fn patch_from(fields: ScheduleArgs) -> SchedulePatch {
    SchedulePatch {
        name: fields.name,
        weekday_morning_open: fields.weekday_morning_open,
        weekday_morning_close: fields.weekday_morning_close,
        weekday_afternoon_open: fields.weekday_afternoon_open,
        weekday_afternoon_close: fields.weekday_afternoon_close,
        saturday_active: fields.saturday_active,
        saturday_morning_open: fields.saturday_morning_open,
        saturday_morning_close: fields.saturday_morning_close,
        saturday_afternoon_active: fields.saturday_afternoon_active,
        saturday_afternoon_open: fields.saturday_afternoon_open,
        saturday_afternoon_close: fields.saturday_afternoon_close,
    }
}

fn run_configure(ctx: &Context, patch: SchedulePatch) {
    let mut policy = SchedulePolicy::default();
    patch.apply(&mut policy);
    let policy = mutate_salon_or_exit(ctx, |salon| salon.configure_schedule(policy));
    report(ctx, "configure", &policy, 0);
}

fn run_update(ctx: &Context, patch: SchedulePatch) {
    if patch.is_empty() {
        exit_with_error("nothing to update (pass at least one schedule field)");
    }
    let policy = mutate_salon_or_exit(ctx, |salon| salon.update_schedule(patch));
    report(ctx, "update", &policy, 0);
}

fn run_show(ctx: &Context) {
    let mut store = load_store_or_exit(ctx);
    let salon = Salon::new(&mut store, ctx.zone);
    let active = salon.active_appointment_count();
    match salon.schedule() {
        Some(policy) => report(ctx, "show", &policy, active),
        None if ctx.json => print_json_or_exit(&json!({
            "action": "schedule.show",
            "configured": false,
        })),
        None => {
            println!("stylehub schedule show");
            println!("  Schedule: not configured");
        }
    }
}

fn report(ctx: &Context, command: &str, policy: &SchedulePolicy, active: usize) {
    if ctx.json {
        print_json_or_exit(&json!({
            "action": format!("schedule.{command}"),
            "configured": true,
            "schedule": to_value_or_exit(policy),
            "activeAppointments": active,
            "locked": active > 0,
        }));
        return;
    }

    println!("stylehub schedule {command}");
    println!("  Schedule: {}", policy.name);
    println!("  Weekdays: {}", day_summary(policy, Weekday::Mon));
    println!("  Saturday: {}", day_summary(policy, Weekday::Sat));
    println!("  Sunday: {}", day_summary(policy, Weekday::Sun));
    if active > 0 {
        println!("  Locked: yes ({active} active appointments)");
    } else {
        println!("  Locked: no");
    }
}

fn day_summary(policy: &SchedulePolicy, weekday: Weekday) -> String {
    match policy.windows_for(weekday) {
        Some(windows) => windows
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", "),
        None => "closed".to_string(),
    }
}
