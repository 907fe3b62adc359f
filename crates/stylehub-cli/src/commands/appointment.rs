use crate::cli::AppointmentCommands;
use crate::support::{
    Context, exit_with_error, load_store_or_exit, mutate_salon_or_exit,
    parse_line_assignment_or_exit, parse_local_time_or_exit, print_json_or_exit,
    to_value_or_exit,
};
use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use serde_json::{Value, json};
use stylehub_kernel::{
    Appointment, AppointmentEdit, AppointmentFilter, AppointmentRequest, AppointmentState,
    LineRequest, Salon, SalonStore, Transition, format_hours,
};

const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M";

pub fn run(command: AppointmentCommands, ctx: &Context) {
    match command {
        AppointmentCommands::Book {
            client,
            stylist,
            start,
            services,
            notes,
        } => run_book(ctx, client, stylist, start, services, notes),
        AppointmentCommands::Edit {
            id,
            stylist,
            client,
            start,
            notes,
            add_services,
            replace_services,
            clear_services,
            line_prices,
            line_durations,
            remove_lines,
        } => {
            let mut edits = Vec::new();
            if let Some(stylist_id) = stylist {
                edits.push(AppointmentEdit::Stylist { stylist_id });
            }
            if let Some(client_id) = client {
                edits.push(AppointmentEdit::Client { client_id });
            }
            if let Some(start) = start {
                let local = parse_local_time_or_exit(&start);
                edits.push(AppointmentEdit::Start {
                    date_start: local_to_utc(ctx, local),
                });
            }
            if let Some(notes) = notes {
                edits.push(AppointmentEdit::Notes { notes });
            }
            for raw in &replace_services {
                let (line_id, service_id) = parse_line_assignment_or_exit::<String>(raw);
                edits.push(AppointmentEdit::ReplaceService {
                    line_id,
                    service_id: Some(service_id),
                });
            }
            for line_id in clear_services {
                edits.push(AppointmentEdit::ReplaceService {
                    line_id,
                    service_id: None,
                });
            }
            for raw in &line_prices {
                let (line_id, price_unit) = parse_line_assignment_or_exit::<f64>(raw);
                edits.push(AppointmentEdit::LinePrice {
                    line_id,
                    price_unit,
                });
            }
            for raw in &line_durations {
                let (line_id, duration) = parse_line_assignment_or_exit::<f64>(raw);
                edits.push(AppointmentEdit::LineDuration { line_id, duration });
            }
            for line_id in remove_lines {
                edits.push(AppointmentEdit::RemoveLine { line_id });
            }
            for service_id in add_services {
                edits.push(AppointmentEdit::AddService { service_id });
            }
            run_edit(ctx, id, edits);
        }
        AppointmentCommands::Confirm { id } => run_transition(ctx, id, Transition::Confirm),
        AppointmentCommands::Complete { id } => run_transition(ctx, id, Transition::Complete),
        AppointmentCommands::Cancel { id } => run_transition(ctx, id, Transition::Cancel),
        AppointmentCommands::Reset { id } => run_transition(ctx, id, Transition::Reset),
        AppointmentCommands::Delete { id } => run_delete(ctx, id),
        AppointmentCommands::Show { id } => run_show(ctx, id),
        AppointmentCommands::List {
            stylist,
            client,
            state,
            from,
            to,
            limit,
        } => run_list(ctx, stylist, client, state, from, to, limit),
    }
}

fn run_book(
    ctx: &Context,
    client_id: String,
    stylist_id: String,
    start: String,
    services: Vec<String>,
    notes: String,
) {
    let local = parse_local_time_or_exit(&start);
    let request = AppointmentRequest {
        client_id,
        stylist_id,
        date_start: local_to_utc(ctx, local),
        lines: services.into_iter().map(LineRequest::service).collect(),
        notes,
    };
    let appointment = mutate_salon_or_exit(ctx, |salon| salon.create_appointment(request));
    report(ctx, "book", "Booked", &appointment);
}

fn run_edit(ctx: &Context, id: String, edits: Vec<AppointmentEdit>) {
    if edits.is_empty() {
        exit_with_error("nothing to edit (see `stylehub appointment edit --help`)");
    }
    let appointment = mutate_salon_or_exit(ctx, |salon| salon.edit_appointment(&id, edits));
    report(ctx, "edit", "Updated", &appointment);
}

fn run_transition(ctx: &Context, id: String, transition: Transition) {
    let appointment = mutate_salon_or_exit(ctx, |salon| salon.transition(&id, transition));
    let verb = match transition {
        Transition::Confirm => "Confirmed",
        Transition::Complete => "Completed",
        Transition::Cancel => "Cancelled",
        Transition::Reset => "Reset",
    };
    report(ctx, transition.as_str(), verb, &appointment);
}

fn run_delete(ctx: &Context, id: String) {
    let removed = mutate_salon_or_exit(ctx, |salon| salon.delete_appointment(&id));
    if ctx.json {
        print_json_or_exit(&json!({
            "action": "appointment.delete",
            "storePath": ctx.store_display(),
            "deleted": removed.id,
            "lineCount": removed.lines.len(),
        }));
    } else {
        println!("stylehub appointment delete");
        println!("  Deleted: {} [{}]", removed.reference, removed.id);
        println!("  Path: {}", ctx.store_path.display());
    }
}

fn run_show(ctx: &Context, id: String) {
    let mut store = load_store_or_exit(ctx);
    let salon = Salon::new(&mut store, ctx.zone);
    let appointment = salon.appointment(&id).unwrap_or_else(|e| exit_with_error(e));
    if ctx.json {
        print_json_or_exit(&json!({
            "action": "appointment.show",
            "appointment": appointment_value(&appointment, &ctx.zone),
        }));
        return;
    }
    println!("stylehub appointment show");
    print_appointment("Appointment", &appointment, &ctx.zone);
}

fn run_list(
    ctx: &Context,
    stylist: Option<String>,
    client: Option<String>,
    state: Option<String>,
    from: Option<String>,
    to: Option<String>,
    limit: Option<usize>,
) {
    let mut filter = AppointmentFilter::new();
    if let Some(stylist_id) = stylist {
        filter = filter.for_stylist(stylist_id);
    }
    if let Some(client_id) = client {
        filter = filter.for_client(client_id);
    }
    if let Some(raw) = state {
        let state: AppointmentState = raw.parse().unwrap_or_else(|e: String| exit_with_error(e));
        filter = filter.in_states(&[state]);
    }
    if let Some(raw) = from {
        filter = filter.ending_after(local_to_utc(ctx, parse_local_time_or_exit(&raw)));
    }
    if let Some(raw) = to {
        filter = filter.starting_before(local_to_utc(ctx, parse_local_time_or_exit(&raw)));
    }

    let store = load_store_or_exit(ctx);
    let appointments = store.find_matching(&filter, limit);

    if ctx.json {
        let items: Vec<Value> = appointments
            .iter()
            .map(|appointment| appointment_value(appointment, &ctx.zone))
            .collect();
        print_json_or_exit(&json!({
            "action": "appointment.list",
            "storePath": ctx.store_display(),
            "count": items.len(),
            "appointments": items,
        }));
        return;
    }

    println!("stylehub appointment list");
    println!("  Count: {}", appointments.len());
    for appointment in &appointments {
        println!(
            "  - {} [{}] {} -> {} stylist={} client={} state={} final={:.2}",
            appointment.reference,
            appointment.id,
            appointment.local_start(&ctx.zone).format(DISPLAY_FORMAT),
            appointment.local_end(&ctx.zone).format("%H:%M"),
            appointment.stylist_id,
            appointment.client_id,
            appointment.state,
            appointment.final_amount,
        );
    }
}

fn local_to_utc(ctx: &Context, local: NaiveDateTime) -> DateTime<Utc> {
    stylehub_kernel::local_to_utc(local, &ctx.zone)
}

/// Serialized appointment plus its local wall-clock bounds.
fn appointment_value(appointment: &Appointment, zone: &FixedOffset) -> Value {
    let mut value = to_value_or_exit(appointment);
    if let Value::Object(fields) = &mut value {
        fields.insert(
            "localStart".to_string(),
            json!(appointment.local_start(zone).format(DISPLAY_FORMAT).to_string()),
        );
        fields.insert(
            "localEnd".to_string(),
            json!(appointment.local_end(zone).format(DISPLAY_FORMAT).to_string()),
        );
    }
    value
}

fn report(ctx: &Context, command: &str, verb: &str, appointment: &Appointment) {
    if ctx.json {
        print_json_or_exit(&json!({
            "action": format!("appointment.{command}"),
            "storePath": ctx.store_display(),
            "appointment": appointment_value(appointment, &ctx.zone),
        }));
        return;
    }
    println!("stylehub appointment {command}");
    print_appointment(verb, appointment, &ctx.zone);
    println!("  Path: {}", ctx.store_path.display());
}

fn print_appointment(verb: &str, appointment: &Appointment, zone: &FixedOffset) {
    println!("  {verb}: {} [{}]", appointment.reference, appointment.id);
    println!(
        "  When: {} -> {} ({zone})",
        appointment.local_start(zone).format(DISPLAY_FORMAT),
        appointment.local_end(zone).format(DISPLAY_FORMAT),
    );
    println!("  Stylist: {}", appointment.stylist_id);
    println!("  Client: {}", appointment.client_id);
    println!("  State: {}", appointment.state);
    for line in &appointment.lines {
        println!(
            "    #{} {} {:.2} x {}",
            line.id,
            line.service_id.as_deref().unwrap_or("-"),
            line.price_unit,
            format_hours(line.duration),
        );
    }
    println!(
        "  Total: {:.2}  Discount: {:.2}  Final: {:.2}",
        appointment.total_amount, appointment.discount_amount, appointment.final_amount
    );
    if !appointment.notes.is_empty() {
        println!("  Notes: {}", appointment.notes);
    }
}
