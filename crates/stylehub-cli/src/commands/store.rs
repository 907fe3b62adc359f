use crate::cli::StoreCommands;
use crate::support::{Context, exit_with_error, load_store_or_exit, print_json_or_exit, yes_no};
use chrono::Utc;
use serde_json::json;
use stylehub_kernel::{
    AppointmentFilter, AppointmentState, EntityKind, Salon, SalonError, SalonStore,
};
use stylehub_store::{
    AtomicStoreMutationError, MemoryStore, migrate_store_to_events, mutate_store_jsonl,
    replay_events_from_path, store_lock_path, store_snapshot_ref, stores_equivalent,
    write_events_to_path,
};

const KINDS: [EntityKind; 4] = [
    EntityKind::Service,
    EntityKind::Stylist,
    EntityKind::Client,
    EntityKind::Appointment,
];

pub fn run(command: StoreCommands, ctx: &Context) {
    match command {
        StoreCommands::Status => run_status(ctx),
        StoreCommands::ExportEvents { out } => run_export(ctx, out),
        StoreCommands::ReplayEvents { events, apply } => run_replay(ctx, events, apply),
    }
}

fn run_status(ctx: &Context) {
    let exists = ctx.store_path.exists();
    let lock_held = store_lock_path(&ctx.store_path).exists();
    let store = load_store_or_exit(ctx);
    let snapshot_ref = store_snapshot_ref(&store);
    let active = store.count_matching(&AppointmentFilter::new().in_states(&AppointmentState::ACTIVE));
    let schedule = store.schedule().is_some();

    if ctx.json {
        let counts: serde_json::Map<String, serde_json::Value> = KINDS
            .iter()
            .map(|kind| (kind.as_str().to_string(), json!(store.count(*kind))))
            .collect();
        print_json_or_exit(&json!({
            "action": "store.status",
            "storePath": ctx.store_display(),
            "exists": exists,
            "lockHeld": lock_held,
            "zone": ctx.zone.to_string(),
            "counts": counts,
            "scheduleConfigured": schedule,
            "activeAppointments": active,
            "snapshotRef": snapshot_ref,
        }));
        return;
    }

    println!("stylehub store status");
    println!("  Path: {}", ctx.store_path.display());
    println!("  Exists: {}", yes_no(exists));
    println!("  Lock held: {}", yes_no(lock_held));
    println!("  Zone: {}", ctx.zone);
    for kind in KINDS {
        println!("  {}s: {}", kind.as_str(), store.count(kind));
    }
    println!("  Schedule configured: {}", yes_no(schedule));
    println!("  Active appointments: {active}");
    println!("  Snapshot: {snapshot_ref}");
}

fn run_export(ctx: &Context, out: String) {
    let store = load_store_or_exit(ctx);
    let events = migrate_store_to_events(&store, Utc::now());
    write_events_to_path(&out, &events)
        .unwrap_or_else(|e| exit_with_error(format!("failed to write {out}: {e}")));
    let snapshot_ref = store_snapshot_ref(&store);

    if ctx.json {
        print_json_or_exit(&json!({
            "action": "store.export_events",
            "storePath": ctx.store_display(),
            "eventsPath": out,
            "eventCount": events.len(),
            "snapshotRef": snapshot_ref,
        }));
    } else {
        println!("stylehub store export-events");
        println!("  Events: {} -> {out}", events.len());
        println!("  Snapshot: {snapshot_ref}");
    }
}

fn run_replay(ctx: &Context, events_path: String, apply: bool) {
    let replayed = replay_events_from_path(&events_path)
        .unwrap_or_else(|e| exit_with_error(format!("failed to replay {events_path}: {e}")));
    let current = load_store_or_exit(ctx);
    let equivalent = stores_equivalent(&current, &replayed);
    let replayed_ref = store_snapshot_ref(&replayed);
    let current_ref = store_snapshot_ref(&current);

    let written = if apply {
        replace_snapshot(ctx, replayed)
    } else {
        false
    };

    if ctx.json {
        print_json_or_exit(&json!({
            "action": "store.replay_events",
            "storePath": ctx.store_display(),
            "eventsPath": events_path,
            "equivalent": equivalent,
            "snapshotRef": current_ref,
            "replayedRef": replayed_ref,
            "applied": written,
        }));
    } else {
        println!("stylehub store replay-events");
        println!("  Events: {events_path}");
        println!("  Snapshot: {current_ref}");
        println!("  Replayed: {replayed_ref}");
        println!("  Equivalent: {}", yes_no(equivalent));
        if apply {
            println!("  Applied: {}", yes_no(written));
        }
    }
}

/// Overwrite the snapshot with `replayed` under the store lock, once the
/// salon accepts it as a replacement. Returns whether the file changed.
fn replace_snapshot(ctx: &Context, replayed: MemoryStore) -> bool {
    mutate_store_jsonl::<bool, SalonError, _>(&ctx.store_path, |store| {
        Salon::new(store, ctx.zone).check_replacement(&replayed)?;
        let changed = !stores_equivalent(store, &replayed);
        *store = replayed;
        Ok((changed, changed))
    })
    .unwrap_or_else(|error| match error {
        AtomicStoreMutationError::Mutation(err) => {
            exit_with_error(format!("refusing to apply replayed events: {err}"))
        }
        other => exit_with_error(other),
    })
}
