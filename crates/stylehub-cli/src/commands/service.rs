use crate::cli::ServiceCommands;
use crate::support::{
    Context, exit_with_error, load_store_or_exit, mutate_salon_or_exit, print_json_or_exit,
    to_value_or_exit, yes_no,
};
use serde_json::json;
use stylehub_kernel::{NewService, SalonStore, Service, ServicePatch, format_hours};

pub fn run(command: ServiceCommands, ctx: &Context) {
    match command {
        ServiceCommands::Add {
            name,
            price,
            duration,
            description,
        } => run_add(
            ctx,
            NewService {
                name,
                description,
                price,
                duration,
            },
        ),
        ServiceCommands::Update {
            id,
            name,
            description,
            price,
            duration,
        } => run_update(
            ctx,
            id,
            ServicePatch {
                name,
                description,
                price,
                duration,
            },
        ),
        ServiceCommands::Archive { id } => run_set_active(ctx, id, false),
        ServiceCommands::Restore { id } => run_set_active(ctx, id, true),
        ServiceCommands::List { all } => run_list(ctx, all),
    }
}

fn run_add(ctx: &Context, new: NewService) {
    let service = mutate_salon_or_exit(ctx, |salon| salon.add_service(new));
    report(ctx, "add", "Added", &service);
}

fn run_update(ctx: &Context, id: String, patch: ServicePatch) {
    if patch.name.is_none()
        && patch.description.is_none()
        && patch.price.is_none()
        && patch.duration.is_none()
    {
        exit_with_error("nothing to update (pass --name, --description, --price or --duration)");
    }
    let service = mutate_salon_or_exit(ctx, |salon| salon.update_service(&id, patch));
    report(ctx, "update", "Updated", &service);
}

fn run_set_active(ctx: &Context, id: String, active: bool) {
    let service = mutate_salon_or_exit(ctx, |salon| salon.set_service_active(&id, active));
    if active {
        report(ctx, "restore", "Restored", &service);
    } else {
        report(ctx, "archive", "Archived", &service);
    }
}

fn run_list(ctx: &Context, include_archived: bool) {
    let store = load_store_or_exit(ctx);
    let services: Vec<Service> = store
        .services()
        .into_iter()
        .filter(|service| include_archived || service.active)
        .collect();

    if ctx.json {
        print_json_or_exit(&json!({
            "action": "service.list",
            "storePath": ctx.store_display(),
            "count": services.len(),
            "services": to_value_or_exit(&services),
        }));
        return;
    }

    println!("stylehub service list");
    println!("  Count: {}", services.len());
    for service in &services {
        println!(
            "  - {} [{}] {:.2} {}{}",
            service.name,
            service.id,
            service.price,
            format_hours(service.duration),
            if service.active { "" } else { " (archived)" }
        );
    }
}

fn report(ctx: &Context, command: &str, verb: &str, service: &Service) {
    if ctx.json {
        print_json_or_exit(&json!({
            "action": format!("service.{command}"),
            "storePath": ctx.store_display(),
            "service": to_value_or_exit(service),
        }));
        return;
    }

    println!("stylehub service {command}");
    println!("  {verb}: {} [{}]", service.name, service.id);
    println!("  Price: {:.2}", service.price);
    println!("  Duration: {}", format_hours(service.duration));
    println!("  Active: {}", yes_no(service.active));
    println!("  Path: {}", ctx.store_path.display());
}
