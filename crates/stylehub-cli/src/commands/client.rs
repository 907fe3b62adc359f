use crate::cli::ClientCommands;
use crate::support::{
    Context, exit_with_error, load_store_or_exit, mutate_salon_or_exit, print_json_or_exit,
    to_value_or_exit, yes_no,
};
use serde_json::json;
use stylehub_kernel::{
    AppointmentFilter, AppointmentState, Client, ClientPatch, NewClient, Salon, SalonStore,
};

pub fn run(command: ClientCommands, ctx: &Context) {
    match command {
        ClientCommands::Add { name, phone, email } => run_add(ctx, NewClient { name, phone, email }),
        ClientCommands::Update {
            id,
            name,
            phone,
            email,
        } => run_update(ctx, id, ClientPatch { name, phone, email }),
        ClientCommands::Show { id } => run_show(ctx, id),
        ClientCommands::List => run_list(ctx),
    }
}

fn run_add(ctx: &Context, new: NewClient) {
    let client = mutate_salon_or_exit(ctx, |salon| salon.add_client(new));
    if ctx.json {
        print_json_or_exit(&json!({
            "action": "client.add",
            "storePath": ctx.store_display(),
            "client": to_value_or_exit(&client),
        }));
    } else {
        println!("stylehub client add");
        println!("  Added: {} [{}]", client.name, client.id);
        println!("  Path: {}", ctx.store_path.display());
    }
}

fn run_update(ctx: &Context, id: String, patch: ClientPatch) {
    if patch.name.is_none() && patch.phone.is_none() && patch.email.is_none() {
        exit_with_error("nothing to update (pass --name, --phone or --email)");
    }
    let client = mutate_salon_or_exit(ctx, |salon| salon.update_client(&id, patch));
    if ctx.json {
        print_json_or_exit(&json!({
            "action": "client.update",
            "storePath": ctx.store_display(),
            "client": to_value_or_exit(&client),
        }));
    } else {
        println!("stylehub client update");
        println!("  Updated: {} [{}]", client.name, client.id);
        println!("  Path: {}", ctx.store_path.display());
    }
}

fn run_show(ctx: &Context, id: String) {
    let mut store = load_store_or_exit(ctx);
    let salon = Salon::new(&mut store, ctx.zone);
    let client = salon.client(&id).unwrap_or_else(|e| exit_with_error(e));
    let booked = salon
        .store()
        .count_matching(&AppointmentFilter::new().for_client(&id).in_states(&AppointmentState::ACTIVE));

    if ctx.json {
        print_json_or_exit(&json!({
            "action": "client.show",
            "client": to_value_or_exit(&client),
            "activeAppointments": booked,
        }));
        return;
    }

    println!("stylehub client show");
    print_client(&client);
    println!("  Active appointments: {booked}");
}

fn run_list(ctx: &Context) {
    let store = load_store_or_exit(ctx);
    let clients = store.clients();

    if ctx.json {
        print_json_or_exit(&json!({
            "action": "client.list",
            "storePath": ctx.store_display(),
            "count": clients.len(),
            "clients": to_value_or_exit(&clients),
        }));
        return;
    }

    println!("stylehub client list");
    println!("  Count: {}", clients.len());
    for client in &clients {
        let vip = if client.is_frequent_client { " (VIP)" } else { "" };
        println!(
            "  - {} [{}] visits={}{vip}",
            client.name, client.id, client.appointment_done_count
        );
    }
}

fn print_client(client: &Client) {
    println!("  Client: {} [{}]", client.name, client.id);
    if !client.phone.is_empty() {
        println!("  Phone: {}", client.phone);
    }
    if !client.email.is_empty() {
        println!("  Email: {}", client.email);
    }
    println!("  Completed visits: {}", client.appointment_done_count);
    println!("  Frequent client: {}", yes_no(client.is_frequent_client));
}
