use crate::cli::StylistCommands;
use crate::support::{
    Context, exit_with_error, load_store_or_exit, mutate_salon_or_exit, print_json_or_exit,
    to_value_or_exit, yes_no,
};
use serde_json::json;
use stylehub_kernel::{NewStylist, SalonStore, Stylist, StylistPatch};

pub fn run(command: StylistCommands, ctx: &Context) {
    match command {
        StylistCommands::Add { name, phone, email } => {
            let stylist = mutate_salon_or_exit(ctx, |salon| {
                salon.add_stylist(NewStylist { name, phone, email })
            });
            report(ctx, "add", "Added", &stylist);
        }
        StylistCommands::Update {
            id,
            name,
            phone,
            email,
        } => {
            if name.is_none() && phone.is_none() && email.is_none() {
                exit_with_error("nothing to update (pass --name, --phone or --email)");
            }
            let patch = StylistPatch { name, phone, email };
            let stylist = mutate_salon_or_exit(ctx, |salon| salon.update_stylist(&id, patch));
            report(ctx, "update", "Updated", &stylist);
        }
        StylistCommands::Archive { id } => {
            let stylist = mutate_salon_or_exit(ctx, |salon| salon.set_stylist_active(&id, false));
            report(ctx, "archive", "Archived", &stylist);
        }
        StylistCommands::Restore { id } => {
            let stylist = mutate_salon_or_exit(ctx, |salon| salon.set_stylist_active(&id, true));
            report(ctx, "restore", "Restored", &stylist);
        }
        StylistCommands::List { all } => run_list(ctx, all),
    }
}

fn run_list(ctx: &Context, include_archived: bool) {
    let store = load_store_or_exit(ctx);
    let stylists: Vec<Stylist> = store
        .stylists()
        .into_iter()
        .filter(|stylist| include_archived || stylist.active)
        .collect();

    if ctx.json {
        print_json_or_exit(&json!({
            "action": "stylist.list",
            "storePath": ctx.store_display(),
            "count": stylists.len(),
            "stylists": to_value_or_exit(&stylists),
        }));
        return;
    }

    println!("stylehub stylist list");
    println!("  Count: {}", stylists.len());
    for stylist in &stylists {
        let archived = if stylist.active { "" } else { " (archived)" };
        println!("  - {} [{}]{archived}", stylist.name, stylist.id);
    }
}

fn report(ctx: &Context, command: &str, verb: &str, stylist: &Stylist) {
    if ctx.json {
        print_json_or_exit(&json!({
            "action": format!("stylist.{command}"),
            "storePath": ctx.store_display(),
            "stylist": to_value_or_exit(stylist),
        }));
        return;
    }

    println!("stylehub stylist {command}");
    println!("  {verb}: {} [{}]", stylist.name, stylist.id);
    println!("  Active: {}", yes_no(stylist.active));
    println!("  Path: {}", ctx.store_path.display());
}
