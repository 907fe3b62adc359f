use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "stylehub",
    about = "StyleHub: appointment scheduling and business policy for salons",
    version
)]
pub struct Cli {
    /// Path to the TOML config file (default: stylehub.toml when present)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Path to the salon JSONL snapshot (overrides the config file)
    #[arg(long, global = true)]
    pub store: Option<String>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage the service catalog
    Service {
        #[command(subcommand)]
        command: ServiceCommands,
    },

    /// Manage stylists
    Stylist {
        #[command(subcommand)]
        command: StylistCommands,
    },

    /// Manage clients
    Client {
        #[command(subcommand)]
        command: ClientCommands,
    },

    /// Configure the salon opening hours
    Schedule {
        #[command(subcommand)]
        command: ScheduleCommands,
    },

    /// Book and manage appointments
    Appointment {
        #[command(subcommand)]
        command: AppointmentCommands,
    },

    /// Inspect the snapshot and move it through the event log
    Store {
        #[command(subcommand)]
        command: StoreCommands,
    },
}

#[derive(Subcommand)]
pub enum ServiceCommands {
    /// Add a bookable service
    Add {
        /// Service name (unique)
        name: String,

        /// Unit price
        #[arg(long)]
        price: f64,

        /// Duration in decimal hours (1.5 = 1h30)
        #[arg(long)]
        duration: f64,

        #[arg(long, default_value = "")]
        description: String,
    },

    /// Update service fields
    Update {
        /// Service ID
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        price: Option<f64>,

        /// Duration in decimal hours
        #[arg(long)]
        duration: Option<f64>,
    },

    /// Stop offering a service for new bookings
    Archive {
        /// Service ID
        id: String,
    },

    /// Offer an archived service again
    Restore {
        /// Service ID
        id: String,
    },

    /// List services
    List {
        /// Include archived services
        #[arg(long)]
        all: bool,
    },
}

#[derive(Subcommand)]
pub enum StylistCommands {
    /// Add a stylist
    Add {
        /// Stylist name (unique)
        name: String,

        #[arg(long, default_value = "")]
        phone: String,

        #[arg(long, default_value = "")]
        email: String,
    },

    /// Update stylist fields
    Update {
        /// Stylist ID
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        #[arg(long)]
        email: Option<String>,
    },

    /// Archive a stylist (no new bookings or reassignments)
    Archive {
        /// Stylist ID
        id: String,
    },

    /// Reactivate an archived stylist
    Restore {
        /// Stylist ID
        id: String,
    },

    /// List stylists
    List {
        /// Include archived stylists
        #[arg(long)]
        all: bool,
    },
}

#[derive(Subcommand)]
pub enum ClientCommands {
    /// Register a client
    Add {
        /// Client name (unique)
        name: String,

        #[arg(long, default_value = "")]
        phone: String,

        #[arg(long, default_value = "")]
        email: String,
    },

    /// Update client fields
    Update {
        /// Client ID
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        #[arg(long)]
        email: Option<String>,
    },

    /// Show a client with loyalty status
    Show {
        /// Client ID
        id: String,
    },

    /// List clients
    List,
}

/// Schedule fields. Hours are decimal (9.5 = 09:30).
#[derive(Args, Debug, Clone, Default)]
pub struct ScheduleArgs {
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub weekday_morning_open: Option<f64>,

    #[arg(long)]
    pub weekday_morning_close: Option<f64>,

    #[arg(long)]
    pub weekday_afternoon_open: Option<f64>,

    #[arg(long)]
    pub weekday_afternoon_close: Option<f64>,

    /// Open on Saturdays (true/false)
    #[arg(long)]
    pub saturday_active: Option<bool>,

    #[arg(long)]
    pub saturday_morning_open: Option<f64>,

    #[arg(long)]
    pub saturday_morning_close: Option<f64>,

    /// Open on Saturday afternoons (true/false)
    #[arg(long)]
    pub saturday_afternoon_active: Option<bool>,

    #[arg(long)]
    pub saturday_afternoon_open: Option<f64>,

    #[arg(long)]
    pub saturday_afternoon_close: Option<f64>,
}

#[derive(Subcommand)]
pub enum ScheduleCommands {
    /// Create the salon schedule (defaults for omitted fields)
    Configure {
        #[command(flatten)]
        fields: ScheduleArgs,
    },

    /// Update the schedule (refused while appointments are active)
    Update {
        #[command(flatten)]
        fields: ScheduleArgs,
    },

    /// Show the schedule and its lock state
    Show,

    /// Delete the schedule (always refused)
    Delete,
}

#[derive(Subcommand)]
pub enum AppointmentCommands {
    /// Book an appointment
    Book {
        /// Client ID
        #[arg(long)]
        client: String,

        /// Stylist ID
        #[arg(long)]
        stylist: String,

        /// Local start time (YYYY-MM-DDTHH:MM)
        #[arg(long)]
        start: String,

        /// Service ID (repeatable, one line per service)
        #[arg(long = "service")]
        services: Vec<String>,

        #[arg(long, default_value = "")]
        notes: String,
    },

    /// Edit an appointment; all edits are validated and saved together
    Edit {
        /// Appointment ID
        id: String,

        /// Reassign to stylist ID
        #[arg(long)]
        stylist: Option<String>,

        /// Reassign to client ID
        #[arg(long)]
        client: Option<String>,

        /// New local start time (YYYY-MM-DDTHH:MM)
        #[arg(long)]
        start: Option<String>,

        #[arg(long)]
        notes: Option<String>,

        /// Append a line for service ID (repeatable)
        #[arg(long = "add-service")]
        add_services: Vec<String>,

        /// Swap the service of a line (repeatable)
        #[arg(long = "replace-service", value_name = "LINE=SERVICE")]
        replace_services: Vec<String>,

        /// Detach the service of a line, keeping its price and duration
        #[arg(long = "clear-service", value_name = "LINE")]
        clear_services: Vec<u32>,

        /// Override the unit price of a line (repeatable)
        #[arg(long = "line-price", value_name = "LINE=PRICE")]
        line_prices: Vec<String>,

        /// Override the duration of a line in decimal hours (repeatable)
        #[arg(long = "line-duration", value_name = "LINE=HOURS")]
        line_durations: Vec<String>,

        /// Remove a line (repeatable)
        #[arg(long = "remove-line", value_name = "LINE")]
        remove_lines: Vec<u32>,
    },

    /// draft -> confirmed
    Confirm {
        /// Appointment ID
        id: String,
    },

    /// confirmed -> done
    Complete {
        /// Appointment ID
        id: String,
    },

    /// draft|confirmed -> cancelled
    Cancel {
        /// Appointment ID
        id: String,
    },

    /// cancelled -> draft
    Reset {
        /// Appointment ID
        id: String,
    },

    /// Delete an appointment and its lines
    Delete {
        /// Appointment ID
        id: String,
    },

    /// Show one appointment
    Show {
        /// Appointment ID
        id: String,
    },

    /// List appointments ordered by start
    List {
        /// Filter by stylist ID
        #[arg(long)]
        stylist: Option<String>,

        /// Filter by client ID
        #[arg(long)]
        client: Option<String>,

        /// Filter by state (draft, confirmed, done, cancelled)
        #[arg(long)]
        state: Option<String>,

        /// Only appointments ending after this local time
        #[arg(long)]
        from: Option<String>,

        /// Only appointments starting before this local time
        #[arg(long)]
        to: Option<String>,

        #[arg(long)]
        limit: Option<usize>,
    },
}

#[derive(Subcommand)]
pub enum StoreCommands {
    /// Show snapshot path, record counts and content digest
    Status,

    /// Write the snapshot as a salon.event.v1 log
    ExportEvents {
        /// Output path for the event log
        #[arg(long)]
        out: String,
    },

    /// Replay an event log and compare it with the snapshot
    ReplayEvents {
        /// Path to the event log
        events: String,

        /// Replace the snapshot with the replayed state
        #[arg(long)]
        apply: bool,
    },
}
