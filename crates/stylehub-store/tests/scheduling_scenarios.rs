//! End-to-end scheduling scenarios: the kernel engine over a `MemoryStore`.
//!
//! Calendar anchors: 2026-10-19 is a Monday, 2026-10-24 a Saturday and
//! 2026-10-25 a Sunday.

use chrono::{FixedOffset, NaiveDate, NaiveDateTime};
use stylehub_kernel::{
    AppointmentEdit, AppointmentFilter, AppointmentRequest, AppointmentState, LineRequest,
    NewClient, NewService, NewStylist, PolicyError, Salon, SalonError, SalonStore, SchedulePatch,
    SchedulePolicy, Transition, ValidationError,
};
use stylehub_store::{MemoryStore, mutate_store_jsonl};

fn utc() -> FixedOffset {
    FixedOffset::east_opt(0).expect("valid offset")
}

fn local(month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, month, day)
        .and_then(|d| d.and_hms_opt(hour, minute, 0))
        .expect("valid timestamp")
}

/// Schedule with the default hours, one 1h service at 100, stylists Ana
/// (`sty-1`) and Bea (`sty-2`), clients Lucia (`cli-1`) and Marta (`cli-2`).
fn salon_store() -> MemoryStore {
    let mut store = MemoryStore::default();
    let mut salon = Salon::new(&mut store, utc());
    salon
        .configure_schedule(SchedulePolicy::default())
        .expect("schedule");
    salon
        .add_service(NewService {
            name: "Cut and style".to_string(),
            description: String::new(),
            price: 100.0,
            duration: 1.0,
        })
        .expect("service");
    for name in ["Ana", "Bea"] {
        salon
            .add_stylist(NewStylist {
                name: name.to_string(),
                ..NewStylist::default()
            })
            .expect("stylist");
    }
    for name in ["Lucia", "Marta"] {
        salon
            .add_client(NewClient {
                name: name.to_string(),
                ..NewClient::default()
            })
            .expect("client");
    }
    store
}

fn booking(
    salon: &Salon<'_, MemoryStore>,
    client: &str,
    stylist: &str,
    start: NaiveDateTime,
) -> AppointmentRequest {
    AppointmentRequest {
        client_id: client.to_string(),
        stylist_id: stylist.to_string(),
        date_start: salon.local_to_utc(start),
        lines: vec![LineRequest::service("svc-1")],
        notes: String::new(),
    }
}

fn book_and_complete(salon: &mut Salon<'_, MemoryStore>, client: &str, start: NaiveDateTime) {
    let request = booking(salon, client, "sty-1", start);
    let appointment = salon.create_appointment(request).expect("booking");
    salon
        .transition(&appointment.id, Transition::Confirm)
        .expect("confirm");
    salon
        .transition(&appointment.id, Transition::Complete)
        .expect("complete");
}

#[test]
fn ana_monday_bookings() {
    let mut store = salon_store();
    let mut salon = Salon::new(&mut store, utc());

    let first = salon
        .create_appointment(booking(&salon, "cli-1", "sty-1", local(10, 19, 10, 0)))
        .expect("10:00-11:00 is free and open");
    assert_eq!(first.local_end(&utc()), local(10, 19, 11, 0));

    let err = salon
        .create_appointment(booking(&salon, "cli-2", "sty-1", local(10, 19, 10, 30)))
        .expect_err("10:30-11:30 overlaps");
    assert_eq!(
        err.to_string(),
        "schedule conflict: stylist 'Ana' already has appointment apt-1 (19/10/2026 10:00 - 19/10/2026 11:00) overlapping 19/10/2026 10:30 - 19/10/2026 11:30"
    );

    let err = salon
        .create_appointment(booking(&salon, "cli-2", "sty-1", local(10, 19, 14, 0)))
        .expect_err("14:00 is the lunch break");
    assert!(matches!(
        err,
        SalonError::Validation(ValidationError::OutsideBusinessHours { .. })
    ));

    let err = salon
        .create_appointment(booking(&salon, "cli-2", "sty-1", local(10, 25, 10, 0)))
        .expect_err("sunday");
    assert!(matches!(
        err,
        SalonError::Validation(ValidationError::ClosedDay { .. })
    ));

    // Back-to-back and other stylists are fine.
    salon
        .create_appointment(booking(&salon, "cli-2", "sty-1", local(10, 19, 11, 0)))
        .expect("11:00 starts when the first ends");
    salon
        .create_appointment(booking(&salon, "cli-2", "sty-2", local(10, 19, 10, 30)))
        .expect("Bea is free");

    assert_eq!(store.find_matching(&AppointmentFilter::new(), None).len(), 3);
}

#[test]
fn cancelling_frees_the_slot() {
    let mut store = salon_store();
    let mut salon = Salon::new(&mut store, utc());
    let first = salon
        .create_appointment(booking(&salon, "cli-1", "sty-1", local(10, 20, 10, 0)))
        .expect("booking");
    salon
        .transition(&first.id, Transition::Cancel)
        .expect("cancel");

    let second = salon
        .create_appointment(booking(&salon, "cli-2", "sty-1", local(10, 20, 10, 0)))
        .expect("identical booking after cancel");
    assert_eq!(second.state, AppointmentState::Draft);
}

#[test]
fn sixth_visit_earns_the_discount() {
    let mut store = salon_store();
    let mut salon = Salon::new(&mut store, utc());
    for day in 19..=23 {
        book_and_complete(&mut salon, "cli-1", local(10, day, 10, 0));
    }
    for day in 19..=22 {
        book_and_complete(&mut salon, "cli-2", local(10, day, 12, 0));
    }

    let lucia = salon
        .create_appointment(booking(&salon, "cli-1", "sty-1", local(10, 26, 10, 0)))
        .expect("sixth booking");
    assert_eq!((lucia.discount_amount, lucia.final_amount), (5.0, 95.0));

    let marta = salon
        .create_appointment(booking(&salon, "cli-2", "sty-1", local(10, 26, 12, 0)))
        .expect("fifth booking");
    assert_eq!((marta.discount_amount, marta.final_amount), (0.0, 100.0));
}

#[test]
fn discount_is_counted_as_of_the_start_time() {
    let mut store = salon_store();
    let mut salon = Salon::new(&mut store, utc());

    // Booked before the history exists; updated once the history completes.
    let future = salon
        .create_appointment(booking(&salon, "cli-1", "sty-1", local(10, 30, 10, 0)))
        .expect("future booking");
    assert_eq!(future.discount_amount, 0.0);

    let early = salon
        .create_appointment(booking(&salon, "cli-1", "sty-1", local(10, 16, 10, 0)))
        .expect("earlier booking");

    for day in 19..=23 {
        book_and_complete(&mut salon, "cli-1", local(10, day, 10, 0));
    }

    let future = salon.appointment(&future.id).expect("future exists");
    assert_eq!((future.discount_amount, future.final_amount), (5.0, 95.0));

    // Later history does not count for an earlier appointment.
    let early = salon.appointment(&early.id).expect("early exists");
    assert_eq!(early.discount_amount, 0.0);
}

#[test]
fn frequent_flag_needs_more_than_five_visits() {
    let mut store = salon_store();
    let mut salon = Salon::new(&mut store, utc());
    for day in 19..=23 {
        book_and_complete(&mut salon, "cli-1", local(10, day, 10, 0));
    }
    let status = salon.client_loyalty("cli-1").expect("client");
    assert_eq!((status.done_count, status.is_frequent), (5, false));

    book_and_complete(&mut salon, "cli-1", local(10, 26, 10, 0));
    let status = salon.client_loyalty("cli-1").expect("client");
    assert_eq!((status.done_count, status.is_frequent), (6, true));
}

#[test]
fn reassigning_the_client_refreshes_both_clients() {
    let mut store = salon_store();
    let mut salon = Salon::new(&mut store, utc());
    for day in 19..=23 {
        book_and_complete(&mut salon, "cli-1", local(10, day, 10, 0));
    }
    let appointment = salon
        .create_appointment(booking(&salon, "cli-1", "sty-1", local(10, 26, 10, 0)))
        .expect("booking");
    assert_eq!(appointment.discount_amount, 5.0);

    let moved = salon
        .edit_appointment(
            &appointment.id,
            vec![AppointmentEdit::Client {
                client_id: "cli-2".to_string(),
            }],
        )
        .expect("reassign");
    assert_eq!(moved.discount_amount, 0.0);
    assert_eq!(moved.reference, "Appointment - Marta - 26/10/2026 10:00");
}

#[test]
fn moving_an_appointment_rechecks_overlap_and_hours() {
    let mut store = salon_store();
    let mut salon = Salon::new(&mut store, utc());
    salon
        .create_appointment(booking(&salon, "cli-1", "sty-1", local(10, 19, 10, 0)))
        .expect("first");
    let second = salon
        .create_appointment(booking(&salon, "cli-2", "sty-1", local(10, 19, 12, 0)))
        .expect("second");

    let into_first = salon.local_to_utc(local(10, 19, 10, 30));
    let err = salon
        .edit_appointment(
            &second.id,
            vec![AppointmentEdit::Start {
                date_start: into_first,
            }],
        )
        .expect_err("overlaps the first");
    assert!(matches!(
        err,
        SalonError::Validation(ValidationError::ScheduleConflict { .. })
    ));

    let saturday = salon.local_to_utc(local(10, 24, 13, 0));
    let moved = salon
        .edit_appointment(
            &second.id,
            vec![AppointmentEdit::Start {
                date_start: saturday,
            }],
        )
        .expect("saturday 13:00-14:00 fits the morning shift");
    assert_eq!(moved.reference, "Appointment - Marta - 24/10/2026 13:00");

    let err = salon
        .edit_appointment(&second.id, vec![AppointmentEdit::AddService {
            service_id: "svc-1".to_string(),
        }])
        .expect_err("a second hour runs past 14:00");
    assert!(matches!(
        err,
        SalonError::Validation(ValidationError::OutsideBusinessHours { .. })
    ));
}

#[test]
fn archived_stylist_keeps_history_but_takes_no_bookings() {
    let mut store = salon_store();
    let mut salon = Salon::new(&mut store, utc());
    let kept = salon
        .create_appointment(booking(&salon, "cli-1", "sty-2", local(10, 19, 10, 0)))
        .expect("booking");
    salon.set_stylist_active("sty-2", false).expect("archive");

    assert!(salon.appointment(&kept.id).is_ok());
    let err = salon
        .create_appointment(booking(&salon, "cli-1", "sty-2", local(10, 20, 10, 0)))
        .expect_err("archived");
    assert!(matches!(
        err,
        SalonError::Validation(ValidationError::InactiveStylist { .. })
    ));

    let first = salon
        .create_appointment(booking(&salon, "cli-2", "sty-1", local(10, 20, 10, 0)))
        .expect("Ana is active");
    let err = salon
        .edit_appointment(
            &first.id,
            vec![AppointmentEdit::Stylist {
                stylist_id: "sty-2".to_string(),
            }],
        )
        .expect_err("cannot reassign to an archived stylist");
    assert!(matches!(
        err,
        SalonError::Validation(ValidationError::InactiveStylist { .. })
    ));
}

#[test]
fn schedule_edits_wait_for_active_appointments() {
    let mut store = salon_store();
    let mut salon = Salon::new(&mut store, utc());
    let draft = salon
        .create_appointment(booking(&salon, "cli-1", "sty-1", local(10, 19, 10, 0)))
        .expect("draft");
    let confirmed = salon
        .create_appointment(booking(&salon, "cli-2", "sty-1", local(10, 19, 12, 0)))
        .expect("draft");
    salon
        .transition(&confirmed.id, Transition::Confirm)
        .expect("confirm");

    let open_saturday_afternoon = SchedulePatch {
        saturday_afternoon_active: Some(true),
        ..SchedulePatch::default()
    };
    assert_eq!(
        salon.update_schedule(open_saturday_afternoon.clone()),
        Err(SalonError::Policy(PolicyError::ScheduleLocked { active_count: 2 }))
    );

    salon.transition(&draft.id, Transition::Cancel).expect("cancel");
    salon
        .transition(&confirmed.id, Transition::Complete)
        .expect("complete");
    assert!(!salon.has_active_appointments());

    let updated = salon
        .update_schedule(open_saturday_afternoon)
        .expect("no active appointments");
    assert!(updated.saturday_afternoon_active);

    salon
        .create_appointment(booking(&salon, "cli-1", "sty-1", local(10, 24, 17, 0)))
        .expect("saturday afternoon is now open");

    assert_eq!(
        salon.delete_schedule(),
        Err(SalonError::Policy(PolicyError::ScheduleIsProtected))
    );
}

#[test]
fn booking_is_refused_without_a_schedule() {
    let mut store = MemoryStore::default();
    let mut salon = Salon::new(&mut store, utc());
    salon
        .add_service(NewService {
            name: "Cut".to_string(),
            description: String::new(),
            price: 20.0,
            duration: 0.5,
        })
        .expect("service");
    salon
        .add_stylist(NewStylist {
            name: "Ana".to_string(),
            ..NewStylist::default()
        })
        .expect("stylist");
    salon
        .add_client(NewClient {
            name: "Lucia".to_string(),
            ..NewClient::default()
        })
        .expect("client");

    let err = salon
        .create_appointment(booking(&salon, "cli-1", "sty-1", local(10, 19, 10, 0)))
        .expect_err("no schedule");
    assert_eq!(err, SalonError::Policy(PolicyError::NoScheduleConfigured));
}

#[test]
fn local_zone_defines_the_calendar_day() {
    let zone = FixedOffset::east_opt(2 * 3600).expect("valid offset");
    let mut store = salon_store();
    let mut salon = Salon::new(&mut store, zone);

    let appointment = salon
        .create_appointment(booking(&salon, "cli-1", "sty-1", local(10, 19, 9, 30)))
        .expect("09:30 local opens the morning shift");
    assert_eq!(appointment.date_start.naive_utc(), local(10, 19, 7, 30));
    assert_eq!(appointment.reference, "Appointment - Lucia - 19/10/2026 09:30");
}

#[test]
fn file_backed_mutation_commits_only_accepted_writes() {
    let unique = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock should be after unix epoch")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("stylehub-scenario-{}-{unique}", std::process::id()));
    let path = dir.join("salon.jsonl");
    salon_store().save_jsonl(&path).expect("seed snapshot");

    let booked: String = mutate_store_jsonl(&path, |store: &mut MemoryStore| {
        let mut salon = Salon::new(store, utc());
        let request = booking(&salon, "cli-1", "sty-1", local(10, 19, 10, 0));
        salon
            .create_appointment(request)
            .map(|appointment| (appointment.id, true))
    })
    .expect("first booking persists");
    assert_eq!(booked, "apt-1");

    let rejected = mutate_store_jsonl(&path, |store: &mut MemoryStore| {
        let mut salon = Salon::new(store, utc());
        let request = booking(&salon, "cli-2", "sty-1", local(10, 19, 10, 30));
        salon
            .create_appointment(request)
            .map(|appointment| (appointment.id, true))
    });
    assert!(rejected.is_err());

    let reloaded = MemoryStore::load_jsonl(&path).expect("snapshot loads");
    assert_eq!(
        reloaded.count_matching(&AppointmentFilter::new()),
        1,
        "rejected booking must not be persisted"
    );
    let _ = std::fs::remove_dir_all(dir);
}
