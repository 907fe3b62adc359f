//! Snapshot records: one JSON object per line, tagged by `kind`.

use serde::{Deserialize, Serialize};
use stylehub_kernel::{Appointment, Client, EntityKind, SchedulePolicy, Service, Stylist};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Record {
    Service(Service),
    Stylist(Stylist),
    Client(Client),
    Schedule(SchedulePolicy),
    Appointment(Appointment),
    Watermark(IdWatermark),
}

/// Highest id suffix issued for `entity` among records that were removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdWatermark {
    pub entity: EntityKind,
    pub last: u64,
}

impl Record {
    pub fn entity(&self) -> EntityKind {
        match self {
            Self::Service(_) => EntityKind::Service,
            Self::Stylist(_) => EntityKind::Stylist,
            Self::Client(_) => EntityKind::Client,
            Self::Schedule(_) => EntityKind::Schedule,
            Self::Appointment(_) => EntityKind::Appointment,
            Self::Watermark(mark) => mark.entity,
        }
    }

    /// Record id. The schedule and watermarks have none.
    pub fn id(&self) -> &str {
        match self {
            Self::Service(service) => &service.id,
            Self::Stylist(stylist) => &stylist.id,
            Self::Client(client) => &client.id,
            Self::Schedule(_) | Self::Watermark(_) => "",
            Self::Appointment(appointment) => &appointment.id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_are_tagged_by_kind() {
        let line = serde_json::to_string(&Record::Stylist(Stylist {
            id: "sty-1".to_string(),
            name: "Ana".to_string(),
            active: true,
            phone: String::new(),
            email: String::new(),
        }))
        .expect("record should serialize");
        assert_eq!(line, r#"{"kind":"stylist","id":"sty-1","name":"Ana","active":true}"#);
    }

    #[test]
    fn schedule_record_parses_with_kind_tag() {
        let record: Record = serde_json::from_str(
            r#"{"kind":"schedule","name":"Hours","weekday_morning_open":9.0,"weekday_morning_close":13.0,"weekday_afternoon_open":16.0,"weekday_afternoon_close":20.0,"saturday_active":false,"saturday_morning_open":9.0,"saturday_morning_close":13.0,"saturday_afternoon_active":false,"saturday_afternoon_open":16.0,"saturday_afternoon_close":20.0}"#,
        )
        .expect("schedule should parse");
        assert_eq!(record.entity(), EntityKind::Schedule);
        assert_eq!(record.id(), "");
    }

    #[test]
    fn watermark_record_names_its_entity() {
        let record: Record =
            serde_json::from_str(r#"{"kind":"watermark","entity":"appointment","last":10}"#)
                .expect("watermark should parse");
        assert_eq!(
            record,
            Record::Watermark(IdWatermark {
                entity: EntityKind::Appointment,
                last: 10,
            })
        );
        assert_eq!(record.entity(), EntityKind::Appointment);
        assert_eq!(record.id(), "");
    }
}
