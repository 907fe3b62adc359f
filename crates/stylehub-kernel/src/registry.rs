//! Catalog and registry writes: services, stylists, clients.

use crate::catalog::{Client, Service, Stylist};
use crate::engine::Salon;
use crate::error::{SalonError, ValidationError};
use crate::loyalty::LoyaltyStatus;
use crate::store::{EntityKind, SalonStore};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewService {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    pub duration: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServicePatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub duration: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewStylist {
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StylistPatch {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewClient {
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
}

/// Contact details of a client; loyalty counters are not patchable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientPatch {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl<S: SalonStore + ?Sized> Salon<'_, S> {
    // ── Services ──────────────────────────────────────────────────

    pub fn add_service(&mut self, new: NewService) -> Result<Service, SalonError> {
        let service = Service {
            id: self.store.next_id(EntityKind::Service),
            name: new.name.trim().to_string(),
            description: new.description,
            price: new.price,
            duration: new.duration,
            active: true,
        };
        self.save_service(service)
    }

    pub fn update_service(&mut self, id: &str, patch: ServicePatch) -> Result<Service, SalonError> {
        let mut service = self.service(id)?;
        if let Some(name) = patch.name {
            service.name = name.trim().to_string();
        }
        if let Some(description) = patch.description {
            service.description = description;
        }
        if let Some(price) = patch.price {
            service.price = price;
        }
        if let Some(duration) = patch.duration {
            service.duration = duration;
        }
        self.save_service(service)
    }

    /// Archive (`false`) or restore (`true`) a service. Existing lines keep
    /// their snapshot either way.
    pub fn set_service_active(&mut self, id: &str, active: bool) -> Result<Service, SalonError> {
        let mut service = self.service(id)?;
        service.active = active;
        self.store.put_service(service.clone());
        tracing::info!(service = id, active, "service availability changed");
        Ok(service)
    }

    pub fn service(&self, id: &str) -> Result<Service, SalonError> {
        self.store
            .service(id)
            .ok_or_else(|| SalonError::not_found(EntityKind::Service, id))
    }

    fn save_service(&mut self, service: Service) -> Result<Service, SalonError> {
        service.validate()?;
        let taken = self
            .store
            .services()
            .iter()
            .any(|other| other.id != service.id && same_name(&other.name, &service.name));
        if taken {
            return Err(duplicate(EntityKind::Service, &service.name));
        }
        self.store.put_service(service.clone());
        tracing::info!(service = %service.id, name = %service.name, "service saved");
        Ok(service)
    }

    // ── Stylists ──────────────────────────────────────────────────

    pub fn add_stylist(&mut self, new: NewStylist) -> Result<Stylist, SalonError> {
        let stylist = Stylist {
            id: self.store.next_id(EntityKind::Stylist),
            name: new.name.trim().to_string(),
            active: true,
            phone: new.phone,
            email: new.email,
        };
        self.save_stylist(stylist)
    }

    pub fn update_stylist(&mut self, id: &str, patch: StylistPatch) -> Result<Stylist, SalonError> {
        let mut stylist = self.stylist(id)?;
        if let Some(name) = patch.name {
            stylist.name = name.trim().to_string();
        }
        if let Some(phone) = patch.phone {
            stylist.phone = phone;
        }
        if let Some(email) = patch.email {
            stylist.email = email;
        }
        self.save_stylist(stylist)
    }

    /// Archive (`false`) or restore (`true`) a stylist. Archived stylists
    /// keep their appointments but take no new bookings.
    pub fn set_stylist_active(&mut self, id: &str, active: bool) -> Result<Stylist, SalonError> {
        let mut stylist = self.stylist(id)?;
        stylist.active = active;
        self.store.put_stylist(stylist.clone());
        tracing::info!(stylist = id, active, "stylist availability changed");
        Ok(stylist)
    }

    pub fn stylist(&self, id: &str) -> Result<Stylist, SalonError> {
        self.store
            .stylist(id)
            .ok_or_else(|| SalonError::not_found(EntityKind::Stylist, id))
    }

    fn save_stylist(&mut self, stylist: Stylist) -> Result<Stylist, SalonError> {
        if stylist.name.is_empty() {
            return Err(ValidationError::InvalidStylist {
                reason: "name is required".to_string(),
            }
            .into());
        }
        let taken = self
            .store
            .stylists()
            .iter()
            .any(|other| other.id != stylist.id && same_name(&other.name, &stylist.name));
        if taken {
            return Err(duplicate(EntityKind::Stylist, &stylist.name));
        }
        self.store.put_stylist(stylist.clone());
        tracing::info!(stylist = %stylist.id, name = %stylist.name, "stylist saved");
        Ok(stylist)
    }

    // ── Clients ───────────────────────────────────────────────────

    pub fn add_client(&mut self, new: NewClient) -> Result<Client, SalonError> {
        let client = Client {
            id: self.store.next_id(EntityKind::Client),
            name: new.name.trim().to_string(),
            phone: new.phone,
            email: new.email,
            appointment_done_count: 0,
            is_frequent_client: false,
        };
        client.validate()?;
        self.store.put_client(client.clone());
        tracing::info!(client = %client.id, name = %client.name, "client added");
        Ok(client)
    }

    pub fn update_client(&mut self, id: &str, patch: ClientPatch) -> Result<Client, SalonError> {
        let mut client = self.client(id)?;
        let renamed = patch.name.is_some();
        if let Some(name) = patch.name {
            client.name = name.trim().to_string();
        }
        if let Some(phone) = patch.phone {
            client.phone = phone;
        }
        if let Some(email) = patch.email {
            client.email = email;
        }
        client.validate()?;
        self.store.put_client(client.clone());
        if renamed {
            self.refresh_references(id);
        }
        tracing::info!(client = id, "client updated");
        Ok(client)
    }

    pub fn client(&self, id: &str) -> Result<Client, SalonError> {
        self.store
            .client(id)
            .ok_or_else(|| SalonError::not_found(EntityKind::Client, id))
    }

    /// Stored loyalty counters of a client.
    pub fn client_loyalty(&self, id: &str) -> Result<LoyaltyStatus, SalonError> {
        let client = self.client(id)?;
        Ok(LoyaltyStatus {
            done_count: client.appointment_done_count,
            is_frequent: client.is_frequent_client,
        })
    }

    fn refresh_references(&mut self, client_id: &str) {
        let name = self.store.client(client_id).map(|client| client.name);
        let zone = self.zone();
        let filter = crate::store::AppointmentFilter::new().for_client(client_id);
        for mut appointment in self.store.find_matching(&filter, None) {
            appointment.refresh_reference(name.as_deref(), &zone);
            self.store.put_appointment(appointment);
        }
    }
}

/// Names compare trimmed and case-insensitively.
fn same_name(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

fn duplicate(kind: EntityKind, name: &str) -> SalonError {
    ValidationError::DuplicateName {
        kind,
        name: name.to_string(),
    }
    .into()
}
