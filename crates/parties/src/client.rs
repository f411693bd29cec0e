use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use billbook_core::{Aggregate, AggregateRoot, Coordinates, DomainError, Event, RecordId};

/// Client identifier, assigned by the store.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(pub RecordId);

impl ClientId {
    pub fn new(id: RecordId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for ClientId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<u64> for ClientId {
    fn from(raw: u64) -> Self {
        Self(RecordId::from_raw(raw))
    }
}

/// Contact information for a client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Free-text postal address as typed or as resolved by geocoding.
    pub address: Option<String>,
}

/// Structured address parts resolved by geocoding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressParts {
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
}

impl AddressParts {
    /// "City, State 12345" when city and state are both known.
    pub fn locality_line(&self) -> Option<String> {
        let (city, state) = (self.city.as_deref()?, self.state.as_deref()?);
        match self.postal_code.as_deref() {
            Some(zip) => Some(format!("{city}, {state} {zip}")),
            None => Some(format!("{city}, {state}")),
        }
    }
}

/// Aggregate root: Client.
#[derive(Debug, Clone, PartialEq)]
pub struct Client {
    id: ClientId,
    name: String,
    contact: ContactInfo,
    location: Option<Coordinates>,
    address_parts: AddressParts,
    version: u64,
    created: bool,
}

impl Client {
    /// Create an empty, not-yet-registered instance.
    pub fn empty(id: ClientId) -> Self {
        Self {
            id,
            name: String::new(),
            contact: ContactInfo::default(),
            location: None,
            address_parts: AddressParts::default(),
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> ClientId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contact(&self) -> &ContactInfo {
        &self.contact
    }

    pub fn location(&self) -> Option<Coordinates> {
        self.location
    }

    pub fn address_parts(&self) -> &AddressParts {
        &self.address_parts
    }

    pub fn is_located(&self) -> bool {
        self.location.is_some()
    }

    /// External map link, offered only for clients with resolved coordinates.
    pub fn map_link(&self) -> Option<String> {
        self.location.map(|c| c.map_link())
    }
}

impl AggregateRoot for Client {
    type Id = ClientId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: RegisterClient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterClient {
    pub client_id: ClientId,
    pub name: String,
    pub contact: ContactInfo,
    pub location: Option<Coordinates>,
    pub address_parts: AddressParts,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ClientCommand {
    RegisterClient(RegisterClient),
}

/// Event: ClientRegistered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientRegistered {
    pub client_id: ClientId,
    pub name: String,
    pub contact: ContactInfo,
    pub location: Option<Coordinates>,
    pub address_parts: AddressParts,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ClientEvent {
    ClientRegistered(ClientRegistered),
}

impl Event for ClientEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ClientEvent::ClientRegistered(_) => "parties.client.registered",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            ClientEvent::ClientRegistered(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Client {
    type Command = ClientCommand;
    type Event = ClientEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            ClientEvent::ClientRegistered(e) => {
                self.id = e.client_id;
                self.name = e.name.clone();
                self.contact = e.contact.clone();
                self.location = e.location;
                self.address_parts = e.address_parts.clone();
                self.created = true;
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            ClientCommand::RegisterClient(cmd) => self.handle_register(cmd),
        }
    }
}

impl Client {
    fn handle_register(&self, cmd: &RegisterClient) -> Result<Vec<ClientEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("client already exists"));
        }

        let name = cmd.name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }

        Ok(vec![ClientEvent::ClientRegistered(ClientRegistered {
            client_id: cmd.client_id,
            name: name.to_string(),
            contact: cmd.contact.clone(),
            location: cmd.location,
            address_parts: cmd.address_parts.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }
}
