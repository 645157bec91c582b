use serde::Serialize;

use crate::{ClientId, EmployeeId, Error};

/// the profile linked to an authenticated user, resolved once per request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UserProfile {
    Client { client_id: ClientId },
    Employee { employee_id: EmployeeId, admin: bool },
}

/// verified caller as handed over by the authentication layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub user_id: i64,
    pub profile: UserProfile,
}

impl Identity {
    pub fn client(user_id: i64, client_id: ClientId) -> Self {
        Self {
            user_id,
            profile: UserProfile::Client { client_id },
        }
    }

    pub fn employee(user_id: i64, employee_id: EmployeeId, admin: bool) -> Self {
        Self {
            user_id,
            profile: UserProfile::Employee { employee_id, admin },
        }
    }

    /// build an identity from the raw user id, role and linked profile id
    pub fn from_parts(user_id: &str, role: &str, profile_id: &str) -> Result<Self, Error> {
        let user_id = user_id.trim().parse().map_err(|_| Error::Unauthorized)?;
        let profile_id = profile_id.trim().parse().map_err(|_| Error::Unauthorized)?;
        match role.trim().to_ascii_lowercase().as_str() {
            "client" => Ok(Self::client(user_id, profile_id)),
            "employee" => Ok(Self::employee(user_id, profile_id, false)),
            "admin" => Ok(Self::employee(user_id, profile_id, true)),
            _ => Err(Error::Unauthorized),
        }
    }

    pub fn is_staff(&self) -> bool {
        matches!(self.profile, UserProfile::Employee { .. })
    }

    pub fn client_id(&self) -> Option<ClientId> {
        match self.profile {
            UserProfile::Client { client_id } => Some(client_id),
            UserProfile::Employee { .. } => None,
        }
    }

    pub fn employee_id(&self) -> Option<EmployeeId> {
        match self.profile {
            UserProfile::Employee { employee_id, .. } => Some(employee_id),
            UserProfile::Client { .. } => None,
        }
    }

    pub fn require_staff(&self) -> Result<(), Error> {
        if self.is_staff() {
            Ok(())
        } else {
            Err(Error::Forbidden)
        }
    }

    /// staff may see everything, clients only what belongs to them
    pub fn can_access(&self, owner: ClientId) -> bool {
        self.is_staff() || self.client_id() == Some(owner)
    }
}
