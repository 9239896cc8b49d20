use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::database::accessor::Entity;

/// Permissions a group can grant to its members
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Permission {
    Read,
    Write,
    Delete,
    Share,
    UploadFiles,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::Read => "READ",
            Permission::Write => "WRITE",
            Permission::Delete => "DELETE",
            Permission::Share => "SHARE",
            Permission::UploadFiles => "UPLOAD_FILES",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "READ" => Ok(Permission::Read),
            "WRITE" => Ok(Permission::Write),
            "DELETE" => Ok(Permission::Delete),
            "SHARE" => Ok(Permission::Share),
            "UPLOAD_FILES" => Ok(Permission::UploadFiles),
            other => Err(format!("Unknown permission: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    pub name: String,
    pub permissions: Vec<Permission>,
    pub is_deleted: bool,
}

impl Entity for Group {
    const KIND: &'static str = "Group";

    fn id(&self) -> &str {
        &self.id
    }

    fn assign_id(&mut self, id: String) {
        self.id = id;
    }

    fn search_key(&self) -> &str {
        &self.name
    }

    fn is_deleted(&self) -> bool {
        self.is_deleted
    }

    fn mark_deleted(&mut self) {
        self.is_deleted = true;
    }
}

/// Body of `POST /group` and `PUT /group/:id`
#[derive(Debug, Clone, Deserialize)]
pub struct GroupPayload {
    pub name: String,
    #[serde(default)]
    pub permissions: Vec<Permission>,
}

impl GroupPayload {
    pub fn validate(&self) -> Result<(), HashMap<String, String>> {
        let mut errors = HashMap::new();
        if self.name.trim().is_empty() {
            errors.insert("name".to_string(), "Name cannot be empty".to_string());
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn into_group(self) -> Group {
        Group {
            id: String::new(),
            name: self.name.trim().to_string(),
            permissions: dedup_permissions(self.permissions),
            is_deleted: false,
        }
    }

    pub fn apply_to(self, group: &mut Group) {
        group.name = self.name.trim().to_string();
        group.permissions = dedup_permissions(self.permissions);
    }
}

// First occurrence wins
fn dedup_permissions(permissions: Vec<Permission>) -> Vec<Permission> {
    let mut unique = Vec::with_capacity(permissions.len());
    for permission in permissions {
        if !unique.contains(&permission) {
            unique.push(permission);
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permissions_use_upper_snake_case_on_the_wire() {
        let json = serde_json::to_string(&vec![Permission::Read, Permission::UploadFiles]).unwrap();
        assert_eq!(json, r#"["READ","UPLOAD_FILES"]"#);
        assert_eq!("SHARE".parse::<Permission>(), Ok(Permission::Share));
        assert!("ADMIN".parse::<Permission>().is_err());
    }

    #[test]
    fn unknown_permission_fails_deserialization() {
        let result = serde_json::from_str::<GroupPayload>(r#"{"name":"ops","permissions":["ROOT"]}"#);
        assert!(result.is_err());
    }

    #[test]
    fn duplicate_permissions_collapse_in_order() {
        let payload = GroupPayload {
            name: " editors ".to_string(),
            permissions: vec![Permission::Write, Permission::Read, Permission::Write],
        };
        let group = payload.into_group();
        assert_eq!(group.name, "editors");
        assert_eq!(group.permissions, vec![Permission::Write, Permission::Read]);
    }

    #[test]
    fn blank_name_is_rejected() {
        let payload = GroupPayload {
            name: "   ".to_string(),
            permissions: vec![],
        };
        assert!(payload.validate().unwrap_err().contains_key("name"));
    }
}
