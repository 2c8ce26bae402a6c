#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Role {
    Customer = 1,
    Employee = 2,
    Manager = 3,
    Admin = 4,
}

impl Role {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Role::Customer),
            2 => Some(Role::Employee),
            3 => Some(Role::Manager),
            4 => Some(Role::Admin),
            _ => None,
        }
    }

    pub fn id(&self) -> u8 {
        *self as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_ids_round_trip() {
        for id in 1u8..=4 {
            let role = Role::from_id(id).unwrap();
            assert_eq!(role.id(), id);
        }
    }

    #[test]
    fn unknown_role_id_is_rejected() {
        assert_eq!(Role::from_id(0), None);
        assert_eq!(Role::from_id(5), None);
    }
}
