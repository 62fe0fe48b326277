//! Conformance scenarios for the Player API, one module per endpoint.

pub mod create;
pub mod delete;
pub mod get_all;
pub mod retrieve;
pub mod update;

use crate::core::suite::TestCase;

pub use get_all::SANITY_GROUP;

/// Every scenario in declaration order: create, retrieve, get-all, update,
/// delete.
pub fn all_cases() -> Vec<TestCase> {
    let mut cases = create::cases();
    cases.extend(retrieve::cases());
    cases.extend(get_all::cases());
    cases.extend(update::cases());
    cases.extend(delete::cases());
    cases
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_shape() {
        let cases = all_cases();
        assert_eq!(cases.len(), 58);

        let names: HashSet<String> = cases.iter().map(|c| c.full_name()).collect();
        assert_eq!(names.len(), cases.len(), "case names must be unique");

        let sanity: Vec<String> = cases
            .iter()
            .filter(|c| c.groups.iter().any(|g| g == SANITY_GROUP))
            .map(|c| c.full_name())
            .collect();
        assert_eq!(sanity, vec!["GetAllPlayers.default_system_users_are_present"]);

        assert!(names.contains("DeletePlayer.supervisor_and_admin_can_delete_player[admin, admin]"));
        assert!(names.contains("CreatePlayer.create_player_with_invalid_age[16]"));
        assert!(names.contains("UpdatePlayer.update_with_boundary_violations[Password without digits]"));
    }
}
