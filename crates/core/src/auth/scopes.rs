/// Scopes requested by the registration application, in request order.
pub const REGISTRATION_SCOPES: &[&str] = &[
    "publicData",
    "characterLocationRead",
    "characterNavigationWrite",
    "characterAssetsRead",
    "characterSkillsRead",
    "characterContractsRead",
    "corporationAssetsRead",
    "corporationMembersRead",
    "corporationStructuresRead",
    "corporationContractsRead",
    "esi-location.read_location.v1",
    "esi-location.read_ship_type.v1",
    "esi-skills.read_skills.v1",
    "esi-wallet.read_character_wallet.v1",
    "esi-search.search_structures.v1",
    "esi-universe.read_structures.v1",
    "esi-corporations.read_corporation_membership.v1",
    "esi-assets.read_assets.v1",
    "esi-corporations.read_structures.v1",
    "esi-location.read_online.v1",
    "esi-contracts.read_character_contracts.v1",
    "esi-characters.read_fatigue.v1",
    "esi-contracts.read_corporation_contracts.v1",
];

/// Owned copy of [`REGISTRATION_SCOPES`].
pub fn registration_scopes() -> Vec<String> {
    REGISTRATION_SCOPES.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_scopes_are_unique() {
        let unique: std::collections::HashSet<_> = REGISTRATION_SCOPES.iter().collect();
        assert_eq!(unique.len(), REGISTRATION_SCOPES.len());
    }

    #[test]
    fn registration_scopes_keep_order() {
        let scopes = registration_scopes();
        assert_eq!(scopes.first().map(String::as_str), Some("publicData"));
        assert_eq!(
            scopes.last().map(String::as_str),
            Some("esi-contracts.read_corporation_contracts.v1")
        );
    }
}
