#![no_main]

use fleet_governance::{
    resolve, DnsConfig, GovernanceSettings, OverrideStore, RepositoryConfig, TeamConfig,
    ZoneResolver, ZonesConfig,
};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };

    // Parsing must never panic
    let _ = GovernanceSettings::parse(s);
    let _ = DnsConfig::parse_list(s);
    let teams = TeamConfig::parse_list(s).unwrap_or_default();

    if let Ok(zones) = ZonesConfig::parse(s) {
        let registry = ZoneResolver::new(zones).load();
        let _ = ZoneResolver::resolve_dns(&registry, &[]);
    }

    // Resolution must either succeed or fail with an error
    if let Ok(repos) = RepositoryConfig::parse_list(s) {
        let mut store = OverrideStore::new();
        store.add_deployment_branches("sandbox", ["dev/*"]);
        store.add_deployment_branches("production", ["release/*"]);

        let settings = GovernanceSettings::new("fuzz");
        if let Ok(model) = resolve(&settings, teams, &repos, &store) {
            let _ = model.to_json();
        }
    }
});
