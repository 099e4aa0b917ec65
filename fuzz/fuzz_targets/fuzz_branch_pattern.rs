#![no_main]

use arbitrary::Arbitrary;
use fleet_governance::BranchProtection;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    pattern: String,
    branch: String,
}

fuzz_target!(|input: Input| {
    let rule = BranchProtection::new("fuzz", input.pattern.as_str(), false);
    let matched = rule.matches(&input.branch);

    // A pattern without wildcards only matches itself
    if !input.pattern.contains('*') {
        assert_eq!(matched, input.pattern == input.branch);
    }

    // A lone wildcard matches everything
    let any = BranchProtection::new("fuzz", "*", false);
    assert!(any.matches(&input.branch));
});
