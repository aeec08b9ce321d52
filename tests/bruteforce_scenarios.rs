//! End-to-end dictionary runs against the in-memory adapter.
//!
//! Every run uses zero settle intervals and a private staging directory, so
//! nothing here touches a real wireless interface or sleeps.

use std::io::Write;

use wifi_sos::core::BUILTIN_PASSWORDS;
use wifi_sos::platform::MockCall;
use wifi_sos::{
    AttemptOutcome, BruteForceResult, BruteForcer, BruteforceConfig, DictionarySpec, MockControl,
    SettleIntervals, Termination,
};

const TARGET: &str = "CafeNet";

fn config(staging: &tempfile::TempDir) -> BruteforceConfig {
    BruteforceConfig {
        settle: SettleIntervals::none(),
        staging_dir: staging.path().to_path_buf(),
        ..BruteforceConfig::default()
    }
}

fn run(control: &MockControl, dictionary: &DictionarySpec) -> BruteForceResult {
    let staging = tempfile::tempdir().unwrap();
    let result = BruteForcer::new(control, config(&staging))
        .run(TARGET, dictionary)
        .unwrap();

    // Staged payloads never outlive their attempt
    assert_eq!(std::fs::read_dir(staging.path()).unwrap().count(), 0);
    result
}

fn wordlist(lines: &[&str]) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    file
}

fn removals(control: &MockControl) -> usize {
    control.count(|c| matches!(c, MockCall::RemoveProfile { .. }))
}

#[test]
fn test_empty_dictionary_exhausts_immediately() {
    let file = wordlist(&[]);
    let control = MockControl::new();

    let result = run(&control, &DictionarySpec::from_file(file.path()));

    assert_eq!(result.termination, Termination::Exhausted);
    assert_eq!(result.tested_count, 0);
    assert!(result.attempts.is_empty());
    assert_eq!(control.count(|c| matches!(c, MockCall::InstallProfile { .. })), 0);
    assert_eq!(control.count(|c| matches!(c, MockCall::Connect { .. })), 0);
}

#[test]
fn test_builtin_dictionary_finds_third_candidate() {
    let control = MockControl::new().accepting("1q2w3e4r");

    let result = run(&control, &DictionarySpec::builtin());

    assert!(result.success());
    assert_eq!(result.password(), Some("1q2w3e4r"));
    assert_eq!(result.tested_count, 3);
    assert_eq!(
        result.failed_attempts().collect::<Vec<_>>(),
        vec![BUILTIN_PASSWORDS[0], BUILTIN_PASSWORDS[1]]
    );
    assert_eq!(result.attempts[2].outcome, AttemptOutcome::Success);
}

#[test]
fn test_status_without_target_ssid_never_succeeds() {
    let control = MockControl::new()
        .accepting("1q2w3e4r")
        .with_status_text("    State : connected\n    SSID  : NeighbourNet\n");

    let capped = run(&control, &DictionarySpec::builtin().with_max_attempts(4));
    assert_eq!(capped.termination, Termination::Exhausted);
    assert_eq!(capped.failed_attempts().count(), 4);

    let control = MockControl::new().with_status_text("    State : connected\n    SSID  : NeighbourNet\n");
    let full = run(&control, &DictionarySpec::builtin());
    assert_eq!(full.termination, Termination::Exhausted);
    assert_eq!(full.failed_attempts().count(), BUILTIN_PASSWORDS.len());
    assert_eq!(control.count(|c| matches!(c, MockCall::ProbeConnectivity)), 0);
}

#[test]
fn test_success_restores_prior_connection_once() {
    let control = MockControl::new()
        .connected_to("HomeNet")
        .accepting("00000000");

    let result = run(&control, &DictionarySpec::builtin());

    assert_eq!(result.password(), Some("00000000"));
    let restores = control
        .connect_targets()
        .into_iter()
        .filter(|name| name == "HomeNet")
        .count();
    assert_eq!(restores, 1);
    assert_eq!(control.calls().last(), Some(&MockCall::Connect { name: "HomeNet".into() }));
    assert_eq!(control.associated().as_deref(), Some("HomeNet"));
}

#[test]
fn test_attempts_bounded_by_cap_and_dictionary() {
    let file = wordlist(&["alpha123", "bravo456", "charlie789"]);

    for cap in [0, 1, 2, 3, 10] {
        let control = MockControl::new();
        let result = run(&control, &DictionarySpec::from_file(file.path()).with_max_attempts(cap));

        let bound = if cap == 0 { 3 } else { cap.min(3) };
        assert_eq!(result.tested_count, bound, "cap {}", cap);
        assert_eq!(result.attempts.len(), result.tested_count);
    }
}

#[test]
fn test_attempt_order_follows_dictionary() {
    let lines = ["zulu0000", "  alpha111  ", "", "mike2222", "alpha111"];
    let file = wordlist(&lines);
    let control = MockControl::new();

    let result = run(&control, &DictionarySpec::from_file(file.path()));

    let tried: Vec<&str> = result.attempts.iter().map(|a| a.password.as_str()).collect();
    assert_eq!(tried, vec!["zulu0000", "alpha111", "mike2222", "alpha111"]);
}

#[test]
fn test_repeated_runs_are_identical() {
    let file = wordlist(&["first111", "second22", "third333"]);
    let dictionary = DictionarySpec::from_file(file.path());

    let first = run(&MockControl::new().accepting("second22"), &dictionary);
    let second = run(&MockControl::new().accepting("second22"), &dictionary);

    assert_eq!(first.attempts, second.attempts);
    assert_eq!(first.termination, second.termination);
}

#[test]
fn test_one_profile_and_one_removal_per_attempt() {
    let control = MockControl::new().accepting("123123123");

    let result = run(&control, &DictionarySpec::builtin());

    assert!(result.success());
    assert_eq!(control.peak_same_name_profiles(), 1);
    assert_eq!(removals(&control), result.tested_count);
    assert!(control.installed_profiles().is_empty());
}

#[test]
fn test_removal_issued_even_when_install_fails() {
    let control = MockControl::new().failing_install();

    let result = run(&control, &DictionarySpec::builtin().with_max_attempts(3));

    assert_eq!(result.tested_count, 3);
    assert_eq!(removals(&control), 3);
    assert!(result
        .attempts
        .iter()
        .all(|a| matches!(a.outcome, AttemptOutcome::Error(_))));
}

#[test]
fn test_ambiguous_status_uses_reachability_probe() {
    let ambiguous = "    State : associating\n    SSID  : CafeNet\n";

    let reachable = MockControl::new().with_status_text(ambiguous).reachable(true);
    let result = run(&reachable, &DictionarySpec::builtin());
    assert_eq!(result.password(), Some(BUILTIN_PASSWORDS[0]));
    assert_eq!(reachable.count(|c| matches!(c, MockCall::ProbeConnectivity)), 1);

    let unreachable = MockControl::new().with_status_text(ambiguous).reachable(false);
    let result = run(&unreachable, &DictionarySpec::builtin().with_max_attempts(2));
    assert_eq!(result.termination, Termination::Exhausted);
}

#[test]
fn test_missing_dictionary_file_is_an_error() {
    let staging = tempfile::tempdir().unwrap();
    let control = MockControl::new();

    let err = BruteForcer::new(&control, config(&staging))
        .run(TARGET, &DictionarySpec::from_file(staging.path().join("nope.txt")))
        .unwrap_err();

    assert!(matches!(err, wifi_sos::Error::DictionaryLoad { .. }));
    assert!(control.count(|c| matches!(c, MockCall::InstallProfile { .. })) == 0);
}
