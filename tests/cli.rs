use assert_cmd::prelude::*;
use predicates::str::contains;
use std::fs;
use std::process::Command;
use tempfile::TempDir;

fn build_bundle() -> TempDir {
    let flow = r#"<flow default-language="hebrew">
  <screen name="intro" progress-bar="false">
    <begin popup="true"><header>welcome</header><body>intro_text</body></begin>
    <end popup="true"><header>well_done</header></end>
  </screen>
  <screen name="quiz">
    <begin popup="false"><header>quiz</header></begin>
  </screen>
  <screen name="outro" next-button="none"/>
</flow>
"#;
    let english = r#"{"translations":[
  {"key":"welcome","value":"Welcome"},
  {"key":"intro_text","value":"Let's begin"},
  {"key":"well_done","value":"Well done"}
]}"#;
    let arabic = r#"{"translations":[{"key":"welcome","value":"أهلا"}]}"#;

    let dir = tempfile::tempdir().expect("temp bundle");
    fs::write(dir.path().join("flow.xml"), flow).expect("write flow");
    fs::create_dir(dir.path().join("lang")).expect("lang dir");
    fs::write(dir.path().join("lang/english.json"), english).expect("write english");
    fs::write(dir.path().join("lang/arabic.json"), arabic).expect("write arabic");
    fs::write(dir.path().join("lang/hebrew.json"), "not json").expect("write hebrew");
    dir
}

#[test]
fn cli_replays_steps_and_prints_final_state() {
    let bundle = build_bundle();
    let mut cmd = Command::cargo_bin("flow-runtime").expect("binary exists");
    cmd.arg(bundle.path())
        .arg("--language")
        .arg("english")
        .arg("--steps")
        .arg("end,next,next,next,prev");
    cmd.assert()
        .success()
        .stdout(contains("Loaded flow with 3 screens (3 languages)"))
        .stdout(contains(" - intro"))
        .stdout(contains("lang:english: english (2/2 translated) [intro]"))
        .stdout(contains("end: ended [intro]"))
        .stdout(contains("next: stayed [outro]"))
        .stdout(contains("prev: moved [quiz]"))
        .stdout(contains(" - screen 2/3 quiz"))
        .stdout(contains(" - language english (ltr)"))
        .stdout(contains(" - score 50 (progress bar shown)"));
}

#[test]
fn cli_keeps_previous_translations_on_broken_language() {
    let bundle = build_bundle();
    let mut cmd = Command::cargo_bin("flow-runtime").expect("binary exists");
    cmd.arg(bundle.path())
        .arg("--steps")
        .arg("lang:arabic,lang:hebrew");
    cmd.assert()
        .success()
        .stdout(contains("lang:arabic: arabic (1/2 translated) [intro]"))
        .stdout(contains("lang:hebrew: hebrew (kept previous translations"))
        .stdout(contains(" - language hebrew (rtl)"))
        .stdout(contains("header=\"أهلا\""));
}

#[test]
fn cli_rejects_unknown_steps() {
    let bundle = build_bundle();
    let mut cmd = Command::cargo_bin("flow-runtime").expect("binary exists");
    cmd.arg(bundle.path()).arg("--steps").arg("jump");
    cmd.assert().failure().stderr(contains("Unknown step: jump"));
}

#[test]
fn cli_rejects_huge_wait() {
    let bundle = build_bundle();
    let mut cmd = Command::cargo_bin("flow-runtime").expect("binary exists");
    cmd.arg(bundle.path()).arg("--steps").arg("next,wait:1e30");
    cmd.assert()
        .failure()
        .code(1)
        .stderr(contains("Invalid wait duration in step \"wait:1e30\""));
}

#[test]
fn cli_rejects_negative_wait() {
    let bundle = build_bundle();
    let mut cmd = Command::cargo_bin("flow-runtime").expect("binary exists");
    cmd.arg(bundle.path()).arg("--steps").arg("wait:-1");
    cmd.assert()
        .failure()
        .code(1)
        .stderr(contains("Invalid wait duration"));
}

#[test]
fn cli_reports_missing_bundle() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut cmd = Command::cargo_bin("flow-runtime").expect("binary exists");
    cmd.arg(dir.path().join("missing"));
    cmd.assert()
        .failure()
        .stderr(contains("failed to open flow bundle"));
}
