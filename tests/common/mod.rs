use captchanova::{CaptchaGenerator, CaptchaSpec, EmbeddedFont, LABELS_FILE, Size};
use std::path::Path;
use std::process::{Command, Output};

pub fn create_test_spec() -> CaptchaSpec {
    CaptchaSpec::new("ABC", 4, Size::new(120, 40))
}

pub fn create_generator(spec: CaptchaSpec) -> CaptchaGenerator {
    CaptchaGenerator::from_provider(spec, &EmbeddedFont).unwrap()
}

pub fn read_labels(dir: &Path) -> Vec<(String, String)> {
    let mut reader = csv::Reader::from_path(dir.join(LABELS_FILE)).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(headers.iter().collect::<Vec<_>>(), vec!["Id", "Label"]);
    reader
        .records()
        .map(|r| {
            let r = r.unwrap();
            (r[0].to_string(), r[1].to_string())
        })
        .collect()
}

pub fn run_cli(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_captchanova"))
        .args(args)
        .env("RUST_LOG", "error")
        .env_remove("CAPTCHA_FONT")
        .env_remove("CAPTCHA_SEED")
        .output()
        .unwrap()
}
