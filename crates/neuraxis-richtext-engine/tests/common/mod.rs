use std::path::PathBuf;

use neuraxis_richtext_engine::models::Value;

pub fn fixture(name: &str) -> Value {
    let path = PathBuf::from(format!(
        "{}/tests/fixtures/{name}.json",
        env!("CARGO_MANIFEST_DIR")
    ));
    neuraxis_richtext_engine::load_value(&path).unwrap()
}
